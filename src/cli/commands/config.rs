use bota_config::{ColorMode, Config, ConfigManager};

use crate::cli::core::{parse_amount, parse_date, require_arg, CommandError, CommandResult};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;

const CONFIG_BACKUP_KEEP: usize = 10;
const SETTABLE_KEYS: &str =
    "currency, color, pot.base, pot.cutoff, forecast.reserve, forecast.horizon, session.idle";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("config", "Show the active configuration", "config", cmd_config),
        CommandEntry::new(
            "config-set",
            "Change one configuration value and save it",
            "config-set <key> <value>",
            cmd_config_set,
        ),
        CommandEntry::new(
            "config-backup",
            "Save a timestamped copy of the configuration",
            "config-backup [note]",
            cmd_config_backup,
        ),
        CommandEntry::new(
            "config-backups",
            "List configuration backups",
            "config-backups",
            cmd_config_backups,
        ),
        CommandEntry::new(
            "config-restore",
            "Restore the configuration from a backup",
            "config-restore <backup-name>",
            cmd_config_restore,
        ),
    ]
}

fn manager(context: &ShellContext) -> Result<ConfigManager, CommandError> {
    context
        .config_manager
        .clone()
        .ok_or_else(|| CommandError::Message("configuration is not file-backed".into()))
}

fn cmd_config(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let config = &context.app.config;
    output_section("Configuration");
    io::print_field("Locale", &config.locale);
    io::print_field("Currency", &config.currency);
    io::print_field("Color", config.color);
    io::print_field("Pot base", context.amount(config.pot.base_balance));
    let cutoff = config.pot.cutoff_date.map(|date| date.to_string());
    io::print_field("Pot cutoff", cutoff.as_deref().unwrap_or("none"));
    io::print_field("Default reserve", context.amount(config.forecast.reserve_min));
    io::print_field("Default horizon", format!("{} days", config.forecast.horizon_days));
    io::print_field("Server address", &config.server_addr);
    io::print_field("Idle timeout", format!("{} min", config.session.idle_timeout_minutes));
    io::print_field("Data root", config.resolve_data_root().display());
    Ok(())
}

/// Applies `key = value` to a copy of `config`.
fn apply_setting(config: &Config, key: &str, value: &str) -> Result<Config, CommandError> {
    let mut updated = config.clone();
    match key {
        "currency" => updated.currency = value.trim().to_uppercase(),
        "color" => updated.color = ColorMode::from_str(value),
        "pot.base" => updated.pot.base_balance = parse_amount(value)?,
        "pot.cutoff" => {
            updated.pot.cutoff_date = match value {
                "none" | "-" => None,
                raw => Some(parse_date(raw)?),
            }
        }
        "forecast.reserve" => updated.forecast.reserve_min = parse_amount(value)?,
        "forecast.horizon" => {
            updated.forecast.horizon_days = value.parse::<u32>().map_err(|_| {
                CommandError::InvalidArguments(format!("invalid horizon `{value}`"))
            })?
        }
        "session.idle" => {
            updated.session.idle_timeout_minutes = value.parse::<u32>().map_err(|_| {
                CommandError::InvalidArguments(format!("invalid minute count `{value}`"))
            })?
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown key `{other}`; expected one of {SETTABLE_KEYS}"
            )))
        }
    }
    updated
        .validate()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    Ok(updated)
}

fn cmd_config_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "config-set <key> <value>";
    let key = require_arg(args, 0, usage)?;
    let value = require_arg(args, 1, usage)?;
    let updated = apply_setting(&context.app.config, key, value)?;
    manager(context)?.save(&updated)?;
    output::apply_color_mode(updated.color);
    context.app.config = updated;
    io::print_success(format!("`{key}` updated."));
    Ok(())
}

fn cmd_config_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let manager = manager(context)?;
    let note = (!args.is_empty()).then(|| args.join(" "));
    let name = manager.backup(&context.app.config, note.as_deref())?;
    manager.prune_backups(CONFIG_BACKUP_KEEP)?;
    io::print_success(format!("Configuration saved as `{name}`."));
    Ok(())
}

fn cmd_config_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let names = manager(context)?.list_backups()?;
    output_section("Configuration backups");
    if names.is_empty() {
        io::print_info("  No backups yet.");
    }
    for name in names {
        io::print_info(format!("  {name}"));
    }
    Ok(())
}

fn cmd_config_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = require_arg(args, 0, "config-restore <backup-name>")?;
    if !context.confirm(&format!("Replace the configuration with `{name}`?"))? {
        io::print_info("Nothing restored.");
        return Ok(());
    }
    let config = manager(context)?.restore(name)?;
    output::apply_color_mode(config.color);
    context.app.config = config;
    io::print_success(format!("Configuration restored from `{name}`."));
    Ok(())
}
