use crate::cli::core::{CommandError, CommandResult};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::ShellContext;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "version",
            "Show build metadata and where records are kept",
            "version",
            cmd_version,
        ),
        CommandEntry::new("help", "Show available commands", "help [command]", cmd_help)
            .with_args(&[ArgKind::Command]),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output_section(format!("Buidant la Bota {}", meta.version));
    io::print_field("CLI version", build_info::CLI_VERSION);
    io::print_field("Build hash", format!("{} ({})", meta.git_hash, meta.git_status));
    io::print_field("Built at", meta.timestamp);
    io::print_field("Target", meta.target);
    io::print_field("Profile", meta.profile);
    io::print_field("Rustc", meta.rustc);

    output_section("Records");
    match &context.config_manager {
        Some(manager) => io::print_field("Config file", manager.config_path().display()),
        None => io::print_field("Config file", "not loaded from disk"),
    }
    match &context.app.archive {
        Some(_) => io::print_field("Tables", context.app.config.resolve_data_root().display()),
        None => io::print_field("Tables", "in memory"),
    }
    io::print_field("Amounts", if context.session.is_masked() { "hidden" } else { "shown" });
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        help::print_overview(&context.registry);
        return Ok(());
    };
    match context.command(&name.to_lowercase()) {
        Some(entry) => help::print_command(entry),
        None => context.suggest_command(name),
    }
    Ok(())
}

/// Leaves the loop; a masked session stays masked for the next start only if configured so.
fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.session.is_masked() && !context.app.config.session.privacy_mask {
        io::print_hint("Privacy was on for this session only.");
    }
    Err(CommandError::ExitRequested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::shell_context::CliMode;
    use crate::context::AppContext;
    use bota_config::Config;
    use bota_core::{FixedClock, InMemoryStore};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn shell() -> ShellContext {
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
        ShellContext::with_context(
            CliMode::Script,
            AppContext::with_store(Config::default(), Arc::new(InMemoryStore::new()), clock),
        )
    }

    #[test]
    fn version_reports_in_memory_records() {
        let mut shell = shell();
        assert!(cmd_version(&mut shell, &[]).is_ok());
    }

    #[test]
    fn help_accepts_known_and_unknown_names() {
        let mut shell = shell();
        assert!(cmd_help(&mut shell, &[]).is_ok());
        assert!(cmd_help(&mut shell, &["GIG-STATUS"]).is_ok());
        assert!(cmd_help(&mut shell, &["gig-stats"]).is_ok());
        assert!(matches!(cmd_exit(&mut shell, &[]), Err(CommandError::ExitRequested)));
    }
}
