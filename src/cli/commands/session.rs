use std::sync::Arc;

use bota_storage_json::JsonRecordStore;

use crate::cli::core::{parse_month, require_arg, CommandError, CommandResult};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::ShellContext;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "privacy",
            "Hide or show amounts",
            "privacy [on|off]",
            cmd_privacy,
        )
        .with_args(&[ArgKind::Toggle]),
        CommandEntry::new(
            "export",
            "Write one month of records to a JSON file",
            "export <YYYY-MM>",
            cmd_export,
        ),
        CommandEntry::new("backup", "Back up every record table", "backup [note]", cmd_backup),
        CommandEntry::new("backups", "List table backups", "backups", cmd_backups),
        CommandEntry::new(
            "restore",
            "Restore the record tables from a backup",
            "restore <backup-name>",
            cmd_restore,
        ),
    ]
}

fn archive(context: &ShellContext) -> Result<Arc<JsonRecordStore>, CommandError> {
    context
        .app
        .archive
        .clone()
        .ok_or_else(|| CommandError::Message("this store has no files to archive".into()))
}

fn cmd_privacy(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let masked = match args.first().map(|arg| arg.to_ascii_lowercase()).as_deref() {
        None => context.session.toggle_mask(),
        Some("on") => {
            context.session.set_masked(true);
            true
        }
        Some("off") => {
            context.session.set_masked(false);
            false
        }
        Some(other) => {
            return Err(CommandError::InvalidArguments(format!(
                "expected `on` or `off`, got `{other}`"
            )))
        }
    };
    if masked {
        io::print_info("Amounts hidden.");
    } else {
        io::print_info("Amounts visible.");
    }
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (year, month) = parse_month(require_arg(args, 0, "export <YYYY-MM>")?)?;
    let path = archive(context)?.export_month(year, month)?;
    io::print_success(format!("Exported {year}-{month:02} to {}.", path.display()));
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let name = archive(context)?.backup(note.as_deref())?;
    io::print_success(format!("Backup `{name}` created."));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let names = archive(context)?.list_backups()?;
    output_section("Backups");
    if names.is_empty() {
        io::print_info("  No backups yet.");
    }
    for name in names {
        io::print_info(format!("  {name}"));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = require_arg(args, 0, "restore <backup-name>")?;
    if !context.confirm(&format!("Replace every table with backup `{name}`?"))? {
        io::print_info("Nothing restored.");
        return Ok(());
    }
    archive(context)?.restore_backup(name)?;
    io::print_success(format!("Restored `{name}`."));
    Ok(())
}
