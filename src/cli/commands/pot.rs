use bota_core::{LedgerReport, LedgerService, MovementService};
use bota_domain::{AdvancePayment, LedgerMovement};

use crate::cli::core::{
    parse_amount, parse_date, require_arg, short_id, CommandError, CommandResult,
};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::{resolve_by_prefix, ShellContext};

const DEFAULT_LEDGER_ROWS: usize = 20;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("pot", "Show the reconciled pot balance", "pot", cmd_pot),
        CommandEntry::new(
            "ledger",
            "List pot ledger entries, newest first",
            "ledger [rows|all]",
            cmd_ledger,
        ),
        CommandEntry::new(
            "movement-add",
            "Record a manual pot movement",
            "movement-add <amount> <YYYY-MM-DD|-> <description>",
            cmd_movement_add,
        ),
        CommandEntry::new(
            "movement-delete",
            "Delete a manual pot movement",
            "movement-delete <movement-id>",
            cmd_movement_delete,
        ),
        CommandEntry::new("advances", "List advance payments", "advances", cmd_advances),
        CommandEntry::new(
            "advance-delete",
            "Delete an advance payment",
            "advance-delete <advance-id>",
            cmd_advance_delete,
        ),
        CommandEntry::new(
            "advance-add",
            "Record an advance paid out for an open gig",
            "advance-add <gig-id> <amount> [YYYY-MM-DD]",
            cmd_advance_add,
        )
        .with_args(&[ArgKind::Gig]),
    ]
}

fn ledger_report(context: &ShellContext) -> (LedgerReport, Vec<String>) {
    let snapshot = context.snapshot();
    let report = LedgerService::compute_ledger(
        &snapshot.movements,
        &snapshot.gigs,
        &snapshot.advances,
        context.app.pot_policy(),
    );
    (report, snapshot.warnings())
}

fn cmd_pot(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let (report, warnings) = ledger_report(context);
    output_section("Pot");
    if let Some(cutoff) = report.policy.cutoff {
        io::print_field("Since", cutoff);
    }
    io::print_field("Base balance", context.amount(report.policy.base_balance));
    io::print_field("Manual movements", context.amount(report.manual_total));
    io::print_field("Closed gigs", context.amount(report.closed_gig_total));
    io::print_field("Open advances", context.amount(-report.outstanding_advances));
    io::print_field("Pot real", context.amount(report.pot_real));
    io::print_field("Available", context.amount(report.diners_disposicio));
    io::print_snapshot_warnings(&warnings);
    Ok(())
}

fn cmd_ledger(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let limit = match args.first().copied() {
        None => Some(DEFAULT_LEDGER_ROWS),
        Some("all") => None,
        Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid row count `{raw}`"))
        })?),
    };
    let (report, _) = ledger_report(context);
    output_section("Ledger");
    if report.entries.is_empty() {
        io::print_info("  No entries.");
        return Ok(());
    }
    let shown = report.display_entries().take(limit.unwrap_or(usize::MAX));
    for entry in shown {
        let date = entry
            .date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "----------".into());
        io::print_info(format!(
            "  {date}  {:>14}  {:>14}  {}",
            context.amount(entry.amount),
            context.amount(entry.balance_after),
            entry.description
        ));
    }
    io::print_field("Closing balance", context.amount(report.closing_balance()));
    Ok(())
}

fn cmd_movement_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "movement-add <amount> <YYYY-MM-DD|-> <description>";
    let amount = parse_amount(require_arg(args, 0, usage)?)?;
    let date = match require_arg(args, 1, usage)? {
        "-" => None,
        raw => Some(parse_date(raw)?),
    };
    let description = args.get(2..).unwrap_or_default().join(" ");
    if description.trim().is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {usage}")));
    }
    let id = MovementService::record_movement(
        context.app.store.as_ref(),
        LedgerMovement::new(date, amount, description),
    )?;
    io::print_success(format!("Movement {} recorded.", short_id(id)));
    Ok(())
}

fn cmd_advance_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "advance-add <gig-id> <amount> [YYYY-MM-DD]";
    let gig = context.resolve_gig(require_arg(args, 0, usage)?)?;
    let amount = parse_amount(require_arg(args, 1, usage)?)?;
    let date = match args.get(2) {
        Some(raw) => parse_date(raw)?,
        None => context.today(),
    };
    let id = MovementService::record_advance(
        context.app.store.as_ref(),
        AdvancePayment::new(gig.id, amount, Some(date)),
    )?;
    io::print_success(format!(
        "Advance {} of {} recorded for {}.",
        short_id(id),
        context.amount(amount),
        gig.town
    ));
    Ok(())
}

fn cmd_movement_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = require_arg(args, 0, "movement-delete <movement-id>")?;
    let movement = resolve_by_prefix(context.app.store.movements()?, key, |m| m.id, "movement")?;
    if !context.confirm(&format!("Delete movement `{}`?", movement.description))? {
        io::print_info("Nothing deleted.");
        return Ok(());
    }
    MovementService::delete_movement(context.app.store.as_ref(), movement.id)?;
    io::print_success(format!("Deleted movement `{}`.", movement.description));
    Ok(())
}

fn cmd_advances(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let snapshot = context.snapshot();
    output_section("Advances");
    if snapshot.advances.is_empty() {
        io::print_info("  No advances.");
        return Ok(());
    }
    for advance in &snapshot.advances {
        let gig = snapshot.gigs.iter().find(|gig| gig.id == advance.gig_id);
        let town = gig.map_or("unknown gig", |gig| gig.town.as_str());
        let state = match gig {
            Some(gig) if gig.is_closed() => "settled",
            _ => "open",
        };
        let date = advance.date.map(|d| d.to_string()).unwrap_or_else(|| "----------".into());
        io::print_info(format!(
            "  {}  {date}  {:<20} {:>14}  {state}",
            short_id(advance.id),
            town,
            context.amount(advance.amount)
        ));
    }
    Ok(())
}

fn cmd_advance_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = require_arg(args, 0, "advance-delete <advance-id>")?;
    let advance = resolve_by_prefix(context.app.store.advances()?, key, |a| a.id, "advance")?;
    if !context.confirm(&format!("Delete advance of {}?", context.amount(advance.amount)))? {
        io::print_info("Nothing deleted.");
        return Ok(());
    }
    MovementService::delete_advance(context.app.store.as_ref(), advance.id)?;
    io::print_success("Advance deleted.");
    Ok(())
}
