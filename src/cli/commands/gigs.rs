use bota_core::{GigService, RawStatsFilter, StatsFilter};
use bota_domain::{Displayable, GigRecord, GigStatus, IncomeType};

use crate::cli::core::{
    parse_amount, parse_date, require_arg, short_id, CommandError, CommandResult,
};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::ShellContext;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("gigs", "List gigs, optionally filtered", "gigs [filters..]", cmd_gigs)
            .with_args(&[ArgKind::StatsFilter]),
        CommandEntry::new(
            "gig-add",
            "Book a gig",
            "gig-add <YYYY-MM-DD|-> <town> <income> <cash|invoice|other> [musician-cost] [status]",
            cmd_gig_add,
        ),
        CommandEntry::new(
            "gig-status",
            "Move a gig to another status",
            "gig-status <gig-id> <status|next>",
            cmd_gig_status,
        )
        .with_args(&[ArgKind::Gig, ArgKind::GigStatus]),
        CommandEntry::new(
            "gig-collect",
            "Mark a confirmed gig's income as collected",
            "gig-collect <gig-id>",
            cmd_gig_collect,
        )
        .with_args(&[ArgKind::Gig]),
        CommandEntry::new(
            "gig-pay",
            "Mark a confirmed gig's musicians as paid",
            "gig-pay <gig-id>",
            cmd_gig_pay,
        )
        .with_args(&[ArgKind::Gig]),
    ]
}

fn describe(context: &ShellContext, gig: &GigRecord) -> String {
    let date = gig.date.map(|d| d.to_string()).unwrap_or_else(|| "no date".into());
    let flags = match (gig.collected, gig.musicians_paid) {
        (true, true) => "closed",
        (true, false) => "collected",
        (false, true) => "paid",
        (false, false) => "",
    };
    format!(
        "  {}  {date:<10}  {:<20} {:<24} {:>14}  {flags}",
        short_id(gig.id),
        gig.town,
        gig.status.label(),
        context.amount(gig.income_total)
    )
}

fn cmd_gigs(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = StatsFilter::try_from(RawStatsFilter::from_pairs(args.iter().copied())?)?;
    let mut gigs = filter.apply(&context.app.store.gigs()?);
    gigs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.town.cmp(&b.town)));
    output_section("Gigs");
    if gigs.is_empty() {
        io::print_info("  No gigs match.");
    }
    for gig in &gigs {
        io::print_info(describe(context, gig));
    }
    Ok(())
}

fn cmd_gig_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage =
        "gig-add <YYYY-MM-DD|-> <town> <income> <cash|invoice|other> [musician-cost] [status]";
    let date = match require_arg(args, 0, usage)? {
        "-" => None,
        raw => Some(parse_date(raw)?),
    };
    let town = require_arg(args, 1, usage)?;
    let income = parse_amount(require_arg(args, 2, usage)?)?;
    let income_type = require_arg(args, 3, usage)?
        .parse::<IncomeType>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    let cost = args.get(4).map(|raw| parse_amount(raw)).transpose()?;
    let status = args
        .get(5)
        .map(|raw| GigStatus::parse(raw))
        .transpose()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?
        .unwrap_or(GigStatus::New);

    if income < 0.0 || cost.is_some_and(|cost| cost < 0.0) {
        return Err(CommandError::InvalidArguments(
            "gig amounts cannot be negative".into(),
        ));
    }

    let mut gig = GigRecord::new(date, town)
        .with_status(status)
        .with_income(income, income_type);
    if let Some(cost) = cost {
        gig = gig.with_musician_cost(cost);
    }
    let id = GigService::add(context.app.store.as_ref(), gig)?;
    io::print_success(format!("Gig {} booked in {town}.", short_id(id)));
    Ok(())
}

fn cmd_gig_status(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "gig-status <gig-id> <status|next>";
    let gig = context.resolve_gig(require_arg(args, 0, usage)?)?;
    let requested = args[1..].join(" ");
    let status = match require_arg(args, 1, usage)? {
        "next" | "seguent" => gig.status.next().ok_or_else(|| {
            CommandError::InvalidArguments(format!("`{}` is a final status", gig.status.label()))
        })?,
        _ => GigStatus::parse(&requested)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?,
    };
    let gig = GigService::advance_status(context.app.store.as_ref(), gig.id, status)?;
    io::print_success(format!("{} is now `{}`.", gig.town, gig.status.label()));
    Ok(())
}

fn cmd_gig_collect(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let gig = context.resolve_gig(require_arg(args, 0, "gig-collect <gig-id>")?)?;
    let gig = GigService::mark_collected(context.app.store.as_ref(), gig.id)?;
    report_progress(context, &gig);
    Ok(())
}

fn cmd_gig_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let gig = context.resolve_gig(require_arg(args, 0, "gig-pay <gig-id>")?)?;
    let gig = GigService::mark_musicians_paid(context.app.store.as_ref(), gig.id)?;
    report_progress(context, &gig);
    Ok(())
}

fn report_progress(context: &ShellContext, gig: &GigRecord) {
    if gig.is_closed() {
        io::print_success(format!(
            "{} is closed; {} joins the pot.",
            gig.town,
            context.amount(gig.pot_delta)
        ));
    } else {
        io::print_success(format!("{} updated.", gig.display_label()));
    }
}
