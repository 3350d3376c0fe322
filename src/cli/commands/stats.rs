use bota_core::{
    CompareAxis, CompareService, GigStats, RawStatsFilter, StatsFilter, StatsOptions, StatsService,
};

use crate::cli::core::{require_arg, short_id, CommandError, CommandResult};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::ShellContext;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "stats",
            "Gig statistics, optionally filtered",
            "stats [years=2024,2025] [towns=..] [types=..] [payment=cash|invoice] [status=..] [minPrice=..] [maxPrice=..] [--timeline] [--debug]",
            cmd_stats,
        )
        .with_args(&[ArgKind::StatsFilter]),
        CommandEntry::new(
            "compare",
            "Compare two subsets along one axis",
            "compare <year|town|type|payment> <a> <b> [filters..]",
            cmd_compare,
        )
        .with_args(&[
            ArgKind::CompareAxis,
            ArgKind::Free,
            ArgKind::Free,
            ArgKind::StatsFilter,
        ]),
    ]
}

/// Splits `key=value` filters from `--flag` switches.
fn parse_filter_args(args: &[&str]) -> Result<(StatsFilter, StatsOptions), CommandError> {
    let mut options = StatsOptions::default();
    let mut pairs = Vec::new();
    for arg in args {
        match *arg {
            "--timeline" => options.timeline = true,
            "--debug" => options.debug = true,
            pair => pairs.push(pair),
        }
    }
    let raw = RawStatsFilter::from_pairs(pairs)?;
    Ok((StatsFilter::try_from(raw)?, options))
}

fn print_stats(context: &ShellContext, stats: &GigStats) {
    let kpis = &stats.kpis;
    let counts = &stats.counts;
    io::print_field(
        "Gigs",
        format!(
            "{} ({} confirmed, {} pending, {} rejected)",
            counts.total, counts.confirmed, counts.pending, counts.rejected
        ),
    );
    io::print_field("Total income", context.amount(kpis.total_income));
    io::print_field("  cash", context.amount(kpis.cash_income));
    io::print_field("  invoice", context.amount(kpis.invoice_income));
    io::print_field("Musician cost", context.amount(kpis.total_musician_cost));
    io::print_field("Net profit", context.amount(kpis.net_profit));
    io::print_field("Median price", context.amount(kpis.median_price));
    io::print_field("Average price", context.amount(kpis.average_price));
    io::print_field("Acceptance rate", format!("{:.1}%", kpis.acceptance_rate));
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (filter, options) = parse_filter_args(args)?;
    let gigs = context.app.store.gigs()?;
    let report = StatsService::report(&gigs, &filter, options);
    let stats = &report.stats;

    output_section("Statistics");
    print_stats(context, stats);

    if !stats.monthly.is_empty() {
        output_section("By month");
        for bucket in &stats.monthly {
            io::print_info(format!(
                "  {}  {:>3}  {}",
                bucket.month,
                bucket.count,
                context.amount(bucket.income)
            ));
        }
    }
    if !stats.top_towns.is_empty() {
        output_section("Top towns");
        for bucket in &stats.top_towns {
            io::print_info(format!(
                "  {:<24} {:>3}  {}",
                bucket.town,
                bucket.count,
                context.amount(bucket.income)
            ));
        }
    }
    output_section("Price ranges");
    for bucket in &stats.price_buckets {
        io::print_info(format!("  {:<12} {}", bucket.label, bucket.count));
    }

    if let Some(timeline) = &report.timeline {
        output_section("Timeline");
        for entry in timeline {
            let date = entry.date.map(|d| d.to_string()).unwrap_or_else(|| "no date".into());
            io::print_info(format!(
                "  {}  {date:<10}  {:<20} {:<24} {}",
                short_id(entry.id),
                entry.town,
                entry.status.label(),
                context.amount(entry.income)
            ));
        }
    }
    if let Some(debug) = &report.debug {
        output_section("Filter");
        io::print_info(format!(
            "  {} of {} gigs matched",
            debug.after_filter, debug.before_filter
        ));
        if let Ok(json) = serde_json::to_string(&debug.filter) {
            io::print_info(format!("  {json}"));
        }
    }
    Ok(())
}

fn cmd_compare(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "compare <year|town|type|payment> <a> <b> [filters..]";
    let axis = require_arg(args, 0, usage)?.parse::<CompareAxis>()?;
    let a = require_arg(args, 1, usage)?;
    let b = require_arg(args, 2, usage)?;
    let (base, _) = parse_filter_args(&args[3..])?;
    let gigs = context.app.store.gigs()?;
    let report = CompareService::compare(&gigs, &base, axis, a, b)?;

    output_section(format!("{axis}: {}", report.a.label));
    print_stats(context, &report.a.stats);
    output_section(format!("{axis}: {}", report.b.label));
    print_stats(context, &report.b.stats);

    output_section(format!("{} vs {}", report.b.label, report.a.label));
    for (name, delta) in &report.deltas {
        let pct = if delta.pct.is_infinite() {
            if delta.pct > 0.0 { "+inf%".to_string() } else { "-inf%".to_string() }
        } else {
            format!("{:+.1}%", delta.pct)
        };
        let diff = if context.session.is_masked() {
            crate::session::MASK.to_string()
        } else {
            format!("{:+.2}", delta.diff)
        };
        io::print_info(format!("  {name:<18} {diff:>12}  {pct:>9}"));
    }
    Ok(())
}
