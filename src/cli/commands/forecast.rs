use bota_core::{ForecastItemService, ForecastService, SettingsService};
use bota_domain::{ForecastHorizon, ForecastItem, ForecastKind};

use crate::cli::core::{
    parse_amount, parse_date, require_arg, short_id, CommandError, CommandResult,
};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::ShellContext;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "forecast",
            "Project the pot balance to a horizon",
            "forecast [30|60|90|180|365]",
            cmd_forecast,
        ),
        CommandEntry::new("items", "List planned expenses and investments", "items", cmd_items),
        CommandEntry::new(
            "item-add",
            "Plan an expense or investment",
            "item-add <expense|investment> <amount> <name> [YYYY-MM-DD]",
            cmd_item_add,
        ),
        CommandEntry::new(
            "item-toggle",
            "Include or exclude a planned item",
            "item-toggle <item-id>",
            cmd_item_toggle,
        )
        .with_args(&[ArgKind::ForecastItem]),
        CommandEntry::new(
            "item-delete",
            "Delete a planned item",
            "item-delete <item-id>",
            cmd_item_delete,
        )
        .with_args(&[ArgKind::ForecastItem]),
        CommandEntry::new(
            "reserve",
            "Show or set the minimum reserve",
            "reserve [amount]",
            cmd_reserve,
        ),
        CommandEntry::new(
            "horizon",
            "Set the default forecast horizon",
            "horizon <30|60|90|180|365>",
            cmd_horizon,
        ),
    ]
}

fn parse_horizon(raw: &str) -> Result<ForecastHorizon, CommandError> {
    let days = raw
        .parse::<u32>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid horizon `{raw}`")))?;
    ForecastHorizon::try_from(days).map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

fn cmd_forecast(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let snapshot = context.snapshot();
    let horizon = match args.first() {
        Some(raw) => parse_horizon(raw)?,
        None => snapshot.settings.default_horizon,
    };
    let projection = ForecastService::from_snapshot(
        &snapshot,
        context.app.pot_policy(),
        horizon.days(),
        context.today(),
    );

    output_section(format!("Forecast to {} ({horizon})", projection.horizon_date));
    io::print_field("Current pot", context.amount(projection.current_pot));
    io::print_field("+ Open gig margins", context.amount(projection.gig_margin_total));
    io::print_field("- Expenses", context.amount(projection.expense_total));
    io::print_field("- Investments", context.amount(projection.investment_total));
    io::print_field("Projected", context.amount(projection.projected));
    let reserve = context.amount(projection.reserve_min);
    io::print_field("Reserve minimum", &reserve);
    io::print_light(projection.light, &reserve);
    io::print_snapshot_warnings(&snapshot.warnings());

    if !projection.gigs.is_empty() {
        output_section("Open gigs");
        for gig in &projection.gigs {
            let date = gig.date.map(|d| d.to_string()).unwrap_or_else(|| "no date".into());
            let marker = if gig.included { " " } else { "~" };
            io::print_info(format!(
                " {marker} {}  {date:<10}  {:<20} {}",
                short_id(gig.gig_id),
                gig.town,
                context.amount(gig.margin)
            ));
        }
    }
    Ok(())
}

fn cmd_items(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let mut items = context.app.store.forecast_items()?;
    items.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
    output_section("Planned items");
    if items.is_empty() {
        io::print_info("  No planned items. Use `item-add` to plan one.");
        return Ok(());
    }
    for item in items {
        let date = item.date.map(|d| d.to_string()).unwrap_or_else(|| "no date".into());
        let state = if item.is_active { "on " } else { "off" };
        io::print_info(format!(
            "  {}  [{state}]  {:<10}  {date:<10}  {:<24} {}",
            short_id(item.id),
            item.kind.to_string(),
            item.name,
            context.amount(item.amount)
        ));
    }
    Ok(())
}

fn cmd_item_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "item-add <expense|investment> <amount> <name> [YYYY-MM-DD]";
    let kind = require_arg(args, 0, usage)?
        .parse::<ForecastKind>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    let amount = parse_amount(require_arg(args, 1, usage)?)?;
    let name = require_arg(args, 2, usage)?;
    let mut item = ForecastItem::new(name, kind, amount);
    if let Some(raw) = args.get(3) {
        item = item.with_date(parse_date(raw)?);
    }
    let item = ForecastItemService::add(context.app.store.as_ref(), item)?;
    io::print_success(format!("Planned {} `{}` ({}).", item.kind, item.name, short_id(item.id)));
    Ok(())
}

fn cmd_item_toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let item = context.resolve_item(require_arg(args, 0, "item-toggle <item-id>")?)?;
    let item = ForecastItemService::toggle_active(context.app.store.as_ref(), item.id)?;
    let state = if item.is_active { "included" } else { "excluded" };
    io::print_success(format!("`{}` is now {state}.", item.name));
    Ok(())
}

fn cmd_item_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let item = context.resolve_item(require_arg(args, 0, "item-delete <item-id>")?)?;
    if !context.confirm(&format!("Delete `{}`?", item.name))? {
        io::print_info("Nothing deleted.");
        return Ok(());
    }
    ForecastItemService::delete(context.app.store.as_ref(), item.id)?;
    io::print_success(format!("Deleted `{}`.", item.name));
    Ok(())
}

fn cmd_reserve(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let store = context.app.store.as_ref();
    let defaults = context.app.default_settings();
    let settings = match args.first() {
        None => SettingsService::load_or(store, defaults)?,
        Some(raw) => {
            let reserve_min = parse_amount(raw)?;
            let settings = SettingsService::update_or_create(store, defaults, |settings| {
                settings.reserve_min = reserve_min
            })?;
            io::print_success("Reserve minimum updated.");
            settings
        }
    };
    io::print_field("Reserve minimum", context.amount(settings.reserve_min));
    Ok(())
}

fn cmd_horizon(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let horizon = parse_horizon(require_arg(args, 0, "horizon <30|60|90|180|365>")?)?;
    SettingsService::update_or_create(
        context.app.store.as_ref(),
        context.app.default_settings(),
        |settings| settings.default_horizon = horizon,
    )?;
    io::print_success(format!("Default horizon set to {horizon}."));
    Ok(())
}
