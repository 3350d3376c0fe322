use bota_core::GigService;
use bota_domain::{AssignmentRole, Musician};

use crate::cli::core::{parse_amount, require_arg, short_id, CommandError, CommandResult};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::{resolve_by_prefix, ShellContext};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("musicians", "List musicians and their fees", "musicians", cmd_musicians),
        CommandEntry::new(
            "musician-add",
            "Register a musician with a default fee",
            "musician-add <name> <fee> [instrument]",
            cmd_musician_add,
        ),
        CommandEntry::new(
            "gig-assign",
            "Assign a musician to a gig and recompute its cost",
            "gig-assign <gig-id> <musician> [regular|substitute] [price]",
            cmd_gig_assign,
        )
        .with_args(&[ArgKind::Gig, ArgKind::Musician]),
    ]
}

fn parse_role(raw: &str) -> Result<AssignmentRole, CommandError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "regular" | "titular" => Ok(AssignmentRole::Regular),
        "substitute" | "substitut" => Ok(AssignmentRole::Substitute),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown role `{other}` (use regular or substitute)"
        ))),
    }
}

/// Matches a musician by exact name, ignoring case, or by id prefix.
fn resolve_musician(context: &ShellContext, key: &str) -> Result<Musician, CommandError> {
    let musicians = context.app.store.musicians()?;
    if let Some(found) = musicians
        .iter()
        .find(|musician| musician.name.eq_ignore_ascii_case(key.trim()))
    {
        return Ok(found.clone());
    }
    resolve_by_prefix(musicians, key, |musician| musician.id, "musician")
}

fn cmd_musicians(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let mut musicians = context.app.store.musicians()?;
    musicians.sort_by(|a, b| a.name.cmp(&b.name));
    output_section("Musicians");
    if musicians.is_empty() {
        io::print_info("  No musicians registered.");
    }
    for musician in musicians {
        io::print_info(format!(
            "  {}  {:<24} {:<14} {}",
            short_id(musician.id),
            musician.name,
            musician.instrument.as_deref().unwrap_or("-"),
            context.amount(musician.default_fee)
        ));
    }
    Ok(())
}

fn cmd_musician_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "musician-add <name> <fee> [instrument]";
    let name = require_arg(args, 0, usage)?;
    let fee = parse_amount(require_arg(args, 1, usage)?)?;
    if fee < 0.0 {
        return Err(CommandError::InvalidArguments("fees cannot be negative".into()));
    }
    let mut musician = Musician::new(name, fee);
    musician.instrument = args.get(2).map(|instrument| instrument.to_string());
    context.app.store.save_musician(&musician)?;
    io::print_success(format!("Musician `{}` registered.", musician.name));
    Ok(())
}

fn cmd_gig_assign(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "gig-assign <gig-id> <musician> [regular|substitute] [price]";
    let gig = context.resolve_gig(require_arg(args, 0, usage)?)?;
    let musician = resolve_musician(context, require_arg(args, 1, usage)?)?;
    let role = args
        .get(2)
        .map(|raw| parse_role(raw))
        .transpose()?
        .unwrap_or_default();
    let price = args.get(3).map(|raw| parse_amount(raw)).transpose()?;

    GigService::assign_musician(context.app.store.as_ref(), gig.id, musician.id, role, price)?;
    let gig = context.app.store.gig(gig.id)?;
    io::print_success(format!(
        "{} plays {} ({role}); musician cost now {}.",
        musician.name,
        gig.town,
        context.amount(gig.musician_cost_total)
    ));
    Ok(())
}
