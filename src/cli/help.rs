use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    for (group, entries) in registry.grouped() {
        output_section(group.title());
        for entry in entries {
            io::print_info(format!("  {:<16} {}", entry.name, entry.description));
        }
    }
    io::print_hint("Use `help <command>` for details. Ids accept any unique prefix.");
}

pub fn print_command(entry: &CommandEntry) {
    output_section(format!("Help: {}", entry.name));
    io::print_info(format!("  Description: {}", entry.description));
    io::print_info(format!("  Usage: {}", entry.usage));
    if let Some(note) = argument_note(entry) {
        io::print_info(format!("  Note: {note}"));
    }
}

fn argument_note(entry: &CommandEntry) -> Option<&'static str> {
    entry.args.iter().find_map(|kind| match kind {
        ArgKind::Gig | ArgKind::ForecastItem => {
            Some("ids may be shortened to any unique prefix, as shown by `gigs` and `items`")
        }
        ArgKind::GigStatus => Some("use `next` to step one stage along the gig lifecycle"),
        ArgKind::StatsFilter => Some("filters are key=value pairs; lists are comma separated"),
        _ => None,
    })
}
