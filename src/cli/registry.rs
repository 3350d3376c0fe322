use std::collections::HashMap;

use crate::cli::core::CommandResult;
use crate::cli::shell_context::ShellContext;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Sections of the help overview, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandGroup {
    Pot,
    Forecast,
    Statistics,
    Gigs,
    Musicians,
    Session,
    Config,
    System,
}

impl CommandGroup {
    pub fn title(self) -> &'static str {
        match self {
            CommandGroup::Pot => "Pot",
            CommandGroup::Forecast => "Forecast",
            CommandGroup::Statistics => "Statistics",
            CommandGroup::Gigs => "Gigs",
            CommandGroup::Musicians => "Musicians",
            CommandGroup::Session => "Session & data",
            CommandGroup::Config => "Configuration",
            CommandGroup::System => "System",
        }
    }
}

/// What a positional argument refers to; drives tab completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Gig,
    ForecastItem,
    Musician,
    GigStatus,
    CompareAxis,
    /// `key=value` statistics filters. Repeats for every remaining argument.
    StatsFilter,
    Toggle,
    Command,
    Free,
}

#[derive(Clone)]
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
    pub group: CommandGroup,
    pub args: &'static [ArgKind],
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
            group: CommandGroup::System,
            args: &[],
        }
    }

    pub fn with_args(mut self, args: &'static [ArgKind]) -> Self {
        self.args = args;
        self
    }

    /// Kind of the positional argument at `index` (0 is the first after the command).
    pub fn arg_kind(&self, index: usize) -> ArgKind {
        match self.args.get(index) {
            Some(kind) => *kind,
            None => match self.args.last() {
                Some(ArgKind::StatsFilter) => ArgKind::StatsFilter,
                _ => ArgKind::Free,
            },
        }
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entries` under `group`. A later entry with the same name replaces the
    /// earlier one but keeps its position.
    pub fn register_group(&mut self, group: CommandGroup, entries: Vec<CommandEntry>) {
        for mut entry in entries {
            entry.group = group;
            if self.commands.insert(entry.name, entry.clone()).is_none() {
                self.order.push(entry.name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    /// Entries in registration order.
    pub fn list(&self) -> impl Iterator<Item = &CommandEntry> {
        self.order.iter().filter_map(move |name| self.commands.get(name))
    }

    /// Entries bucketed by group, groups in display order.
    pub fn grouped(&self) -> Vec<(CommandGroup, Vec<&CommandEntry>)> {
        let mut groups: Vec<(CommandGroup, Vec<&CommandEntry>)> = Vec::new();
        for entry in self.list() {
            match groups.iter_mut().find(|(group, _)| *group == entry.group) {
                Some((_, entries)) => entries.push(entry),
                None => groups.push((entry.group, vec![entry])),
            }
        }
        groups.sort_by_key(|(group, _)| *group);
        groups
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|entry| entry.handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn filters_repeat_past_the_declared_arguments() {
        let compare = CommandEntry::new("compare", "", "", noop).with_args(&[
            ArgKind::CompareAxis,
            ArgKind::Free,
            ArgKind::Free,
            ArgKind::StatsFilter,
        ]);
        assert_eq!(compare.arg_kind(0), ArgKind::CompareAxis);
        assert_eq!(compare.arg_kind(1), ArgKind::Free);
        assert_eq!(compare.arg_kind(6), ArgKind::StatsFilter);

        let collect = CommandEntry::new("gig-collect", "", "", noop).with_args(&[ArgKind::Gig]);
        assert_eq!(collect.arg_kind(1), ArgKind::Free);
    }

    #[test]
    fn overview_groups_follow_display_order() {
        let mut registry = CommandRegistry::new();
        registry.register_group(
            CommandGroup::System,
            vec![CommandEntry::new("help", "", "", noop)],
        );
        registry.register_group(
            CommandGroup::Pot,
            vec![
                CommandEntry::new("pot", "", "", noop),
                CommandEntry::new("ledger", "", "", noop),
            ],
        );

        let grouped = registry.grouped();
        assert_eq!(grouped[0].0, CommandGroup::Pot);
        assert_eq!(
            grouped[0].1.iter().map(|entry| entry.name).collect::<Vec<_>>(),
            vec!["pot", "ledger"]
        );
        assert_eq!(grouped[1].0, CommandGroup::System);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["help", "pot", "ledger"]);
    }
}
