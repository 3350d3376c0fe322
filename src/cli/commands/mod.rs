pub mod config;
pub mod forecast;
pub mod gigs;
pub mod musicians;
pub mod pot;
pub mod session;
pub mod stats;
pub mod system;

use crate::cli::registry::{CommandGroup, CommandRegistry};

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    registry.register_group(CommandGroup::System, system::definitions());
    registry.register_group(CommandGroup::Pot, pot::definitions());
    registry.register_group(CommandGroup::Forecast, forecast::definitions());
    registry.register_group(CommandGroup::Statistics, stats::definitions());
    registry.register_group(CommandGroup::Gigs, gigs::definitions());
    registry.register_group(CommandGroup::Musicians, musicians::definitions());
    registry.register_group(CommandGroup::Session, session::definitions());
    registry.register_group(CommandGroup::Config, config::definitions());
}
