#![doc(test(attr(deny(warnings))))]

//! Bota offers the booking dashboard's reporting surfaces: the pot ledger, the
//! forecast page and gig statistics, served over HTTP and from an interactive shell.

pub mod api;
pub mod cli;
pub mod context;
pub mod errors;
pub mod session;
pub mod utils;

pub use context::AppContext;
pub use errors::{BotaError, CliError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(version = utils::build_info::CLI_VERSION, "Bota tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
