//! bota-core
//!
//! Aggregation rules and record services for the booking dashboard.
//! Depends on bota-domain. No HTTP, no terminal I/O, storage only through [`RecordStore`].

pub mod compare_service;
pub mod error;
pub mod forecast_item_service;
pub mod forecast_service;
pub mod gig_service;
pub mod ledger_service;
pub mod movement_service;
pub mod settings_service;
pub mod snapshot;
pub mod stats_filter;
pub mod stats_service;
pub mod storage;
pub mod time;

pub use compare_service::*;
pub use error::CoreError;
pub use forecast_item_service::*;
pub use forecast_service::*;
pub use gig_service::*;
pub use ledger_service::*;
pub use movement_service::*;
pub use settings_service::*;
pub use snapshot::Snapshot;
pub use stats_filter::*;
pub use stats_service::*;
pub use storage::{InMemoryStore, RecordStore};
pub use time::{Clock, FixedClock};
