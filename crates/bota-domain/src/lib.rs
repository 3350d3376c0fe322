//! bota-domain
//!
//! Pure domain models for the collective's bookings: gigs, musicians, cash movements,
//! advances and forecast items. No I/O, no HTTP, no storage. Only data types and core enums.

pub mod common;
pub mod error;
pub mod forecast;
pub mod gig;
pub mod movement;
pub mod musician;
pub mod status;

pub use common::*;
pub use error::DomainError;
pub use forecast::*;
pub use gig::*;
pub use movement::*;
pub use musician::*;
pub use status::*;
