use thiserror::Error;

use crate::status::GigStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Cannot move gig from `{from}` to `{to}`")]
    InvalidTransition { from: GigStatus, to: GigStatus },
    #[error("Gig is not confirmed (status `{0}`)")]
    NotConfirmed(GigStatus),
    #[error("Unknown gig status: {0}")]
    UnknownStatus(String),
    #[error("Unknown income type: {0}")]
    UnknownIncomeType(String),
    #[error("Unknown forecast kind: {0}")]
    UnknownForecastKind(String),
    #[error("Unsupported forecast horizon: {0} days")]
    UnsupportedHorizon(u32),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Gig is closed; its pot delta can no longer change")]
    GigClosed,
}
