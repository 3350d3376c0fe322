//! Manual cash-box movements and advance payments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// A manual income (positive) or expense (negative) entry in the pot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerMovement {
    pub id: Uuid,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LedgerMovement {
    pub fn new(date: Option<NaiveDate>, amount: f64, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            amount,
            description: description.into(),
            category: None,
        }
    }
}

impl Identifiable for LedgerMovement {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Dated for LedgerMovement {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// A partial payment received before its gig closes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvancePayment {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AdvancePayment {
    pub fn new(gig_id: Uuid, amount: f64, date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            gig_id,
            amount,
            date,
            notes: None,
        }
    }
}

impl Identifiable for AdvancePayment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Dated for AdvancePayment {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}
