//! Musicians and their assignment to gigs ("bolo_music").

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Musician {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    /// Fee paid per gig unless the assignment overrides it.
    #[serde(default)]
    pub default_fee: f64,
    #[serde(default = "Musician::default_active")]
    pub active: bool,
}

impl Musician {
    pub fn new(name: impl Into<String>, default_fee: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            instrument: None,
            default_fee,
            active: true,
        }
    }

    fn default_active() -> bool {
        true
    }
}

impl Identifiable for Musician {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentRole {
    #[default]
    #[serde(alias = "titular")]
    Regular,
    #[serde(alias = "substitut")]
    Substitute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    #[serde(alias = "pendent")]
    Pending,
    #[serde(alias = "confirmat")]
    Confirmed,
    #[serde(alias = "no")]
    Declined,
}

impl fmt::Display for AssignmentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssignmentRole::Regular => "regular",
            AssignmentRole::Substitute => "substitute",
        };
        f.write_str(label)
    }
}

/// Links a musician to a gig with a role, confirmation state and optional price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MusicianAssignment {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub musician_id: Uuid,
    #[serde(default)]
    pub role: AssignmentRole,
    #[serde(default)]
    pub confirmation: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_override: Option<f64>,
}

impl MusicianAssignment {
    pub fn new(gig_id: Uuid, musician_id: Uuid, role: AssignmentRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            gig_id,
            musician_id,
            role,
            confirmation: AssignmentStatus::Pending,
            price_override: None,
        }
    }

    /// Declined musicians are not paid.
    pub fn counts_towards_cost(&self) -> bool {
        self.confirmation != AssignmentStatus::Declined
    }

    pub fn effective_price(&self, musician: &Musician) -> f64 {
        self.price_override.unwrap_or(musician.default_fee)
    }
}

impl Identifiable for MusicianAssignment {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_default_fee() {
        let musician = Musician::new("Marta", 80.0);
        let mut assignment =
            MusicianAssignment::new(Uuid::new_v4(), musician.id, AssignmentRole::Substitute);
        assert_eq!(assignment.effective_price(&musician), 80.0);
        assignment.price_override = Some(120.0);
        assert_eq!(assignment.effective_price(&musician), 120.0);
    }

    #[test]
    fn declined_assignments_cost_nothing() {
        let mut assignment =
            MusicianAssignment::new(Uuid::new_v4(), Uuid::new_v4(), AssignmentRole::Regular);
        assert!(assignment.counts_towards_cost());
        assignment.confirmation = AssignmentStatus::Declined;
        assert!(!assignment.counts_towards_cost());
    }
}
