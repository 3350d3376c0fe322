//! Canonical gig lifecycle.
//!
//! Every status string the booking tables have ever stored is parsed into [`GigStatus`],
//! and the confirmed/rejected/pending grouping is answered here and nowhere else.
//!
//! ```text
//! Nova -> Pendent de confirmació -> Confirmada -> Pendents de cobrar -> Per pagar -> Tancades
//! any non-terminal -> Cancel·lat | Rebutjat
//! ```

use std::{fmt, str::FromStr};

use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GigStatus {
    New,
    AwaitingConfirmation,
    Confirmed,
    AwaitingCollection,
    AwaitingPayment,
    Closed,
    Cancelled,
    Rejected,
}

/// Coarse grouping used by statistics and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusGroup {
    Confirmed,
    Rejected,
    Pending,
}

const ALIASES: &[(&str, GigStatus)] = &[
    ("nova", GigStatus::New),
    ("nou", GigStatus::New),
    ("sollicitud", GigStatus::New),
    ("solicitud", GigStatus::New),
    ("pendent de confirmacio", GigStatus::AwaitingConfirmation),
    ("pendents de confirmacio", GigStatus::AwaitingConfirmation),
    ("pendent confirmacio", GigStatus::AwaitingConfirmation),
    ("pendent", GigStatus::AwaitingConfirmation),
    ("confirmada", GigStatus::Confirmed),
    ("confirmades", GigStatus::Confirmed),
    ("confirmat", GigStatus::Confirmed),
    ("acceptada", GigStatus::Confirmed),
    ("acceptat", GigStatus::Confirmed),
    ("pendents de cobrar", GigStatus::AwaitingCollection),
    ("pendent de cobrar", GigStatus::AwaitingCollection),
    ("per cobrar", GigStatus::AwaitingCollection),
    ("per pagar", GigStatus::AwaitingPayment),
    ("pendent de pagar", GigStatus::AwaitingPayment),
    ("tancades", GigStatus::Closed),
    ("tancada", GigStatus::Closed),
    ("tancat", GigStatus::Closed),
    ("tancats", GigStatus::Closed),
    ("cancellat", GigStatus::Cancelled),
    ("cancellada", GigStatus::Cancelled),
    ("cancelat", GigStatus::Cancelled),
    ("cancelada", GigStatus::Cancelled),
    ("rebutjat", GigStatus::Rejected),
    ("rebutjada", GigStatus::Rejected),
    ("rebutjats", GigStatus::Rejected),
];

impl GigStatus {
    pub const ALL: [GigStatus; 8] = [
        GigStatus::New,
        GigStatus::AwaitingConfirmation,
        GigStatus::Confirmed,
        GigStatus::AwaitingCollection,
        GigStatus::AwaitingPayment,
        GigStatus::Closed,
        GigStatus::Cancelled,
        GigStatus::Rejected,
    ];

    /// Label stored in the booking tables and shown to users.
    pub fn label(self) -> &'static str {
        match self {
            GigStatus::New => "Nova",
            GigStatus::AwaitingConfirmation => "Pendent de confirmació",
            GigStatus::Confirmed => "Confirmada",
            GigStatus::AwaitingCollection => "Pendents de cobrar",
            GigStatus::AwaitingPayment => "Per pagar",
            GigStatus::Closed => "Tancades",
            GigStatus::Cancelled => "Cancel·lat",
            GigStatus::Rejected => "Rebutjat",
        }
    }

    pub fn group(self) -> StatusGroup {
        match self {
            GigStatus::Confirmed
            | GigStatus::AwaitingCollection
            | GigStatus::AwaitingPayment
            | GigStatus::Closed => StatusGroup::Confirmed,
            GigStatus::Cancelled | GigStatus::Rejected => StatusGroup::Rejected,
            GigStatus::New | GigStatus::AwaitingConfirmation => StatusGroup::Pending,
        }
    }

    pub fn is_confirmed(self) -> bool {
        self.group() == StatusGroup::Confirmed
    }

    pub fn is_rejected(self) -> bool {
        self.group() == StatusGroup::Rejected
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GigStatus::Closed | GigStatus::Cancelled | GigStatus::Rejected
        )
    }

    /// Position on the forward path; `None` for the cancellation branch.
    fn stage(self) -> Option<u8> {
        match self {
            GigStatus::New => Some(0),
            GigStatus::AwaitingConfirmation => Some(1),
            GigStatus::Confirmed => Some(2),
            GigStatus::AwaitingCollection => Some(3),
            GigStatus::AwaitingPayment => Some(4),
            GigStatus::Closed => Some(5),
            GigStatus::Cancelled | GigStatus::Rejected => None,
        }
    }

    /// Next status on the forward path, if any.
    pub fn next(self) -> Option<GigStatus> {
        match self {
            GigStatus::New => Some(GigStatus::AwaitingConfirmation),
            GigStatus::AwaitingConfirmation => Some(GigStatus::Confirmed),
            GigStatus::Confirmed => Some(GigStatus::AwaitingCollection),
            GigStatus::AwaitingCollection => Some(GigStatus::AwaitingPayment),
            GigStatus::AwaitingPayment => Some(GigStatus::Closed),
            GigStatus::Closed | GigStatus::Cancelled | GigStatus::Rejected => None,
        }
    }

    /// Forward moves (skipping stages allowed) and cancellation from any open status.
    pub fn can_transition_to(self, next: GigStatus) -> bool {
        if self == next || self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        }
    }

    /// Returns `true` when `self` sits strictly earlier than `other` on the forward path.
    pub fn precedes(self, other: GigStatus) -> bool {
        match (self.stage(), other.stage()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    pub fn parse(value: &str) -> Result<GigStatus, DomainError> {
        let key = fold_label(value);
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, status)| *status)
            .ok_or_else(|| DomainError::UnknownStatus(value.trim().to_string()))
    }
}

impl StatusGroup {
    pub fn parse(value: &str) -> Option<StatusGroup> {
        match fold_label(value).as_str() {
            "confirmed" | "confirmades" | "confirmada" => Some(StatusGroup::Confirmed),
            "rejected" | "rebutjades" | "rebutjat" => Some(StatusGroup::Rejected),
            "pending" | "pendents" | "pendent" => Some(StatusGroup::Pending),
            _ => None,
        }
    }
}

/// Lowercases, strips diacritics and the middle dot, and collapses separators.
fn fold_label(value: &str) -> String {
    let mut folded = String::with_capacity(value.len());
    for ch in value.trim().chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'à' | 'á' => 'a',
            'è' | 'é' => 'e',
            'í' | 'ï' => 'i',
            'ò' | 'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            '·' | '.' => continue,
            '-' | '_' => ' ',
            other => other,
        };
        if mapped == ' ' && (folded.is_empty() || folded.ends_with(' ')) {
            continue;
        }
        folded.push(mapped);
    }
    folded.trim_end().to_string()
}

impl FromStr for GigStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        GigStatus::parse(value)
    }
}

impl fmt::Display for GigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for GigStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for GigStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        GigStatus::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for StatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusGroup::Confirmed => "confirmed",
            StatusGroup::Rejected => "rejected",
            StatusGroup::Pending => "pending",
        };
        f.write_str(label)
    }
}
