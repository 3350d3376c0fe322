//! Gig records ("bolos") and the income classification they carry.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, error::DomainError, status::GigStatus};

/// How a gig's income is received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    #[serde(alias = "efectiu")]
    Cash,
    #[default]
    #[serde(alias = "factura")]
    Invoice,
    #[serde(alias = "altre")]
    Other,
}

impl FromStr for IncomeType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cash" | "efectiu" | "b" => Ok(IncomeType::Cash),
            "invoice" | "factura" | "a" => Ok(IncomeType::Invoice),
            "other" | "altre" => Ok(IncomeType::Other),
            _ => Err(DomainError::UnknownIncomeType(value.trim().to_string())),
        }
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IncomeType::Cash => "cash",
            IncomeType::Invoice => "invoice",
            IncomeType::Other => "other",
        };
        f.write_str(label)
    }
}

/// A booked or prospective performance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GigRecord {
    pub id: Uuid,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub town: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gig_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    pub status: GigStatus,
    #[serde(default)]
    pub income_total: f64,
    #[serde(default)]
    pub musician_cost_total: f64,
    #[serde(default)]
    pub income_type: IncomeType,
    /// Net contribution to the pot once the gig is collected and musicians are paid.
    #[serde(default)]
    pub pot_delta: f64,
    #[serde(default)]
    pub collected: bool,
    #[serde(default)]
    pub musicians_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GigRecord {
    pub fn new(date: Option<NaiveDate>, town: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            town: normalize_town(&town.into()),
            gig_type: None,
            client: None,
            status: GigStatus::New,
            income_total: 0.0,
            musician_cost_total: 0.0,
            income_type: IncomeType::default(),
            pot_delta: 0.0,
            collected: false,
            musicians_paid: false,
            notes: None,
        }
    }

    /// Sets the status together with the close flags it implies.
    pub fn with_status(mut self, status: GigStatus) -> Self {
        self.status = status;
        self.imply_flags_from_status();
        self
    }

    pub fn with_income(mut self, amount: f64, income_type: IncomeType) -> Self {
        self.income_total = amount;
        self.income_type = income_type;
        self.recompute_pot_delta();
        self
    }

    pub fn with_musician_cost(mut self, amount: f64) -> Self {
        self.musician_cost_total = amount;
        self.recompute_pot_delta();
        self
    }

    pub fn with_gig_type(mut self, gig_type: impl Into<String>) -> Self {
        self.gig_type = Some(gig_type.into());
        self
    }

    /// Collected and musicians paid: the pot delta is now a permanent ledger entry.
    pub fn is_closed(&self) -> bool {
        self.collected && self.musicians_paid
    }

    /// Income minus musician cost, independent of the stored pot delta.
    pub fn margin(&self) -> f64 {
        self.income_total - self.musician_cost_total
    }

    pub fn recompute_pot_delta(&mut self) {
        self.pot_delta = self.margin();
    }

    pub fn set_income(&mut self, amount: f64) -> Result<(), DomainError> {
        self.ensure_open()?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(DomainError::InvalidAmount(format!("income {amount}")));
        }
        self.income_total = amount;
        self.recompute_pot_delta();
        Ok(())
    }

    pub fn set_musician_cost(&mut self, amount: f64) -> Result<(), DomainError> {
        self.ensure_open()?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(DomainError::InvalidAmount(format!("musician cost {amount}")));
        }
        self.musician_cost_total = amount;
        self.recompute_pot_delta();
        Ok(())
    }

    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_closed() {
            return Err(DomainError::GigClosed);
        }
        Ok(())
    }

    /// Moves the gig along the lifecycle, rejecting backwards or post-terminal moves.
    ///
    /// Reaching `AwaitingPayment` records the collection and reaching `Closed` also
    /// records the musicians' payment, so `status == Closed` exactly when `is_closed()`.
    pub fn advance_to(&mut self, next: GigStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.imply_flags_from_status();
        Ok(())
    }

    pub fn mark_collected(&mut self) -> Result<(), DomainError> {
        if !self.status.is_confirmed() {
            return Err(DomainError::NotConfirmed(self.status));
        }
        self.collected = true;
        self.sync_status_with_flags();
        Ok(())
    }

    pub fn mark_musicians_paid(&mut self) -> Result<(), DomainError> {
        if !self.status.is_confirmed() {
            return Err(DomainError::NotConfirmed(self.status));
        }
        self.musicians_paid = true;
        self.sync_status_with_flags();
        Ok(())
    }

    fn imply_flags_from_status(&mut self) {
        match self.status {
            GigStatus::AwaitingPayment => self.collected = true,
            GigStatus::Closed => {
                self.collected = true;
                self.musicians_paid = true;
            }
            _ => return,
        }
        self.sync_status_with_flags();
    }

    /// Derives the furthest status implied by the flags. Never moves backwards.
    fn sync_status_with_flags(&mut self) {
        let implied = match (self.collected, self.musicians_paid) {
            (true, true) => GigStatus::Closed,
            (true, false) => GigStatus::AwaitingPayment,
            (false, _) => GigStatus::AwaitingCollection,
        };
        if self.status.precedes(implied) {
            self.status = implied;
        }
    }
}

impl Identifiable for GigRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Dated for GigRecord {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl Displayable for GigRecord {
    fn display_label(&self) -> String {
        let date = self
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "sense data".into());
        format!("{} {} [{}]", date, self.town, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed_gig() -> GigRecord {
        GigRecord::new(NaiveDate::from_ymd_opt(2025, 6, 21), "Vilafranca")
            .with_status(GigStatus::Confirmed)
            .with_income(900.0, IncomeType::Invoice)
            .with_musician_cost(600.0)
    }

    #[test]
    fn pot_delta_tracks_income_and_cost() {
        let mut gig = confirmed_gig();
        assert_eq!(gig.pot_delta, 300.0);
        gig.set_income(1000.0).unwrap();
        assert_eq!(gig.pot_delta, 400.0);
        assert!(gig.set_musician_cost(-1.0).is_err());
    }

    #[test]
    fn flags_drive_status_to_closed() {
        let mut gig = confirmed_gig();
        gig.mark_collected().unwrap();
        assert_eq!(gig.status, GigStatus::AwaitingPayment);
        assert!(!gig.is_closed());

        gig.mark_musicians_paid().unwrap();
        assert_eq!(gig.status, GigStatus::Closed);
        assert!(gig.is_closed());
    }

    #[test]
    fn paying_musicians_first_waits_for_collection() {
        let mut gig = confirmed_gig();
        gig.mark_musicians_paid().unwrap();
        assert_eq!(gig.status, GigStatus::AwaitingCollection);
    }

    #[test]
    fn pending_gigs_cannot_be_collected() {
        let mut gig = GigRecord::new(None, "Olot");
        let err = gig.mark_collected().unwrap_err();
        assert_eq!(err, DomainError::NotConfirmed(GigStatus::New));
        assert!(!gig.collected);
    }

    #[test]
    fn advance_rejects_backwards_moves() {
        let mut gig = confirmed_gig();
        assert!(gig.advance_to(GigStatus::AwaitingConfirmation).is_err());
        gig.advance_to(GigStatus::Cancelled).unwrap();
        assert_eq!(gig.status, GigStatus::Cancelled);
    }

    #[test]
    fn closed_status_matches_close_flags() {
        let mut stepped = confirmed_gig();
        while let Some(next) = stepped.status.next() {
            stepped.advance_to(next).unwrap();
            assert_eq!(stepped.status == GigStatus::Closed, stepped.is_closed());
        }
        assert_eq!(stepped.status, GigStatus::Closed);

        let mut jumped = confirmed_gig();
        jumped.advance_to(GigStatus::Closed).unwrap();
        assert!(jumped.collected && jumped.musicians_paid);

        let mut paid_first = confirmed_gig();
        paid_first.mark_musicians_paid().unwrap();
        paid_first.advance_to(GigStatus::AwaitingPayment).unwrap();
        assert_eq!(paid_first.status, GigStatus::Closed);
        assert!(paid_first.is_closed());

        let built = GigRecord::new(None, "Olot").with_status(GigStatus::Closed);
        assert!(built.is_closed());
        let waiting = GigRecord::new(None, "Olot").with_status(GigStatus::AwaitingCollection);
        assert!(!waiting.collected && !waiting.musicians_paid);
    }

    #[test]
    fn closed_gigs_keep_their_pot_delta() {
        let mut gig = confirmed_gig();
        gig.mark_collected().unwrap();
        gig.mark_musicians_paid().unwrap();

        assert_eq!(gig.set_musician_cost(900.0), Err(DomainError::GigClosed));
        assert_eq!(gig.set_income(0.0), Err(DomainError::GigClosed));
        assert_eq!(gig.pot_delta, 300.0);
        assert_eq!(gig.musician_cost_total, 600.0);
    }

    #[test]
    fn income_type_accepts_catalan_names() {
        assert_eq!("efectiu".parse::<IncomeType>().unwrap(), IncomeType::Cash);
        assert_eq!("Factura".parse::<IncomeType>().unwrap(), IncomeType::Invoice);
        let parsed: IncomeType = serde_json::from_str("\"efectiu\"").unwrap();
        assert_eq!(parsed, IncomeType::Cash);
    }
}
