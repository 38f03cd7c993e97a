//! Payment note domain entity and its settlement lifecycle.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::window::{ClaimOutcome, SettlementWindow};
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentNoteStatus {
    /// Persisted, settlement not yet resolved.
    Creating,
    /// Terminal.
    Completed,
    /// Settlement errored; `failure_reason` says why. Can be retried.
    Failed,
}

impl PaymentNoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentNoteStatus::Creating => "CREATING",
            PaymentNoteStatus::Completed => "COMPLETED",
            PaymentNoteStatus::Failed => "FAILED",
        }
    }

    pub fn can_transition_to(&self, next: PaymentNoteStatus) -> bool {
        use PaymentNoteStatus::*;
        matches!(
            (self, next),
            (Creating, Completed) | (Creating, Failed) | (Failed, Creating)
        )
    }
}

impl fmt::Display for PaymentNoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentNoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATING" => Ok(PaymentNoteStatus::Creating),
            "COMPLETED" => Ok(PaymentNoteStatus::Completed),
            "FAILED" => Ok(PaymentNoteStatus::Failed),
            other => Err(format!("unknown payment note status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentNote {
    pub id: Uuid,
    pub period_from: DateTime<Utc>,
    pub period_to: DateTime<Utc>,
    pub status: PaymentNoteStatus,
    pub transactions_count: i64,
    pub value: BigDecimal,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PaymentNote {
    /// A fresh note in `Creating` with zero aggregates.
    pub fn new(period_from: DateTime<Utc>, period_to: DateTime<Utc>) -> Result<Self, ValidationError> {
        let window = SettlementWindow::new(period_from, period_to)?;
        Ok(Self {
            id: Uuid::new_v4(),
            period_from: window.from(),
            period_to: window.to(),
            status: PaymentNoteStatus::Creating,
            transactions_count: 0,
            value: BigDecimal::from(0),
            failure_reason: None,
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    pub fn window(&self) -> Result<SettlementWindow, ValidationError> {
        SettlementWindow::new(self.period_from, self.period_to)
    }

    pub fn complete(&mut self, outcome: &ClaimOutcome) -> Result<(), String> {
        self.transition(PaymentNoteStatus::Completed)?;
        self.transactions_count = outcome.claimed_count;
        self.value = outcome.total_value.clone();
        self.failure_reason = None;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), String> {
        self.transition(PaymentNoteStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    pub fn reopen(&mut self) -> Result<(), String> {
        self.transition(PaymentNoteStatus::Creating)?;
        self.failure_reason = None;
        Ok(())
    }

    fn transition(&mut self, next: PaymentNoteStatus) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "payment note {} cannot move from {} to {}",
                self.id, self.status, next
            ));
        }
        self.status = next;
        Ok(())
    }
}
