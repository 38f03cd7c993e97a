//! Claim windows and the aggregate a claim produces.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{validate_period, ValidationError};

/// Inclusive date/time range used to select transactions for claiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl SettlementWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ValidationError> {
        validate_period(from, to)?;
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

/// Result of claiming every pending transaction in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOutcome {
    pub claimed_count: i64,
    pub total_value: BigDecimal,
}

impl ClaimOutcome {
    pub fn empty() -> Self {
        Self {
            claimed_count: 0,
            total_value: BigDecimal::from(0),
        }
    }

    /// Exact decimal aggregate over the claimed values.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a BigDecimal>,
    {
        values.into_iter().fold(Self::empty(), |mut acc, value| {
            acc.claimed_count += 1;
            acc.total_value = &acc.total_value + value;
            acc
        })
    }
}
