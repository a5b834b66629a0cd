use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message returned to callers whose readings fail the assessment.
pub const REJECTED_MSG: &str = "Product not accepted. Assessment test failed.";

/// Reference readings for an `Excellent` product.
const IDEAL_TEMPERATURE: i64 = 25;
const IDEAL_HUMIDITY: i64 = 45;

/// Acceptable sensor window, inclusive on both ends.
const MIN_TEMPERATURE: i64 = 20;
const MAX_TEMPERATURE: i64 = 30;
const MIN_HUMIDITY: i64 = 40;
const MAX_HUMIDITY: i64 = 50;

/// Quality label derived from a pair of sensor readings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProductQuality {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Average,
}

impl ProductQuality {
    /// Classify readings. Rules are evaluated in order; the first match wins.
    pub fn classify(temperature: i64, humidity: i64) -> Self {
        if temperature == IDEAL_TEMPERATURE && humidity == IDEAL_HUMIDITY {
            ProductQuality::Excellent
        } else if temperature < IDEAL_TEMPERATURE && humidity < IDEAL_HUMIDITY {
            ProductQuality::VeryGood
        } else if temperature > IDEAL_TEMPERATURE && humidity > IDEAL_HUMIDITY {
            ProductQuality::Good
        } else {
            ProductQuality::Average
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductQuality::Excellent => "Excellent",
            ProductQuality::VeryGood => "Very Good",
            ProductQuality::Good => "Good",
            ProductQuality::Average => "Average",
        }
    }
}

impl fmt::Display for ProductQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides what the caller is told. Has no say over whether the block is
/// appended; see [`is_append_eligible`].
pub fn check_announcement(temperature: i64, humidity: i64) -> Result<()> {
    if temperature < MIN_TEMPERATURE
        || temperature > MAX_TEMPERATURE
        || humidity > MAX_HUMIDITY
        || humidity < MIN_HUMIDITY
    {
        return Err(LedgerError::ValidationRejected(REJECTED_MSG.into()));
    }
    Ok(())
}

/// Decides whether a proposed block is linked into the ledger.
pub fn is_append_eligible(temperature: i64, humidity: i64, farm_id: &str) -> bool {
    (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature)
        && (MIN_HUMIDITY..=MAX_HUMIDITY).contains(&humidity)
        && !farm_id.is_empty()
}
