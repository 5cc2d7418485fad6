use serde::{Deserialize, Serialize};

/// Monthly translation usage, as persisted by the usage store
///
/// The JSON layout (`currentMonth`, `totalCharacters`) is shared with the
/// chat backend's existing `translation_usage.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Calendar month the counter applies to, `YYYY-MM`
    pub current_month: String,
    /// Characters translated so far in `current_month`
    pub total_characters: u64,
}

impl UsageRecord {
    /// Fresh record for `month` with nothing charged
    pub fn new(month: impl Into<String>) -> Self {
        Self {
            current_month: month.into(),
            total_characters: 0,
        }
    }

    /// Reset the counter if `month` differs from the stored month.
    ///
    /// Returns true when a rollover happened.
    pub fn roll_over(&mut self, month: &str) -> bool {
        if self.current_month == month {
            return false;
        }
        self.current_month = month.to_string();
        self.total_characters = 0;
        true
    }

    /// Quota left after what has been charged; negative if the record is over quota.
    ///
    /// Saturates at the bounds of `i64`.
    pub fn remaining(&self, quota: u64) -> i64 {
        let remaining = i128::from(quota) - i128::from(self.total_characters);
        i64::try_from(remaining).unwrap_or(if remaining < 0 { i64::MIN } else { i64::MAX })
    }
}

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageDecision {
    pub allowed: bool,
    pub remaining: i64,
}

/// Read-only view of the current month's usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub current_month: String,
    pub total_characters: u64,
    pub remaining: i64,
    pub quota: u64,
}
