//! Daily calorie goal model.

use serde::{Deserialize, Serialize};

/// Default goal applied when a user has not set one for the day.
pub const DEFAULT_DAILY_GOAL: i64 = 2000;

/// A user's calorie goal for one calendar day (IST).
///
/// Stored at `users/{uid}/goals/{date}`, keyed by the date string.
/// Once `locked` is true the document is refused further writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Calendar date (`YYYY-MM-DD`, IST); also the document ID
    pub date: String,
    /// Target intake in kcal
    pub goal: i64,
    /// Finalized for this date; one-way transition
    pub locked: bool,
    /// Last write timestamp (RFC3339)
    pub updated_at: String,
}
