//! Daily consumption aggregate.

use serde::{Deserialize, Serialize};

/// Running calorie total for a user on one calendar day (IST).
///
/// Stored at `users/{uid}/status/{date}` and updated inside the same
/// transaction that appends the meal, so the invariant holds by
/// construction: `total_calories` equals the sum of `calories` over all
/// meals with a matching `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatus {
    /// Calendar date (`YYYY-MM-DD`, IST); also the document ID
    pub date: String,
    /// Sum of calories over all meals logged for this date
    pub total_calories: i64,
    /// Last write timestamp (RFC3339)
    pub updated_at: String,
}
