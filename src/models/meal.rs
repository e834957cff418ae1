//! Logged meal model.

use serde::{Deserialize, Serialize};

/// One logged meal with its estimated calories and advisory tip.
///
/// Stored at `users/{uid}/meals/{id}` with a server-generated id.
/// Append-only; never mutated or deleted individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    /// Document id, populated by Firestore on reads; never serialized back
    #[serde(rename = "_firestore_id", skip_serializing, default)]
    pub id: Option<String>,
    /// Free-text description as entered by the user
    pub meal: String,
    /// Estimated calories (kcal)
    pub calories: i64,
    /// Advisory tip returned by the estimator
    pub tip: String,
    /// Creation timestamp (RFC3339)
    pub created_at: String,
    /// Calendar date (`YYYY-MM-DD`, IST) the meal counts toward
    pub date: String,
}
