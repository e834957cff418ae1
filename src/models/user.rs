//! User model for storage.

use serde::{Deserialize, Serialize};

/// Root document for a user's data subtree.
///
/// Goals, meals, and status live in subcollections under this document;
/// it exists mainly so the account-deletion cascade has a root to remove.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque user id (also used as document ID)
    pub uid: String,
    /// When the user first wrote data (RFC3339)
    pub created_at: String,
}
