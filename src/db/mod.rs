//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Per-user goal docs, keyed by IST date (`users/{uid}/goals/{date}`)
    pub const GOALS: &str = "goals";
    /// Per-user meal docs, server-generated ids (`users/{uid}/meals/{id}`)
    pub const MEALS: &str = "meals";
    /// Per-user daily totals, keyed by IST date (`users/{uid}/status/{date}`)
    pub const STATUS: &str = "status";
}
