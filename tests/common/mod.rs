// SPDX-License-Identifier: MIT

use kcal_tracker::config::Config;
use kcal_tracker::db::FirestoreDb;
use kcal_tracker::routes::create_router;
use kcal_tracker::services::GeminiClient;
use kcal_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = test_db_offline();

    // Point the Gemini client at a dead port so upstream calls fail fast
    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        "http://127.0.0.1:9".to_string(),
    );

    let state = Arc::new(AppState { config, db, gemini });

    (create_router(state.clone()), state)
}

/// Create a test app backed by the Firestore emulator.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = test_db().await;

    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        "http://127.0.0.1:9".to_string(),
    );

    let state = Arc::new(AppState { config, db, gemini });

    (create_router(state.clone()), state)
}

/// Generate a unique uid for test isolation.
#[allow(dead_code)]
pub fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}
