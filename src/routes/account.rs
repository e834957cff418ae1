// SPDX-License-Identifier: MIT

//! Account deletion route.

use crate::error::Result;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::delete,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/deleteAccount/{uid}", delete(delete_account))
}

#[derive(Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    /// Number of documents removed by the cascade
    pub deleted: usize,
}

/// Delete a user's goals, meals, status docs, and root document.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(uid = %uid, "User-initiated account deletion");

    let deleted = state.db.delete_user_data(&uid).await?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        deleted,
    }))
}
