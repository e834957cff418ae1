// SPDX-License-Identifier: MIT

//! Goal routes: saving/fetching the daily goal and goal history.

use crate::error::{AppError, Result};
use crate::models::Goal;
use crate::time_utils;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use futures_util::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of days of goal history returned by the history routes.
const HISTORY_DAYS: u32 = 7;

/// Concurrency limit for the status join reads.
const MAX_CONCURRENT_STATUS_READS: usize = 4;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/saveGoal", post(save_goal))
        .route("/getGoal/{uid}", get(get_goal))
        .route("/getLockedGoalsWithStatus/{uid}", get(get_locked_goals_with_status))
        .route("/getLast7LockedGoals/{uid}", get(get_last7_locked_goals))
}

// ─── Save Goal ───────────────────────────────────────────────

#[derive(Deserialize)]
struct SaveGoalRequest {
    uid: Option<String>,
    goal: Option<i64>,
    #[serde(default)]
    locked: bool,
}

#[derive(Serialize)]
pub struct SaveGoalResponse {
    pub message: String,
}

/// Upsert today's goal. Refused with 409 once the goal is locked.
async fn save_goal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveGoalRequest>,
) -> Result<Json<SaveGoalResponse>> {
    let uid = req
        .uid
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing uid or goal".to_string()))?;
    let goal_value = req
        .goal
        .ok_or_else(|| AppError::BadRequest("Missing uid or goal".to_string()))?;

    let today = time_utils::today_ist();
    let goal = Goal {
        date: today.clone(),
        goal: goal_value,
        locked: req.locked,
        updated_at: time_utils::now_rfc3339(),
    };

    state.db.ensure_user(&uid).await?;
    state.db.upsert_goal(&uid, &goal).await?;

    tracing::info!(uid = %uid, date = %today, goal = goal_value, locked = req.locked, "Goal saved");

    Ok(Json(SaveGoalResponse {
        message: "Goal saved successfully".to_string(),
    }))
}

// ─── Get Goal ────────────────────────────────────────────────

/// Get today's goal, or 404 if the user has not set one.
async fn get_goal(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<Goal>> {
    let today = time_utils::today_ist();

    let goal = state
        .db
        .get_goal(&uid, &today)
        .await?
        .ok_or_else(|| AppError::NotFound("Goal not found for today".to_string()))?;

    Ok(Json(goal))
}

// ─── Locked Goal History ─────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedGoalEntry {
    pub date: String,
    pub goal: i64,
    pub total_calories: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedGoalsResponse {
    pub locked_goals: Vec<LockedGoalEntry>,
}

/// Get up to 7 most recent locked goals, each joined with that day's
/// consumed total (0 if the user logged nothing).
///
/// The join is read-only and eventually consistent: goal and status are
/// fetched independently.
async fn get_locked_goals_with_status(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<LockedGoalsResponse>> {
    let goals = state.db.get_locked_goals(&uid, HISTORY_DAYS).await?;

    // Join each goal with its daily total; `buffered` keeps the
    // date-descending order of the underlying query.
    let locked_goals = stream::iter(goals)
        .map(|goal| {
            let db = state.db.clone();
            let uid = uid.clone();
            async move {
                let total_calories = db
                    .get_status(&uid, &goal.date)
                    .await?
                    .map_or(0, |s| s.total_calories);

                Ok::<_, AppError>(LockedGoalEntry {
                    date: goal.date,
                    goal: goal.goal,
                    total_calories,
                })
            }
        })
        .buffered(MAX_CONCURRENT_STATUS_READS)
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Json(LockedGoalsResponse { locked_goals }))
}

// ─── Last-7-Days Goals ───────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalHistoryEntry {
    pub date: String,
    pub goal: i64,
    pub locked: bool,
    /// Set when the day had no locked goal and the unlocked one was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

#[derive(Serialize)]
pub struct GoalHistoryResponse {
    pub goals: Vec<GoalHistoryEntry>,
}

/// Get the goal for each of the last 7 calendar days (IST), preferring the
/// locked goal and tagging unlocked fallbacks. Days without any goal are
/// omitted rather than padded.
async fn get_last7_locked_goals(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<GoalHistoryResponse>> {
    let mut entries = Vec::new();

    for days_ago in 0..HISTORY_DAYS {
        let date = time_utils::date_ist_days_ago(days_ago as i64);

        if let Some(goal) = state.db.get_goal(&uid, &date).await? {
            let fallback = if goal.locked { None } else { Some(true) };
            entries.push(GoalHistoryEntry {
                date,
                goal: goal.goal,
                locked: goal.locked,
                fallback,
            });
        }
    }

    Ok(Json(GoalHistoryResponse { goals: entries }))
}
