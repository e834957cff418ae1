// SPDX-License-Identifier: MIT

//! Meal routes: logging, recent meals, daily status, and estimation.
//!
//! Meal logging is a two-phase flow: the client first calls
//! `/estimateCaloriesOnly` and then passes the returned estimate back to
//! `/logMeal`. No estimate state is held between the two calls.

use crate::error::{AppError, Result};
use crate::models::goal::DEFAULT_DAILY_GOAL;
use crate::models::Meal;
use crate::services::CalorieEstimate;
use crate::time_utils;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RECENT_MEALS_LIMIT: u32 = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/logMeal", post(log_meal))
        .route("/getStatus/{uid}", get(get_status))
        .route("/getRecentMeals/{uid}", get(get_recent_meals))
        .route("/estimateCaloriesOnly", post(estimate_calories_only))
}

// ─── Log Meal ────────────────────────────────────────────────

#[derive(Deserialize)]
struct LogMealRequest {
    uid: Option<String>,
    meal: Option<String>,
    calories: Option<i64>,
    tip: Option<String>,
}

#[derive(Serialize)]
pub struct LogMealResponse {
    pub success: bool,
}

/// Append a meal and update today's total in one transaction.
async fn log_meal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogMealRequest>,
) -> Result<Json<LogMealResponse>> {
    let missing = || AppError::BadRequest("Missing uid, meal, calories, or tip".to_string());

    let uid = req.uid.filter(|u| !u.is_empty()).ok_or_else(missing)?;
    let meal = req.meal.filter(|m| !m.is_empty()).ok_or_else(missing)?;
    let calories = req.calories.ok_or_else(missing)?;
    let tip = req.tip.filter(|t| !t.is_empty()).ok_or_else(missing)?;

    state.db.log_meal_atomic(&uid, &meal, calories, &tip).await?;

    Ok(Json(LogMealResponse { success: true }))
}

// ─── Daily Status ────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub total_calories: i64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Get today's running calorie total; 0 if no meals were logged yet.
async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<StatusResponse>> {
    let today = time_utils::today_ist();

    let response = match state.db.get_status(&uid, &today).await? {
        Some(status) => StatusResponse {
            total_calories: status.total_calories,
            date: status.date,
            updated_at: Some(status.updated_at),
        },
        None => StatusResponse {
            total_calories: 0,
            date: today,
            updated_at: None,
        },
    };

    Ok(Json(response))
}

// ─── Recent Meals ────────────────────────────────────────────

#[derive(Serialize)]
pub struct RecentMealsResponse {
    pub meals: Vec<Meal>,
}

/// Get the 10 most recently logged meals, newest first.
async fn get_recent_meals(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<RecentMealsResponse>> {
    let meals = state.db.get_recent_meals(&uid, RECENT_MEALS_LIMIT).await?;
    Ok(Json(RecentMealsResponse { meals }))
}

// ─── Calorie Estimation ──────────────────────────────────────

#[derive(Deserialize)]
struct EstimateRequest {
    uid: Option<String>,
    meal: Option<String>,
}

/// Estimate calories for a meal without logging it.
///
/// Today's goal (default 2000) and consumed total (default 0) are fetched
/// first so the model can judge how the meal fits the rest of the day.
async fn estimate_calories_only(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<CalorieEstimate>> {
    let missing = || AppError::BadRequest("uid and meal are required".to_string());

    let uid = req.uid.filter(|u| !u.is_empty()).ok_or_else(missing)?;
    let meal = req.meal.filter(|m| !m.is_empty()).ok_or_else(missing)?;

    let today = time_utils::today_ist();

    let daily_goal = state
        .db
        .get_goal(&uid, &today)
        .await?
        .map_or(DEFAULT_DAILY_GOAL, |g| g.goal);

    let total_so_far = state
        .db
        .get_status(&uid, &today)
        .await?
        .map_or(0, |s| s.total_calories);

    let estimate = state.gemini.estimate(&meal, daily_goal, total_so_far).await?;

    tracing::debug!(
        uid = %uid,
        calories = estimate.calories,
        daily_goal,
        total_so_far,
        "Calories estimated"
    );

    Ok(Json(estimate))
}
