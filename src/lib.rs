// SPDX-License-Identifier: MIT

//! Kcal-Tracker: backend API for a calorie-tracking app.
//!
//! This crate provides the HTTP API for logging meals, managing daily
//! calorie goals, and estimating meal calories through the Gemini API.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::GeminiClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub gemini: GeminiClient,
}
