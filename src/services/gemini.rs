// SPDX-License-Identifier: MIT

//! Gemini API client for estimating meal calories.
//!
//! Sends a nutrition-assistant prompt to the generateContent REST endpoint
//! and extracts a calorie number and an advisory tip from the free-text
//! reply. There is no retry and no fallback value: a reply without a
//! parseable calorie count fails the call.

use crate::error::AppError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Tip used when the reply has a calorie line but no `Tip:` line.
const DEFAULT_TIP: &str = "No tip provided.";

static CALORIES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Calories:\s*(\d+)").expect("valid calories pattern"));

static TIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Tip:\s*(.+)").expect("valid tip pattern"));

/// A parsed calorie estimate.
#[derive(Debug, Clone, Serialize)]
pub struct CalorieEstimate {
    pub calories: i64,
    pub tip: String,
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// `base_url` is normally `https://generativelanguage.googleapis.com`;
    /// tests point it at a local stub.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Estimate the calories in a meal, given the user's daily goal and
    /// calories consumed so far today.
    pub async fn estimate(
        &self,
        meal_description: &str,
        daily_goal: i64,
        total_so_far: i64,
    ) -> Result<CalorieEstimate, AppError> {
        let prompt = build_prompt(meal_description, daily_goal, total_so_far);

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("HTTP {}: {}", status, body)));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid response body: {}", e)))?;

        parse_estimate(&reply.reply_text())
    }
}

/// Build the nutrition-assistant prompt instructing the model to answer
/// with a `Calories:` line and a `Tip:` line.
fn build_prompt(meal_description: &str, daily_goal: i64, total_so_far: i64) -> String {
    format!(
        "You are a helpful nutrition assistant. A user has eaten {total_so_far} kcal so far \
         today and has a daily goal of {daily_goal} kcal.\n\
         They are considering this meal: \"{meal_description}\"\n\
         \n\
         Your tasks:\n\
         1. Estimate the total calories in the meal.\n\
         2. Provide a brief tip on whether this meal fits well with their goal and any \
         suggestions for the rest of the day.\n\
         \n\
         Respond in this exact format:\n\
         Calories: <number>\n\
         Tip: <tip goes here>"
    )
}

/// Extract the calorie count and tip from a model reply.
///
/// The tip defaults to a placeholder when absent, but the call never
/// succeeds without a parsed calorie number.
fn parse_estimate(raw: &str) -> Result<CalorieEstimate, AppError> {
    let calories = CALORIES_PATTERN
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .ok_or_else(|| {
            AppError::Parse("Could not parse calories from Gemini response".to_string())
        })?;

    let tip = TIP_PATTERN
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or_else(|| DEFAULT_TIP.to_string(), |m| m.as_str().trim().to_string());

    Ok(CalorieEstimate { calories, tip })
}

// ─── Wire Types ──────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate part, or empty if the reply is bare.
    fn reply_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
            .unwrap_or_default()
    }
}
