// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod gemini;

pub use gemini::{CalorieEstimate, GeminiClient};
