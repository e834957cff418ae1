// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod goal;
pub mod meal;
pub mod status;
pub mod user;

pub use goal::Goal;
pub use meal::Meal;
pub use status::DailyStatus;
pub use user::User;
