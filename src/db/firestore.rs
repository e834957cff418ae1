// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Goals (per-user, per-day calorie targets with a lock flag)
//! - Meals (append-only ledger of logged meals)
//! - Daily status (incrementally maintained calorie totals)
//!
//! All documents live in subcollections under `users/{uid}`.

use crate::db::collections;
use crate::error::AppError;
use crate::models::goal::DEFAULT_DAILY_GOAL;
use crate::models::{DailyStatus, Goal, Meal, User};
use crate::time_utils;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Parent path for a user's subcollections.
    fn user_path(&self, uid: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::USERS, uid)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user's root document.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ensure a user's root document exists, creating it lazily on first write.
    ///
    /// The root doc only anchors the subcollections for the deletion cascade.
    pub async fn ensure_user(&self, uid: &str) -> Result<(), AppError> {
        if self.get_user(uid).await?.is_some() {
            return Ok(());
        }

        let user = User {
            uid: uid.to_string(),
            created_at: time_utils::now_rfc3339(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(uid)
            .object(&user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(uid, "Created user root document");
        Ok(())
    }

    // ─── Goal Operations ─────────────────────────────────────────

    /// Get a user's goal for a specific date.
    pub async fn get_goal(&self, uid: &str, date: &str) -> Result<Option<Goal>, AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GOALS)
            .parent(&parent)
            .obj()
            .one(date)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user's goal for its date.
    ///
    /// An already-locked goal refuses further writes; the `false -> true`
    /// lock transition is one-way. The lock check and the write run in one
    /// transaction, so a save racing the locking write is aborted and
    /// retried against the locked state instead of clobbering it.
    pub async fn upsert_goal(&self, uid: &str, goal: &Goal) -> Result<(), AppError> {
        let client = self.get_client()?;
        let uid_owned = uid.to_string();
        let goal_owned = goal.clone();

        let saved = client
            .run_transaction(|db, transaction| {
                let uid = uid_owned.clone();
                let goal = goal_owned.clone();
                Box::pin(async move {
                    let parent = db.parent_path(collections::USERS, uid)?;

                    // Read through the transaction-scoped `db` so the lock
                    // state is part of the transaction's read set
                    let existing: Option<Goal> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::GOALS)
                        .parent(&parent)
                        .obj()
                        .one(&goal.date)
                        .await?;

                    if existing.map_or(false, |g| g.locked) {
                        return Ok(false);
                    }

                    db.fluent()
                        .update()
                        .in_col(collections::GOALS)
                        .document_id(&goal.date)
                        .parent(&parent)
                        .object(&goal)
                        .add_to_transaction(transaction)?;

                    Ok(true)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Goal save transaction failed: {}", e)))?;

        if !saved {
            return Err(AppError::GoalLocked(goal.date.clone()));
        }

        Ok(())
    }

    /// Get the most recent locked goals, newest date first.
    pub async fn get_locked_goals(&self, uid: &str, limit: u32) -> Result<Vec<Goal>, AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::GOALS)
            .parent(&parent)
            .filter(|q| q.field("locked").eq(true))
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Status Operations ───────────────────────────────────────

    /// Get the daily status aggregate for a specific date.
    pub async fn get_status(&self, uid: &str, date: &str) -> Result<Option<DailyStatus>, AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STATUS)
            .parent(&parent)
            .obj()
            .one(date)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Meal Operations ─────────────────────────────────────────

    /// Get the most recently logged meals, newest first.
    pub async fn get_recent_meals(&self, uid: &str, limit: u32) -> Result<Vec<Meal>, AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MEALS)
            .parent(&parent)
            .order_by([(
                "createdAt",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Meal Logging ─────────────────────────────────────

    /// Atomically log a meal: append the meal document and update the
    /// daily total for its date.
    ///
    /// Runs inside `run_transaction`, so the goal and status reads are part
    /// of the transaction's read set. If another request updates the same
    /// daily status concurrently, the commit aborts and the store retries
    /// the whole closure with fresh data, preventing lost updates on
    /// `totalCalories`. On conflict exhaustion nothing is visible.
    ///
    /// Returns the new daily total.
    pub async fn log_meal_atomic(
        &self,
        uid: &str,
        meal_description: &str,
        calories: i64,
        tip: &str,
    ) -> Result<i64, AppError> {
        let today = time_utils::today_ist();
        let now = time_utils::now_rfc3339();
        // Generated outside the closure so a retried transaction writes the
        // same meal document instead of a duplicate
        let meal_id = uuid::Uuid::new_v4().to_string();

        self.ensure_user(uid).await?;

        let client = self.get_client()?;
        let uid_owned = uid.to_string();
        let meal_owned = meal_description.to_string();
        let tip_owned = tip.to_string();

        let new_total = client
            .run_transaction(|db, transaction| {
                let uid = uid_owned.clone();
                let today = today.clone();
                let now = now.clone();
                let meal_id = meal_id.clone();
                let meal_description = meal_owned.clone();
                let tip = tip_owned.clone();
                Box::pin(async move {
                    let parent = db.parent_path(collections::USERS, uid)?;

                    // 1. Read today's goal and status through the
                    //    transaction-scoped `db`. The goal is only read for
                    //    its default; the status read is what conflict
                    //    detection guards.
                    let goal: Option<Goal> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::GOALS)
                        .parent(&parent)
                        .obj()
                        .one(&today)
                        .await?;
                    let daily_goal = goal.map_or(DEFAULT_DAILY_GOAL, |g| g.goal);

                    let status: Option<DailyStatus> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::STATUS)
                        .parent(&parent)
                        .obj()
                        .one(&today)
                        .await?;
                    let prev_total = status.map_or(0, |s| s.total_calories);
                    let new_total = prev_total + calories;

                    // 2. Add the meal write to the transaction
                    let meal = Meal {
                        id: None,
                        meal: meal_description,
                        calories,
                        tip,
                        created_at: now.clone(),
                        date: today.clone(),
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::MEALS)
                        .document_id(&meal_id)
                        .parent(&parent)
                        .object(&meal)
                        .add_to_transaction(transaction)?;

                    // 3. Add the status upsert to the transaction
                    let new_status = DailyStatus {
                        date: today.clone(),
                        total_calories: new_total,
                        updated_at: now,
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::STATUS)
                        .document_id(&today)
                        .parent(&parent)
                        .object(&new_status)
                        .add_to_transaction(transaction)?;

                    tracing::debug!(date = %today, daily_goal, new_total, "Meal transaction staged");

                    Ok(new_total)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Meal logging transaction failed: {}", e)))?;

        tracing::info!(
            uid,
            date = %today,
            calories,
            new_total,
            "Meal logged atomically"
        );

        Ok(new_total)
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents from a user subcollection.
    async fn batch_delete<T, F>(
        &self,
        uid: &str,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;
        let parent = self.user_path(uid)?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .parent(&parent)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── User Data Deletion ────────────────────────────────────────

    /// Delete ALL data for a user (account deletion cascade).
    ///
    /// Deletes the `goals`, `meals`, and `status` subcollections and then
    /// the `users/{uid}` root document.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, uid: &str) -> Result<usize, AppError> {
        let parent = self.user_path(uid)?;
        let mut deleted_count = 0;

        // 1. Delete all goals
        let goals: Vec<Goal> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::GOALS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = goals.len();
        self.batch_delete(uid, &goals, collections::GOALS, |goal: &Goal| {
            goal.date.clone()
        })
        .await?;

        deleted_count += count;
        tracing::debug!(uid, count, "Deleted goals");

        // 2. Delete all meals
        let meals: Vec<Meal> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MEALS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = meals.len();
        self.batch_delete(uid, &meals, collections::MEALS, |meal: &Meal| {
            meal.id.clone().unwrap_or_default()
        })
        .await?;

        deleted_count += count;
        tracing::debug!(uid, count, "Deleted meals");

        // 3. Delete all status docs
        let statuses: Vec<DailyStatus> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::STATUS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = statuses.len();
        self.batch_delete(uid, &statuses, collections::STATUS, |s: &DailyStatus| {
            s.date.clone()
        })
        .await?;

        deleted_count += count;
        tracing::debug!(uid, count, "Deleted status docs");

        // 4. Delete the user root document
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(uid)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;
        tracing::debug!(uid, "Deleted user root document");

        tracing::info!(uid, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
