// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (set FIRESTORE_EMULATOR_HOST). The emulator provides a clean state
//! for each test run.

use kcal_tracker::models::Goal;
use kcal_tracker::time_utils;

mod common;
use common::{test_db, unique_uid};

fn test_goal(date: &str, goal: i64, locked: bool) -> Goal {
    Goal {
        date: date.to_string(),
        goal,
        locked,
        updated_at: time_utils::now_rfc3339(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// GOAL TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_goal_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("goal-rt");
    let today = time_utils::today_ist();

    // Initially, no goal for today
    let before = db.get_goal(&uid, &today).await.unwrap();
    assert!(before.is_none(), "Goal should not exist before saving");

    db.upsert_goal(&uid, &test_goal(&today, 1800, false))
        .await
        .unwrap();

    let fetched = db.get_goal(&uid, &today).await.unwrap().unwrap();
    assert_eq!(fetched.date, today);
    assert_eq!(fetched.goal, 1800);
    assert!(!fetched.locked);
}

#[tokio::test]
async fn test_goal_update_before_lock() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("goal-update");
    let today = time_utils::today_ist();

    db.upsert_goal(&uid, &test_goal(&today, 1800, false))
        .await
        .unwrap();
    db.upsert_goal(&uid, &test_goal(&today, 2200, false))
        .await
        .unwrap();

    let fetched = db.get_goal(&uid, &today).await.unwrap().unwrap();
    assert_eq!(fetched.goal, 2200);
}

#[tokio::test]
async fn test_locked_goal_refuses_writes() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("goal-lock");
    let today = time_utils::today_ist();

    // Lock the goal
    db.upsert_goal(&uid, &test_goal(&today, 2000, true))
        .await
        .unwrap();

    // Any further write for the same date must be refused
    let err = db
        .upsert_goal(&uid, &test_goal(&today, 2500, false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        kcal_tracker::error::AppError::GoalLocked(_)
    ));

    // Stored goal is unchanged
    let fetched = db.get_goal(&uid, &today).await.unwrap().unwrap();
    assert_eq!(fetched.goal, 2000);
    assert!(fetched.locked);
}

#[tokio::test]
async fn test_concurrent_locking_writes_single_winner() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("lock-race");
    let today = time_utils::today_ist();

    // Several racing saves all trying to lock the same date. The lock
    // check runs in the same transaction as the write, so exactly one
    // save can win; the rest must observe the lock.
    let mut handles = vec![];
    for i in 0..5i64 {
        let db_clone = db.clone();
        let uid_clone = uid.clone();
        let today_clone = today.clone();
        handles.push(tokio::spawn(async move {
            let goal = test_goal(&today_clone, 2000 + i, true);
            db_clone.upsert_goal(&uid_clone, &goal).await.map(|_| 2000 + i)
        }));
    }

    let mut winners = vec![];
    let mut locked_refusals = 0;
    for handle in handles {
        match handle.await.expect("Task join failed") {
            Ok(value) => winners.push(value),
            Err(kcal_tracker::error::AppError::GoalLocked(date)) => {
                assert_eq!(date, today);
                locked_refusals += 1;
            }
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }

    assert_eq!(winners.len(), 1, "Exactly one locking write should win");
    assert_eq!(locked_refusals, 4);

    let fetched = db.get_goal(&uid, &today).await.unwrap().unwrap();
    assert!(fetched.locked);
    assert_eq!(fetched.goal, winners[0], "Stored goal belongs to the winner");
}

#[tokio::test]
async fn test_locked_goals_query_ordering_and_limit() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("goal-history");

    // 9 locked goals plus one unlocked
    for day in 1..=9 {
        let date = format!("2024-03-{:02}", day);
        db.upsert_goal(&uid, &test_goal(&date, 1500 + day, true))
            .await
            .unwrap();
    }
    db.upsert_goal(&uid, &test_goal("2024-03-10", 9999, false))
        .await
        .unwrap();

    let goals = db.get_locked_goals(&uid, 7).await.unwrap();

    assert_eq!(goals.len(), 7, "At most 7 locked goals returned");
    assert!(goals.iter().all(|g| g.locked), "Only locked goals returned");

    // Strictly date descending
    for pair in goals.windows(2) {
        assert!(pair[0].date > pair[1].date);
    }
    assert_eq!(goals[0].date, "2024-03-09");
}

// ═══════════════════════════════════════════════════════════════════════════
// MEAL & STATUS TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_status_absent_before_meals() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("status-empty");
    let today = time_utils::today_ist();

    let status = db.get_status(&uid, &today).await.unwrap();
    assert!(status.is_none());
}

#[tokio::test]
async fn test_log_meal_updates_total() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("log-meal");
    let today = time_utils::today_ist();

    let total = db
        .log_meal_atomic(&uid, "2 eggs and toast", 350, "Good protein start.")
        .await
        .unwrap();
    assert_eq!(total, 350);

    let total = db
        .log_meal_atomic(&uid, "banana", 100, "Nice light snack.")
        .await
        .unwrap();
    assert_eq!(total, 450);

    let status = db.get_status(&uid, &today).await.unwrap().unwrap();
    assert_eq!(status.total_calories, 450);
    assert_eq!(status.date, today);
}

#[tokio::test]
async fn test_recent_meals_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("recent-meals");

    for i in 0..12 {
        db.log_meal_atomic(&uid, &format!("meal {}", i), 100, "tip")
            .await
            .unwrap();
        // createdAt has millisecond precision; keep the ordering unambiguous
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let meals = db.get_recent_meals(&uid, 10).await.unwrap();

    assert_eq!(meals.len(), 10, "Recent meals capped at 10");
    assert_eq!(meals[0].meal, "meal 11", "Newest meal first");
    for pair in meals.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DELETION CASCADE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_delete_user_data_cascades() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("delete");
    let today = time_utils::today_ist();

    db.upsert_goal(&uid, &test_goal(&today, 2000, false))
        .await
        .unwrap();
    db.log_meal_atomic(&uid, "lunch", 600, "tip").await.unwrap();
    db.log_meal_atomic(&uid, "dinner", 700, "tip")
        .await
        .unwrap();

    // 1 goal + 2 meals + 1 status + 1 user root
    let deleted = db.delete_user_data(&uid).await.unwrap();
    assert_eq!(deleted, 5);

    assert!(db.get_goal(&uid, &today).await.unwrap().is_none());
    assert!(db.get_status(&uid, &today).await.unwrap().is_none());
    assert!(db.get_recent_meals(&uid, 10).await.unwrap().is_empty());
    assert!(db.get_user(&uid).await.unwrap().is_none());
}
