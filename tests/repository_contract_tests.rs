mod common;

use chrono::{Duration, Utc};

use common::{InMemoryItemRepository, InMemorySessionRepository, InMemoryUserRepository};
use finquiz_server::{
    errors::AppError,
    models::domain::{CatalogItem, Category, GameSession, SessionStatus, User},
    repositories::{CompletedSessionFilter, ItemRepository, SessionRepository, UserRepository},
};

fn make_item(id: &str, level: u8) -> CatalogItem {
    CatalogItem::new(
        id,
        &format!("Line item {}", id),
        vec![Category::Asset],
        "A resource controlled by the entity from past events.",
        level,
        finquiz_server::models::domain::Difficulty::Beginner,
        vec![],
    )
}

fn make_completed(student_id: &str, level: u8, percentage: u32, time_taken: i64) -> GameSession {
    let mut session = GameSession::start(student_id, "0712345678", level, 10);
    session.score = percentage / 10;
    session.percentage = percentage;
    session.time_taken_seconds = time_taken;
    session.end_time = Some(Utc::now());
    session.status = SessionStatus::Completed;
    session
}

#[tokio::test]
async fn item_repository_crud_and_error_paths() {
    let repo = InMemoryItemRepository::new();

    let item = make_item("CASH_01", 1);
    let created = repo.create(item.clone()).await.expect("create should work");
    assert_eq!(created.id, "CASH_01");

    let duplicate = repo.create(item.clone()).await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    let found = repo.find_by_id("CASH_01").await.expect("find should work");
    assert!(found.is_some());

    let missing = repo.find_by_id("NOPE").await.expect("find should work");
    assert!(missing.is_none());

    let missing_update = repo.update(make_item("NOPE", 1)).await;
    assert!(matches!(missing_update, Err(AppError::NotFound(_))));

    let missing_deactivate = repo.deactivate("NOPE").await;
    assert!(matches!(missing_deactivate, Err(AppError::NotFound(_))));

    repo.deactivate("CASH_01").await.expect("deactivate should work");
    let item = repo
        .find_by_id("CASH_01")
        .await
        .expect("find should work")
        .expect("item should still exist");
    assert!(!item.is_active);
}

#[tokio::test]
async fn item_sampling_respects_level_active_and_count() {
    let repo = InMemoryItemRepository::new();

    for i in 0..5 {
        repo.create(make_item(&format!("L1_{}", i), 1))
            .await
            .expect("create should work");
    }
    repo.create(make_item("L2_0", 2)).await.expect("create should work");
    repo.deactivate("L1_4").await.expect("deactivate should work");

    // More requested than available: all four active level-1 items.
    let sample = repo.sample_by_level(1, 10).await.expect("sample should work");
    assert_eq!(sample.len(), 4);
    assert!(sample.iter().all(|i| i.level == 1 && i.is_active));

    // Fewer requested than available: exactly the requested count,
    // without duplicates.
    let sample = repo.sample_by_level(1, 2).await.expect("sample should work");
    assert_eq!(sample.len(), 2);
    assert_ne!(sample[0].id, sample[1].id);

    // A level with no items is an empty sample, not an error.
    let sample = repo.sample_by_level(3, 10).await.expect("sample should work");
    assert!(sample.is_empty());
}

#[tokio::test]
async fn record_usage_tracks_true_correct_counts() {
    let repo = InMemoryItemRepository::new();
    repo.create(make_item("SALES_01", 1)).await.expect("create should work");

    // Fresh item: no usage, zero rate.
    let item = repo.find_by_id("SALES_01").await.unwrap().unwrap();
    assert_eq!(item.usage_count, 0);
    assert_eq!(item.correct_answer_rate(), 0);

    // One correct use: 1/1 = 100%.
    let item = repo.record_usage("SALES_01", true).await.expect("usage should record");
    assert_eq!(item.usage_count, 1);
    assert_eq!(item.correct_answer_rate(), 100);

    // A second, incorrect use: 1/2 = 50%.
    let item = repo.record_usage("SALES_01", false).await.expect("usage should record");
    assert_eq!(item.usage_count, 2);
    assert_eq!(item.correct_count, 1);
    assert_eq!(item.correct_answer_rate(), 50);
}

#[tokio::test]
async fn record_usage_rejects_unknown_and_inactive_items() {
    let repo = InMemoryItemRepository::new();
    repo.create(make_item("RENT_01", 1)).await.expect("create should work");
    repo.deactivate("RENT_01").await.expect("deactivate should work");

    let unknown = repo.record_usage("NOPE", true).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let inactive = repo.record_usage("RENT_01", true).await;
    assert!(matches!(inactive, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn session_lookups_are_owner_and_status_scoped() {
    let repo = InMemorySessionRepository::new();

    let session = GameSession::start("student-a", "0712345678", 1, 10);
    let session_id = session.id.clone();
    repo.create(session.clone()).await.expect("create should work");

    let found = repo
        .find_in_progress(&session_id, "student-a")
        .await
        .expect("find should work");
    assert!(found.is_some());

    // Another student cannot see the session as theirs.
    let other = repo
        .find_in_progress(&session_id, "student-b")
        .await
        .expect("find should work");
    assert!(other.is_none());

    // Not completed yet.
    let completed = repo
        .find_completed(&session_id, "student-a")
        .await
        .expect("find should work");
    assert!(completed.is_none());
}

#[tokio::test]
async fn replace_in_progress_only_matches_in_progress_documents() {
    let repo = InMemorySessionRepository::new();

    let mut session = GameSession::start("student-a", "0712345678", 1, 10);
    repo.create(session.clone()).await.expect("create should work");

    session.finalize(Some("done".to_string()));
    let replaced = repo
        .replace_in_progress(&session)
        .await
        .expect("replace should work");
    assert!(replaced);

    // Now completed in the store: a second filtered replace matches nothing.
    let replaced_again = repo
        .replace_in_progress(&session)
        .await
        .expect("replace should work");
    assert!(!replaced_again);
}

#[tokio::test]
async fn completed_history_excludes_in_progress_and_paginates() {
    let repo = InMemorySessionRepository::new();

    for i in 0..3 {
        let mut session = make_completed("student-a", 1, 70, 60 + i);
        session.created_at = Some(Utc::now() + Duration::seconds(i));
        repo.create(session).await.expect("create should work");
    }
    repo.create(GameSession::start("student-a", "0712345678", 1, 10))
        .await
        .expect("create should work");

    let (page, total) = repo
        .completed_history("student-a", 0, 2)
        .await
        .expect("history should work");
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert!(page.iter().all(|s| s.status == SessionStatus::Completed));

    let (page2, _) = repo
        .completed_history("student-a", 2, 2)
        .await
        .expect("history should work");
    assert_eq!(page2.len(), 1);
}

#[tokio::test]
async fn top_performers_break_ties_by_faster_time() {
    let repo = InMemorySessionRepository::new();

    let slow = make_completed("student-slow", 2, 90, 300);
    let fast = make_completed("student-fast", 2, 90, 120);
    let best = make_completed("student-best", 2, 100, 500);

    repo.create(slow).await.expect("create should work");
    repo.create(fast).await.expect("create should work");
    repo.create(best).await.expect("create should work");

    let performers = repo.top_performers(2, 10).await.expect("query should work");

    assert_eq!(performers.len(), 3);
    assert_eq!(performers[0].student_id, "student-best");
    assert_eq!(performers[1].student_id, "student-fast");
    assert_eq!(performers[2].student_id, "student-slow");
}

#[tokio::test]
async fn aggregates_exclude_non_completed_sessions() {
    let repo = InMemorySessionRepository::new();

    repo.create(make_completed("student-a", 1, 80, 100))
        .await
        .expect("create should work");
    repo.create(make_completed("student-a", 3, 60, 200))
        .await
        .expect("create should work");
    repo.create(GameSession::start("student-a", "0712345678", 1, 10))
        .await
        .expect("create should work");

    let breakdown = repo.level_breakdown().await.expect("aggregate should work");
    assert_eq!(breakdown.len(), 2);
    // Sorted by level ascending.
    assert_eq!(breakdown[0].level, 1);
    assert_eq!(breakdown[1].level, 3);
    assert_eq!(breakdown[0].total_sessions, 1);
    assert!((breakdown[0].average_percentage - 80.0).abs() < f64::EPSILON);

    let level_stats = repo.level_stats(1).await.expect("aggregate should work");
    assert!(level_stats.is_some());

    // A level with only an in-progress session has no aggregate.
    let empty = repo.level_stats(2).await.expect("aggregate should work");
    assert!(empty.is_none());

    let overall = repo
        .student_overall_stats("student-a")
        .await
        .expect("aggregate should work")
        .expect("student has completed sessions");
    assert_eq!(overall.total_sessions, 2);
    assert_eq!(overall.best_percentage, 80);

    let nobody = repo
        .student_overall_stats("student-z")
        .await
        .expect("aggregate should work");
    assert!(nobody.is_none());
}

#[tokio::test]
async fn list_completed_applies_filters() {
    let repo = InMemorySessionRepository::new();

    repo.create(make_completed("student-a", 1, 80, 100))
        .await
        .expect("create should work");
    repo.create(make_completed("student-b", 1, 40, 100))
        .await
        .expect("create should work");
    repo.create(make_completed("student-a", 2, 90, 100))
        .await
        .expect("create should work");

    let filter = CompletedSessionFilter {
        level: Some(1),
        min_score: Some(5),
        ..Default::default()
    };
    let (sessions, total) = repo
        .list_completed(filter, 0, 10)
        .await
        .expect("query should work");
    assert_eq!(total, 1);
    assert_eq!(sessions[0].student_id, "student-a");

    let filter = CompletedSessionFilter {
        student_id: Some("student-a".to_string()),
        ..Default::default()
    };
    let (_, total) = repo
        .list_completed(filter, 0, 10)
        .await
        .expect("query should work");
    assert_eq!(total, 2);
}

#[tokio::test]
async fn session_recent_counts_use_trailing_window() {
    let repo = InMemorySessionRepository::new();

    let mut recent = make_completed("student-a", 1, 70, 60);
    recent.created_at = Some(Utc::now());
    repo.create(recent).await.expect("create should work");

    let mut old = make_completed("student-b", 1, 70, 60);
    old.created_at = Some(Utc::now() - Duration::days(30));
    repo.create(old).await.expect("create should work");

    let total = repo.count_completed().await.expect("count should work");
    assert_eq!(total, 2);

    let recent_count = repo
        .count_completed_since(Utc::now() - Duration::days(7))
        .await
        .expect("count should work");
    assert_eq!(recent_count, 1);
}

#[tokio::test]
async fn user_repository_contract() {
    let repo = InMemoryUserRepository::new();

    let student = User::new_student(
        "student_s100",
        "hash",
        Some("0712345678".to_string()),
        Some("S-100".to_string()),
        Some("Student S-100".to_string()),
    );
    let student = repo.create(student).await.expect("create should work");
    assert!(student.id.is_some());

    let duplicate = repo
        .create(User::new_student("student_s100", "hash", None, None, None))
        .await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    // Either identifier finds the student.
    let by_mobile = repo
        .find_student_by_identifier(Some("0712345678"), None)
        .await
        .expect("find should work");
    assert!(by_mobile.is_some());

    let by_student_id = repo
        .find_student_by_identifier(None, Some("S-100"))
        .await
        .expect("find should work");
    assert!(by_student_id.is_some());

    let neither = repo
        .find_student_by_identifier(None, None)
        .await
        .expect("find should work");
    assert!(neither.is_none());

    let admin = repo
        .create(User::new_admin("boss", "hash", "boss@example.com", "Boss"))
        .await
        .expect("create should work");
    let found_admin = repo
        .find_admin_by_username("boss")
        .await
        .expect("find should work");
    assert!(found_admin.is_some());

    assert_eq!(
        repo.count_by_role(finquiz_server::models::domain::UserRole::Student)
            .await
            .expect("count should work"),
        1
    );
    assert_eq!(
        repo.count_by_role(finquiz_server::models::domain::UserRole::Admin)
            .await
            .expect("count should work"),
        1
    );

    let (students, total) = repo
        .list_students(Some("s-100"), 0, 10)
        .await
        .expect("list should work");
    assert_eq!(total, 1);
    assert_eq!(students[0].username, "student_s100");

    let mut updated = admin.clone();
    updated.admin_name = Some("Renamed".to_string());
    repo.save(&updated).await.expect("save should work");

    let mut unsaved = User::new_admin("ghost", "hash", "ghost@example.com", "Ghost");
    unsaved.id = Some(mongodb::bson::oid::ObjectId::new());
    let missing_save = repo.save(&unsaved).await;
    assert!(matches!(missing_save, Err(AppError::NotFound(_))));
}
