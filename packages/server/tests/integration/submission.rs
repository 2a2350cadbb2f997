use chrono::{Duration, SecondsFormat, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;

use assignment_server::entity::{assignment, submission};

use crate::common::{FUTURE_DEADLINE, PAST_DEADLINE, TestApp, basic_header, routes};

fn submission_body(url: &str) -> serde_json::Value {
    json!({ "submission_url": url })
}

#[tokio::test]
async fn first_submission_returns_201_with_one_retry() {
    let app = TestApp::spawn().await;
    let owner = app.create_account("owner@example.com", "pw-owner").await;
    let student = app.create_account("student@example.com", "pw-student").await;
    let id = app.create_assignment(&owner, 3, FUTURE_DEADLINE).await;

    let res = app
        .post(
            &routes::submission(id),
            &submission_body("https://example.com/hw1.zip"),
            &student,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["assignment_id"], id);
    assert_eq!(res.body["submission_url"], "https://example.com/hw1.zip");
    assert_eq!(res.body["submission_retries"], 1);
}

#[tokio::test]
async fn resubmission_overwrites_url_and_increments_retries() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;
    let id = app.create_assignment(&creds, 3, FUTURE_DEADLINE).await;

    let first = app
        .post(
            &routes::submission(id),
            &submission_body("https://example.com/v1.zip"),
            &creds,
        )
        .await;
    assert_eq!(first.status, 201);

    let second = app
        .post(
            &routes::submission(id),
            &submission_body("https://example.com/v2.zip"),
            &creds,
        )
        .await;

    assert_eq!(second.status, 200, "{}", second.text);
    assert_eq!(second.body["id"], first.body["id"]);
    assert_eq!(second.body["submission_url"], "https://example.com/v2.zip");
    assert_eq!(second.body["submission_retries"], 2);
}

#[tokio::test]
async fn attempt_after_limit_returns_400() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;
    let id = app.create_assignment(&creds, 2, FUTURE_DEADLINE).await;

    for expected in [201, 200] {
        let res = app
            .post(
                &routes::submission(id),
                &submission_body("https://example.com/hw.zip"),
                &creds,
            )
            .await;
        assert_eq!(res.status, expected, "{}", res.text);
    }

    let res = app
        .post(
            &routes::submission(id),
            &submission_body("https://example.com/hw.zip"),
            &creds,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn attempts_are_counted_per_account() {
    let app = TestApp::spawn().await;
    let alice = app.create_account("alice@example.com", "pw-alice").await;
    let bob = app.create_account("bob@example.com", "pw-bob").await;
    let id = app.create_assignment(&alice, 1, FUTURE_DEADLINE).await;

    let body = submission_body("https://example.com/hw.zip");
    assert_eq!(app.post(&routes::submission(id), &body, &alice).await.status, 201);
    assert_eq!(app.post(&routes::submission(id), &body, &bob).await.status, 201);
    assert_eq!(app.post(&routes::submission(id), &body, &alice).await.status, 400);
}

#[tokio::test]
async fn submission_after_deadline_returns_400() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;

    // Deadlines in the past are valid at creation time; only submissions are refused.
    let id = app.create_assignment(&creds, 3, PAST_DEADLINE).await;

    let res = app
        .post(
            &routes::submission(id),
            &submission_body("https://example.com/hw.zip"),
            &creds,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn deadline_is_checked_at_submission_time() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;
    let soon = (Utc::now() + Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Millis, true);
    let id = app.create_assignment(&creds, 3, &soon).await;

    let body = submission_body("https://example.com/hw.zip");
    assert_eq!(app.post(&routes::submission(id), &body, &creds).await.status, 201);

    let expired = (Utc::now() - Duration::minutes(1)).to_rfc3339_opts(SecondsFormat::Millis, true);
    let model = assignment::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: assignment::ActiveModel = model.into();
    active.deadline = Set(expired);
    active.update(&app.db).await.unwrap();

    assert_eq!(app.post(&routes::submission(id), &body, &creds).await.status, 400);
}

#[tokio::test]
async fn unknown_or_deleted_assignment_returns_404() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;
    let body = submission_body("https://example.com/hw.zip");

    let res = app.post(&routes::submission(4242), &body, &creds).await;
    assert_eq!(res.status, 404);

    let id = app.create_assignment(&creds, 3, FUTURE_DEADLINE).await;
    assert_eq!(app.delete(&routes::assignment(id), &creds).await.status, 204);

    let res = app.post(&routes::submission(id), &body, &creds).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn invalid_url_returns_400() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;
    let id = app.create_assignment(&creds, 3, FUTURE_DEADLINE).await;

    for url in ["", "not a url", "ftp://example.com/hw.zip"] {
        let res = app
            .post(&routes::submission(id), &submission_body(url), &creds)
            .await;
        assert_eq!(res.status, 400, "{url:?} should be rejected");
    }
}

#[tokio::test]
async fn submission_requires_credentials() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;
    let id = app.create_assignment(&creds, 3, FUTURE_DEADLINE).await;

    let res = app
        .request(
            reqwest::Method::POST,
            &routes::submission(id),
            Some(&submission_body("https://example.com/hw.zip")),
            None,
        )
        .await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn concurrent_submissions_respect_the_attempt_limit() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;
    let id = app.create_assignment(&creds, 3, FUTURE_DEADLINE).await;

    let mut set = tokio::task::JoinSet::new();
    for n in 0..12 {
        let client = app.client.clone();
        let url = format!("http://{}{}", app.addr, routes::submission(id));
        let auth = basic_header(&creds.email, &creds.password);
        set.spawn(async move {
            client
                .post(url)
                .header("Authorization", auth)
                .json(&submission_body(&format!("https://example.com/hw-{n}.zip")))
                .send()
                .await
                .expect("Failed to send POST request")
                .status()
                .as_u16()
        });
    }

    let mut statuses = set.join_all().await;
    statuses.sort_unstable();

    let mut expected = vec![200, 200, 201];
    expected.extend([400; 9]);
    assert_eq!(statuses, expected);

    let rows = submission::Entity::find()
        .filter(submission::Column::AssignmentId.eq(id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].submission_retries, 3);
}

#[tokio::test]
async fn unknown_assignment_is_reported_before_a_bad_body() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("student@example.com", "pw-student").await;

    let res = app
        .post(&routes::submission(9999), &json!({"bad": 1}), &creds)
        .await;
    assert_eq!(res.status, 404);

    let id = app.create_assignment(&creds, 3, FUTURE_DEADLINE).await;
    let res = app
        .post(&routes::submission(id), &json!({"bad": 1}), &creds)
        .await;
    assert_eq!(res.status, 400);
}
