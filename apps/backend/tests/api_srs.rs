//! Spaced repetition API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Local};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::fixtures;
use common::{unique_session, TestContext};

async fn add_item(server: &TestServer, session: &str, content: &str, tags: &[&str]) -> String {
    let response = server
        .post(&format!("/api/srs/{session}/items"))
        .json(&fixtures::new_item_request(content, "meaning", "vocabulary", tags))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["item_id"].as_str().unwrap().to_string()
}

async fn json_array_len(server: &TestServer, path: &str) -> usize {
    let response = server.get(path).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body.as_array().unwrap().len()
}

/// Test a new item is due today and leaves the queue after a review.
#[tokio::test]
async fn test_add_and_review_item() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");
    let today = Local::now().date_naive();

    let id = add_item(&server, &session, "猫", &["animals"]).await;

    let response = server.get(&format!("/api/srs/{session}/items/{id}")).await;
    response.assert_status_ok();
    let item: serde_json::Value = response.json();
    assert_eq!(item["content"], "猫");
    assert_eq!(item["ease_factor"], 2.5);
    assert_eq!(item["interval"], 0);
    assert_eq!(item["next_review"], today.to_string());

    assert_eq!(json_array_len(&server, &format!("/api/srs/{session}/due")).await, 1);

    let response = server
        .post(&format!("/api/srs/{session}/items/{id}/review"))
        .json(&fixtures::review_request(4))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["interval"], 1);
    assert_eq!(body["next_review"], (today + Duration::days(1)).to_string());

    assert_eq!(json_array_len(&server, &format!("/api/srs/{session}/due")).await, 0);

    let response = server.get(&format!("/api/srs/{session}/items/{id}")).await;
    let item: serde_json::Value = response.json();
    assert_eq!(item["review_count"], 1);
    assert_eq!(item["history"][0]["quality"], 4);
    assert_eq!(item["history"][0]["interval"], 0);
}

/// Test review quality is validated at the boundary.
#[tokio::test]
async fn test_review_validation() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");
    let id = add_item(&server, &session, "犬", &[]).await;

    for quality in [-1, 6] {
        let response = server
            .post(&format!("/api/srs/{session}/items/{id}/review"))
            .json(&fixtures::review_request(quality))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    let response = server
        .post(&format!("/api/srs/{session}/items/missing/review"))
        .json(&fixtures::review_request(3))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Rejected reviews leave the item untouched.
    let response = server.get(&format!("/api/srs/{session}/items/{id}")).await;
    let item: serde_json::Value = response.json();
    assert_eq!(item["review_count"], 0);
}

/// Test bulk entry skips malformed lines and keeps tags.
#[tokio::test]
async fn test_bulk_add() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");

    let response = server
        .post(&format!("/api/srs/{session}/items/bulk"))
        .json(&json!({ "content": fixtures::sample_bulk_content() }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["added"], 3);

    assert_eq!(
        json_array_len(&server, &format!("/api/srs/{session}/items?tags=nouns")).await,
        1
    );
    assert_eq!(
        json_array_len(&server, &format!("/api/srs/{session}/items?tags=JLPT%20N5")).await,
        2
    );
    assert_eq!(
        json_array_len(&server, &format!("/api/srs/{session}/items?item_type=kanji")).await,
        1
    );
    assert_eq!(
        json_array_len(&server, &format!("/api/srs/{session}/due?item_type=sentence")).await,
        1
    );

    let response = server
        .get(&format!("/api/srs/{session}/due?item_type=idiom"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

/// Test import skips incomplete records and export feeds back into import.
#[tokio::test]
async fn test_import_and_export() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");

    let records = json!([
        { "content": "私", "english": "I", "item_type": "vocabulary" },
        { "content": "本", "item_type": "vocabulary" },
        { "content": "木", "english": "tree", "item_type": "idiom" },
        { "content": "〜ながら", "english": "while", "item_type": "Grammar", "tags": ["N4"] }
    ]);
    let response = server
        .post(&format!("/api/srs/{session}/items/import"))
        .json(&records)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["added"], 2);

    let response = server.get(&format!("/api/srs/{session}/items/export")).await;
    response.assert_status_ok();
    let exported: serde_json::Value = response.json();
    assert_eq!(exported.as_array().unwrap().len(), 2);

    let other = unique_session("srs");
    let response = server
        .post(&format!("/api/srs/{other}/items/import"))
        .json(&exported)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["added"], 2);
    assert_eq!(json_array_len(&server, &format!("/api/srs/{other}/items")).await, 2);
}

/// Test a malformed record is skipped without losing the rest of the batch.
#[tokio::test]
async fn test_import_skips_malformed_records() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");

    let records = json!([
        { "content": "私", "english": "I", "item_type": "vocabulary" },
        { "content": "本", "english": "book", "item_type": "vocabulary", "tags": "JLPT N5" },
        "stray",
        { "content": "水", "english": "water", "item_type": "kanji", "tags": ["N5"] }
    ]);
    let response = server
        .post(&format!("/api/srs/{session}/items/import"))
        .json(&records)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["added"], 2);
    assert_eq!(json_array_len(&server, &format!("/api/srs/{session}/items")).await, 2);
}

/// Test CSV import with optional columns and comma separated tags.
#[tokio::test]
async fn test_import_csv() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");

    let csv = "content,english,item_type,notes,tags\n\
               本,book,vocabulary,,\"JLPT N5, nouns\"\n\
               水,water,kanji,element,JLPT N5\n\
               木,tree,idiom,,\n";
    let response = server
        .post(&format!("/api/srs/{session}/items/import/csv"))
        .text(csv)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["added"], 2);

    assert_eq!(
        json_array_len(&server, &format!("/api/srs/{session}/items?tags=nouns")).await,
        1
    );
    assert_eq!(
        json_array_len(&server, &format!("/api/srs/{session}/items?tags=JLPT%20N5")).await,
        2
    );

    let response = server
        .post(&format!("/api/srs/{session}/items/import/csv"))
        .text("content,notes\n本,\n")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "invalid_import");
}

/// Test resetting a session removes every item.
#[tokio::test]
async fn test_clear_items() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");
    let other = unique_session("srs");

    add_item(&server, &session, "一", &[]).await;
    add_item(&server, &session, "二", &[]).await;
    add_item(&server, &other, "三", &[]).await;

    let response = server.delete(&format!("/api/srs/{session}/items")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["removed"], 2);

    assert_eq!(json_array_len(&server, &format!("/api/srs/{session}/items")).await, 0);
    assert_eq!(json_array_len(&server, &format!("/api/srs/{other}/items")).await, 1);
}

/// Test editing and deleting items.
#[tokio::test]
async fn test_update_and_delete_item() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");
    let id = add_item(&server, &session, "山", &[]).await;

    let response = server
        .put(&format!("/api/srs/{session}/items/{id}"))
        .json(&json!({ "english": "mountain", "tags": ["nature"] }))
        .await;
    response.assert_status_ok();
    let item: serde_json::Value = response.json();
    assert_eq!(item["english"], "mountain");
    assert_eq!(item["content"], "山");
    assert_eq!(item["tags"], json!(["nature"]));

    let response = server
        .put(&format!("/api/srs/{session}/items/missing"))
        .json(&json!({ "english": "x" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.delete(&format!("/api/srs/{session}/items/{id}")).await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/srs/{session}/items/{id}")).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.delete(&format!("/api/srs/{session}/items/{id}")).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

/// Test due count limit and session isolation.
#[tokio::test]
async fn test_due_count_and_sessions() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");
    let other = unique_session("srs");

    for content in ["一", "二", "三"] {
        add_item(&server, &session, content, &[]).await;
    }

    assert_eq!(json_array_len(&server, &format!("/api/srs/{session}/due?count=2")).await, 2);
    assert_eq!(json_array_len(&server, &format!("/api/srs/{session}/due")).await, 3);
    assert_eq!(json_array_len(&server, &format!("/api/srs/{other}/due")).await, 0);
}

/// Test forecast and statistics.
#[tokio::test]
async fn test_forecast_and_stats() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");
    let today = Local::now().date_naive();

    let reviewed = add_item(&server, &session, "月", &[]).await;
    add_item(&server, &session, "日", &[]).await;
    server
        .post(&format!("/api/srs/{session}/items/{reviewed}/review"))
        .json(&fixtures::review_request(5))
        .await
        .assert_status_ok();

    let response = server.get(&format!("/api/srs/{session}/forecast?days=3")).await;
    response.assert_status_ok();
    let forecast: serde_json::Value = response.json();
    let days = forecast.as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["date"], today.to_string());
    assert_eq!(days[0]["count"], 1);
    assert_eq!(days[1]["count"], 1);
    assert_eq!(days[2]["count"], 0);

    let response = server.get(&format!("/api/srs/{session}/forecast?days=1000")).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.get(&format!("/api/srs/{session}/stats")).await;
    response.assert_status_ok();
    let stats: serde_json::Value = response.json();
    assert_eq!(stats["total_items"], 2);
    assert_eq!(stats["items_by_type"]["vocabulary"], 2);
    assert_eq!(stats["total_reviews"], 1);
    assert_eq!(stats["review_success_rate"], 1.0);
    assert_eq!(stats["daily_reviews"].as_array().unwrap().len(), 30);
    assert_eq!(stats["daily_reviews"][0]["count"], 1);
}

/// Test statistics for an empty session.
#[tokio::test]
async fn test_stats_empty() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = unique_session("srs");

    let response = server.get(&format!("/api/srs/{session}/stats")).await;
    response.assert_status_ok();
    let stats: serde_json::Value = response.json();
    assert_eq!(stats["total_items"], 0);
    assert_eq!(stats["average_ease"], 0.0);
    assert_eq!(stats["daily_reviews"].as_array().unwrap().len(), 0);
}
