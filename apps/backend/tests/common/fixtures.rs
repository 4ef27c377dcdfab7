//! Test fixtures and factory functions for creating test data.

use serde_json::json;

/// Create an add-item request body.
pub fn new_item_request(content: &str, english: &str, item_type: &str, tags: &[&str]) -> serde_json::Value {
    json!({
        "item_type": item_type,
        "content": content,
        "english": english,
        "tags": tags,
    })
}

/// Generate pipe-delimited bulk entry text.
pub fn sample_bulk_content() -> String {
    [
        "私は学生です | I am a student | sentence | Basic self-introduction | JLPT N5, grammar",
        "本 | book | vocabulary | | JLPT N5, nouns",
        "",
        "incomplete | line",
        "水 | water | kanji",
    ]
    .join("\n")
}

/// Create a review request body.
pub fn review_request(quality: i64) -> serde_json::Value {
    json!({ "quality": quality })
}

/// Create a grammar check request body.
pub fn check_request(text: &str, session_id: Option<&str>) -> serde_json::Value {
    match session_id {
        Some(s) => json!({ "text": text, "session_id": s }),
        None => json!({ "text": text }),
    }
}

/// Create a custom rule request body for 〜てみる ("try doing").
pub fn te_miru_rule() -> serde_json::Value {
    json!({
        "name": "te-miru",
        "pattern": "〜てみる",
        "check_pattern": "みる|みます",
        "correct_pattern": "てみ",
        "explanation": "Try doing something",
        "example": "食べてみる",
        "error_description": "みる must follow the te-form",
        "suggestion": "Use the te-form before みる",
        "context_rules": ["must_follow_te_form"]
    })
}
