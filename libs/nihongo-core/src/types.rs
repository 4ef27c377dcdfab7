//! Core types for the spaced repetition side of the library.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Initial ease factor for a fresh item.
pub const INITIAL_EASE: f64 = 2.5;

/// Lowest ease factor an item can reach.
pub const MINIMUM_EASE: f64 = 1.3;

/// Kind of learnable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Vocabulary,
    Kanji,
    Grammar,
    Sentence,
    Phrase,
}

impl ItemType {
    pub const ALL: [ItemType; 5] = [
        Self::Vocabulary,
        Self::Kanji,
        Self::Grammar,
        Self::Sentence,
        Self::Phrase,
    ];

    /// Get the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocabulary => "vocabulary",
            Self::Kanji => "kanji",
            Self::Grammar => "grammar",
            Self::Sentence => "sentence",
            Self::Phrase => "phrase",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known item type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownItemType(pub String);

impl fmt::Display for UnknownItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown item type: {}", self.0)
    }
}

impl std::error::Error for UnknownItemType {}

impl FromStr for ItemType {
    type Err = UnknownItemType;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| UnknownItemType(s.to_string()))
    }
}

/// One entry of an item's review log.
///
/// `ease_factor` and `interval` are the values in effect *before* the review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub date: NaiveDate,
    pub quality: u8,
    pub ease_factor: f64,
    pub interval: u32,
}

/// A learnable unit together with its review schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrsItem {
    pub item_id: String,
    pub item_type: ItemType,
    pub content: String,
    pub english: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_ease")]
    pub ease_factor: f64,
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub last_reviewed: Option<NaiveDate>,
    pub next_review: NaiveDate,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub history: Vec<ReviewRecord>,
}

fn default_ease() -> f64 {
    INITIAL_EASE
}

impl SrsItem {
    /// Create a fresh item, due on its creation date.
    pub fn new(item_id: String, new_item: NewItem, created_on: NaiveDate) -> Self {
        Self {
            item_id,
            item_type: new_item.item_type,
            content: new_item.content,
            english: new_item.english,
            notes: new_item.notes,
            tags: new_item.tags,
            ease_factor: INITIAL_EASE,
            interval: 0,
            last_reviewed: None,
            next_review: created_on,
            review_count: 0,
            history: Vec::new(),
        }
    }

    /// Whether the item is due on `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }

    /// Days past the scheduled date (negative when not yet due).
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.next_review).num_days()
    }

    /// Whether the item carries any of the given tags.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.tags.contains(tag))
    }
}

/// Content of an item about to be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub item_type: ItemType,
    pub content: String,
    pub english: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial content edit; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Loosely shaped record from an import file or bulk-add form.
///
/// Every field is optional at this stage; [`ImportRecord::validate`] decides
/// whether the record can become an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ImportRecord {
    /// Turn the record into a [`NewItem`] if `content`, `english` and a known
    /// `item_type` are all present.
    pub fn validate(self) -> Option<NewItem> {
        let content = self.content?;
        let english = self.english?;
        let item_type = self.item_type?.parse().ok()?;
        Some(NewItem {
            item_type,
            content,
            english,
            notes: self.notes.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn item_type_parses_case_insensitively() {
        assert_eq!("Kanji".parse::<ItemType>(), Ok(ItemType::Kanji));
        assert_eq!(" phrase ".parse::<ItemType>(), Ok(ItemType::Phrase));
        assert!("idiom".parse::<ItemType>().is_err());
    }

    #[test]
    fn new_item_is_due_on_creation_date() {
        let item = SrsItem::new(
            "a".to_string(),
            NewItem {
                item_type: ItemType::Vocabulary,
                content: "本".to_string(),
                english: "book".to_string(),
                notes: String::new(),
                tags: vec![],
            },
            date(2024, 3, 1),
        );
        assert_eq!(item.ease_factor, 2.5);
        assert_eq!(item.interval, 0);
        assert!(item.is_due(date(2024, 3, 1)));
        assert!(!item.is_due(date(2024, 2, 29)));
        assert_eq!(item.days_overdue(date(2024, 3, 4)), 3);
    }

    #[test]
    fn import_record_requires_core_fields() {
        let complete = ImportRecord {
            content: Some("私".to_string()),
            english: Some("I".to_string()),
            item_type: Some("vocabulary".to_string()),
            ..Default::default()
        };
        let item = complete.validate().unwrap();
        assert_eq!(item.item_type, ItemType::Vocabulary);
        assert!(item.tags.is_empty());

        let missing_english = ImportRecord {
            content: Some("私".to_string()),
            item_type: Some("vocabulary".to_string()),
            ..Default::default()
        };
        assert!(missing_english.validate().is_none());

        let unknown_type = ImportRecord {
            content: Some("私".to_string()),
            english: Some("I".to_string()),
            item_type: Some("idiom".to_string()),
            ..Default::default()
        };
        assert!(unknown_type.validate().is_none());
    }

    #[test]
    fn item_deserializes_with_defaults() {
        let json = r#"{
            "item_id": "x",
            "item_type": "kanji",
            "content": "水",
            "english": "water",
            "next_review": "2024-01-05"
        }"#;
        let item: SrsItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.ease_factor, INITIAL_EASE);
        assert_eq!(item.interval, 0);
        assert_eq!(item.last_reviewed, None);
        assert!(item.history.is_empty());
    }
}
