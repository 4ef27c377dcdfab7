//! Persistence boundary for item collections.

use crate::error::StoreError;
use crate::types::SrsItem;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// All items of one session, keyed by item id.
///
/// Serialized as a JSON object from item id to the full item record, history
/// included; this is the interchange format for other layers.
pub type Collection = BTreeMap<String, SrsItem>;

/// Load/save collaborator keyed by session id.
pub trait ItemStore {
    /// Load a session's collection; an unknown session yields an empty one.
    fn load(&self, session_id: &str) -> Result<Collection, StoreError>;

    fn save(&self, session_id: &str, items: &Collection) -> Result<(), StoreError>;
}

impl<S: ItemStore + ?Sized> ItemStore for &S {
    fn load(&self, session_id: &str) -> Result<Collection, StoreError> {
        (**self).load(session_id)
    }

    fn save(&self, session_id: &str, items: &Collection) -> Result<(), StoreError> {
        (**self).save(session_id, items)
    }
}

/// In-process store, mainly for tests and single-process tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with a saved collection.
    pub fn session_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Collection>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::backend("memory store lock poisoned"))
    }
}

impl ItemStore for MemoryStore {
    fn load(&self, session_id: &str) -> Result<Collection, StoreError> {
        Ok(self.lock()?.get(session_id).cloned().unwrap_or_default())
    }

    fn save(&self, session_id: &str, items: &Collection) -> Result<(), StoreError> {
        self.lock()?.insert(session_id.to_string(), items.clone());
        Ok(())
    }
}

/// Encode a collection in the interchange format.
pub fn to_json(items: &Collection) -> Result<String, StoreError> {
    Ok(serde_json::to_string(items)?)
}

/// Decode a collection from the interchange format.
pub fn from_json(json: &str) -> Result<Collection, StoreError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemType, NewItem, ReviewRecord};
    use chrono::NaiveDate;

    fn item(id: &str) -> SrsItem {
        let mut item = SrsItem::new(
            id.to_string(),
            NewItem {
                item_type: ItemType::Grammar,
                content: "〜てもいい".to_string(),
                english: "may".to_string(),
                notes: String::new(),
                tags: vec!["N5".to_string()],
            },
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        item.history.push(ReviewRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            quality: 4,
            ease_factor: 2.5,
            interval: 0,
        });
        item
    }

    #[test]
    fn memory_store_keeps_sessions_apart() {
        let store = MemoryStore::new();
        let mut items = Collection::new();
        items.insert("a".to_string(), item("a"));
        store.save("alice", &items).unwrap();

        assert_eq!(store.load("alice").unwrap().len(), 1);
        assert!(store.load("bob").unwrap().is_empty());
        assert_eq!(store.session_count().unwrap(), 1);
    }

    #[test]
    fn wire_format_is_keyed_by_item_id() {
        let mut items = Collection::new();
        items.insert("a".to_string(), item("a"));
        let json = to_json(&items).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let record = &value["a"];
        assert_eq!(record["item_id"], "a");
        assert_eq!(record["item_type"], "grammar");
        assert_eq!(record["next_review"], "2024-01-01");
        assert_eq!(record["last_reviewed"], serde_json::Value::Null);
        assert_eq!(record["history"][0]["quality"], 4);
        assert_eq!(record["history"][0]["date"], "2024-01-01");

        assert_eq!(from_json(&json).unwrap(), items);
    }
}
