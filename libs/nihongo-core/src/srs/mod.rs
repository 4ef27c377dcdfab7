//! Spaced repetition scheduler over a per-session item collection.
//!
//! [`SpacedRepetitionSystem`] is the only thing that mutates scheduling state.
//! It loads the session's collection from an [`ItemStore`] when opened and
//! writes it back after every mutating call. A mutation whose save fails
//! leaves the in-memory collection untouched. Load → mutate → save is not
//! atomic across instances; callers serialize access per session.

pub mod stats;
pub mod store;

pub use stats::{DayCount, Statistics, MAX_FORECAST_DAYS};
pub use store::{Collection, ItemStore, MemoryStore};

use crate::algorithm::sm2::Sm2;
use crate::algorithm::SpacedRepetitionAlgorithm;
use crate::error::StoreError;
use crate::types::{ImportRecord, ItemType, ItemUpdate, NewItem, ReviewRecord, SrsItem};
use chrono::{Local, NaiveDate};
use uuid::Uuid;

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Optional narrowing of a due-item query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DueFilter {
    pub item_type: Option<ItemType>,
    /// Matches items carrying any of these tags; empty means no tag filter.
    pub tags: Vec<String>,
}

impl DueFilter {
    fn accepts(&self, item: &SrsItem) -> bool {
        if self.item_type.is_some_and(|t| t != item.item_type) {
            return false;
        }
        self.tags.is_empty() || item.has_any_tag(&self.tags)
    }
}

pub struct SpacedRepetitionSystem<S: ItemStore> {
    session_id: String,
    store: S,
    items: Collection,
    algorithm: Box<dyn SpacedRepetitionAlgorithm>,
    clock: Clock,
}

impl<S: ItemStore> std::fmt::Debug for SpacedRepetitionSystem<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpacedRepetitionSystem")
            .field("session_id", &self.session_id)
            .field("items", &self.items.len())
            .field("algorithm", &self.algorithm.name())
            .finish()
    }
}

impl<S: ItemStore> SpacedRepetitionSystem<S> {
    /// Load the collection for `session_id`.
    pub fn open(store: S, session_id: impl Into<String>) -> Result<Self, StoreError> {
        let session_id = session_id.into();
        let items = store.load(&session_id)?;
        tracing::debug!(session_id = %session_id, items = items.len(), "collection loaded");
        Ok(Self {
            session_id,
            store,
            items,
            algorithm: Box::new(Sm2::default()),
            clock: Box::new(|| Local::now().date_naive()),
        })
    }

    /// Replace the source of "today".
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &SrsItem> {
        self.items.values()
    }

    pub fn get_item(&self, item_id: &str) -> Option<&SrsItem> {
        self.items.get(item_id)
    }

    /// Create an item, due immediately.
    pub fn add_item(&mut self, new_item: NewItem) -> Result<&SrsItem, StoreError> {
        let mut items = self.items.clone();
        let item_id = self.insert(&mut items, new_item);
        self.commit(items)?;
        Ok(&self.items[&item_id])
    }

    /// Add every valid record; invalid ones are skipped. Returns the number added.
    pub fn bulk_add_items(
        &mut self,
        records: impl IntoIterator<Item = ImportRecord>,
    ) -> Result<usize, StoreError> {
        self.insert_records(records)
    }

    /// Import records under fresh ids; invalid ones are skipped.
    /// Returns the number imported.
    pub fn import_items(
        &mut self,
        records: impl IntoIterator<Item = ImportRecord>,
    ) -> Result<usize, StoreError> {
        self.insert_records(records)
    }

    pub fn export_items(&self) -> Vec<SrsItem> {
        self.items.values().cloned().collect()
    }

    /// Edit content fields. Returns `false` for an unknown id.
    pub fn update_item(&mut self, item_id: &str, update: ItemUpdate) -> Result<bool, StoreError> {
        let Some(mut item) = self.items.get(item_id).cloned() else {
            return Ok(false);
        };

        if let Some(content) = update.content {
            item.content = content;
        }
        if let Some(english) = update.english {
            item.english = english;
        }
        if let Some(notes) = update.notes {
            item.notes = notes;
        }
        if let Some(tags) = update.tags {
            item.tags = tags;
        }

        self.commit_item(item)?;
        Ok(true)
    }

    /// Returns `false` for an unknown id.
    pub fn delete_item(&mut self, item_id: &str) -> Result<bool, StoreError> {
        let mut items = self.items.clone();
        if items.remove(item_id).is_none() {
            return Ok(false);
        }
        self.commit(items)?;
        Ok(true)
    }

    /// Remove every item of the session. Returns the number removed.
    pub fn clear(&mut self) -> Result<usize, StoreError> {
        let removed = self.items.len();
        self.commit(Collection::new())?;
        tracing::info!(session_id = %self.session_id, removed, "collection cleared");
        Ok(removed)
    }

    /// Record a review and reschedule. Returns the new interval in days, or
    /// `None` for an unknown id.
    ///
    /// `quality` must already be within `0..=5`.
    pub fn review_item(&mut self, item_id: &str, quality: u8) -> Result<Option<u32>, StoreError> {
        let today = self.today();
        let Some(mut item) = self.items.get(item_id).cloned() else {
            return Ok(None);
        };

        item.history.push(ReviewRecord {
            date: today,
            quality,
            ease_factor: item.ease_factor,
            interval: item.interval,
        });
        item.review_count += 1;
        item.last_reviewed = Some(today);

        let result = self
            .algorithm
            .schedule(item.ease_factor, item.interval, quality, today);
        item.ease_factor = result.ease_factor;
        item.interval = result.interval;
        item.next_review = result.next_review;

        self.commit_item(item)?;
        tracing::debug!(
            item_id,
            quality,
            interval = result.interval,
            ease = result.ease_factor,
            "item reviewed"
        );
        Ok(Some(result.interval))
    }

    /// Up to `count` due items, most overdue first, then lowest ease first.
    pub fn due_items(&self, count: usize, filter: &DueFilter) -> Vec<&SrsItem> {
        let today = self.today();
        let mut due: Vec<&SrsItem> = self
            .items
            .values()
            .filter(|item| item.is_due(today) && filter.accepts(item))
            .collect();

        due.sort_by(|a, b| {
            b.days_overdue(today)
                .cmp(&a.days_overdue(today))
                .then_with(|| a.ease_factor.total_cmp(&b.ease_factor))
        });
        due.truncate(count);
        due
    }

    pub fn items_by_type(&self, item_type: ItemType) -> Vec<&SrsItem> {
        self.items
            .values()
            .filter(|item| item.item_type == item_type)
            .collect()
    }

    /// Items carrying any of `tags`.
    pub fn items_by_tags(&self, tags: &[String]) -> Vec<&SrsItem> {
        self.items
            .values()
            .filter(|item| item.has_any_tag(tags))
            .collect()
    }

    pub fn review_forecast(&self, days: u32) -> Vec<DayCount> {
        stats::review_forecast(&self.items, self.today(), days)
    }

    pub fn statistics(&self) -> Statistics {
        stats::statistics(&self.items, self.today())
    }

    fn insert(&self, items: &mut Collection, new_item: NewItem) -> String {
        let item_id = Uuid::new_v4().to_string();
        let mut item = SrsItem::new(item_id.clone(), new_item, self.today());
        item.ease_factor = self.algorithm.initial_ease();
        items.insert(item_id.clone(), item);
        item_id
    }

    fn insert_records(
        &mut self,
        records: impl IntoIterator<Item = ImportRecord>,
    ) -> Result<usize, StoreError> {
        let mut items = self.items.clone();
        let mut added = 0;
        for (index, record) in records.into_iter().enumerate() {
            match record.validate() {
                Some(new_item) => {
                    self.insert(&mut items, new_item);
                    added += 1;
                }
                None => tracing::debug!(index, "skipping incomplete item record"),
            }
        }

        if added > 0 {
            self.commit(items)?;
        }
        Ok(added)
    }

    fn commit_item(&mut self, item: SrsItem) -> Result<(), StoreError> {
        let mut items = self.items.clone();
        items.insert(item.item_id.clone(), item);
        self.commit(items)
    }

    /// Persist `items`, adopting them only once the store has accepted them.
    fn commit(&mut self, items: Collection) -> Result<(), StoreError> {
        self.store.save(&self.session_id, &items)?;
        self.items = items;
        Ok(())
    }
}
