//! In-memory collection source.
//!
//! Backs the `--offline` mode and the engine tests. Keyword filtering is a
//! case-insensitive fuzzy match over each record's searchable text; paging is
//! applied after filtering, in id order.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use parking_lot::Mutex;

use crate::error::{AtriumError, Result};
use crate::view::QueryParameters;

use super::{CollectionResult, CollectionSource, Record, RecordId};

/// A record type that can live in a [`MemorySource`].
pub trait MemoryRecord: Record {
    type Draft: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Text the keyword is matched against.
    fn search_text(&self) -> String;

    /// Build a record from a draft, validating it first.
    fn from_draft(id: RecordId, draft: &Self::Draft) -> Result<Self>;
}

struct MemoryState<R> {
    records: BTreeMap<RecordId, R>,
    next_id: i32,
}

pub struct MemorySource<R: MemoryRecord> {
    state: Mutex<MemoryState<R>>,
    matcher: SkimMatcherV2,
    latency: Option<Duration>,
}

impl<R: MemoryRecord> MemorySource<R> {
    pub fn new(records: impl IntoIterator<Item = R>) -> Self {
        let records: BTreeMap<RecordId, R> = records.into_iter().map(|r| (r.id(), r)).collect();
        let next_id = records.keys().next_back().map(|id| id.0 + 1).unwrap_or(1);
        Self {
            state: Mutex::new(MemoryState { records, next_id }),
            matcher: SkimMatcherV2::default().ignore_case(),
            latency: None,
        }
    }

    /// Delay every operation, so debouncing and loading states are visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: RecordId) -> Option<R> {
        self.state.lock().records.get(&id).cloned()
    }

    /// Every record matching `keep`, in id order.
    pub fn filter(&self, keep: impl Fn(&R) -> bool) -> Vec<R> {
        self.state
            .lock()
            .records
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }

    fn matches(&self, record: &R, keyword: &str) -> bool {
        keyword.is_empty()
            || self
                .matcher
                .fuzzy_match(&record.search_text(), keyword)
                .is_some()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn not_found(id: RecordId) -> AtriumError {
        AtriumError::NotFound(format!("{} {id}", R::NAMES.singular))
    }
}

#[async_trait]
impl<R: MemoryRecord> CollectionSource for MemorySource<R> {
    type Record = R;
    type Draft = R::Draft;

    async fn fetch(&self, params: &QueryParameters) -> Result<CollectionResult<R>> {
        self.simulate_latency().await;

        let state = self.state.lock();
        let keyword = params.keyword.trim();
        let matching: Vec<&R> = state
            .records
            .values()
            .filter(|r| self.matches(r, keyword))
            .collect();

        let total_count = matching.len() as u64;
        let offset = usize::try_from(params.offset).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(params.limit as usize)
            .cloned()
            .collect();

        Ok(CollectionResult::new(items, total_count))
    }

    async fn create(&self, draft: R::Draft) -> Result<R> {
        self.simulate_latency().await;

        let mut state = self.state.lock();
        let id = RecordId(state.next_id);
        let record = R::from_draft(id, &draft)?;
        state.next_id += 1;
        state.records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: RecordId, draft: R::Draft) -> Result<R> {
        self.simulate_latency().await;

        let mut state = self.state.lock();
        if !state.records.contains_key(&id) {
            return Err(Self::not_found(id));
        }
        let record = R::from_draft(id, &draft)?;
        state.records.insert(id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: RecordId) -> Result<R> {
        self.simulate_latency().await;

        self.state
            .lock()
            .records
            .remove(&id)
            .ok_or_else(|| Self::not_found(id))
    }
}
