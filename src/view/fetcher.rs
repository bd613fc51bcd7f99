//! Fetch state of a view under a cache-and-network, last-request-wins policy.
//!
//! The fetcher does no IO itself. [`CollectionFetcher::begin`] hands out a
//! [`FetchTicket`] for the caller to run against the source, and
//! [`CollectionFetcher::resolve`] decides whether the outcome is still wanted.
//! Only the outcome of the most recently issued ticket is applied, and only
//! while its parameters are still the current ones.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::collection::CollectionResult;
use crate::error::ErrorInfo;

use super::query::QueryParameters;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<R> {
    Idle,
    Loading,
    Success(CollectionResult<R>),
    Failure(ErrorInfo),
}

impl<R> FetchState<R> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn result(&self) -> Option<&CollectionResult<R>> {
        match self {
            FetchState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            FetchState::Failure(info) => Some(info),
            _ => None,
        }
    }
}

/// A fetch the caller must run, tagged with its parameter snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub params: QueryParameters,
}

/// What happened to a resolved fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer fetch was issued after this one; the outcome was dropped
    Superseded,
}

#[derive(Debug, Clone)]
struct CachedPage<R> {
    ticket: u64,
    result: CollectionResult<R>,
}

pub struct CollectionFetcher<R> {
    state: FetchState<R>,
    current: Option<QueryParameters>,
    latest_ticket: u64,
    /// Tickets up to this id were issued before the last invalidation.
    invalidated_through: u64,
    refreshing: bool,
    cache: HashMap<QueryParameters, CachedPage<R>>,
}

impl<R: Clone> Default for CollectionFetcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Clone> CollectionFetcher<R> {
    pub fn new() -> Self {
        Self {
            state: FetchState::Idle,
            current: None,
            latest_ticket: 0,
            invalidated_through: 0,
            refreshing: false,
            cache: HashMap::new(),
        }
    }

    pub fn state(&self) -> &FetchState<R> {
        &self.state
    }

    pub fn current_params(&self) -> Option<&QueryParameters> {
        self.current.as_ref()
    }

    /// True while a cached result is shown and its network refresh is pending.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Whether `params` differ from the parameters last fetched.
    pub fn needs_fetch(&self, params: &QueryParameters) -> bool {
        self.current.as_ref() != Some(params)
    }

    /// Total of the currently shown result, if any.
    pub fn known_total(&self) -> Option<u64> {
        self.state.result().map(|r| r.total_count)
    }

    /// Issue a fetch for `params`, superseding every earlier one.
    ///
    /// A cached result for equal parameters is shown at once while the
    /// returned ticket refreshes it; otherwise the state becomes `Loading`.
    pub fn begin(&mut self, params: QueryParameters) -> FetchTicket {
        self.latest_ticket += 1;
        let ticket = FetchTicket {
            id: self.latest_ticket,
            params: params.clone(),
        };

        match self.cache.get(&params) {
            Some(cached) => {
                trace!(ticket = ticket.id, "serving cached page while refreshing");
                self.state = FetchState::Success(cached.result.clone());
                self.refreshing = true;
            }
            None => {
                self.state = FetchState::Loading;
                self.refreshing = false;
            }
        }
        self.current = Some(params);
        ticket
    }

    /// Apply or discard the outcome of `ticket`.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        outcome: std::result::Result<CollectionResult<R>, ErrorInfo>,
    ) -> Resolution {
        if let Ok(result) = &outcome {
            self.remember(ticket, result);
        }

        let is_latest = ticket.id == self.latest_ticket;
        if !is_latest || self.current.as_ref() != Some(&ticket.params) {
            debug!(
                ticket = ticket.id,
                latest = self.latest_ticket,
                "discarding superseded fetch result"
            );
            return Resolution::Superseded;
        }

        self.refreshing = false;
        self.state = match outcome {
            Ok(result) => FetchState::Success(result),
            Err(info) => FetchState::Failure(info),
        };
        Resolution::Applied
    }

    /// Drop every cached page, e.g. after a write. Fetches already in
    /// flight may carry pre-write data, so their results are no longer cached.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.invalidated_through = self.latest_ticket;
    }

    /// Successful results stay valid for their own parameters even when
    /// they arrive too late to be shown; keep the newest one per key.
    fn remember(&mut self, ticket: &FetchTicket, result: &CollectionResult<R>) {
        if ticket.id <= self.invalidated_through {
            trace!(ticket = ticket.id, "not caching result issued before invalidation");
            return;
        }
        let newer = self
            .cache
            .get(&ticket.params)
            .is_none_or(|cached| cached.ticket < ticket.id);
        if newer {
            self.cache.insert(
                ticket.params.clone(),
                CachedPage {
                    ticket: ticket.id,
                    result: result.clone(),
                },
            );
        }
    }
}
