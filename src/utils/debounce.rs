//! Trailing-edge debounce timer.
//!
//! Each [`Debouncer::schedule`] aborts the pending timer and starts a new one;
//! when a timer runs out it sends a [`Stabilized`] value on the channel given
//! at construction. Values carry the generation they were scheduled under, and
//! [`Debouncer::accept`] only lets the newest one through, so a timer that
//! fired just before being superseded is still ignored. Dropping the debouncer
//! aborts the pending timer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::trace;

/// A value whose quiet period has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stabilized<T> {
    pub generation: u64,
    pub value: T,
}

pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Stabilized<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<Stabilized<T>>) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
            tx,
        }
    }

    /// Restart the quiet period with `value` as the candidate.
    ///
    /// The deadline is taken now, not when the timer task first runs.
    pub fn schedule(&mut self, value: T) {
        self.abort_pending();
        self.generation += 1;

        let generation = self.generation;
        let deadline = Instant::now() + self.delay;
        let tx = self.tx.clone();
        trace!(generation, delay = ?self.delay, "debounce scheduled");

        self.pending = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            let _ = tx.send(Stabilized { generation, value });
        }));
    }

    /// Drop the pending value, if any, without firing it.
    pub fn cancel(&mut self) {
        if self.abort_pending() {
            self.generation += 1;
        }
    }

    /// Take a fired value if it is the newest scheduled one.
    ///
    /// Each generation is accepted at most once.
    pub fn accept(&mut self, stabilized: Stabilized<T>) -> Option<T> {
        if stabilized.generation != self.generation || self.pending.is_none() {
            trace!(
                generation = stabilized.generation,
                current = self.generation,
                "stale debounce ignored"
            );
            return None;
        }
        self.pending = None;
        Some(stabilized.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn abort_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
