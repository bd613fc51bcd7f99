//! Search term of a view: raw keystrokes in, stabilized keyword out.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::utils::debounce::{Debouncer, Stabilized};

/// Design default for the keystroke quiet period.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

pub struct SearchInput {
    raw: String,
    stabilized: String,
    debouncer: Debouncer<String>,
}

impl SearchInput {
    /// Starts empty on both sides, so the first fetch is unfiltered.
    pub fn new(quiet_period: Duration, tx: mpsc::UnboundedSender<Stabilized<String>>) -> Self {
        Self {
            raw: String::new(),
            stabilized: String::new(),
            debouncer: Debouncer::new(quiet_period, tx),
        }
    }

    /// Mount with a keyword already typed and stabilized.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.raw = keyword.into();
        self.stabilized = self.raw.clone();
        self
    }

    /// Echo the keystroke immediately and restart the quiet period.
    pub fn on_keystroke(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
        self.debouncer.schedule(self.raw.clone());
    }

    /// Apply a fired stabilization.
    ///
    /// Returns the new stabilized keyword, or `None` if the value was
    /// superseded by a later keystroke. Callers reset pagination whenever
    /// this returns `Some`, even if the keyword text is unchanged.
    pub fn on_stabilized(&mut self, fired: Stabilized<String>) -> Option<&str> {
        let value = self.debouncer.accept(fired)?;
        self.stabilized = value;
        Some(&self.stabilized)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn stabilized(&self) -> &str {
        &self.stabilized
    }

    pub fn is_settling(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Forget a pending stabilization (view teardown).
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_raw_echoes_before_stabilization() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut input = SearchInput::new(DEFAULT_QUIET_PERIOD, tx);
        assert_eq!(input.stabilized(), "");

        input.on_keystroke("ac");
        assert_eq!(input.raw(), "ac");
        assert_eq!(input.stabilized(), "");
        assert!(input.is_settling());

        let fired = rx.recv().await.unwrap();
        assert_eq!(input.on_stabilized(fired), Some("ac"));
        assert_eq!(input.stabilized(), "ac");
        assert!(!input.is_settling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_publishes_last_value_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut input = SearchInput::new(DEFAULT_QUIET_PERIOD, tx);

        for raw in ["a", "ac", "acm", "acme", "acm"] {
            input.on_keystroke(raw);
            tokio::time::advance(Duration::from_millis(100)).await;
        }

        let fired = rx.recv().await.unwrap();
        assert_eq!(input.on_stabilized(fired), Some("acm"));

        tokio::time::advance(DEFAULT_QUIET_PERIOD * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_seeded_keyword_is_already_stable() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let input = SearchInput::new(DEFAULT_QUIET_PERIOD, tx).with_keyword("acme");
        assert_eq!(input.raw(), "acme");
        assert_eq!(input.stabilized(), "acme");
        assert!(!input.is_settling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_previous_keyword() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut input = SearchInput::new(DEFAULT_QUIET_PERIOD, tx);

        input.on_keystroke("globex");
        input.cancel();
        tokio::time::advance(DEFAULT_QUIET_PERIOD * 2).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(input.stabilized(), "");
        assert_eq!(input.raw(), "globex");
    }
}
