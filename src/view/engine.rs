//! The searchable paginated collection view.
//!
//! A view is one tokio task that owns the search input, cursor, fetcher and
//! mutation coordinator. Callers drive it through a [`ViewHandle`] and watch
//! its [`ViewSnapshot`]s. Fetches, writes, delete confirmations and debounce
//! timers run as their own tasks and report back through channels, so all
//! state changes happen on the view's task in the order they are received.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use crate::collection::{CollectionResult, CollectionSource, Record, RecordId};
use crate::error::{AtriumError, ErrorInfo, Result};
use crate::notify::{Notification, Notifier};
use crate::session::AuthorizationGuard;
use crate::utils::debounce::Stabilized;

use super::cursor::PaginationCursor;
use super::fetcher::{CollectionFetcher, FetchState, FetchTicket, Resolution};
use super::mutation::{MutationCoordinator, MutationKind, MutationState, PageClampPolicy};
use super::query::compose;
use super::search::{DEFAULT_QUIET_PERIOD, SearchInput};

const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(size) => size,
    None => unreachable!(),
};

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub page_size: NonZeroU32,
    pub quiet_period: Duration,
    pub clamp_policy: PageClampPolicy,
    /// Keyword the view mounts with, already stabilized
    pub initial_keyword: String,
    pub initial_page: u32,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            quiet_period: DEFAULT_QUIET_PERIOD,
            clamp_policy: PageClampPolicy::default(),
            initial_keyword: String::new(),
            initial_page: 1,
        }
    }
}

impl ViewOptions {
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.initial_keyword = keyword.into();
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.initial_page = page;
        self
    }
}

/// Everything a renderer needs to draw a view at one point in time.
#[derive(Debug, Clone)]
pub struct ViewSnapshot<R> {
    pub raw_keyword: String,
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
    pub fetch: FetchState<R>,
    /// A cached page is shown while its refresh is in flight
    pub refreshing: bool,
    /// A keystroke is waiting out its quiet period
    pub settling: bool,
    pub create: MutationState,
    pub update: MutationState,
    pub delete: MutationState,
    /// Record returned by the most recent successful write
    pub last_written: Option<R>,
    pub pending_confirmations: usize,
    pub pending_writes: usize,
    /// Sequence number of the last command the view has handled
    pub acknowledged: u64,
}

impl<R> ViewSnapshot<R> {
    fn cursor(&self) -> Option<PaginationCursor> {
        NonZeroU32::new(self.page_size).map(|size| {
            let mut cursor = PaginationCursor::new(size);
            cursor.set_page(self.page);
            cursor
        })
    }

    pub fn result(&self) -> Option<&CollectionResult<R>> {
        self.fetch.result()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.result().map(|r| r.total_count)
    }

    pub fn total_pages(&self) -> Option<u32> {
        let total = self.total_count()?;
        self.cursor().map(|c| c.total_pages(total))
    }

    pub fn first_item_index(&self) -> u64 {
        self.cursor().map(|c| c.first_item_index()).unwrap_or(1)
    }

    pub fn last_item_index(&self) -> u64 {
        match (self.cursor(), self.total_count()) {
            (Some(cursor), Some(total)) => cursor.last_item_index(total),
            _ => 0,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.cursor()
            .is_some_and(|c| c.has_next(self.total_count()))
    }

    pub fn mutation(&self, kind: MutationKind) -> &MutationState {
        match kind {
            MutationKind::Create => &self.create,
            MutationKind::Update => &self.update,
            MutationKind::Delete => &self.delete,
        }
    }

    /// Nothing is pending: no quiet period, fetch, refresh, prompt or write.
    pub fn is_settled(&self) -> bool {
        !matches!(self.fetch, FetchState::Idle | FetchState::Loading)
            && !self.refreshing
            && !self.settling
            && self.pending_confirmations == 0
            && self.pending_writes == 0
    }
}

enum ViewCommand<D> {
    Keystroke(String),
    PreviousPage,
    NextPage,
    GoToPage(u32),
    Refetch,
    Create(D),
    Update(RecordId, D),
    Delete { id: RecordId, label: String },
    Shutdown,
}

enum ViewEvent<R> {
    Fetched {
        ticket: FetchTicket,
        outcome: std::result::Result<CollectionResult<R>, ErrorInfo>,
    },
    Written {
        kind: MutationKind,
        outcome: std::result::Result<R, ErrorInfo>,
    },
    DeleteConfirmed {
        id: RecordId,
        confirmed: bool,
    },
}

/// Handle to a running view. Dropping it shuts the view down.
pub struct ViewHandle<S: CollectionSource> {
    commands: mpsc::UnboundedSender<(u64, ViewCommand<S::Draft>)>,
    snapshots: watch::Receiver<ViewSnapshot<S::Record>>,
    sent: AtomicU64,
    task: JoinHandle<()>,
}

impl<S: CollectionSource> ViewHandle<S> {
    fn send(&self, command: ViewCommand<S::Draft>) -> Result<()> {
        let seq = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        self.commands
            .send((seq, command))
            .map_err(|_| AtriumError::ViewClosed)
    }

    /// Replace the raw search text, as if typed.
    pub fn keystroke(&self, raw: impl Into<String>) -> Result<()> {
        self.send(ViewCommand::Keystroke(raw.into()))
    }

    pub fn previous_page(&self) -> Result<()> {
        self.send(ViewCommand::PreviousPage)
    }

    pub fn next_page(&self) -> Result<()> {
        self.send(ViewCommand::NextPage)
    }

    pub fn go_to_page(&self, page: u32) -> Result<()> {
        self.send(ViewCommand::GoToPage(page))
    }

    pub fn refetch(&self) -> Result<()> {
        self.send(ViewCommand::Refetch)
    }

    pub fn create(&self, draft: S::Draft) -> Result<()> {
        self.send(ViewCommand::Create(draft))
    }

    pub fn update(&self, id: RecordId, draft: S::Draft) -> Result<()> {
        self.send(ViewCommand::Update(id, draft))
    }

    /// Ask for confirmation, then delete `id` if the user agrees.
    pub fn delete(&self, id: RecordId, label: impl Into<String>) -> Result<()> {
        self.send(ViewCommand::Delete {
            id,
            label: label.into(),
        })
    }

    pub fn snapshot(&self) -> ViewSnapshot<S::Record> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot<S::Record>> {
        self.snapshots.clone()
    }

    /// Wait until every command sent so far is handled and nothing is pending.
    pub async fn settled(&self) -> Result<ViewSnapshot<S::Record>> {
        let sent = self.sent.load(Ordering::SeqCst);
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.acknowledged >= sent && s.is_settled())
            .await
            .map_err(|_| AtriumError::ViewClosed)?;
        Ok(snapshot.clone())
    }

    /// Stop the view and wait for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send((0, ViewCommand::Shutdown));
        if let Err(e) = self.task.await {
            warn!("view task ended abnormally: {}", e);
        }
    }
}

/// Spawns views. Must be called from within a tokio runtime.
pub struct CollectionView;

impl CollectionView {
    pub fn spawn<S: CollectionSource>(
        source: Arc<S>,
        notifier: Arc<dyn Notifier>,
        guard: AuthorizationGuard,
        options: ViewOptions,
    ) -> ViewHandle<S> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (stabilized_tx, stabilized_rx) = mpsc::unbounded_channel();

        let mut cursor = PaginationCursor::new(options.page_size);
        cursor.set_page(options.initial_page);
        let search = SearchInput::new(options.quiet_period, stabilized_tx)
            .with_keyword(options.initial_keyword);

        let state = ViewState {
            source,
            notifier,
            guard,
            search,
            cursor,
            fetcher: CollectionFetcher::new(),
            mutations: MutationCoordinator::new(options.clamp_policy),
            last_total: None,
            last_written: None,
            pending_confirmations: 0,
            pending_writes: 0,
            acknowledged: 0,
            events: event_tx,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());

        let span = info_span!("view", entity = S::Record::NAMES.plural);
        let task = tokio::spawn(
            state
                .run(command_rx, event_rx, stabilized_rx, snapshot_tx)
                .instrument(span),
        );

        ViewHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            sent: AtomicU64::new(0),
            task,
        }
    }
}

struct ViewState<S: CollectionSource> {
    source: Arc<S>,
    notifier: Arc<dyn Notifier>,
    guard: AuthorizationGuard,
    search: SearchInput,
    cursor: PaginationCursor,
    fetcher: CollectionFetcher<S::Record>,
    mutations: MutationCoordinator,
    /// Total of the last applied page, kept across loading states
    last_total: Option<u64>,
    last_written: Option<S::Record>,
    pending_confirmations: usize,
    pending_writes: usize,
    acknowledged: u64,
    events: mpsc::UnboundedSender<ViewEvent<S::Record>>,
}

impl<S: CollectionSource> ViewState<S> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<(u64, ViewCommand<S::Draft>)>,
        mut events: mpsc::UnboundedReceiver<ViewEvent<S::Record>>,
        mut stabilized: mpsc::UnboundedReceiver<Stabilized<String>>,
        snapshots: watch::Sender<ViewSnapshot<S::Record>>,
    ) {
        debug!("view mounted");
        self.issue_fetch();
        snapshots.send_replace(self.snapshot());

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some((_, ViewCommand::Shutdown)) => break,
                    Some((seq, command)) => {
                        self.handle_command(command);
                        self.acknowledged = seq;
                    }
                },
                Some(fired) = stabilized.recv() => self.on_stabilized(fired),
                Some(event) = events.recv() => self.handle_event(event),
            }
            snapshots.send_replace(self.snapshot());
        }

        self.search.cancel();
        debug!("view unmounted");
    }

    fn snapshot(&self) -> ViewSnapshot<S::Record> {
        ViewSnapshot {
            raw_keyword: self.search.raw().to_string(),
            keyword: self.search.stabilized().to_string(),
            page: self.cursor.page(),
            page_size: self.cursor.page_size(),
            fetch: self.fetcher.state().clone(),
            refreshing: self.fetcher.is_refreshing(),
            settling: self.search.is_settling(),
            create: self.mutations.state(MutationKind::Create).clone(),
            update: self.mutations.state(MutationKind::Update).clone(),
            delete: self.mutations.state(MutationKind::Delete).clone(),
            last_written: self.last_written.clone(),
            pending_confirmations: self.pending_confirmations,
            pending_writes: self.pending_writes,
            acknowledged: self.acknowledged,
        }
    }

    fn handle_command(&mut self, command: ViewCommand<S::Draft>) {
        match command {
            ViewCommand::Keystroke(raw) => self.search.on_keystroke(raw),
            ViewCommand::PreviousPage => {
                if self.cursor.go_to_previous_page() {
                    self.fetch_if_changed();
                }
            }
            ViewCommand::NextPage => {
                if self.cursor.go_to_next_page(self.fetcher.known_total()) {
                    self.fetch_if_changed();
                }
            }
            ViewCommand::GoToPage(page) => {
                self.cursor.set_page(page);
                self.fetch_if_changed();
            }
            ViewCommand::Refetch => self.issue_fetch(),
            ViewCommand::Create(draft) => {
                let source = Arc::clone(&self.source);
                self.spawn_write(MutationKind::Create, async move { source.create(draft).await });
            }
            ViewCommand::Update(id, draft) => {
                let source = Arc::clone(&self.source);
                self.spawn_write(MutationKind::Update, async move {
                    source.update(id, draft).await
                });
            }
            ViewCommand::Delete { id, label } => self.confirm_delete(id, label),
            ViewCommand::Shutdown => {}
        }
    }

    fn handle_event(&mut self, event: ViewEvent<S::Record>) {
        match event {
            ViewEvent::Fetched { ticket, outcome } => self.on_fetched(ticket, outcome),
            ViewEvent::Written { kind, outcome } => self.on_written(kind, outcome),
            ViewEvent::DeleteConfirmed { id, confirmed } => {
                self.pending_confirmations = self.pending_confirmations.saturating_sub(1);
                if confirmed {
                    let source = Arc::clone(&self.source);
                    self.spawn_write(MutationKind::Delete, async move { source.delete(id).await });
                } else {
                    debug!(%id, "delete declined");
                }
            }
        }
    }

    fn on_stabilized(&mut self, fired: Stabilized<String>) {
        if let Some(keyword) = self.search.on_stabilized(fired) {
            debug!(keyword, "search stabilized");
            self.cursor.reset();
            self.fetch_if_changed();
        }
    }

    fn fetch_if_changed(&mut self) {
        let params = compose(self.search.stabilized(), &self.cursor);
        if self.fetcher.needs_fetch(&params) {
            self.issue_fetch();
        }
    }

    /// Fetch the current parameters, even if they were fetched before.
    fn issue_fetch(&mut self) {
        let params = compose(self.search.stabilized(), &self.cursor);
        let ticket = self.fetcher.begin(params);
        if let Some(total) = self.fetcher.known_total() {
            self.last_total = Some(total);
        }
        debug!(
            ticket = ticket.id,
            offset = ticket.params.offset,
            keyword = %ticket.params.keyword,
            "fetching"
        );

        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = source
                .fetch(&ticket.params)
                .await
                .map_err(|e| ErrorInfo::from(&e));
            let _ = events.send(ViewEvent::Fetched { ticket, outcome });
        });
    }

    fn on_fetched(
        &mut self,
        ticket: FetchTicket,
        outcome: std::result::Result<CollectionResult<S::Record>, ErrorInfo>,
    ) {
        let failure = outcome.as_ref().err().cloned();
        if self.fetcher.resolve(&ticket, outcome) == Resolution::Superseded {
            return;
        }

        if let Some(info) = failure {
            warn!(ticket = ticket.id, kind = %info.kind, "fetch failed: {}", info);
            let message = if info.is_authorization() {
                format!(
                    "You are not authorized to view {}.",
                    S::Record::NAMES.plural
                )
            } else {
                info.message.clone()
            };
            self.report_failure(&info, message);
            return;
        }

        let Some(total) = self.fetcher.known_total() else {
            return;
        };
        self.last_total = Some(total);
        if self.mutations.clamps_on_result() && self.cursor.clamp_to(total) {
            debug!(page = self.cursor.page(), total, "page past the end, clamping");
            self.fetch_if_changed();
        }
    }

    fn confirm_delete(&mut self, id: RecordId, label: String) {
        self.pending_confirmations += 1;
        let notifier = Arc::clone(&self.notifier);
        let events = self.events.clone();
        let prompt = format!("Are you sure to delete {label}?");
        tokio::spawn(async move {
            let confirmed = notifier.confirm(&prompt).await;
            let _ = events.send(ViewEvent::DeleteConfirmed { id, confirmed });
        });
    }

    fn spawn_write<F>(&mut self, kind: MutationKind, write: F)
    where
        F: Future<Output = Result<S::Record>> + Send + 'static,
    {
        debug!(%kind, "write started");
        self.mutations.begin(kind);
        self.pending_writes += 1;
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = write.await.map_err(|e| ErrorInfo::from(&e));
            let _ = events.send(ViewEvent::Written { kind, outcome });
        });
    }

    fn on_written(&mut self, kind: MutationKind, outcome: std::result::Result<S::Record, ErrorInfo>) {
        self.pending_writes = self.pending_writes.saturating_sub(1);
        match outcome {
            Ok(record) => {
                debug!(%kind, id = %record.id(), "write succeeded");
                self.mutations.resolve(kind, Ok(()));
                self.notifier
                    .notify(success_notification::<S::Record>(kind));

                // Only a row on the shown page shrinks the filtered total by
                // one; anything else waits for the refetched total.
                let shown = self
                    .fetcher
                    .state()
                    .result()
                    .is_some_and(|r| r.items.iter().any(|i| i.id() == record.id()));
                self.last_written = Some(record);

                let last_total = self.fetcher.known_total().or(self.last_total);
                if shown
                    && self
                        .mutations
                        .reconcile_cursor(kind, &mut self.cursor, last_total)
                {
                    debug!(page = self.cursor.page(), "clamped page after delete");
                }
                self.fetcher.invalidate();
                self.issue_fetch();
            }
            Err(info) => {
                warn!(%kind, error_kind = %info.kind, "write failed: {}", info);
                self.mutations.resolve(kind, Err(info.clone()));
                let message = info.message.clone();
                self.report_failure(&info, message);
            }
        }
    }

    /// One notification per failure, plus the guard for lost authorization.
    fn report_failure(&self, info: &ErrorInfo, message: String) {
        self.notifier.notify(Notification::error(message));
        if info.is_authorization() {
            self.guard.on_unauthorized();
        }
    }
}

fn success_notification<R: Record>(kind: MutationKind) -> Notification {
    let entity = R::NAMES.title();
    match kind {
        MutationKind::Create => Notification::success(format!("{entity} created successfully!")),
        MutationKind::Update => Notification::success(format!("{entity} updated successfully!")),
        MutationKind::Delete => {
            Notification::success("Record has been deleted.").with_title("Deleted!")
        }
    }
}
