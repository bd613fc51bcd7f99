#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::Semaphore;

use atrium::collection::{CollectionResult, CollectionSource, EntityNames, Record, RecordId};
use atrium::error::{AtriumError, Result};
use atrium::notify::{Level, Notification, Notifier};
use atrium::session::{AuthorizationGuard, SessionHandle};
use atrium::view::{CollectionView, QueryParameters, ViewHandle, ViewOptions};

// ============================================================================
// Scripted collection source
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub id: RecordId,
    pub name: String,
}

impl Record for Widget {
    const NAMES: EntityNames = EntityNames {
        singular: "widget",
        plural: "widgets",
    };

    fn id(&self) -> RecordId {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// Failures the scripted source can be told to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fail {
    Forbidden,
    Unauthorized,
    Network,
    NotFound,
    Conflict,
}

impl Fail {
    fn error(self) -> AtriumError {
        match self {
            Fail::Forbidden => AtriumError::Forbidden("Access denied".to_string()),
            Fail::Unauthorized => AtriumError::Unauthorized(401),
            Fail::Network => AtriumError::Network("connection refused".to_string()),
            Fail::NotFound => AtriumError::NotFound("widget".to_string()),
            Fail::Conflict => AtriumError::Conflict("name already taken".to_string()),
        }
    }
}

struct Held {
    gate: Arc<Semaphore>,
    fail: Option<Fail>,
}

/// In-memory widgets with controllable timing and failures.
///
/// Fetches for parameters passed to [`ScriptedSource::hold`] block until
/// [`ScriptedSource::release`] is called, which lets tests resolve responses
/// out of order.
#[derive(Default)]
pub struct ScriptedSource {
    widgets: Mutex<Vec<Widget>>,
    next_id: Mutex<i32>,
    fetches: Mutex<Vec<QueryParameters>>,
    completed: Mutex<usize>,
    writes: Mutex<usize>,
    held: Mutex<HashMap<QueryParameters, Held>>,
    write_gate: Mutex<Option<Arc<Semaphore>>>,
    fetch_failures: Mutex<VecDeque<Fail>>,
    write_failures: Mutex<VecDeque<Fail>>,
}

impl ScriptedSource {
    /// `count` widgets named `widget-1` to `widget-<count>`.
    pub fn with_widgets(count: i32) -> Arc<Self> {
        Self::with_names((1..=count).map(|i| format!("widget-{i}")))
    }

    pub fn with_names(names: impl IntoIterator<Item = impl Into<String>>) -> Arc<Self> {
        let widgets: Vec<Widget> = names
            .into_iter()
            .zip(1..)
            .map(|(name, id)| Widget {
                id: RecordId(id),
                name: name.into(),
            })
            .collect();
        let next_id = widgets.len() as i32 + 1;
        Arc::new(Self {
            widgets: Mutex::new(widgets),
            next_id: Mutex::new(next_id),
            ..Default::default()
        })
    }

    /// Block fetches of `params` until released.
    pub fn hold(&self, params: QueryParameters) {
        self.held.lock().insert(
            params,
            Held {
                gate: Arc::new(Semaphore::new(0)),
                fail: None,
            },
        );
    }

    /// Block fetches of `params`, then fail them once released.
    pub fn hold_and_fail(&self, params: QueryParameters, fail: Fail) {
        self.held.lock().insert(
            params,
            Held {
                gate: Arc::new(Semaphore::new(0)),
                fail: Some(fail),
            },
        );
    }

    pub fn release(&self, params: &QueryParameters) {
        if let Some(held) = self.held.lock().remove(params) {
            held.gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// Block every write until [`ScriptedSource::release_writes`].
    pub fn hold_writes(&self) {
        *self.write_gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_writes(&self) {
        if let Some(gate) = self.write_gate.lock().take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn fail_next_fetch(&self, fail: Fail) {
        self.fetch_failures.lock().push_back(fail);
    }

    pub fn fail_next_write(&self, fail: Fail) {
        self.write_failures.lock().push_back(fail);
    }

    /// Every fetch started so far, in order.
    pub fn fetch_log(&self) -> Vec<QueryParameters> {
        self.fetches.lock().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().len()
    }

    pub fn completed_fetches(&self) -> usize {
        *self.completed.lock()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }

    pub fn len(&self) -> usize {
        self.widgets.lock().len()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.widgets.lock().iter().any(|w| w.id == id)
    }

    fn page(&self, params: &QueryParameters) -> CollectionResult<Widget> {
        let keyword = params.keyword.to_lowercase();
        let matching: Vec<Widget> = self
            .widgets
            .lock()
            .iter()
            .filter(|w| w.name.to_lowercase().contains(&keyword))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(params.offset as usize)
            .take(params.limit as usize)
            .collect();
        CollectionResult::new(items, total)
    }

    async fn begin_write(&self) -> Result<()> {
        let gate = self.write_gate.lock().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
        *self.writes.lock() += 1;
        match self.write_failures.lock().pop_front() {
            Some(fail) => Err(fail.error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CollectionSource for ScriptedSource {
    type Record = Widget;
    type Draft = String;

    async fn fetch(&self, params: &QueryParameters) -> Result<CollectionResult<Widget>> {
        self.fetches.lock().push(params.clone());

        let held = self
            .held
            .lock()
            .get(params)
            .map(|h| (Arc::clone(&h.gate), h.fail));
        let mut fail = None;
        if let Some((gate, held_fail)) = held {
            let _permit = gate.acquire().await;
            fail = held_fail;
        }
        if fail.is_none() {
            fail = self.fetch_failures.lock().pop_front();
        }

        *self.completed.lock() += 1;
        match fail {
            Some(fail) => Err(fail.error()),
            None => Ok(self.page(params)),
        }
    }

    async fn create(&self, name: String) -> Result<Widget> {
        if name.trim().is_empty() {
            return Err(AtriumError::Validation("Name is required.".to_string()));
        }
        self.begin_write().await?;
        let mut next_id = self.next_id.lock();
        let widget = Widget {
            id: RecordId(*next_id),
            name,
        };
        *next_id += 1;
        self.widgets.lock().push(widget.clone());
        Ok(widget)
    }

    async fn update(&self, id: RecordId, name: String) -> Result<Widget> {
        self.begin_write().await?;
        let mut widgets = self.widgets.lock();
        let widget = widgets
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| Fail::NotFound.error())?;
        widget.name = name;
        Ok(widget.clone())
    }

    async fn delete(&self, id: RecordId) -> Result<Widget> {
        self.begin_write().await?;
        let mut widgets = self.widgets.lock();
        let index = widgets
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| Fail::NotFound.error())?;
        Ok(widgets.remove(index))
    }
}

// ============================================================================
// Recording notifier
// ============================================================================

/// Records every notification and prompt; answers prompts with a fixed value.
pub struct RecordingNotifier {
    answer: bool,
    notifications: Mutex<Vec<Notification>>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            notifications: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn errors(&self) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == Level::Error)
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}

// ============================================================================
// View harness
// ============================================================================

pub struct Harness {
    pub source: Arc<ScriptedSource>,
    pub notifier: Arc<RecordingNotifier>,
    pub session: SessionHandle,
    pub guard: AuthorizationGuard,
    pub view: ViewHandle<ScriptedSource>,
}

/// Spawn a view over `source` with a logged-in in-memory session.
pub fn spawn_view(source: Arc<ScriptedSource>, options: ViewOptions, answer: bool) -> Harness {
    let session = SessionHandle::in_memory();
    session
        .login("test-token".to_string(), serde_json::json!({"email": "ops@example.com"}))
        .expect("in-memory login");
    let guard = AuthorizationGuard::new(session.clone());
    let notifier = RecordingNotifier::answering(answer);
    let view = CollectionView::spawn(
        Arc::clone(&source),
        notifier.clone(),
        guard.clone(),
        options,
    );
    Harness {
        source,
        notifier,
        session,
        guard,
        view,
    }
}

/// Let every spawned task run until the runtime is idle (paused clock).
pub async fn drain() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// ============================================================================
// Binary harness
// ============================================================================

pub fn atrium_binary() -> &'static str {
    env!("CARGO_BIN_EXE_atrium")
}

/// Runs the binary with config and data directories inside a temp dir.
pub struct AtriumTest {
    pub temp_dir: TempDir,
}

impl AtriumTest {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let home = self.temp_dir.path().join("home");
        Command::new(atrium_binary())
            .args(args)
            .env("ATRIUM_CONFIG", self.config_path())
            .env_remove("ATRIUM_API_URL")
            .env_remove("ATRIUM_LOG")
            .env("HOME", &home)
            .env("XDG_DATA_HOME", home.join(".local/share"))
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute atrium command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run a command expected to fail; returns stderr.
    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Command {:?} should have failed\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut args = args.to_vec();
        args.push("--json");
        let stdout = self.run_success(&args);
        serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
    }
}
