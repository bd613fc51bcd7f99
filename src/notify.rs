//! User-facing notifications and confirmation prompts.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use owo_colors::OwoColorize;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: Option<String>,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            title: None,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Where the user sees notifications and answers prompts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Fire and forget.
    fn notify(&self, notification: Notification);

    /// Ask a yes/no question; `false` unless the user explicitly agrees.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// A confirmation waiting for the next line of input.
pub type PendingConfirm = oneshot::Sender<bool>;

enum Answers {
    /// Every prompt is accepted without asking (`--yes`)
    AutoYes,
    /// Read the answer from stdin
    Stdin,
    /// Hand the prompt to whoever owns the input stream
    Routed(mpsc::UnboundedSender<PendingConfirm>),
}

/// Prints notifications to stderr and reads answers from the terminal.
pub struct TerminalNotifier {
    answers: Answers,
}

impl TerminalNotifier {
    pub fn new(assume_yes: bool) -> Self {
        let answers = if assume_yes {
            Answers::AutoYes
        } else {
            Answers::Stdin
        };
        Self { answers }
    }

    /// A notifier whose prompts are answered by the caller's input loop.
    ///
    /// Each prompt arrives on the returned receiver as a [`PendingConfirm`];
    /// the loop answers it with the next line it reads.
    pub fn routed() -> (Self, mpsc::UnboundedReceiver<PendingConfirm>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                answers: Answers::Routed(tx),
            },
            rx,
        )
    }

    fn render(notification: &Notification) -> String {
        let body = match &notification.title {
            Some(title) => format!("{} {}", title.bold(), notification.message),
            None => notification.message.clone(),
        };
        match notification.level {
            Level::Success => format!("{} {}", "✓".green(), body),
            Level::Info => format!("{} {}", "i".cyan(), body),
            Level::Warning => format!("{} {}", "!".yellow(), body.yellow()),
            Level::Error => format!("{} {}", "✗".red(), body.red()),
        }
    }
}

/// Whether an answer line means yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", Self::render(&notification));
    }

    async fn confirm(&self, prompt: &str) -> bool {
        match &self.answers {
            Answers::AutoYes => true,
            Answers::Stdin => {
                let prompt = prompt.to_string();
                let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
                    eprint!("{} [y/N] ", prompt);
                    io::stderr().flush()?;
                    let mut input = String::new();
                    io::stdin().lock().read_line(&mut input)?;
                    Ok(input)
                })
                .await;
                match answer {
                    Ok(Ok(input)) => is_yes(&input),
                    Ok(Err(e)) => {
                        warn!("failed to read confirmation: {}", e);
                        false
                    }
                    Err(e) => {
                        warn!("confirmation prompt panicked: {}", e);
                        false
                    }
                }
            }
            Answers::Routed(tx) => {
                eprint!("{} [y/N] ", prompt);
                let (answer_tx, answer_rx) = oneshot::channel();
                if tx.send(answer_tx).is_err() {
                    return false;
                }
                answer_rx.await.unwrap_or(false)
            }
        }
    }
}
