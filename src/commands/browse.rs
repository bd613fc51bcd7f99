//! Line-driven interactive view.
//!
//! Every plain line replaces the search text, as if it had been typed into
//! the search box; lines starting with `:` are commands. Delete prompts are
//! answered by the next line read. The loop ends on `:q`, end of input, or
//! when the session is torn down.

use std::collections::VecDeque;
use std::sync::Arc;

use owo_colors::OwoColorize;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::{Backend, Context};
use crate::cli::EntityKind;
use crate::collection::{CollectionSource, Record, RecordId};
use crate::display::{Tabular, render_snapshot};
use crate::error::{AtriumError, Result};
use crate::notify::{PendingConfirm, TerminalNotifier, is_yes};
use crate::remote::{CompanySource, CustomerSource};
use crate::session::AuthState;
use crate::view::{CollectionView, FetchState, ViewSnapshot};

const HELP: &str = "Type to search. :n next page, :p previous page, :g <page> go to page, \
                    :r refetch, :d <id> delete, :h help, :q quit";

/// One line of browse input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseInput {
    Search(String),
    NextPage,
    PreviousPage,
    GoToPage(u32),
    Refetch,
    Delete(RecordId),
    Help,
    Quit,
    Invalid(String),
}

impl BrowseInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(command) = line.strip_prefix(':') else {
            return BrowseInput::Search(line.to_string());
        };
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match (name, arg) {
            ("n" | "next", None) => BrowseInput::NextPage,
            ("p" | "prev", None) => BrowseInput::PreviousPage,
            ("r" | "refetch", None) => BrowseInput::Refetch,
            ("h" | "help", None) => BrowseInput::Help,
            ("q" | "quit", None) => BrowseInput::Quit,
            ("g" | "page", Some(page)) => match page.parse::<u32>() {
                Ok(page) if page > 0 => BrowseInput::GoToPage(page),
                _ => BrowseInput::Invalid(format!("invalid page '{page}'")),
            },
            ("d" | "delete", Some(id)) => match id.parse::<RecordId>() {
                Ok(id) => BrowseInput::Delete(id),
                Err(e) => BrowseInput::Invalid(e.to_string()),
            },
            _ => BrowseInput::Invalid(format!("unknown command ':{command}'")),
        }
    }
}

pub async fn cmd_browse(ctx: &Context, entity: EntityKind, keyword: Option<String>) -> Result<()> {
    if ctx.global.json {
        return Err(AtriumError::Config(
            "browse is interactive and has no JSON output".to_string(),
        ));
    }
    match (entity, ctx.backend()?) {
        (EntityKind::Customers, Backend::Remote(client)) => {
            browse(ctx, Arc::new(CustomerSource::new(Arc::clone(client))), keyword).await
        }
        (EntityKind::Customers, Backend::Offline(data)) => {
            browse(ctx, Arc::clone(&data.customers), keyword).await
        }
        (EntityKind::Companies, Backend::Remote(client)) => {
            browse(ctx, Arc::new(CompanySource::new(Arc::clone(client))), keyword).await
        }
        (EntityKind::Companies, Backend::Offline(data)) => {
            browse(ctx, Arc::clone(&data.companies), keyword).await
        }
    }
}

/// Label for a delete prompt: the record's own label when it is on screen.
fn delete_label<R: Record>(snapshot: &ViewSnapshot<R>, id: RecordId) -> String {
    snapshot
        .result()
        .and_then(|r| r.items.iter().find(|item| item.id() == id))
        .map(Record::label)
        .unwrap_or_else(|| format!("{} #{id}", R::NAMES.singular))
}

async fn browse<S>(ctx: &Context, source: Arc<S>, keyword: Option<String>) -> Result<()>
where
    S: CollectionSource,
    S::Record: Tabular + Serialize,
{
    let (notifier, mut prompts) = TerminalNotifier::routed();
    let options = ctx
        .view_options()?
        .with_keyword(keyword.unwrap_or_default());
    let view = CollectionView::spawn(source, Arc::new(notifier), ctx.guard(), options);
    let mut snapshots = view.subscribe();
    let mut auth = ctx.session().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut waiting: VecDeque<PendingConfirm> = VecDeque::new();
    let mut last_rendered = String::new();

    eprintln!("{}", HELP.dimmed());

    let outcome: Result<()> = loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Err(AtriumError::ViewClosed);
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let ready = snapshot.is_settled() || matches!(snapshot.fetch, FetchState::Failure(_));
                if ready {
                    let rendered = render_snapshot(&snapshot);
                    if rendered != last_rendered {
                        println!("{rendered}");
                        last_rendered = rendered;
                    }
                }
            }
            Some(prompt) = prompts.recv() => waiting.push_back(prompt),
            changed = auth.changed() => {
                if changed.is_err() || *auth.borrow_and_update() == AuthState::LoggedOut {
                    eprintln!("{}", "Session ended. Run `atrium login` to continue.".yellow());
                    break Err(AtriumError::NotLoggedIn);
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e.into()),
                };
                if let Some(prompt) = waiting.pop_front() {
                    let _ = prompt.send(is_yes(&line));
                    continue;
                }
                let sent = match BrowseInput::parse(&line) {
                    BrowseInput::Search(text) => view.keystroke(text),
                    BrowseInput::NextPage => view.next_page(),
                    BrowseInput::PreviousPage => view.previous_page(),
                    BrowseInput::GoToPage(page) => view.go_to_page(page),
                    BrowseInput::Refetch => view.refetch(),
                    BrowseInput::Delete(id) => view.delete(id, delete_label(&view.snapshot(), id)),
                    BrowseInput::Help => {
                        eprintln!("{}", HELP.dimmed());
                        Ok(())
                    }
                    BrowseInput::Quit => break Ok(()),
                    BrowseInput::Invalid(message) => {
                        eprintln!("{}", message.red());
                        Ok(())
                    }
                };
                if let Err(e) = sent {
                    break Err(e);
                }
            }
        }
    };

    debug!("browse finished");
    for prompt in waiting {
        let _ = prompt.send(false);
    }
    view.shutdown().await;
    outcome
}
