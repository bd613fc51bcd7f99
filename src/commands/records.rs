//! One-shot commands that drive a collection view to completion.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use super::{CommandOutput, Context};
use crate::collection::{CollectionSource, RecordId};
use crate::display::{Tabular, render_detail, render_snapshot};
use crate::error::{AtriumError, Result};
use crate::view::{CollectionView, FetchState, MutationKind, MutationState, ViewSnapshot};

/// A write to submit through a view.
pub enum Write<D> {
    Create(D),
    Update(RecordId, D),
    Delete { id: RecordId, label: String },
}

impl<D> Write<D> {
    fn kind(&self) -> MutationKind {
        match self {
            Write::Create(_) => MutationKind::Create,
            Write::Update(..) => MutationKind::Update,
            Write::Delete { .. } => MutationKind::Delete,
        }
    }
}

/// Page summary used by `list --json`.
pub fn page_json<R: Serialize>(snapshot: &ViewSnapshot<R>) -> Value {
    json!({
        "keyword": snapshot.keyword,
        "page": snapshot.page,
        "page_size": snapshot.page_size,
        "total_count": snapshot.total_count(),
        "total_pages": snapshot.total_pages(),
        "items": snapshot.result().map(|r| &r.items),
    })
}

/// Mount a view on one page, wait for it to settle and print it.
pub async fn list<S>(ctx: &Context, source: Arc<S>, keyword: Option<String>, page: u32) -> Result<()>
where
    S: CollectionSource,
    S::Record: Tabular + Serialize,
{
    let options = ctx
        .view_options()?
        .with_keyword(keyword.unwrap_or_default())
        .with_page(page);
    let view = CollectionView::spawn(source, ctx.notifier(), ctx.guard(), options);
    let snapshot = view.settled().await;
    view.shutdown().await;
    let snapshot = snapshot?;

    if let FetchState::Failure(info) = &snapshot.fetch {
        return Err(AtriumError::Reported(info.clone()));
    }

    CommandOutput::new(page_json(&snapshot))
        .with_text(render_snapshot(&snapshot))
        .print(ctx.global.json)
}

/// Submit one write through a view and report how it ended.
pub async fn write<S>(ctx: &Context, source: Arc<S>, op: Write<S::Draft>) -> Result<()>
where
    S: CollectionSource,
    S::Record: Tabular + Serialize,
{
    let kind = op.kind();
    let view = CollectionView::spawn(source, ctx.notifier(), ctx.guard(), ctx.view_options()?);
    let submitted = match op {
        Write::Create(draft) => view.create(draft),
        Write::Update(id, draft) => view.update(id, draft),
        Write::Delete { id, label } => view.delete(id, label),
    };
    let snapshot = match submitted {
        Ok(()) => view.settled().await,
        Err(e) => Err(e),
    };
    view.shutdown().await;
    let snapshot = snapshot?;

    match snapshot.mutation(kind) {
        MutationState::Failure(info) => Err(AtriumError::Reported(info.clone())),
        MutationState::Success => {
            let record = snapshot.last_written.as_ref();
            let mut output = CommandOutput::new(json!({
                "action": kind.to_string(),
                "success": true,
                "record": record,
            }));
            if kind != MutationKind::Delete
                && let Some(record) = record
            {
                output = output.with_text(render_detail(record));
            }
            output.print(ctx.global.json)
        }
        MutationState::Idle | MutationState::InFlight => CommandOutput::new(json!({
            "action": kind.to_string(),
            "success": false,
            "cancelled": true,
        }))
        .with_text("Cancelled.")
        .print(ctx.global.json),
    }
}
