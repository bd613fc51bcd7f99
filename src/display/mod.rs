//! Terminal rendering of records and pages.

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::collection::Record;
use crate::view::{FetchState, ViewSnapshot};

/// Shown in place of an absent or empty value.
pub const MISSING: &str = "—";

/// One table column: a header and an accessor into the record.
pub struct Column<R> {
    pub header: &'static str,
    accessor: fn(&R) -> Option<String>,
}

impl<R> Column<R> {
    pub const fn new(header: &'static str, accessor: fn(&R) -> Option<String>) -> Self {
        Self { header, accessor }
    }

    pub fn value(&self, record: &R) -> Option<String> {
        (self.accessor)(record).filter(|v| !v.trim().is_empty())
    }

    pub fn render(&self, record: &R) -> String {
        self.value(record).unwrap_or_else(|| MISSING.to_string())
    }
}

/// A record type with a list layout and a detail layout.
pub trait Tabular: Record {
    fn columns() -> Vec<Column<Self>>;

    /// Rows for the single-record view; defaults to the list columns.
    fn details() -> Vec<Column<Self>> {
        Self::columns()
    }
}

pub fn render_table<R: Tabular>(items: &[R]) -> String {
    let columns = R::columns();
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.header.to_string()));
    for item in items {
        builder.push_record(columns.iter().map(|c| c.render(item)));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Two-column field/value table for one record.
pub fn render_detail<R: Tabular>(record: &R) -> String {
    let mut builder = Builder::default();
    for column in R::details() {
        builder.push_record([column.header.to_string(), column.render(record)]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// "Showing X to Y of Z results"
pub fn pagination_footer(first: u64, last: u64, total: u64) -> String {
    format!("Showing {first} to {last} of {total} results")
}

/// Render a whole view: status line, rows and footer.
pub fn render_snapshot<R: Tabular>(snapshot: &ViewSnapshot<R>) -> String {
    let plural = R::NAMES.plural;
    let mut out = Vec::new();

    if snapshot.raw_keyword != snapshot.keyword {
        out.push(format!("{} {}", "search:".dimmed(), snapshot.raw_keyword));
    } else if !snapshot.keyword.is_empty() {
        out.push(format!("{} {}", "search:".dimmed(), snapshot.keyword.cyan()));
    }

    match &snapshot.fetch {
        FetchState::Idle => {}
        FetchState::Loading => out.push("Loading...".dimmed().to_string()),
        FetchState::Failure(info) => out.push(
            format!("Error fetching {plural}: {}", info.message)
                .red()
                .to_string(),
        ),
        FetchState::Success(result) if result.items.is_empty() => {
            out.push(format!("No {plural} found."));
            if result.total_count > 0 {
                out.push(format!(
                    "Page {} is past the end ({} pages).",
                    snapshot.page,
                    snapshot.total_pages().unwrap_or(0)
                ));
            }
        }
        FetchState::Success(result) => {
            out.push(render_table(&result.items));
            let mut footer = pagination_footer(
                snapshot.first_item_index(),
                snapshot.last_item_index(),
                result.total_count,
            );
            if snapshot.refreshing {
                footer.push_str(&format!(" {}", "(refreshing)".dimmed()));
            }
            out.push(footer);
        }
    }

    out.join("\n")
}
