use serde::Serialize;

use super::cursor::PaginationCursor;

/// The complete input of one collection fetch.
///
/// Value equality over all three fields decides whether a new fetch is
/// needed, and tags responses for last-request-wins application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryParameters {
    pub limit: u32,
    pub offset: u64,
    pub keyword: String,
}

impl QueryParameters {
    pub fn new(limit: u32, offset: u64, keyword: impl Into<String>) -> Self {
        Self {
            limit,
            offset,
            keyword: keyword.into(),
        }
    }

    /// Keyword to send to the remote; an empty keyword means "unfiltered".
    pub fn keyword_filter(&self) -> Option<&str> {
        if self.keyword.is_empty() {
            None
        } else {
            Some(&self.keyword)
        }
    }
}

/// Merge the stabilized keyword and the cursor into fetch parameters.
pub fn compose(stabilized_keyword: &str, cursor: &PaginationCursor) -> QueryParameters {
    QueryParameters {
        limit: cursor.limit(),
        offset: cursor.offset(),
        keyword: stabilized_keyword.to_string(),
    }
}
