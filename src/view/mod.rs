//! Searchable paginated collection views.
//!
//! Keystrokes are debounced into a stabilized keyword, composed with the
//! pagination cursor into [`QueryParameters`], and fetched under a
//! cache-and-network, last-request-wins policy. Writes go through the
//! mutation coordinator and refetch the current parameters on success.

pub mod cursor;
pub mod engine;
pub mod fetcher;
pub mod mutation;
pub mod query;
pub mod search;

pub use cursor::PaginationCursor;
pub use engine::{CollectionView, ViewHandle, ViewOptions, ViewSnapshot};
pub use fetcher::{CollectionFetcher, FetchState, FetchTicket, Resolution};
pub use mutation::{MutationCoordinator, MutationKind, MutationState, PageClampPolicy};
pub use query::{QueryParameters, compose};
pub use search::{DEFAULT_QUIET_PERIOD, SearchInput};
