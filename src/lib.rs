pub mod cli;
pub mod collection;
pub mod commands;
pub mod config;
pub mod display;
pub mod entity;
pub mod error;
pub mod logging;
pub mod notify;
pub mod remote;
pub mod session;
pub mod utils;
pub mod view;

pub use collection::{CollectionResult, CollectionSource, EntityNames, Record, RecordId};
pub use config::Config;
pub use error::{AtriumError, ErrorInfo, ErrorKind, Result};
pub use notify::{Level, Notification, Notifier};
pub use session::{AuthState, AuthorizationGuard, SessionHandle};
pub use view::{
    CollectionView, FetchState, MutationKind, MutationState, PageClampPolicy, QueryParameters,
    ViewHandle, ViewOptions, ViewSnapshot,
};
