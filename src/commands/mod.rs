//! Command implementations behind the `atrium` binary.
//!
//! `list`, `create`, `update`, `delete` and `browse` all run through a
//! [`CollectionView`](crate::view::CollectionView); `show` reads a single
//! record directly.

mod auth;
mod browse;
mod companies;
mod config;
mod customers;
mod records;

use std::sync::Arc;

use serde_json::Value;

use crate::cli::GlobalArgs;
use crate::collection::{MemorySource, Record, RecordId};
use crate::config::Config;
use crate::entity::{Company, CompanyDetail, Customer, CustomerDetail, seed};
use crate::error::{AtriumError, Result};
use crate::notify::{Notifier, TerminalNotifier};
use crate::remote::GraphQlClient;
use crate::session::{AuthorizationGuard, FileSessionStore, SessionHandle};
use crate::view::ViewOptions;

pub use auth::{cmd_login, cmd_logout, cmd_session};
pub use browse::{BrowseInput, cmd_browse};
pub use companies::cmd_companies;
pub use config::{cmd_config_path, cmd_config_set, cmd_config_show};
pub use customers::cmd_customers;

/// JSON and human-readable forms of a command's result.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print to stdout. Without text, nothing is printed unless JSON is asked for.
    pub fn print(self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&self.json)?);
        } else if let Some(text) = self.text {
            println!("{text}");
        }
        Ok(())
    }
}

/// Seeded in-memory collections used by `--offline`.
pub struct OfflineData {
    pub customers: Arc<MemorySource<Customer>>,
    pub companies: Arc<MemorySource<Company>>,
}

impl OfflineData {
    pub fn seeded() -> Self {
        Self {
            customers: Arc::new(MemorySource::new(seed::demo_customers())),
            companies: Arc::new(MemorySource::new(seed::demo_companies())),
        }
    }

    pub fn customer_detail(&self, id: RecordId) -> Result<CustomerDetail> {
        let customer = self
            .customers
            .get(id)
            .ok_or_else(|| not_found::<Customer>(id))?;
        let company = customer
            .company
            .as_ref()
            .and_then(|summary| self.companies.get(summary.id));
        Ok(CustomerDetail { customer, company })
    }

    pub fn company_detail(&self, id: RecordId) -> Result<CompanyDetail> {
        let company = self
            .companies
            .get(id)
            .ok_or_else(|| not_found::<Company>(id))?;
        let customers = self
            .customers
            .filter(|c| c.company.as_ref().is_some_and(|summary| summary.id == id));
        Ok(CompanyDetail { company, customers })
    }
}

fn not_found<R: Record>(id: RecordId) -> AtriumError {
    AtriumError::NotFound(format!("{} {id}", R::NAMES.singular))
}

/// Where records come from.
pub enum Backend {
    Remote(Arc<GraphQlClient>),
    Offline(OfflineData),
}

/// Everything a command needs: configuration, session and record backend.
pub struct Context {
    pub config: Config,
    pub global: GlobalArgs,
    session: SessionHandle,
    guard: AuthorizationGuard,
    backend: Backend,
}

impl Context {
    pub fn new(global: GlobalArgs) -> Result<Self> {
        let config = Config::load()?;
        let (session, backend) = if global.offline {
            (SessionHandle::in_memory(), Backend::Offline(OfflineData::seeded()))
        } else {
            let store = FileSessionStore::new(FileSessionStore::default_path()?);
            let session = SessionHandle::open(store)?;
            let client = GraphQlClient::new(
                config.http_client()?,
                config.graphql_url()?,
                session.clone(),
            );
            (session, Backend::Remote(Arc::new(client)))
        };
        Ok(Self::with_parts(config, global, session, backend))
    }

    /// Assemble a context from already-built parts.
    pub fn with_parts(
        config: Config,
        global: GlobalArgs,
        session: SessionHandle,
        backend: Backend,
    ) -> Self {
        let guard = AuthorizationGuard::new(session.clone());
        Self {
            config,
            global,
            session,
            guard,
            backend,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn guard(&self) -> AuthorizationGuard {
        self.guard.clone()
    }

    /// The record backend; the remote one requires a stored session.
    pub fn backend(&self) -> Result<&Backend> {
        if let Backend::Remote(_) = &self.backend
            && !self.session.is_authenticated()
        {
            return Err(AtriumError::NotLoggedIn);
        }
        Ok(&self.backend)
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::new(TerminalNotifier::new(self.global.yes))
    }

    pub fn view_options(&self) -> Result<ViewOptions> {
        self.config.view_options()
    }

    /// Route an authorization failure from outside a view through the guard.
    pub fn guarded<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result
            && e.is_authorization()
        {
            self.guard.on_unauthorized();
        }
        result
    }
}
