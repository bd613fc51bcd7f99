//! Process-wide login session.
//!
//! The session is shared through an explicit [`SessionHandle`]. It is
//! written only by the login and logout commands and by the
//! [`AuthorizationGuard`]; everything else reads it.

mod guard;
pub mod login;
mod store;

use std::sync::Arc;

use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretBox};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::Result;

pub use guard::AuthorizationGuard;
pub use login::{Credentials, LoginResponse};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    LoggedIn,
}

struct Active {
    token: SecretBox<String>,
    user: serde_json::Value,
    saved_at: String,
}

struct Inner {
    store: Box<dyn SessionStore>,
    active: Mutex<Option<Active>>,
    state: watch::Sender<AuthState>,
}

/// Shared, cloneable handle to the session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl SessionHandle {
    /// Open the session persisted in `store`, if any.
    pub fn open(store: impl SessionStore + 'static) -> Result<Self> {
        let active = store.load()?.map(|stored| Active {
            token: SecretBox::new(Box::new(stored.token)),
            user: stored.user,
            saved_at: stored.saved_at,
        });
        let state = if active.is_some() {
            AuthState::LoggedIn
        } else {
            AuthState::LoggedOut
        };
        debug!(?state, "session opened");

        Ok(Self {
            inner: Arc::new(Inner {
                store: Box::new(store),
                active: Mutex::new(active),
                state: watch::Sender::new(state),
            }),
        })
    }

    /// A logged-out session that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Box::new(MemorySessionStore::new()),
                active: Mutex::new(None),
                state: watch::Sender::new(AuthState::LoggedOut),
            }),
        }
    }

    /// The bearer token to attach to API calls.
    pub fn bearer(&self) -> Option<String> {
        self.inner
            .active
            .lock()
            .as_ref()
            .map(|a| a.token.expose_secret().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.active.lock().is_some()
    }

    pub fn user(&self) -> Option<serde_json::Value> {
        self.inner.active.lock().as_ref().map(|a| a.user.clone())
    }

    pub fn saved_at(&self) -> Option<String> {
        self.inner.active.lock().as_ref().map(|a| a.saved_at.clone())
    }

    pub fn state(&self) -> AuthState {
        *self.inner.state.borrow()
    }

    /// Persist a new login and mark the session logged in.
    pub fn login(&self, token: String, user: serde_json::Value) -> Result<()> {
        let stored = StoredSession::new(token, user);
        self.inner.store.save(&stored)?;
        *self.inner.active.lock() = Some(Active {
            token: SecretBox::new(Box::new(stored.token)),
            user: stored.user,
            saved_at: stored.saved_at,
        });
        self.inner.state.send_replace(AuthState::LoggedIn);
        Ok(())
    }

    /// Forget the credentials, in memory and in the store.
    ///
    /// The in-memory session is cleared even when the store fails.
    pub fn logout(&self) -> Result<()> {
        self.inner.active.lock().take();
        self.inner.state.send_replace(AuthState::LoggedOut);
        if let Err(e) = self.inner.store.clear() {
            warn!("failed to clear persisted session: {}", e);
            return Err(e);
        }
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }
}
