use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

use super::SessionHandle;

/// Tears the session down when any view or command loses authorization.
///
/// Knows nothing about which view failed and never retries.
#[derive(Clone)]
pub struct AuthorizationGuard {
    session: SessionHandle,
    invocations: Arc<AtomicUsize>,
}

impl AuthorizationGuard {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Call once per authorization failure.
    pub fn on_unauthorized(&self) {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        warn!("authorization lost, logging out");
        if let Err(e) = self.session.logout() {
            warn!("logout after authorization failure incomplete: {}", e);
        }
    }

    /// How many times the guard has fired, across all clones.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AuthState;

    #[test]
    fn test_guard_logs_out_and_counts() {
        let session = SessionHandle::in_memory();
        session
            .login("tok".to_string(), serde_json::Value::Null)
            .unwrap();
        let guard = AuthorizationGuard::new(session.clone());

        guard.clone().on_unauthorized();
        assert_eq!(guard.invocations(), 1);
        assert_eq!(session.state(), AuthState::LoggedOut);

        guard.on_unauthorized();
        assert_eq!(guard.invocations(), 2);
    }
}
