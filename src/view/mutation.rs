//! Write-side state of a view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AtriumError, ErrorInfo};

use super::cursor::PaginationCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::Create => write!(f, "create"),
            MutationKind::Update => write!(f, "update"),
            MutationKind::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    InFlight,
    Success,
    Failure(ErrorInfo),
}

impl MutationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, MutationState::InFlight)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, MutationState::Success | MutationState::Failure(_))
    }
}

/// What a view does with its page when the collection shrinks under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageClampPolicy {
    /// Pull the page back to the last page that still has rows
    #[default]
    Clamp,
    /// Stay on the page even if it is now past the end
    Preserve,
}

impl fmt::Display for PageClampPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageClampPolicy::Clamp => write!(f, "clamp"),
            PageClampPolicy::Preserve => write!(f, "preserve"),
        }
    }
}

impl FromStr for PageClampPolicy {
    type Err = AtriumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clamp" => Ok(PageClampPolicy::Clamp),
            "preserve" => Ok(PageClampPolicy::Preserve),
            _ => Err(AtriumError::Config(format!(
                "unknown clamp policy '{s}', expected 'clamp' or 'preserve'"
            ))),
        }
    }
}

/// Tracks create, update and delete independently.
#[derive(Debug, Clone, Default)]
pub struct MutationCoordinator {
    create: MutationState,
    update: MutationState,
    delete: MutationState,
    policy: PageClampPolicy,
}

impl MutationCoordinator {
    pub fn new(policy: PageClampPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> PageClampPolicy {
        self.policy
    }

    pub fn state(&self, kind: MutationKind) -> &MutationState {
        match kind {
            MutationKind::Create => &self.create,
            MutationKind::Update => &self.update,
            MutationKind::Delete => &self.delete,
        }
    }

    fn state_mut(&mut self, kind: MutationKind) -> &mut MutationState {
        match kind {
            MutationKind::Create => &mut self.create,
            MutationKind::Update => &mut self.update,
            MutationKind::Delete => &mut self.delete,
        }
    }

    pub fn begin(&mut self, kind: MutationKind) {
        *self.state_mut(kind) = MutationState::InFlight;
    }

    pub fn resolve(&mut self, kind: MutationKind, outcome: Result<(), ErrorInfo>) {
        *self.state_mut(kind) = match outcome {
            Ok(()) => MutationState::Success,
            Err(info) => MutationState::Failure(info),
        };
    }

    /// Correct the cursor after a successful write, before the refetch.
    ///
    /// A delete shrinks the total by one; under [`PageClampPolicy::Clamp`]
    /// the cursor is pulled back if its page would now be past the end.
    /// Returns whether the page changed.
    pub fn reconcile_cursor(
        &self,
        kind: MutationKind,
        cursor: &mut PaginationCursor,
        last_total: Option<u64>,
    ) -> bool {
        if self.policy != PageClampPolicy::Clamp || kind != MutationKind::Delete {
            return false;
        }
        match last_total {
            Some(total) => cursor.clamp_to(total.saturating_sub(1)),
            None => false,
        }
    }

    /// Whether an applied result should pull the cursor back.
    pub fn clamps_on_result(&self) -> bool {
        self.policy == PageClampPolicy::Clamp
    }
}
