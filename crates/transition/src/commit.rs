//! The remote commit boundary.

use std::future::Future;

use protolab_protocol::{EntityId, EntityStatus, Status, StatusChangeRequest};

use crate::error::{CommitError, Result};

/// Persists a status change remotely.
///
/// The engine only inspects success or failure. Implementations must be
/// shareable across tasks so commits can run off the UI loop.
pub trait Committer: Send + Sync + 'static {
    /// Commits `status` for `entity_id`.
    fn commit(&self, entity_id: EntityId, status: EntityStatus) -> impl Future<Output = Result<()>> + Send;
}

/// A settled commit, ready to be applied by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome<S> {
    /// The request that was committed.
    pub request: StatusChangeRequest<S>,
    /// What the backend answered.
    pub result: std::result::Result<(), CommitError>,
}

impl<S: Status> CommitOutcome<S> {
    /// A successful outcome.
    #[must_use]
    pub fn succeeded(request: StatusChangeRequest<S>) -> Self {
        Self {
            request,
            result: Ok(()),
        }
    }

    /// A failed outcome.
    #[must_use]
    pub fn failed(request: StatusChangeRequest<S>, error: CommitError) -> Self {
        Self {
            request,
            result: Err(error),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs the remote half of a transition to completion.
///
/// There is no cancellation: the returned outcome is always produced, even if
/// the view that requested it is gone by then.
pub async fn run_commit<C, S>(committer: &C, request: StatusChangeRequest<S>) -> CommitOutcome<S>
where
    C: Committer,
    S: Status,
{
    let result = committer
        .commit(request.entity_id, request.to.into_entity_status())
        .await;
    CommitOutcome { request, result }
}
