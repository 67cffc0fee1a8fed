//! Optimistic status transition engine.
//!
//! A transition runs in two halves. [`TransitionEngine::request_transition`]
//! runs synchronously inside the UI handler: it rejects no-op and concurrent
//! requests, writes the new status into the caller's slot and returns the
//! request to commit. Once the remote commit finishes,
//! [`TransitionEngine::settle`] applies the outcome, but only to an entity
//! that still exists.
//!
//! What a failed commit does to the local value is a per-engine
//! [`FailurePolicy`], optionally overridden per request.

use std::collections::HashMap;
use std::fmt;

use protolab_protocol::{EntityId, Status, StatusChangeRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::commit::CommitOutcome;
use crate::error::CommitError;

/// What happens to the optimistic value when its commit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Restore the status the entity had before the request.
    #[default]
    Revert,
    /// Leave the optimistic status in place until a refresh resyncs it.
    KeepOptimistic,
}

/// Why a request was turned away without a commit.
///
/// These are expected UI races, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The entity already has the requested status.
    SameStatus,
    /// A transition for the entity has not settled yet.
    InFlight,
    /// The entity is not known to the caller.
    Missing,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SameStatus => "status unchanged",
            Self::InFlight => "a change is already pending",
            Self::Missing => "entity not found",
        })
    }
}

/// Notification sent to observers when a transition settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent<S> {
    /// The commit succeeded.
    Changed {
        entity_id: EntityId,
        new_status: S,
    },
    /// The commit failed.
    Failed {
        entity_id: EntityId,
        attempted: S,
        error: CommitError,
        /// The status restored under [`FailurePolicy::Revert`].
        reverted_to: Option<S>,
    },
}

/// Receives settlement notifications.
pub trait TransitionObserver<S> {
    fn notify(&mut self, event: &TransitionEvent<S>);
}

impl<S, F> TransitionObserver<S> for F
where
    F: FnMut(&TransitionEvent<S>),
{
    fn notify(&mut self, event: &TransitionEvent<S>) {
        self(event);
    }
}

/// How an outcome was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<S> {
    /// The commit succeeded; the optimistic status stands.
    Committed(S),
    /// The commit failed and the previous status was restored.
    Reverted { restored: S, error: CommitError },
    /// The commit failed and the optimistic status was kept.
    KeptOptimistic { status: S, error: CommitError },
    /// The entity is gone or the request was superseded; nothing was applied.
    Stale,
}

impl<S> Settlement<S> {
    /// The failure carried by this settlement, if any.
    #[must_use]
    pub fn error(&self) -> Option<&CommitError> {
        match self {
            Self::Reverted { error, .. } | Self::KeptOptimistic { error, .. } => Some(error),
            Self::Committed(_) | Self::Stale => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending<S> {
    request: StatusChangeRequest<S>,
    policy: FailurePolicy,
}

/// Tracks in-flight transitions for a set of entities of one status family.
pub struct TransitionEngine<S: Status> {
    policy: FailurePolicy,
    in_flight: HashMap<EntityId, Pending<S>>,
    observers: Vec<Box<dyn TransitionObserver<S>>>,
}

impl<S: Status> fmt::Debug for TransitionEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("policy", &self.policy)
            .field("in_flight", &self.in_flight.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: Status> TransitionEngine<S> {
    /// Creates an engine with no transition in flight.
    #[must_use]
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            in_flight: HashMap::new(),
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
    }

    /// Registers an observer for settlement notifications.
    pub fn subscribe(&mut self, observer: impl TransitionObserver<S> + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn is_in_flight(&self, entity_id: EntityId) -> bool {
        self.in_flight.contains_key(&entity_id)
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// The unsettled request for an entity.
    #[must_use]
    pub fn pending(&self, entity_id: EntityId) -> Option<&StatusChangeRequest<S>> {
        self.in_flight.get(&entity_id).map(|p| &p.request)
    }

    /// Starts a transition using the engine's policy.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::SameStatus`] if `to` equals the current value and
    /// [`Rejection::InFlight`] if the entity has an unsettled request. In both
    /// cases `current` is left untouched and nothing must be committed.
    pub fn request_transition(
        &mut self,
        entity_id: EntityId,
        current: &mut S,
        to: S,
    ) -> Result<StatusChangeRequest<S>, Rejection> {
        let policy = self.policy;
        self.request_transition_with(entity_id, current, to, policy)
    }

    /// Starts a transition with an explicit failure policy for this request.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request_transition`].
    pub fn request_transition_with(
        &mut self,
        entity_id: EntityId,
        current: &mut S,
        to: S,
        policy: FailurePolicy,
    ) -> Result<StatusChangeRequest<S>, Rejection> {
        if *current == to {
            debug!(entity = %entity_id, status = ?to, "transition rejected: same status");
            return Err(Rejection::SameStatus);
        }
        if self.in_flight.contains_key(&entity_id) {
            debug!(entity = %entity_id, to = ?to, "transition rejected: in flight");
            return Err(Rejection::InFlight);
        }

        let request = StatusChangeRequest::new(entity_id, *current, to);
        *current = to;
        self.in_flight.insert(entity_id, Pending { request, policy });
        debug!(entity = %entity_id, from = ?request.from, to = ?to, ?policy, "optimistic transition applied");
        Ok(request)
    }

    /// Applies a commit outcome.
    ///
    /// `current` is the entity's status slot, or `None` if the entity no
    /// longer exists. Both a missing entity and a request that is no longer
    /// the pending one report [`Settlement::Stale`]; only the former releases
    /// the guard.
    pub fn settle(&mut self, outcome: CommitOutcome<S>, current: Option<&mut S>) -> Settlement<S> {
        let CommitOutcome { request, result } = outcome;
        let entity_id = request.entity_id;

        let policy = match self.in_flight.get(&entity_id) {
            Some(pending) if pending.request == request => pending.policy,
            _ => {
                debug!(entity = %entity_id, "outcome for a superseded request ignored");
                return Settlement::Stale;
            }
        };
        self.in_flight.remove(&entity_id);

        let Some(current) = current else {
            debug!(entity = %entity_id, "outcome for a removed entity ignored");
            return Settlement::Stale;
        };

        let (settlement, event) = match result {
            Ok(()) => {
                debug!(entity = %entity_id, status = ?request.to, "transition committed");
                (
                    Settlement::Committed(request.to),
                    TransitionEvent::Changed {
                        entity_id,
                        new_status: request.to,
                    },
                )
            }
            Err(error) => match policy {
                FailurePolicy::Revert if *current == request.to => {
                    *current = request.from;
                    warn!(entity = %entity_id, %error, restored = ?request.from, "commit failed, status reverted");
                    (
                        Settlement::Reverted {
                            restored: request.from,
                            error: error.clone(),
                        },
                        TransitionEvent::Failed {
                            entity_id,
                            attempted: request.to,
                            error,
                            reverted_to: Some(request.from),
                        },
                    )
                }
                FailurePolicy::Revert | FailurePolicy::KeepOptimistic => {
                    warn!(entity = %entity_id, %error, status = ?*current, "commit failed, local status kept");
                    (
                        Settlement::KeptOptimistic {
                            status: *current,
                            error: error.clone(),
                        },
                        TransitionEvent::Failed {
                            entity_id,
                            attempted: request.to,
                            error,
                            reverted_to: None,
                        },
                    )
                }
            },
        };

        for observer in &mut self.observers {
            observer.notify(&event);
        }
        settlement
    }

    /// Drops the guard for an entity without applying anything.
    ///
    /// A later outcome for the same request settles as stale.
    pub fn forget(&mut self, entity_id: EntityId) -> bool {
        self.in_flight.remove(&entity_id).is_some()
    }
}

impl<S: Status> Default for TransitionEngine<S> {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}

/// One entity's status, driven through its own engine.
///
/// # Examples
///
/// ```
/// use protolab_protocol::{BinaryStatus, EntityId};
/// use protolab_transition::{CommitOutcome, FailurePolicy, Settlement, StatusCell};
///
/// let mut cell = StatusCell::new(EntityId::new_v4(), BinaryStatus::Ativo, FailurePolicy::Revert);
/// let request = cell.request(BinaryStatus::Inativo).unwrap();
/// assert_eq!(cell.status(), BinaryStatus::Inativo);
///
/// let settled = cell.settle(CommitOutcome::succeeded(request));
/// assert_eq!(settled, Settlement::Committed(BinaryStatus::Inativo));
/// ```
#[derive(Debug)]
pub struct StatusCell<S: Status> {
    entity_id: EntityId,
    status: S,
    engine: TransitionEngine<S>,
}

impl<S: Status> StatusCell<S> {
    #[must_use]
    pub fn new(entity_id: EntityId, status: S, policy: FailurePolicy) -> Self {
        Self {
            entity_id,
            status,
            engine: TransitionEngine::new(policy),
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    #[must_use]
    pub fn status(&self) -> S {
        self.status
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.engine.is_in_flight(self.entity_id)
    }

    pub fn subscribe(&mut self, observer: impl TransitionObserver<S> + 'static) {
        self.engine.subscribe(observer);
    }

    /// Starts a transition of this entity.
    ///
    /// # Errors
    ///
    /// See [`TransitionEngine::request_transition`].
    pub fn request(&mut self, to: S) -> Result<StatusChangeRequest<S>, Rejection> {
        self.engine.request_transition(self.entity_id, &mut self.status, to)
    }

    pub fn settle(&mut self, outcome: CommitOutcome<S>) -> Settlement<S> {
        self.engine.settle(outcome, Some(&mut self.status))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use protolab_protocol::{BinaryStatus, WorkflowStatus};

    use super::*;

    fn recorder<S: Clone + 'static>() -> (Rc<RefCell<Vec<TransitionEvent<S>>>>, impl FnMut(&TransitionEvent<S>)) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        (events, move |event: &TransitionEvent<S>| sink.borrow_mut().push(event.clone()))
    }

    #[test]
    fn same_status_is_rejected_without_change() {
        let mut engine = TransitionEngine::new(FailurePolicy::Revert);
        let mut status = WorkflowStatus::Pendente;
        let id = EntityId::new_v4();

        let result = engine.request_transition(id, &mut status, WorkflowStatus::Pendente);
        assert_eq!(result, Err(Rejection::SameStatus));
        assert_eq!(status, WorkflowStatus::Pendente);
        assert!(!engine.is_in_flight(id));
    }

    #[test]
    fn second_request_is_rejected_while_in_flight() {
        let mut engine = TransitionEngine::new(FailurePolicy::Revert);
        let mut status = WorkflowStatus::Pendente;
        let id = EntityId::new_v4();

        let first = engine
            .request_transition(id, &mut status, WorkflowStatus::EmAndamento)
            .expect("first accepted");
        assert_eq!(
            engine.request_transition(id, &mut status, WorkflowStatus::Concluido),
            Err(Rejection::InFlight)
        );
        assert_eq!(status, WorkflowStatus::EmAndamento);

        engine.settle(CommitOutcome::succeeded(first), Some(&mut status));
        assert!(
            engine
                .request_transition(id, &mut status, WorkflowStatus::Concluido)
                .is_ok()
        );
    }

    #[test]
    fn optimistic_value_is_visible_before_settlement() {
        let mut engine = TransitionEngine::new(FailurePolicy::KeepOptimistic);
        let mut status = WorkflowStatus::Pendente;
        let request = engine
            .request_transition(EntityId::new_v4(), &mut status, WorkflowStatus::EmAndamento)
            .expect("accepted");
        assert_eq!(status, WorkflowStatus::EmAndamento);
        assert_eq!(request.from, WorkflowStatus::Pendente);
    }

    #[test]
    fn binary_success_emits_one_changed_notification() {
        let (events, observer) = recorder::<BinaryStatus>();
        let id = EntityId::new_v4();
        let mut cell = StatusCell::new(id, BinaryStatus::Ativo, FailurePolicy::Revert);
        cell.subscribe(observer);

        let request = cell.request(BinaryStatus::Inativo).expect("accepted");
        let settlement = cell.settle(CommitOutcome::succeeded(request));

        assert_eq!(settlement, Settlement::Committed(BinaryStatus::Inativo));
        assert_eq!(cell.status(), BinaryStatus::Inativo);
        assert_eq!(
            events.borrow().as_slice(),
            &[TransitionEvent::Changed {
                entity_id: id,
                new_status: BinaryStatus::Inativo
            }]
        );
    }

    #[test]
    fn revert_policy_restores_previous_status() {
        let (events, observer) = recorder::<BinaryStatus>();
        let mut cell = StatusCell::new(EntityId::new_v4(), BinaryStatus::Inativo, FailurePolicy::Revert);
        cell.subscribe(observer);

        let request = cell.request(BinaryStatus::Ativo).expect("accepted");
        let settlement = cell.settle(CommitOutcome::failed(request, CommitError::Offline));

        assert_eq!(
            settlement,
            Settlement::Reverted {
                restored: BinaryStatus::Inativo,
                error: CommitError::Offline
            }
        );
        assert_eq!(cell.status(), BinaryStatus::Inativo);
        assert!(matches!(
            events.borrow().as_slice(),
            [TransitionEvent::Failed { reverted_to: Some(BinaryStatus::Inativo), .. }]
        ));
    }

    #[test]
    fn keep_policy_leaves_optimistic_status() {
        let (events, observer) = recorder::<WorkflowStatus>();
        let mut engine = TransitionEngine::new(FailurePolicy::KeepOptimistic);
        engine.subscribe(observer);
        let mut status = WorkflowStatus::Pendente;
        let id = EntityId::new_v4();

        let request = engine
            .request_transition(id, &mut status, WorkflowStatus::EmAndamento)
            .expect("accepted");
        let settlement = engine.settle(CommitOutcome::failed(request, CommitError::Offline), Some(&mut status));

        assert!(matches!(settlement, Settlement::KeptOptimistic { status: WorkflowStatus::EmAndamento, .. }));
        assert_eq!(status, WorkflowStatus::EmAndamento);
        assert_eq!(events.borrow().len(), 1);
        assert!(!engine.is_in_flight(id));
    }

    #[test]
    fn per_request_policy_overrides_engine_default() {
        let mut engine = TransitionEngine::new(FailurePolicy::KeepOptimistic);
        let mut status = BinaryStatus::Ativo;
        let request = engine
            .request_transition_with(EntityId::new_v4(), &mut status, BinaryStatus::Inativo, FailurePolicy::Revert)
            .expect("accepted");
        engine.settle(CommitOutcome::failed(request, CommitError::Offline), Some(&mut status));
        assert_eq!(status, BinaryStatus::Ativo);
    }

    #[test]
    fn outcome_for_removed_entity_is_stale() {
        let (events, observer) = recorder::<WorkflowStatus>();
        let mut engine = TransitionEngine::new(FailurePolicy::Revert);
        engine.subscribe(observer);
        let mut status = WorkflowStatus::Pendente;
        let id = EntityId::new_v4();

        let request = engine
            .request_transition(id, &mut status, WorkflowStatus::Concluido)
            .expect("accepted");
        assert_eq!(engine.settle(CommitOutcome::succeeded(request), None), Settlement::Stale);
        assert!(!engine.is_in_flight(id));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn forgotten_request_settles_stale() {
        let mut engine = TransitionEngine::new(FailurePolicy::Revert);
        let mut status = WorkflowStatus::Pendente;
        let id = EntityId::new_v4();
        let request = engine
            .request_transition(id, &mut status, WorkflowStatus::Concluido)
            .expect("accepted");

        assert!(engine.forget(id));
        assert_eq!(
            engine.settle(CommitOutcome::failed(request, CommitError::Offline), Some(&mut status)),
            Settlement::Stale
        );
        assert_eq!(status, WorkflowStatus::Concluido);
    }

    #[test]
    fn all_workflow_states_are_mutually_reachable() {
        let mut engine = TransitionEngine::new(FailurePolicy::Revert);
        let id = EntityId::new_v4();
        for from in WorkflowStatus::all() {
            for to in from.others() {
                let mut status = from;
                let request = engine.request_transition(id, &mut status, to).expect("legal");
                engine.settle(CommitOutcome::succeeded(request), Some(&mut status));
                assert_eq!(status, to);
            }
        }
    }

    #[test]
    fn failure_policy_json_format() {
        let json = serde_json::to_string(&FailurePolicy::KeepOptimistic).expect("serialize");
        assert_eq!(json, r#""keep-optimistic""#);
    }
}

#[cfg(test)]
mod proptest_tests {
    use protolab_protocol::WorkflowStatus;
    use proptest::prelude::*;

    use super::*;

    fn arb_status() -> impl Strategy<Value = WorkflowStatus> {
        prop_oneof![
            Just(WorkflowStatus::Pendente),
            Just(WorkflowStatus::EmAndamento),
            Just(WorkflowStatus::Concluido),
        ]
    }

    #[derive(Debug, Clone)]
    enum Step {
        Request(WorkflowStatus),
        Settle(bool),
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            arb_status().prop_map(Step::Request),
            any::<bool>().prop_map(Step::Settle),
        ]
    }

    proptest! {
        /// At most one commit is ever outstanding for an entity, and a revert
        /// engine always ends on a status some request or the start produced.
        #[test]
        fn one_commit_in_flight_per_entity(
            start in arb_status(),
            steps in prop::collection::vec(arb_step(), 0..40),
            revert in any::<bool>(),
        ) {
            let policy = if revert { FailurePolicy::Revert } else { FailurePolicy::KeepOptimistic };
            let mut engine = TransitionEngine::new(policy);
            let id = EntityId::new_v4();
            let mut status = start;
            let mut outstanding: Vec<StatusChangeRequest<WorkflowStatus>> = Vec::new();

            for step in steps {
                match step {
                    Step::Request(to) => {
                        let before = status;
                        match engine.request_transition(id, &mut status, to) {
                            Ok(request) => {
                                prop_assert!(outstanding.is_empty());
                                prop_assert_eq!(status, to);
                                outstanding.push(request);
                            }
                            Err(_) => {
                                prop_assert_eq!(status, before);
                            }
                        }
                    }
                    Step::Settle(ok) => {
                        if let Some(request) = outstanding.pop() {
                            let outcome = if ok {
                                CommitOutcome::succeeded(request)
                            } else {
                                CommitOutcome::failed(request, CommitError::Offline)
                            };
                            engine.settle(outcome, Some(&mut status));
                            if !ok && revert {
                                prop_assert_eq!(status, request.from);
                            } else {
                                prop_assert_eq!(status, request.to);
                            }
                        }
                    }
                }
                prop_assert_eq!(engine.in_flight_count(), outstanding.len());
            }
        }
    }
}
