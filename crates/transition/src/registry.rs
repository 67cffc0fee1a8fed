//! Registry status controller.
//!
//! Every registry entity carries an `Ativo`/`Inativo` status that can be
//! flipped from its row's status picker. One engine serves all entities;
//! the failure policy is chosen per entity kind.

use std::collections::BTreeMap;

use protolab_protocol::{BinaryStatus, EntityId, EntityKind, RegistryEntry, StatusChangeRequest, sort_entries};
use tracing::info;

use crate::commit::CommitOutcome;
use crate::engine::{FailurePolicy, Rejection, Settlement, TransitionEngine, TransitionObserver};

/// Which failure policy each entity kind uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindPolicies {
    /// Policy for kinds without an override.
    pub default: FailurePolicy,
    /// Per-kind overrides.
    pub overrides: BTreeMap<EntityKind, FailurePolicy>,
}

impl KindPolicies {
    #[must_use]
    pub fn new(default: FailurePolicy) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    /// Adds an override, builder-style.
    #[must_use]
    pub fn with(mut self, kind: EntityKind, policy: FailurePolicy) -> Self {
        self.overrides.insert(kind, policy);
        self
    }

    #[must_use]
    pub fn for_kind(&self, kind: EntityKind) -> FailurePolicy {
        self.overrides.get(&kind).copied().unwrap_or(self.default)
    }
}

/// Registry entries plus the transition engine driving their statuses.
#[derive(Debug)]
pub struct RegistryController {
    entries: Vec<RegistryEntry>,
    engine: TransitionEngine<BinaryStatus>,
    policies: KindPolicies,
    notice: Option<String>,
}

impl RegistryController {
    /// Creates a controller over `entries`, sorted for display.
    #[must_use]
    pub fn new(mut entries: Vec<RegistryEntry>, policies: KindPolicies) -> Self {
        sort_entries(&mut entries);
        Self {
            entries,
            engine: TransitionEngine::new(policies.default),
            policies,
            notice: None,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entry(&self, id: EntityId) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn policies(&self) -> &KindPolicies {
        &self.policies
    }

    pub fn subscribe(&mut self, observer: impl TransitionObserver<BinaryStatus> + 'static) {
        self.engine.subscribe(observer);
    }

    #[must_use]
    pub fn is_pending(&self, id: EntityId) -> bool {
        self.engine.is_in_flight(id)
    }

    /// Number of active entries of one kind.
    #[must_use]
    pub fn active_count(&self, kind: EntityKind) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == kind && e.status == BinaryStatus::Ativo)
            .count()
    }

    /// Sets an entity's status through the kind's failure policy.
    ///
    /// # Errors
    ///
    /// [`Rejection::Missing`] for an unknown entity, otherwise see
    /// [`TransitionEngine::request_transition`].
    pub fn request_transition(
        &mut self,
        id: EntityId,
        to: BinaryStatus,
    ) -> Result<StatusChangeRequest<BinaryStatus>, Rejection> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(Rejection::Missing)?;
        let policy = self.policies.for_kind(entry.kind);
        let request = self
            .engine
            .request_transition_with(id, &mut entry.status, to, policy)?;
        info!(entry = %entry.name, kind = ?entry.kind, to = ?to, "registry status changed");
        Ok(request)
    }

    /// Applies a commit outcome. A failure leaves a notice for the status bar.
    pub fn settle(&mut self, outcome: CommitOutcome<BinaryStatus>) -> Settlement<BinaryStatus> {
        let id = outcome.request.entity_id;
        let entry = self.entries.iter_mut().find(|e| e.id == id);
        let name = entry.as_ref().map(|e| e.name.clone());
        let settlement = self.engine.settle(outcome, entry.map(|e| &mut e.status));

        if let (Some(error), Some(name)) = (settlement.error(), name) {
            let suffix = if matches!(settlement, Settlement::Reverted { .. }) {
                " (revertido)"
            } else {
                ""
            };
            self.notice = Some(format!("Falha ao atualizar {name}: {error}{suffix}"));
        }
        settlement
    }

    /// Takes the pending failure notice, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Replaces the entries with a fresh snapshot, keeping pending
    /// optimistic statuses.
    pub fn replace_entries(&mut self, mut entries: Vec<RegistryEntry>) {
        sort_entries(&mut entries);
        for entry in &mut entries {
            if let Some(pending) = self.engine.pending(entry.id) {
                entry.status = pending.to;
            }
        }
        self.entries = entries;
    }
}
