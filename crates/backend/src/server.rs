//! Simulated lab server.
//!
//! Holds the lab's records in memory behind an async mutex and answers with a
//! configurable delay. It can be switched offline at runtime and told to
//! refuse specific statuses, which is how commit failures are exercised.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use protolab_protocol::{EntityId, EntityStatus, OrderId, OrderRecord, OrderStatus, RegistryEntry};
use protolab_transition::{CommitError, Committer};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{BackendError, Result};
use crate::snapshot::LabSnapshot;

/// Behaviour knobs of the simulated server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSettings {
    /// Delay before every answer.
    pub latency: Duration,
    /// Start offline.
    pub offline: bool,
    /// Statuses the server refuses to store.
    pub fail_statuses: Vec<EntityStatus>,
}

impl BackendSettings {
    /// Settings with no delay and no failures.
    #[must_use]
    pub fn instant() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    #[must_use]
    pub fn refusing(mut self, status: EntityStatus) -> Self {
        self.fail_statuses.push(status);
        self
    }
}

#[derive(Debug)]
struct Records {
    orders: Vec<OrderRecord>,
    registry: Vec<RegistryEntry>,
}

#[derive(Debug)]
struct Shared {
    records: Mutex<Records>,
    latency: Duration,
    offline: AtomicBool,
    fail_statuses: Vec<EntityStatus>,
    commits: AtomicUsize,
}

/// Client handle onto the simulated server.
///
/// Cheap to clone; every clone talks to the same records.
///
/// # Examples
///
/// ```
/// use protolab_backend::{BackendSettings, LabBackend};
///
/// # async fn example() -> protolab_backend::Result<()> {
/// let backend = LabBackend::with_sample_data(BackendSettings::instant());
/// let orders = backend.fetch_orders().await?;
/// assert!(!orders.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LabBackend {
    shared: Arc<Shared>,
}

impl LabBackend {
    /// A server holding the records of `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: LabSnapshot, settings: BackendSettings) -> Self {
        let BackendSettings {
            latency,
            offline,
            fail_statuses,
        } = settings;
        Self {
            shared: Arc::new(Shared {
                records: Mutex::new(Records {
                    orders: snapshot.orders,
                    registry: snapshot.registry,
                }),
                latency,
                offline: AtomicBool::new(offline),
                fail_statuses,
                commits: AtomicUsize::new(0),
            }),
        }
    }

    /// A server seeded with the sample lab.
    #[must_use]
    pub fn with_sample_data(settings: BackendSettings) -> Self {
        Self::from_snapshot(LabSnapshot::sample(), settings)
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.shared.offline.load(Ordering::Relaxed)
    }

    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::Relaxed);
        info!(offline, "backend connectivity changed");
    }

    /// Number of commit calls received, successful or not.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.shared.commits.load(Ordering::Relaxed)
    }

    async fn round_trip(&self) -> Result<()> {
        if !self.shared.latency.is_zero() {
            tokio::time::sleep(self.shared.latency).await;
        }
        if self.is_offline() {
            return Err(BackendError::Offline);
        }
        Ok(())
    }

    /// All orders, including cancelled ones.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Offline`] while offline.
    #[instrument(skip(self))]
    pub async fn fetch_orders(&self) -> Result<Vec<OrderRecord>> {
        self.round_trip().await?;
        let records = self.shared.records.lock().await;
        debug!(count = records.orders.len(), "fetched orders");
        Ok(records.orders.clone())
    }

    /// All registry entries.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Offline`] while offline.
    #[instrument(skip(self))]
    pub async fn fetch_registry(&self) -> Result<Vec<RegistryEntry>> {
        self.round_trip().await?;
        let records = self.shared.records.lock().await;
        debug!(count = records.registry.len(), "fetched registry");
        Ok(records.registry.clone())
    }

    /// Deletes an order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Offline`] while offline and
    /// [`BackendError::OrderNotFound`] for an unknown order.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<()> {
        self.round_trip().await?;
        let mut records = self.shared.records.lock().await;
        let before = records.orders.len();
        records.orders.retain(|o| o.id != id);
        if records.orders.len() == before {
            return Err(BackendError::OrderNotFound(id));
        }
        info!(order = %id, "order deleted");
        Ok(())
    }

    /// Copies every record, regardless of connectivity.
    pub async fn snapshot(&self) -> LabSnapshot {
        let records = self.shared.records.lock().await;
        LabSnapshot::new(records.orders.clone(), records.registry.clone())
    }

    async fn store_status(&self, entity_id: EntityId, status: EntityStatus) -> std::result::Result<(), CommitError> {
        let mut records = self.shared.records.lock().await;
        let wrong_family = || CommitError::WrongFamily {
            entity_id,
            code: status.code().to_string(),
        };

        if let Some(order) = records.orders.iter_mut().find(|o| o.id == entity_id) {
            let EntityStatus::Workflow(status) = status else {
                return Err(wrong_family());
            };
            order.status = OrderStatus::from(status);
            return Ok(());
        }
        if let Some(entry) = records.registry.iter_mut().find(|e| e.id == entity_id) {
            let EntityStatus::Binary(status) = status else {
                return Err(wrong_family());
            };
            entry.status = status;
            return Ok(());
        }
        Err(CommitError::NotFound(entity_id))
    }
}

impl Committer for LabBackend {
    #[instrument(skip(self, status), fields(status = %status))]
    async fn commit(&self, entity_id: EntityId, status: EntityStatus) -> protolab_transition::Result<()> {
        self.shared.commits.fetch_add(1, Ordering::Relaxed);
        self.round_trip().await.map_err(|_| CommitError::Offline)?;

        if self.shared.fail_statuses.contains(&status) {
            warn!(entity = %entity_id, "status refused by server");
            return Err(CommitError::Refused {
                code: status.code().to_string(),
            });
        }
        self.store_status(entity_id, status).await?;
        debug!(entity = %entity_id, "status committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use protolab_protocol::{BinaryStatus, WorkflowStatus};
    use protolab_transition::{CommitOutcome, FailurePolicy, KanbanController, run_commit};

    use super::*;

    fn first_order_in(records: &[OrderRecord], status: OrderStatus) -> OrderId {
        records
            .iter()
            .find(|r| r.status == status)
            .map(|r| r.id)
            .expect("sample data has one")
    }

    #[tokio::test]
    async fn commit_updates_order_record() {
        let backend = LabBackend::with_sample_data(BackendSettings::instant());
        let orders = backend.fetch_orders().await.expect("online");
        let id = first_order_in(&orders, OrderStatus::Pendente);

        backend
            .commit(id, EntityStatus::Workflow(WorkflowStatus::Concluido))
            .await
            .expect("accepted");

        let orders = backend.fetch_orders().await.expect("online");
        assert_eq!(
            orders.iter().find(|o| o.id == id).map(|o| o.status),
            Some(OrderStatus::Concluido)
        );
        assert_eq!(backend.commit_count(), 1);
    }

    #[tokio::test]
    async fn commit_updates_registry_entry() {
        let backend = LabBackend::with_sample_data(BackendSettings::instant());
        let registry = backend.fetch_registry().await.expect("online");
        let entry = registry
            .iter()
            .find(|e| e.status == BinaryStatus::Ativo)
            .expect("an active entry");

        backend
            .commit(entry.id, EntityStatus::Binary(BinaryStatus::Inativo))
            .await
            .expect("accepted");
        let snapshot = backend.snapshot().await;
        assert_eq!(
            snapshot.registry.iter().find(|e| e.id == entry.id).map(|e| e.status),
            Some(BinaryStatus::Inativo)
        );
    }

    #[tokio::test]
    async fn offline_commit_fails() {
        let backend = LabBackend::with_sample_data(BackendSettings::instant().with_offline(true));
        let err = backend
            .commit(EntityId::new_v4(), EntityStatus::Binary(BinaryStatus::Ativo))
            .await
            .unwrap_err();
        assert_eq!(err, CommitError::Offline);
        assert!(matches!(backend.fetch_orders().await, Err(BackendError::Offline)));

        backend.set_offline(false);
        assert!(backend.fetch_orders().await.is_ok());
    }

    #[tokio::test]
    async fn refused_status_is_reported() {
        let refused = EntityStatus::Workflow(WorkflowStatus::Concluido);
        let backend = LabBackend::with_sample_data(BackendSettings::instant().refusing(refused));
        let orders = backend.fetch_orders().await.expect("online");
        let id = first_order_in(&orders, OrderStatus::Pendente);

        let err = backend.commit(id, refused).await.unwrap_err();
        assert_eq!(
            err,
            CommitError::Refused {
                code: "CONCLUIDO".to_string()
            }
        );
    }

    #[tokio::test]
    async fn wrong_family_and_unknown_entity() {
        let backend = LabBackend::with_sample_data(BackendSettings::instant());
        let orders = backend.fetch_orders().await.expect("online");
        let id = orders[0].id;

        let err = backend
            .commit(id, EntityStatus::Binary(BinaryStatus::Inativo))
            .await
            .unwrap_err();
        assert!(matches!(err, CommitError::WrongFamily { .. }));

        let missing = EntityId::new_v4();
        let err = backend
            .commit(missing, EntityStatus::Workflow(WorkflowStatus::Pendente))
            .await
            .unwrap_err();
        assert_eq!(err, CommitError::NotFound(missing));
    }

    #[tokio::test]
    async fn delete_removes_order() {
        let backend = LabBackend::with_sample_data(BackendSettings::instant());
        let orders = backend.fetch_orders().await.expect("online");
        let id = orders[0].id;

        backend.delete_order(id).await.expect("deleted");
        assert!(matches!(
            backend.delete_order(id).await,
            Err(BackendError::OrderNotFound(_))
        ));
        assert_eq!(backend.fetch_orders().await.expect("online").len(), orders.len() - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_commits() {
        let backend = LabBackend::with_sample_data(BackendSettings::instant().with_latency(Duration::from_millis(500)));
        let orders = backend.fetch_orders().await.expect("online");
        let id = first_order_in(&orders, OrderStatus::EmAndamento);

        let started = tokio::time::Instant::now();
        backend
            .commit(id, EntityStatus::Workflow(WorkflowStatus::Concluido))
            .await
            .expect("accepted");
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn board_keeps_optimistic_status_when_commit_fails() {
        let backend = LabBackend::with_sample_data(BackendSettings::instant());
        let mut kanban = KanbanController::new(
            protolab_protocol::OrderBoard::from_records(backend.fetch_orders().await.expect("online")),
            FailurePolicy::KeepOptimistic,
        );
        let id = kanban.columns()[0][0].id;

        let request = kanban
            .request_transition(id, WorkflowStatus::EmAndamento)
            .expect("accepted");
        assert_eq!(kanban.order(id).map(|o| o.status), Some(WorkflowStatus::EmAndamento));

        backend.set_offline(true);
        let outcome: CommitOutcome<_> = run_commit(&backend, request).await;
        kanban.settle(outcome);

        assert_eq!(kanban.order(id).map(|o| o.status), Some(WorkflowStatus::EmAndamento));
        assert!(kanban.banner().is_some());

        backend.set_offline(false);
        kanban.replace_from_records(backend.fetch_orders().await.expect("online"));
        assert_eq!(kanban.order(id).map(|o| o.status), Some(WorkflowStatus::Pendente));
    }
}
