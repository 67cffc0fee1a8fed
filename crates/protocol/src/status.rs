//! Status families shared by every lab entity.
//!
//! Two families exist: the binary `Ativo`/`Inativo` status used by registry
//! entities, and the three-state workflow used by orders. Orders additionally
//! carry a server-only `Cancelado` value that never enters the workflow.

use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Identifier of any status-bearing entity.
pub type EntityId = uuid::Uuid;

/// The family a status value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFamily {
    /// `Ativo` / `Inativo`.
    Binary,
    /// `Pendente` / `EmAndamento` / `Concluido`.
    Workflow,
}

/// A closed set of named states an entity can be in.
///
/// Implemented by [`BinaryStatus`] and [`WorkflowStatus`]. The transition
/// engine is generic over this trait.
pub trait Status: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// The family this status type belongs to.
    fn family() -> StatusFamily;

    /// The upper-case code used on the wire (`"EM_ANDAMENTO"`).
    fn code(self) -> &'static str;

    /// A short human-readable label.
    fn label(self) -> &'static str;

    /// Wraps the value in the family-erased [`EntityStatus`].
    fn into_entity_status(self) -> EntityStatus;
}

/// Binary status used by dentists, prosthetists, patients, clinics, services
/// and materials.
///
/// # Examples
///
/// ```
/// use protolab_protocol::BinaryStatus;
///
/// assert_eq!(BinaryStatus::Ativo.toggled(), BinaryStatus::Inativo);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BinaryStatus {
    /// The entity is active.
    #[default]
    Ativo,
    /// The entity is inactive.
    Inativo,
}

impl BinaryStatus {
    /// Both values, active first.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Ativo, Self::Inativo]
    }

    /// Returns the opposite value.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ativo => Self::Inativo,
            Self::Inativo => Self::Ativo,
        }
    }
}

impl Status for BinaryStatus {
    fn family() -> StatusFamily {
        StatusFamily::Binary
    }

    fn code(self) -> &'static str {
        match self {
            Self::Ativo => "ATIVO",
            Self::Inativo => "INATIVO",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Ativo => "Ativo",
            Self::Inativo => "Inativo",
        }
    }

    fn into_entity_status(self) -> EntityStatus {
        EntityStatus::Binary(self)
    }
}

/// The three in-scope states of an order.
///
/// All three states are mutually reachable; there is no transition table.
///
/// # Examples
///
/// ```
/// use protolab_protocol::WorkflowStatus;
///
/// assert_eq!(WorkflowStatus::all().len(), 3);
/// assert_eq!(WorkflowStatus::EmAndamento.index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    /// Waiting to be started.
    #[default]
    Pendente,
    /// Being worked on at the bench.
    EmAndamento,
    /// Finished.
    Concluido,
}

impl WorkflowStatus {
    /// Returns all workflow states in column order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Pendente, Self::EmAndamento, Self::Concluido]
    }

    /// Column index of this status (0-2).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Pendente => 0,
            Self::EmAndamento => 1,
            Self::Concluido => 2,
        }
    }

    /// Creates a status from its column index.
    ///
    /// Returns `None` if the index is out of range (>= 3).
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_protocol::WorkflowStatus;
    ///
    /// assert_eq!(WorkflowStatus::from_index(2), Some(WorkflowStatus::Concluido));
    /// assert_eq!(WorkflowStatus::from_index(3), None);
    /// ```
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Pendente),
            1 => Some(Self::EmAndamento),
            2 => Some(Self::Concluido),
            _ => None,
        }
    }

    /// The column to the right, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The column to the left, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self.index() {
            0 => None,
            i => Self::from_index(i - 1),
        }
    }

    /// The two statuses an order in this status can be moved to.
    #[must_use]
    pub fn others(self) -> [Self; 2] {
        match self {
            Self::Pendente => [Self::EmAndamento, Self::Concluido],
            Self::EmAndamento => [Self::Pendente, Self::Concluido],
            Self::Concluido => [Self::Pendente, Self::EmAndamento],
        }
    }
}

impl Status for WorkflowStatus {
    fn family() -> StatusFamily {
        StatusFamily::Workflow
    }

    fn code(self) -> &'static str {
        match self {
            Self::Pendente => "PENDENTE",
            Self::EmAndamento => "EM_ANDAMENTO",
            Self::Concluido => "CONCLUIDO",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::EmAndamento => "Em andamento",
            Self::Concluido => "Concluído",
        }
    }

    fn into_entity_status(self) -> EntityStatus {
        EntityStatus::Workflow(self)
    }
}

/// Status of an order as stored by the server.
///
/// `Cancelado` is terminal and only ever set server-side; orders in that
/// state are excluded from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pendente,
    EmAndamento,
    Concluido,
    Cancelado,
}

impl From<WorkflowStatus> for OrderStatus {
    fn from(status: WorkflowStatus) -> Self {
        match status {
            WorkflowStatus::Pendente => Self::Pendente,
            WorkflowStatus::EmAndamento => Self::EmAndamento,
            WorkflowStatus::Concluido => Self::Concluido,
        }
    }
}

impl TryFrom<OrderStatus> for WorkflowStatus {
    type Error = ProtocolError;

    fn try_from(status: OrderStatus) -> Result<Self> {
        match status {
            OrderStatus::Pendente => Ok(Self::Pendente),
            OrderStatus::EmAndamento => Ok(Self::EmAndamento),
            OrderStatus::Concluido => Ok(Self::Concluido),
            OrderStatus::Cancelado => Err(ProtocolError::OutOfScopeStatus(status)),
        }
    }
}

/// A status value with its family erased, as sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityStatus {
    Binary(BinaryStatus),
    Workflow(WorkflowStatus),
}

impl EntityStatus {
    /// The wire code of the wrapped value.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Binary(s) => s.code(),
            Self::Workflow(s) => s.code(),
        }
    }

    /// The family of the wrapped value.
    #[must_use]
    pub fn family(self) -> StatusFamily {
        match self {
            Self::Binary(_) => StatusFamily::Binary,
            Self::Workflow(_) => StatusFamily::Workflow,
        }
    }

    /// Parses a wire code such as `"INATIVO"` or `"EM_ANDAMENTO"`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownStatusCode`] if the code names no
    /// in-scope status.
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_protocol::{EntityStatus, WorkflowStatus};
    ///
    /// let status = EntityStatus::from_code("concluido").unwrap();
    /// assert_eq!(status, EntityStatus::Workflow(WorkflowStatus::Concluido));
    /// assert!(EntityStatus::from_code("CANCELADO").is_err());
    /// ```
    pub fn from_code(code: &str) -> Result<Self> {
        let upper = code.trim().to_ascii_uppercase();
        BinaryStatus::all()
            .into_iter()
            .map(Self::Binary)
            .chain(WorkflowStatus::all().into_iter().map(Self::Workflow))
            .find(|status| status.code() == upper)
            .ok_or_else(|| ProtocolError::UnknownStatusCode(code.to_string()))
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An in-flight status change for one entity.
///
/// Exists only between the optimistic update and the settlement of the
/// remote commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChangeRequest<S> {
    /// The entity whose status changes.
    pub entity_id: EntityId,
    /// Status before the optimistic update.
    pub from: S,
    /// Requested status.
    pub to: S,
    /// When the user asked for the change.
    pub requested_at: DateTime<Utc>,
}

impl<S: Status> StatusChangeRequest<S> {
    /// Creates a request stamped with the current time.
    #[must_use]
    pub fn new(entity_id: EntityId, from: S, to: S) -> Self {
        Self {
            entity_id,
            from,
            to,
            requested_at: Utc::now(),
        }
    }
}
