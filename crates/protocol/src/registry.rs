//! Registry entities with a binary status.
//!
//! Dentists, prosthetists, patients, clinics, services and materials are all
//! plain records whose only state machine is `Ativo` / `Inativo`.

use serde::{Deserialize, Serialize};

use crate::status::{BinaryStatus, EntityId};

/// The kind of registry entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Dentist,
    Prosthetist,
    Patient,
    Clinic,
    Service,
    Material,
}

impl EntityKind {
    /// Returns all kinds in display order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Dentist,
            Self::Prosthetist,
            Self::Patient,
            Self::Clinic,
            Self::Service,
            Self::Material,
        ]
    }

    /// Plural heading used by the registry view.
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_protocol::EntityKind;
    ///
    /// assert_eq!(EntityKind::Prosthetist.heading(), "Protéticos");
    /// ```
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Dentist => "Dentistas",
            Self::Prosthetist => "Protéticos",
            Self::Patient => "Pacientes",
            Self::Clinic => "Clínicas",
            Self::Service => "Serviços",
            Self::Material => "Materiais",
        }
    }

    /// The snake_case key used in configuration files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Dentist => "dentist",
            Self::Prosthetist => "prosthetist",
            Self::Patient => "patient",
            Self::Clinic => "clinic",
            Self::Service => "service",
            Self::Material => "material",
        }
    }
}

/// One row in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Unique identifier.
    pub id: EntityId,
    /// What the entry is.
    pub kind: EntityKind,
    /// Display name.
    pub name: String,
    /// Current binary status.
    #[serde(default)]
    pub status: BinaryStatus,
}

impl RegistryEntry {
    /// Creates an active entry with a fresh ID.
    #[must_use]
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new_v4(),
            kind,
            name: name.into(),
            status: BinaryStatus::Ativo,
        }
    }

    /// Sets the status, builder-style.
    #[must_use]
    pub fn with_status(mut self, status: BinaryStatus) -> Self {
        self.status = status;
        self
    }
}

/// Sorts entries by kind, then by name, which is the order the registry
/// view lists them in.
pub fn sort_entries(entries: &mut [RegistryEntry]) {
    entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
}
