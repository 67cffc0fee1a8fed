//! Failure policies for status transitions.
//!
//! Screens disagree on what a failed commit should do to the optimistic
//! value, so each call site reads its policy from here instead of sharing a
//! hard-coded one.
//!
//! ```json5
//! {
//!   transitions: {
//!     board: "keep-optimistic",
//!     registry: {
//!       default: "revert",
//!       overrides: { dentist: "keep-optimistic" },
//!     },
//!   },
//! }
//! ```

use std::collections::BTreeMap;

use protolab_protocol::EntityKind;
use protolab_transition::{FailurePolicy, KindPolicies};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Failure policy per call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionsConfig {
    /// Policy for drag and menu moves on the order board.
    #[serde(default = "default_board_policy")]
    pub board: FailurePolicy,

    /// Policies for registry status pickers.
    #[serde(default)]
    pub registry: RegistryPolicyConfig,
}

fn default_board_policy() -> FailurePolicy {
    FailurePolicy::KeepOptimistic
}

impl Default for TransitionsConfig {
    fn default() -> Self {
        Self {
            board: default_board_policy(),
            registry: RegistryPolicyConfig::default(),
        }
    }
}

/// Registry policies: one default plus per-kind overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryPolicyConfig {
    /// Policy for kinds without an override.
    #[serde(default)]
    pub default: FailurePolicy,

    /// Per-kind overrides keyed by snake_case kind name (`dentist`,
    /// `clinic`, ...). Checked by [`RegistryPolicyConfig::validate`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, FailurePolicy>,
}

impl RegistryPolicyConfig {
    /// Resolves override keys to entity kinds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKind`] for the first key that names no
    /// entity kind.
    pub fn parsed_overrides(&self) -> Result<BTreeMap<EntityKind, FailurePolicy>> {
        self.overrides
            .iter()
            .map(|(name, policy)| {
                parse_kind(name)
                    .map(|kind| (kind, *policy))
                    .ok_or_else(|| ConfigError::InvalidKind(name.clone()))
            })
            .collect()
    }

    /// Validates override keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKind`] if a key is unknown.
    pub fn validate(&self) -> Result<()> {
        self.parsed_overrides()?;
        Ok(())
    }

    /// Converts into the lookup table the registry controller uses.
    /// Unknown keys are skipped; [`Config::load`](crate::Config::load)
    /// rejects them before this is reached.
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_config::RegistryPolicyConfig;
    /// use protolab_protocol::EntityKind;
    /// use protolab_transition::FailurePolicy;
    ///
    /// let mut config = RegistryPolicyConfig::default();
    /// config.overrides.insert("clinic".to_string(), FailurePolicy::KeepOptimistic);
    ///
    /// let policies = config.kind_policies();
    /// assert_eq!(policies.for_kind(EntityKind::Clinic), FailurePolicy::KeepOptimistic);
    /// assert_eq!(policies.for_kind(EntityKind::Prosthetist), FailurePolicy::Revert);
    /// ```
    #[must_use]
    pub fn kind_policies(&self) -> KindPolicies {
        let overrides = self
            .overrides
            .iter()
            .filter_map(|(name, policy)| parse_kind(name).map(|kind| (kind, *policy)))
            .collect();
        KindPolicies {
            default: self.default,
            overrides,
        }
    }
}

fn parse_kind(name: &str) -> Option<EntityKind> {
    EntityKind::all().into_iter().find(|kind| kind.key() == name)
}
