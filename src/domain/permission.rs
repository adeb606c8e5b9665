//! Role-based permission rules
//!
//! A `PermissionRule` holds per-mode allow and deny role sets. `Crud` acts
//! as an umbrella mode: a rule registered under `Crud` applies to any of
//! the four CRUD modes that has no rule of its own.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Wildcard role matching every actor
pub const ANYONE: &str = "*";

/// The permission category being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    Read,
    Create,
    Update,
    Delete,
    Crud,
}

impl PermissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionMode::Read => "read",
            PermissionMode::Create => "create",
            PermissionMode::Update => "update",
            PermissionMode::Delete => "delete",
            PermissionMode::Crud => "crud",
        }
    }
}

impl std::fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A boolean-evaluable rule over (operation mode, actor roles)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionRule {
    allowed: HashMap<PermissionMode, HashSet<String>>,
    denied: HashMap<PermissionMode, HashSet<String>>,
}

impl PermissionRule {
    /// Start a rule allowing `roles` for `mode`
    pub fn allow(mode: PermissionMode, roles: &[&str]) -> Self {
        Self::default().also_allow(mode, roles)
    }

    /// Start a rule denying `roles` for `mode`
    pub fn deny(mode: PermissionMode, roles: &[&str]) -> Self {
        Self::default().also_deny(mode, roles)
    }

    pub fn also_allow(mut self, mode: PermissionMode, roles: &[&str]) -> Self {
        self.allowed
            .entry(mode)
            .or_default()
            .extend(roles.iter().map(|r| r.to_string()));
        self
    }

    pub fn also_deny(mut self, mode: PermissionMode, roles: &[&str]) -> Self {
        self.denied
            .entry(mode)
            .or_default()
            .extend(roles.iter().map(|r| r.to_string()));
        self
    }

    /// Check whether an actor holding `roles` passes this rule for `mode`.
    ///
    /// An allow-list for the mode is authoritative when present: the actor
    /// must hold one of the listed roles (or the list must contain
    /// `ANYONE`). Otherwise a deny-list for the mode rejects matching
    /// actors, and an unconstrained mode passes.
    pub fn has_permission(&self, mode: PermissionMode, roles: &[String]) -> bool {
        if let Some(allowed) = self.roles_for(&self.allowed, mode) {
            return allowed.contains(ANYONE) || roles.iter().any(|r| allowed.contains(r));
        }

        if let Some(denied) = self.roles_for(&self.denied, mode) {
            if denied.contains(ANYONE) || roles.iter().any(|r| denied.contains(r)) {
                return false;
            }
        }

        true
    }

    /// Role set registered for `mode`, falling back to the `Crud` umbrella
    fn roles_for<'a>(
        &self,
        map: &'a HashMap<PermissionMode, HashSet<String>>,
        mode: PermissionMode,
    ) -> Option<&'a HashSet<String>> {
        map.get(&mode)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                if mode != PermissionMode::Crud {
                    map.get(&PermissionMode::Crud).filter(|s| !s.is_empty())
                } else {
                    None
                }
            })
    }
}
