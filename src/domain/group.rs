//! Group domain model and group-based permission evaluation
//!
//! A group names a set of users and carries an explicit allow-list over
//! (resource, action) pairs. Resource-level and action-level grants are
//! independent flags; absence of an entry denies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use validator::Validate;

/// A named set of actors sharing a resource/action allow-list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Group {
    pub id: Uuid,
    #[validate(custom(function = "validate_group_name"))]
    pub name: String,
    /// User identifiers; a non-owning association by ID
    pub users: HashSet<String>,
    /// Per-resource grants, keyed by resource name
    pub resource_permissions: HashMap<String, ResourceGrant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One group's grant against a single resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceGrant {
    /// Resource-level allow flag
    pub allowed: bool,
    /// Per-action overrides within the resource
    pub actions: HashMap<String, bool>,
}

fn validate_group_name(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        Err(validator::ValidationError::new("blank_group_name"))
    } else {
        Ok(())
    }
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            users: HashSet::new(),
            resource_permissions: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_user(&mut self, user_id: impl Into<String>) -> &mut Self {
        self.users.insert(user_id.into());
        self
    }

    pub fn remove_user(&mut self, user_id: &str) -> &mut Self {
        self.users.remove(user_id);
        self
    }

    pub fn has_user(&self, user_id: &str) -> bool {
        self.users.contains(user_id)
    }

    /// Grant or revoke resource-level access
    pub fn set_resource_allowed(&mut self, resource: &str, allowed: bool) -> &mut Self {
        self.resource_permissions
            .entry(resource.to_string())
            .or_default()
            .allowed = allowed;
        self
    }

    /// Grant or revoke a single action within a resource
    pub fn set_action_allowed(&mut self, resource: &str, action: &str, allowed: bool) -> &mut Self {
        self.resource_permissions
            .entry(resource.to_string())
            .or_default()
            .actions
            .insert(action.to_string(), allowed);
        self
    }

    /// Does this group grant resource-level access? Absence denies.
    pub fn has_resource_permission(&self, resource: &str) -> bool {
        self.resource_permissions
            .get(resource)
            .map(|grant| grant.allowed)
            .unwrap_or(false)
    }

    /// Does this group grant the given action? Independent of the
    /// resource-level flag; absence denies.
    pub fn has_resource_action_permission(&self, resource: &str, action: &str) -> bool {
        self.resource_permissions
            .get(resource)
            .and_then(|grant| grant.actions.get(action))
            .copied()
            .unwrap_or(false)
    }
}

/// The requesting actor's group memberships.
///
/// Authorization is a union: a pair is allowed if any of the actor's
/// groups grants it.
#[derive(Debug, Clone, Default)]
pub struct GroupSet {
    groups: Vec<Group>,
}

impl GroupSet {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn has_resource_permission(&self, resource: &str) -> bool {
        self.groups.iter().any(|g| g.has_resource_permission(resource))
    }

    pub fn has_resource_action_permission(&self, resource: &str, action: &str) -> bool {
        self.groups
            .iter()
            .any(|g| g.has_resource_action_permission(resource, action))
    }
}

/// Snapshot of one group's grants against a single resource, used for
/// editing and for the runtime allow-list check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePermission {
    pub name: String,
    pub allowed: bool,
    pub actions: Vec<ResourceActionPermission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceActionPermission {
    pub name: String,
    pub allowed: bool,
}
