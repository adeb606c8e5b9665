//! Per-request evaluation context
//!
//! Immutable for the lifetime of a request: permission and visibility
//! checks are pure functions of this context plus the action definition.

use crate::domain::group::GroupSet;

/// Ambient request/actor state used by permission resolution
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Identifier of the requesting actor, if authenticated
    pub actor_id: Option<String>,
    /// Roles held by the actor
    pub roles: Vec<String>,
    /// The actor's resolved group memberships
    pub groups: GroupSet,
    /// Name of the resource being served by the current request
    pub resource: Option<String>,
}

impl RequestContext {
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            ..Default::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_groups(mut self, groups: GroupSet) -> Self {
        self.groups = groups;
        self
    }

    pub fn for_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}
