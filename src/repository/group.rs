//! Group repository
//!
//! Persistence engines are out of scope; the shipped backend is
//! in-memory. A real deployment implements [`GroupRepository`] against
//! its own store.

use crate::domain::Group;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use validator::Validate;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Group>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Group>>;
    /// Create or update a group; the group is validated first
    async fn save(&self, group: Group) -> Result<Group>;
    async fn delete(&self, name: &str) -> Result<()>;
    /// All groups containing the given user
    async fn groups_for_user(&self, user_id: &str) -> Result<Vec<Group>>;
}

/// In-memory group store, keyed by group name
#[derive(Default)]
pub struct InMemoryGroupRepository {
    groups: RwLock<HashMap<String, Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn list(&self) -> Result<Vec<Group>> {
        let groups = self.groups.read().expect("group store poisoned");
        let mut all: Vec<Group> = groups.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Group>> {
        let groups = self.groups.read().expect("group store poisoned");
        Ok(groups.get(name).cloned())
    }

    async fn save(&self, group: Group) -> Result<Group> {
        group.validate()?;
        let mut groups = self.groups.write().expect("group store poisoned");
        groups.insert(group.name.clone(), group.clone());
        Ok(group)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut groups = self.groups.write().expect("group store poisoned");
        groups
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", name)))
    }

    async fn groups_for_user(&self, user_id: &str) -> Result<Vec<Group>> {
        let groups = self.groups.read().expect("group store poisoned");
        Ok(groups
            .values()
            .filter(|g| g.has_user(user_id))
            .cloned()
            .collect())
    }
}
