//! Data access layer (Repository pattern)

pub mod group;

pub use group::{GroupRepository, InMemoryGroupRepository};
