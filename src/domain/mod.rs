//! Domain models: permission rules, groups, menus, records

pub mod context;
pub mod group;
pub mod menu;
pub mod permission;
pub mod record;

pub use context::RequestContext;
pub use group::{Group, GroupSet, ResourceActionPermission, ResourceGrant, ResourcePermission};
pub use menu::Menu;
pub use permission::{PermissionMode, PermissionRule, ANYONE};
pub use record::Record;
