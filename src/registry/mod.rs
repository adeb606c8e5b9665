//! Resource/action registry with a two-phase lifecycle
//!
//! Registration happens on a mutable [`AdminBuilder`] during startup;
//! [`AdminBuilder::seal`] produces an immutable [`Admin`] that is shared
//! by reference for the lifetime of the process. After sealing no locking
//! is needed for concurrent reads.

pub mod action;

pub use action::{
    handler_fn, Action, ActionDefinition, ActionHandler, ActionMethod, ActionMode, UrlOpenType,
};

use crate::config::AdminConfig;
use crate::domain::{Menu, PermissionMode, PermissionRule, RequestContext};
use crate::error::{AppError, Result};

/// Registration-time configuration of a resource
#[derive(Debug, Clone, Default)]
pub struct ResourceConfig {
    pub name: String,
    /// URL segment; defaults to the normalized name
    pub param: Option<String>,
    /// Hidden resources are omitted from the catalog
    pub invisible: bool,
    /// Exempt from group-based permission control
    pub skip_group_control: bool,
    /// Resource-level default permission rule
    pub permission: Option<PermissionRule>,
}

impl ResourceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A CRUD-managed entity type registered with the admin system
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub param: String,
    pub invisible: bool,
    pub skip_group_control: bool,
    pub permission: Option<PermissionRule>,
    actions: Vec<Action>,
}

impl Resource {
    fn new(config: ResourceConfig) -> Self {
        let param = config
            .param
            .unwrap_or_else(|| action::to_param_string(&config.name));
        Self {
            name: config.name,
            param,
            invisible: config.invisible,
            skip_group_control: config.skip_group_control,
            permission: config.permission,
            actions: Vec::new(),
        }
    }

    /// All registered actions, in registration order
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Look up a registered action by name
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Resource-level default permission check; unconstrained resources
    /// allow everyone
    pub fn has_permission(&self, mode: PermissionMode, context: &RequestContext) -> bool {
        match &self.permission {
            Some(rule) => rule.has_permission(mode, &context.roles),
            None => true,
        }
    }
}

/// One URL pattern registered for an action
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: ActionMethod,
    pub path: String,
    pub resource: String,
    pub action: String,
    /// Whether the route addresses a single record (carries an `{id}`
    /// path parameter) or a bulk selection
    pub single_record: bool,
    /// Permission mode the route guard checks via the action itself
    pub permission_mode: PermissionMode,
}

/// Router collaborator boundary: receives each action route as it is
/// registered
pub trait RouteBinder {
    fn register_route(&mut self, entry: RouteEntry);
}

/// Default recording binder; the HTTP layer replays it onto the router
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }
}

impl RouteBinder for RouteTable {
    fn register_route(&mut self, entry: RouteEntry) {
        self.entries.push(entry);
    }
}

/// Mutable registry, open for registration
#[derive(Default)]
pub struct AdminBuilder {
    resources: Vec<Resource>,
    menus: Vec<Menu>,
    group_authorization_enabled: bool,
    routes: RouteTable,
}

impl AdminBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded from configuration: `ADMIN_GROUP_AUTHORIZATION`
    /// controls the system-wide group toggle
    pub fn from_config(config: &AdminConfig) -> Self {
        let mut builder = Self::new();
        builder.enable_group_authorization(config.group_authorization_enabled);
        builder
    }

    /// Enable or disable group-based authorization system-wide
    pub fn enable_group_authorization(&mut self, enabled: bool) -> &mut Self {
        self.group_authorization_enabled = enabled;
        self
    }

    /// Register a resource. Names are unique.
    pub fn add_resource(&mut self, config: ResourceConfig) -> Result<&Resource> {
        if self.resources.iter().any(|r| r.name == config.name) {
            return Err(AppError::Conflict(format!(
                "Resource {} is already registered",
                config.name
            )));
        }
        self.resources.push(Resource::new(config));
        Ok(self.resources.last().expect("just pushed"))
    }

    /// Add a top-level menu node
    pub fn add_menu(&mut self, menu: Menu) -> &mut Self {
        self.menus.push(menu);
        self
    }

    /// Register an action on a resource.
    ///
    /// If an action with the same name already exists, only the supplied
    /// fields of `definition` overwrite it, ownership is re-bound to the
    /// resource, and no routes are registered. A new action gets its
    /// defaults computed and its routes recorded: cross-resource actions
    /// get GET bulk and single-record paths, actions with a handler get
    /// the same two paths under PUT. Both are guarded by the action
    /// itself in `Update` mode.
    ///
    /// Returns the fully merged action, so callers always observe the
    /// complete state, not just the fields they supplied.
    pub fn register_action(
        &mut self,
        resource_name: &str,
        definition: ActionDefinition,
    ) -> Result<Action> {
        let resource = self
            .resources
            .iter_mut()
            .find(|r| r.name == resource_name)
            .ok_or_else(|| {
                AppError::NotFound(format!("Resource {} is not registered", resource_name))
            })?;

        if let Some(existing) = resource
            .actions
            .iter_mut()
            .find(|a| a.name == definition.name)
        {
            definition.merge_into(existing, resource_name);
            return Ok(existing.clone());
        }

        let action = definition.into_action(resource_name);
        let param = action.to_param();
        let bulk_path = format!("/{}/!action/{}", resource.param, param);
        let single_path = format!("/{}/{{id}}/{}", resource.param, param);

        if action.target_resource.is_some() {
            for (path, single_record) in [(&bulk_path, false), (&single_path, true)] {
                self.routes.register_route(RouteEntry {
                    method: ActionMethod::Get,
                    path: path.clone(),
                    resource: resource.name.clone(),
                    action: action.name.clone(),
                    single_record,
                    permission_mode: PermissionMode::Update,
                });
            }
        }

        if action.handler.is_some() {
            for (path, single_record) in [(&bulk_path, false), (&single_path, true)] {
                self.routes.register_route(RouteEntry {
                    method: ActionMethod::Put,
                    path: path.clone(),
                    resource: resource.name.clone(),
                    action: action.name.clone(),
                    single_record,
                    permission_mode: PermissionMode::Update,
                });
            }
        }

        resource.actions.push(action.clone());
        Ok(action)
    }

    /// Seal the registry: registration ends, request serving begins
    pub fn seal(self) -> Admin {
        Admin {
            resources: self.resources,
            menus: self.menus,
            group_authorization_enabled: self.group_authorization_enabled,
            routes: self.routes,
        }
    }
}

/// Sealed, read-only registry shared across requests
#[derive(Debug, Clone)]
pub struct Admin {
    resources: Vec<Resource>,
    menus: Vec<Menu>,
    group_authorization_enabled: bool,
    routes: RouteTable,
}

impl Admin {
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn is_group_authorization_enabled(&self) -> bool {
        self.group_authorization_enabled
    }

    pub fn routes(&self) -> &[RouteEntry] {
        self.routes.entries()
    }
}
