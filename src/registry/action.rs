//! Action definitions and registration merge rules

use crate::dispatch::ActionArgument;
use crate::domain::{PermissionRule, Record, RequestContext};
use crate::error::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

/// Record-aware URL producer; receives `None` in bulk context
pub type UrlFn = dyn Fn(Option<&dyn Record>, &RequestContext) -> String + Send + Sync;

/// Visibility predicate; receives `None` in bulk context
pub type VisibleFn = dyn Fn(Option<&dyn Record>, &RequestContext) -> bool + Send + Sync;

/// The operation an action performs when invoked
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn call(&self, argument: &mut ActionArgument) -> Result<()>;
}

/// Wrap a synchronous closure as an [`ActionHandler`]
pub fn handler_fn<F>(f: F) -> Arc<dyn ActionHandler>
where
    F: Fn(&mut ActionArgument) -> Result<()> + Send + Sync + 'static,
{
    struct SyncHandler<F>(F);

    #[async_trait]
    impl<F> ActionHandler for SyncHandler<F>
    where
        F: Fn(&mut ActionArgument) -> Result<()> + Send + Sync,
    {
        async fn call(&self, argument: &mut ActionArgument) -> Result<()> {
            (self.0)(argument)
        }
    }

    Arc::new(SyncHandler(f))
}

/// HTTP method an action is invoked with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMethod {
    Get,
    Put,
}

impl ActionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionMethod::Get => "GET",
            ActionMethod::Put => "PUT",
        }
    }
}

impl std::fmt::Display for ActionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display hint for how the action's target opens; not authorization-relevant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlOpenType {
    Bottomsheet,
    NewTab,
}

impl UrlOpenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlOpenType::Bottomsheet => "bottomsheet",
            UrlOpenType::NewTab => "_blank",
        }
    }
}

/// Context in which an action may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    Index,
    Show,
    Edit,
    MenuItem,
}

impl ActionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionMode::Index => "index",
            ActionMode::Show => "show",
            ActionMode::Edit => "edit",
            ActionMode::MenuItem => "menu_item",
        }
    }
}

/// A registered action: a named bulk or single-record operation
#[derive(Clone)]
pub struct Action {
    pub name: String,
    pub label: String,
    pub method: ActionMethod,
    pub url: Option<Arc<UrlFn>>,
    pub url_open_type: Option<UrlOpenType>,
    pub visible: Option<Arc<VisibleFn>>,
    pub handler: Option<Arc<dyn ActionHandler>>,
    pub modes: Vec<ActionMode>,
    /// When set, the action is a bulk/record action on a different
    /// resource than the one it is registered on
    pub target_resource: Option<String>,
    pub permission: Option<PermissionRule>,
    pub skip_group_control: bool,
    /// The resource this action was registered under; used for group
    /// permission lookups. Distinct from `target_resource`.
    pub(crate) belonged_resource: String,
}

impl Action {
    pub fn belonged_resource(&self) -> &str {
        &self.belonged_resource
    }

    /// Normalized parameter form of the action name, used in routes
    pub fn to_param(&self) -> String {
        to_param_string(&self.name)
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("method", &self.method)
            .field("url", &self.url.is_some())
            .field("url_open_type", &self.url_open_type)
            .field("visible", &self.visible.is_some())
            .field("handler", &self.handler.is_some())
            .field("modes", &self.modes)
            .field("target_resource", &self.target_resource)
            .field("permission", &self.permission)
            .field("skip_group_control", &self.skip_group_control)
            .field("belonged_resource", &self.belonged_resource)
            .finish()
    }
}

/// Incoming action registration.
///
/// Every overridable field carries an explicit "was this supplied" marker
/// (`Option` / non-empty `Vec`): re-registering an existing name merges by
/// replacing only the fields marked present.
#[derive(Default)]
pub struct ActionDefinition {
    pub name: String,
    pub label: Option<String>,
    pub method: Option<ActionMethod>,
    pub url: Option<Arc<UrlFn>>,
    pub url_open_type: Option<UrlOpenType>,
    pub visible: Option<Arc<VisibleFn>>,
    pub handler: Option<Arc<dyn ActionHandler>>,
    pub modes: Vec<ActionMode>,
    pub target_resource: Option<String>,
    pub permission: Option<PermissionRule>,
    pub skip_group_control: bool,
}

impl ActionDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn method(mut self, method: ActionMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn url<F>(mut self, url: F) -> Self
    where
        F: Fn(Option<&dyn Record>, &RequestContext) -> String + Send + Sync + 'static,
    {
        self.url = Some(Arc::new(url));
        self
    }

    pub fn url_open_type(mut self, open_type: UrlOpenType) -> Self {
        self.url_open_type = Some(open_type);
        self
    }

    pub fn visible<F>(mut self, visible: F) -> Self
    where
        F: Fn(Option<&dyn Record>, &RequestContext) -> bool + Send + Sync + 'static,
    {
        self.visible = Some(Arc::new(visible));
        self
    }

    pub fn handler(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn modes(mut self, modes: &[ActionMode]) -> Self {
        self.modes = modes.to_vec();
        self
    }

    pub fn target_resource(mut self, resource: impl Into<String>) -> Self {
        self.target_resource = Some(resource.into());
        self
    }

    pub fn permission(mut self, rule: PermissionRule) -> Self {
        self.permission = Some(rule);
        self
    }

    pub fn skip_group_control(mut self) -> Self {
        self.skip_group_control = true;
        self
    }

    /// Build a fresh action from this definition, applying the defaulting
    /// rules for label, method and URL open type.
    pub(crate) fn into_action(self, belonged_resource: &str) -> Action {
        let label = self.label.unwrap_or_else(|| humanize(&self.name));
        let method = self.method.unwrap_or(if self.url.is_some() {
            ActionMethod::Get
        } else {
            ActionMethod::Put
        });
        let url_open_type = self.url_open_type.or({
            if self.target_resource.is_some() {
                Some(UrlOpenType::Bottomsheet)
            } else if method == ActionMethod::Get {
                Some(UrlOpenType::NewTab)
            } else {
                None
            }
        });

        Action {
            name: self.name,
            label,
            method,
            url: self.url,
            url_open_type,
            visible: self.visible,
            handler: self.handler,
            modes: self.modes,
            target_resource: self.target_resource,
            permission: self.permission,
            skip_group_control: self.skip_group_control,
            belonged_resource: belonged_resource.to_string(),
        }
    }

    /// Merge into an existing action: only fields supplied here overwrite.
    pub(crate) fn merge_into(self, existing: &mut Action, belonged_resource: &str) {
        if let Some(label) = self.label {
            existing.label = label;
        }
        if let Some(method) = self.method {
            existing.method = method;
        }
        if let Some(url) = self.url {
            existing.url = Some(url);
        }
        if let Some(open_type) = self.url_open_type {
            existing.url_open_type = Some(open_type);
        }
        if let Some(visible) = self.visible {
            existing.visible = Some(visible);
        }
        if let Some(handler) = self.handler {
            existing.handler = Some(handler);
        }
        if !self.modes.is_empty() {
            existing.modes = self.modes;
        }
        if let Some(target) = self.target_resource {
            existing.target_resource = Some(target);
        }
        if let Some(permission) = self.permission {
            existing.permission = Some(permission);
        }
        existing.belonged_resource = belonged_resource.to_string();
    }
}

lazy_static! {
    static ref PARAM_SANITIZER: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Normalized route-parameter form: camel split, lowercased, runs of
/// non-alphanumerics collapsed to `_`
pub(crate) fn to_param_string(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() && !spaced.is_empty() && !spaced.ends_with(' ') {
            spaced.push(' ');
        }
        spaced.extend(ch.to_lowercase());
    }
    PARAM_SANITIZER
        .replace_all(&spaced, "_")
        .trim_matches('_')
        .to_string()
}

/// Human-readable form of an identifier: camel/underscore split with each
/// word capitalized
pub(crate) fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if ch.is_uppercase()
            && current
                .chars()
                .last()
                .is_some_and(|c| c.is_lowercase() || c.is_ascii_digit())
        {
            words.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("ship"), "Ship");
        assert_eq!(humanize("CancelOrder"), "Cancel Order");
        assert_eq!(humanize("publish_all"), "Publish All");
        assert_eq!(humanize("mark as_Paid"), "Mark As Paid");
    }

    #[test]
    fn test_to_param_string() {
        assert_eq!(to_param_string("Ship"), "ship");
        assert_eq!(to_param_string("CancelOrder"), "cancel_order");
        assert_eq!(to_param_string("Mark as Paid!"), "mark_as_paid");
        assert_eq!(to_param_string("publish_all"), "publish_all");
    }

    #[test]
    fn test_default_label_and_method() {
        let action = ActionDefinition::new("CancelOrder").into_action("Order");
        assert_eq!(action.label, "Cancel Order");
        assert_eq!(action.method, ActionMethod::Put);
        assert_eq!(action.url_open_type, None);
    }

    #[test]
    fn test_url_implies_get_and_new_tab() {
        let action = ActionDefinition::new("Export")
            .url(|_, _| "/exports/latest".to_string())
            .into_action("Order");
        assert_eq!(action.method, ActionMethod::Get);
        assert_eq!(action.url_open_type, Some(UrlOpenType::NewTab));
    }

    #[test]
    fn test_cross_resource_defaults_to_bottomsheet() {
        let action = ActionDefinition::new("Attach")
            .target_resource("Document")
            .into_action("Order");
        assert_eq!(action.url_open_type, Some(UrlOpenType::Bottomsheet));
    }

    #[test]
    fn test_merge_preserves_unsupplied_fields() {
        let mut existing = ActionDefinition::new("Ship")
            .label("Ship It")
            .visible(|_, _| true)
            .permission(PermissionRule::allow(
                crate::domain::PermissionMode::Update,
                &["admin"],
            ))
            .into_action("Order");

        ActionDefinition::new("Ship")
            .label("Ship Now")
            .merge_into(&mut existing, "Order");

        assert_eq!(existing.label, "Ship Now");
        assert!(existing.visible.is_some());
        assert!(existing.permission.is_some());
        assert_eq!(existing.method, ActionMethod::Put);
    }

    #[test]
    fn test_to_param_matches_action() {
        let action = ActionDefinition::new("Mark as Paid").into_action("Order");
        assert_eq!(action.to_param(), "mark_as_paid");
    }
}
