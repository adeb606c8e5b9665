//! Action permission resolution
//!
//! Three-tier precedence, evaluated per (mode, action, resource, actor):
//! group tier, explicit action-permission override, resource-level
//! default. All checks are pure over the sealed registry and the
//! per-request context.

use crate::domain::{PermissionMode, Record, RequestContext};
use crate::registry::{Action, Admin};
use std::sync::Arc;

impl Action {
    /// Group tier. When group-based authorization is enabled: exempt
    /// actions always pass, everything else defers to the actor's group
    /// allow-list for (belonged resource, action). When it is disabled
    /// this tier always passes.
    pub fn has_group_permission(&self, admin: &Admin, context: &RequestContext) -> bool {
        if admin.is_group_authorization_enabled() {
            if self.skip_group_control {
                return true;
            }
            return context
                .groups
                .has_resource_action_permission(&self.belonged_resource, &self.name);
        }

        true
    }

    /// Route-guard permission check.
    ///
    /// Evaluates the group tier first, then lets an explicit permission
    /// rule override it entirely. Re-running this after `is_allowed` on
    /// the same request yields the same answer: evaluation is pure with
    /// respect to (context, action).
    pub fn has_permission(
        &self,
        admin: &Admin,
        mode: PermissionMode,
        context: &RequestContext,
    ) -> bool {
        let mut result = self.has_group_permission(admin, context);

        if let Some(rule) = &self.permission {
            result = rule.has_permission(mode, &context.roles);
        }

        result
    }

    /// Full check for whether the actor may see and invoke this action.
    ///
    /// The visibility gate runs first and short-circuits permission
    /// entirely: with no records the predicate is consulted once in bulk
    /// context, otherwise once per record, and any `false` denies.
    ///
    /// Then: group tier, overridden by an explicit permission rule when
    /// present. The resource-level default is consulted only when there
    /// is no explicit rule and group authorization is globally disabled —
    /// when groups are enabled, a reachable action implies the resource
    /// is reachable, so falling back would only re-deny.
    pub fn is_allowed(
        &self,
        admin: &Admin,
        mode: PermissionMode,
        context: &RequestContext,
        records: &[Arc<dyn Record>],
    ) -> bool {
        if let Some(visible) = &self.visible {
            if records.is_empty() && !visible(None, context) {
                return false;
            }
            for record in records {
                if !visible(Some(record.as_ref()), context) {
                    return false;
                }
            }
        }

        let result = self.has_group_permission(admin, context);

        if let Some(rule) = &self.permission {
            return rule.has_permission(mode, &context.roles);
        }

        if let Some(resource_name) = &context.resource {
            if !admin.is_group_authorization_enabled() {
                if let Some(resource) = admin.resource(resource_name) {
                    return resource.has_permission(mode, context);
                }
            }
        }

        result
    }
}
