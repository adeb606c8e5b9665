//! Action dispatch: permission resolution, record loading, invocation

use crate::domain::{PermissionMode, Record, RequestContext};
use crate::error::{AppError, Result};
use crate::query::{QueryCriteria, ResourceQuery, UNPAGINATED};
use crate::registry::{Action, Admin};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-invocation argument handed to the action handler.
///
/// Constructed per request and discarded after the handler returns.
pub struct ActionArgument {
    /// Primary-key strings identifying the target records
    pub primary_values: Vec<String>,
    /// Ambient request/actor state
    pub context: RequestContext,
    /// Handler-specific payload
    pub argument: Option<serde_json::Value>,
    /// Set by the handler to suppress the default post-handler response
    pub skip_default_response: bool,
    /// Records resolved from `primary_values`, populated before the
    /// handler runs
    pub records: Vec<Arc<dyn Record>>,
}

impl ActionArgument {
    pub fn new(context: RequestContext) -> Self {
        Self {
            primary_values: Vec::new(),
            context,
            argument: None,
            skip_default_response: false,
            records: Vec::new(),
        }
    }

    pub fn with_primary_values(mut self, values: Vec<String>) -> Self {
        self.primary_values = values;
        self
    }

    pub fn with_argument(mut self, argument: serde_json::Value) -> Self {
        self.argument = Some(argument);
        self
    }
}

/// Outcome of a successful invocation
#[derive(Debug, Clone, Copy)]
pub struct DispatchOutcome {
    pub skip_default_response: bool,
}

/// Resolved action plus the records it applies to, after authorization
pub struct ResolvedAction {
    pub action: Action,
    pub records: Vec<Arc<dyn Record>>,
}

/// Given an invocation request, resolves permission, loads target
/// records, and invokes the action handler.
pub struct ActionDispatcher {
    admin: Arc<Admin>,
    queries: HashMap<String, Arc<dyn ResourceQuery>>,
}

impl ActionDispatcher {
    pub fn new(admin: Arc<Admin>) -> Self {
        Self {
            admin,
            queries: HashMap::new(),
        }
    }

    /// Attach the query collaborator for a resource
    pub fn register_query(&mut self, resource: &str, query: Arc<dyn ResourceQuery>) -> &mut Self {
        self.queries.insert(resource.to_string(), query);
        self
    }

    pub fn admin(&self) -> &Admin {
        &self.admin
    }

    /// Find the records selected by a bulk/single action.
    ///
    /// Empty primary values return an empty set without issuing a query.
    /// Query failures are swallowed to an empty set: callers must treat
    /// an empty result as ambiguous and consult the collaborator's own
    /// error channel when they need fault visibility.
    pub async fn find_selected_records(
        &self,
        resource: &str,
        argument: &ActionArgument,
    ) -> Vec<Arc<dyn Record>> {
        if argument.primary_values.is_empty() {
            return Vec::new();
        }

        let Some(query) = self.queries.get(resource) else {
            tracing::warn!("no query collaborator registered for resource {}", resource);
            return Vec::new();
        };

        let clauses = argument
            .primary_values
            .iter()
            .map(|value| query.to_primary_query_params(value, &argument.context))
            .collect();
        let criteria = QueryCriteria {
            clauses,
            current_page: UNPAGINATED,
        };

        match query.find_many(&criteria, &argument.context).await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("selected record query failed for {}: {}", resource, err);
                Vec::new()
            }
        }
    }

    /// Resolve the action and its target records, then authorize.
    ///
    /// Denial is translated into an HTTP-forbidden error here; it is not
    /// an error channel inside permission resolution itself.
    pub async fn authorize(
        &self,
        resource_name: &str,
        action_name: &str,
        argument: &ActionArgument,
    ) -> Result<ResolvedAction> {
        let resource = self.admin.resource(resource_name).ok_or_else(|| {
            AppError::NotFound(format!("Resource {} is not registered", resource_name))
        })?;
        let action = resource.action(action_name).ok_or_else(|| {
            AppError::NotFound(format!(
                "Action {} is not registered on {}",
                action_name, resource_name
            ))
        })?;

        let records = self.find_selected_records(resource_name, argument).await;

        if !action.is_allowed(
            &self.admin,
            PermissionMode::Update,
            &argument.context,
            &records,
        ) {
            return Err(AppError::Forbidden(format!(
                "Not allowed to run action {}",
                action_name
            )));
        }

        Ok(ResolvedAction {
            action: action.clone(),
            records,
        })
    }

    /// Authorize and run the action handler.
    ///
    /// Handler errors propagate unchanged; actions are never retried.
    pub async fn invoke(
        &self,
        resource_name: &str,
        action_name: &str,
        mut argument: ActionArgument,
    ) -> Result<DispatchOutcome> {
        let resolved = self.authorize(resource_name, action_name, &argument).await?;

        let handler = resolved.action.handler.clone().ok_or_else(|| {
            AppError::BadRequest(format!("Action {} has no handler", action_name))
        })?;

        argument.records = resolved.records;
        handler.call(&mut argument).await?;

        tracing::debug!(
            resource = resource_name,
            action = action_name,
            records = argument.records.len(),
            "action invoked"
        );

        Ok(DispatchOutcome {
            skip_default_response: argument.skip_default_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Group, GroupSet, PermissionRule};
    use crate::query::{MockResourceQuery, QueryClause};
    use crate::registry::{handler_fn, ActionDefinition, AdminBuilder, ResourceConfig};
    use serde_json::json;
    use std::sync::Mutex;

    struct Order {
        id: u64,
    }

    impl Record for Order {
        fn primary_key(&self) -> String {
            self.id.to_string()
        }

        fn kind(&self) -> &str {
            "Order"
        }
    }

    fn admin_with_ship(groups_enabled: bool) -> Arc<Admin> {
        let mut builder = AdminBuilder::new();
        builder.enable_group_authorization(groups_enabled);
        builder.add_resource(ResourceConfig::new("Order")).unwrap();
        builder
            .register_action(
                "Order",
                ActionDefinition::new("Ship").handler(handler_fn(|argument| {
                    if argument.argument == Some(json!({"fail": true})) {
                        return Err(AppError::BadRequest("carrier rejected".to_string()));
                    }
                    Ok(())
                })),
            )
            .unwrap();
        Arc::new(builder.seal())
    }

    fn context() -> RequestContext {
        RequestContext::new("u1").for_resource("Order")
    }

    #[tokio::test]
    async fn test_empty_primary_values_issue_no_query() {
        let mut query = MockResourceQuery::new();
        query.expect_find_many().times(0);
        query.expect_to_primary_query_params().times(0);

        let mut dispatcher = ActionDispatcher::new(admin_with_ship(false));
        dispatcher.register_query("Order", Arc::new(query));

        let argument = ActionArgument::new(context());
        let records = dispatcher.find_selected_records("Order", &argument).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_selected_records_or_combined_and_unpaginated() {
        let mut query = MockResourceQuery::new();
        query
            .expect_to_primary_query_params()
            .times(2)
            .returning(|value, _| QueryClause {
                predicate: "id = ?".to_string(),
                params: vec![json!(value)],
            });
        query
            .expect_find_many()
            .withf(|criteria, _| {
                criteria.combined_predicate() == "id = ? OR id = ?"
                    && criteria.current_page == UNPAGINATED
            })
            .returning(|_, _| {
                Ok(vec![
                    Arc::new(Order { id: 1 }) as Arc<dyn Record>,
                    Arc::new(Order { id: 2 }) as Arc<dyn Record>,
                ])
            });

        let mut dispatcher = ActionDispatcher::new(admin_with_ship(false));
        dispatcher.register_query("Order", Arc::new(query));

        let argument = ActionArgument::new(context())
            .with_primary_values(vec!["1".to_string(), "2".to_string()]);
        let records = dispatcher.find_selected_records("Order", &argument).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].primary_key(), "1");
    }

    #[tokio::test]
    async fn test_query_failure_swallowed_to_empty_set() {
        let mut query = MockResourceQuery::new();
        query
            .expect_to_primary_query_params()
            .returning(|value, _| QueryClause {
                predicate: "id = ?".to_string(),
                params: vec![json!(value)],
            });
        query
            .expect_find_many()
            .returning(|_, _| Err(AppError::Internal(anyhow::anyhow!("connection reset"))));

        let mut dispatcher = ActionDispatcher::new(admin_with_ship(false));
        dispatcher.register_query("Order", Arc::new(query));

        let argument =
            ActionArgument::new(context()).with_primary_values(vec!["1".to_string()]);
        let records = dispatcher.find_selected_records("Order", &argument).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_runs_handler() {
        let dispatcher = ActionDispatcher::new(admin_with_ship(false));
        let outcome = dispatcher
            .invoke("Order", "Ship", ActionArgument::new(context()))
            .await
            .unwrap();
        assert!(!outcome.skip_default_response);
    }

    #[tokio::test]
    async fn test_invoke_translates_denial_to_forbidden() {
        // Groups enabled, actor belongs to no granting group
        let dispatcher = ActionDispatcher::new(admin_with_ship(true));
        let err = dispatcher
            .invoke("Order", "Ship", ActionArgument::new(context()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_invoke_allowed_via_group_grant() {
        let dispatcher = ActionDispatcher::new(admin_with_ship(true));

        let mut group = Group::new("shipping");
        group.add_user("u1");
        group.set_action_allowed("Order", "Ship", true);
        let ctx = RequestContext::new("u1")
            .with_groups(GroupSet::new(vec![group]))
            .for_resource("Order");

        dispatcher
            .invoke("Order", "Ship", ActionArgument::new(ctx))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invoke_unknown_action() {
        let dispatcher = ActionDispatcher::new(admin_with_ship(false));
        let err = dispatcher
            .invoke("Order", "Refund", ActionArgument::new(context()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invoke_without_handler_is_bad_request() {
        let mut builder = AdminBuilder::new();
        builder.add_resource(ResourceConfig::new("Order")).unwrap();
        builder
            .register_action(
                "Order",
                ActionDefinition::new("Export").url(|_, _| "/export".to_string()),
            )
            .unwrap();
        let dispatcher = ActionDispatcher::new(Arc::new(builder.seal()));

        let err = dispatcher
            .invoke("Order", "Export", ActionArgument::new(context()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let dispatcher = ActionDispatcher::new(admin_with_ship(false));
        let argument = ActionArgument::new(context()).with_argument(json!({"fail": true}));
        let err = dispatcher.invoke("Order", "Ship", argument).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_handler_sees_resolved_records() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut builder = AdminBuilder::new();
        builder.add_resource(ResourceConfig::new("Order")).unwrap();
        builder
            .register_action(
                "Order",
                ActionDefinition::new("Ship").handler(handler_fn(move |argument| {
                    let mut seen = sink.lock().unwrap();
                    seen.extend(argument.records.iter().map(|r| r.primary_key()));
                    argument.skip_default_response = true;
                    Ok(())
                })),
            )
            .unwrap();

        let mut query = MockResourceQuery::new();
        query
            .expect_to_primary_query_params()
            .returning(|value, _| QueryClause {
                predicate: "id = ?".to_string(),
                params: vec![json!(value)],
            });
        query
            .expect_find_many()
            .returning(|_, _| Ok(vec![Arc::new(Order { id: 7 }) as Arc<dyn Record>]));

        let mut dispatcher = ActionDispatcher::new(Arc::new(builder.seal()));
        dispatcher.register_query("Order", Arc::new(query));

        let argument =
            ActionArgument::new(context()).with_primary_values(vec!["7".to_string()]);
        let outcome = dispatcher.invoke("Order", "Ship", argument).await.unwrap();

        assert!(outcome.skip_default_response);
        assert_eq!(*seen.lock().unwrap(), vec!["7".to_string()]);
    }

    #[tokio::test]
    async fn test_explicit_permission_gates_invoke() {
        let mut builder = AdminBuilder::new();
        builder.add_resource(ResourceConfig::new("Order")).unwrap();
        builder
            .register_action(
                "Order",
                ActionDefinition::new("Ship")
                    .permission(PermissionRule::allow(PermissionMode::Update, &["admin"]))
                    .handler(handler_fn(|_| Ok(()))),
            )
            .unwrap();
        let dispatcher = ActionDispatcher::new(Arc::new(builder.seal()));

        let admin_ctx = RequestContext::new("u1")
            .with_roles(&["admin"])
            .for_resource("Order");
        dispatcher
            .invoke("Order", "Ship", ActionArgument::new(admin_ctx))
            .await
            .unwrap();

        let guest_ctx = RequestContext::new("u2")
            .with_roles(&["guest"])
            .for_resource("Order");
        let err = dispatcher
            .invoke("Order", "Ship", ActionArgument::new(guest_ctx))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
