//! HTTP surface: binds recorded action routes onto an axum router

use crate::config::AdminConfig;
use crate::dispatch::{ActionArgument, ActionDispatcher};
use crate::domain::{GroupSet, PermissionMode, RequestContext};
use crate::error::{AppError, Result};
use crate::middleware::ActorContext;
use crate::registry::ActionMethod;
use crate::repository::GroupRepository;
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AdminConfig>,
    pub dispatcher: Arc<ActionDispatcher>,
    pub groups: Arc<dyn GroupRepository>,
}

/// Per-route target attached as an extension when the route is bound
#[derive(Debug, Clone)]
struct RouteTarget {
    resource: String,
    action: String,
    single_record: bool,
    permission_mode: PermissionMode,
}

/// Request body accepted by action routes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRequest {
    /// Primary keys of the selected records (bulk routes)
    #[serde(default)]
    pub primary_values: Vec<String>,
    /// Handler-specific payload
    #[serde(default)]
    pub argument: Option<serde_json::Value>,
}

/// Default response after a successful invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Action description returned by GET routes; the embedding UI renders it
#[derive(Debug, Clone, Serialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub label: String,
    pub method: String,
    pub url_open_type: Option<String>,
    pub url: Option<String>,
}

/// Build the router from the sealed registry's recorded routes
pub fn build_router(state: AppState) -> Router {
    // Routes for the same path (GET + PUT of one action) share a target.
    let mut grouped: Vec<(String, RouteTarget, Vec<ActionMethod>)> = Vec::new();
    for entry in state.dispatcher.admin().routes() {
        if let Some((_, _, methods)) = grouped.iter_mut().find(|(path, _, _)| path == &entry.path)
        {
            if !methods.contains(&entry.method) {
                methods.push(entry.method);
            }
        } else {
            grouped.push((
                entry.path.clone(),
                RouteTarget {
                    resource: entry.resource.clone(),
                    action: entry.action.clone(),
                    single_record: entry.single_record,
                    permission_mode: entry.permission_mode,
                },
                vec![entry.method],
            ));
        }
    }

    let mut router = Router::new();
    for (path, target, methods) in grouped {
        let mut method_router: MethodRouter<AppState> = MethodRouter::new();
        for method in methods {
            let filter = match method {
                ActionMethod::Get => MethodFilter::GET,
                ActionMethod::Put => MethodFilter::PUT,
            };
            method_router = method_router.on(filter, action_endpoint);
        }
        router = router.route(&path, method_router.layer(Extension(target)));
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shutdown
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.http_host, state.config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("admin action server listening on {}", addr);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Shared endpoint for all action routes.
///
/// GET answers with the action descriptor, PUT invokes the handler. Both
/// run the route guard and full permission resolution.
async fn action_endpoint(
    State(state): State<AppState>,
    Extension(target): Extension<RouteTarget>,
    method: Method,
    actor: ActorContext,
    Path(params): Path<HashMap<String, String>>,
    body: Option<Json<ActionRequest>>,
) -> Result<Response> {
    let groups = match &actor.actor_id {
        Some(actor_id) => GroupSet::new(state.groups.groups_for_user(actor_id).await?),
        None => GroupSet::default(),
    };
    let context = RequestContext {
        actor_id: actor.actor_id,
        roles: actor.roles,
        groups,
        resource: Some(target.resource.clone()),
    };

    let admin = state.dispatcher.admin();
    let action = admin
        .resource(&target.resource)
        .and_then(|r| r.action(&target.action))
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Action {} is not registered on {}",
                target.action, target.resource
            ))
        })?;

    // Route guard: the action itself is the permission source.
    if !action.has_permission(admin, target.permission_mode, &context) {
        return Err(AppError::Forbidden(format!(
            "Not allowed to access action {}",
            target.action
        )));
    }

    let request = body.map(|Json(request)| request).unwrap_or_default();
    let primary_values = if target.single_record {
        params.get("id").cloned().into_iter().collect()
    } else {
        request.primary_values
    };

    let mut argument = ActionArgument::new(context).with_primary_values(primary_values);
    if let Some(payload) = request.argument {
        argument = argument.with_argument(payload);
    }

    if method == Method::PUT {
        let outcome = state
            .dispatcher
            .invoke(&target.resource, &target.action, argument)
            .await?;
        if outcome.skip_default_response {
            return Ok(StatusCode::NO_CONTENT.into_response());
        }
        return Ok(Json(MessageResponse::new(format!(
            "Action {} completed",
            action.label
        )))
        .into_response());
    }

    // GET: authorize against the selected records, then describe.
    let resolved = state
        .dispatcher
        .authorize(&target.resource, &target.action, &argument)
        .await?;
    let url = resolved.action.url.as_ref().map(|url| {
        url(
            resolved.records.first().map(|r| r.as_ref()),
            &argument.context,
        )
    });

    Ok(Json(ActionDescriptor {
        name: resolved.action.name.clone(),
        label: resolved.action.label.clone(),
        method: resolved.action.method.to_string(),
        url_open_type: resolved.action.url_open_type.map(|t| t.as_str().to_string()),
        url,
    })
    .into_response())
}
