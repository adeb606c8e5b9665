//! Actor identity extractor
//!
//! The embedding host performs its own authentication and forwards the
//! resolved identity in headers: `x-admin-actor` carries the actor id,
//! `x-admin-roles` a comma-separated role list. Absent headers yield an
//! anonymous actor; whether that actor may do anything is decided by
//! permission resolution, not here.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

pub const ACTOR_HEADER: &str = "x-admin-actor";
pub const ROLES_HEADER: &str = "x-admin-roles";

/// Identity of the requesting actor, as forwarded by the host
#[derive(Debug, Clone, Default)]
pub struct ActorContext {
    pub actor_id: Option<String>,
    pub roles: Vec<String>,
}

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string());

        let roles = parts
            .headers
            .get(ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { actor_id, roles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ActorContext {
        let (mut parts, _) = request.into_parts();
        ActorContext::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_actor_and_roles() {
        let request = Request::builder()
            .header(ACTOR_HEADER, "u1")
            .header(ROLES_HEADER, "admin, editor")
            .body(())
            .unwrap();

        let actor = extract(request).await;
        assert_eq!(actor.actor_id.as_deref(), Some("u1"));
        assert_eq!(actor.roles, vec!["admin".to_string(), "editor".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_headers_yield_anonymous() {
        let request = Request::builder().body(()).unwrap();
        let actor = extract(request).await;
        assert!(actor.actor_id.is_none());
        assert!(actor.roles.is_empty());
    }
}
