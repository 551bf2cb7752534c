use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::Role;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Access requirement attached to a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    Anonymous,
    Authenticated,
    Role(Role),
}

impl AccessRule {
    pub fn check(&self, user: Option<&AuthenticatedUser>) -> Result<(), ApiError> {
        match (self, user) {
            (AccessRule::Anonymous, _) => Ok(()),
            (_, None) => Err(ApiError::Unauthorized(
                "Authentication required".to_string(),
            )),
            (AccessRule::Authenticated, Some(_)) => Ok(()),
            (AccessRule::Role(role), Some(user)) if user.role == *role => Ok(()),
            (AccessRule::Role(role), Some(_)) => Err(ApiError::Forbidden(format!(
                "Requires role {}",
                role
            ))),
        }
    }
}

/// Route layer enforcing an [`AccessRule`] against the identity left by the
/// authentication gate
pub async fn authorize(
    State(rule): State<AccessRule>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(e) = rule.check(req.extensions().get::<AuthenticatedUser>()) {
        tracing::debug!(rule = ?rule, uri = %req.uri(), "Access denied");
        return Err(e);
    }

    Ok(next.run(req).await)
}
