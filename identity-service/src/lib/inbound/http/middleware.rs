use std::sync::Arc;

use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use thiserror::Error;

use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::handlers::ApiError;
use crate::user::errors::UserError;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity attached to a request once its bearer token checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: Username,
    pub role: Role,
    pub authorities: Vec<String>,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            authorities: user.role.authorities(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum GateError {
    #[error("Token subject does not resolve to a user: {0}")]
    UnknownSubject(String),

    #[error("Identity lookup failed: {0}")]
    Lookup(#[from] UserError),
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::UnknownSubject(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            GateError::Lookup(e) => ApiError::from(e),
        }
    }
}

/// Per-request authentication filter.
///
/// A request without a usable bearer token passes through anonymously; the
/// decision to reject it belongs to the access rules of the route.
pub struct AuthenticationGate<UR>
where
    UR: UserRepository,
{
    authenticator: Arc<Authenticator>,
    repository: Arc<UR>,
}

impl<UR> Clone for AuthenticationGate<UR>
where
    UR: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            authenticator: Arc::clone(&self.authenticator),
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<UR> AuthenticationGate<UR>
where
    UR: UserRepository,
{
    pub fn new(authenticator: Arc<Authenticator>, repository: Arc<UR>) -> Self {
        Self {
            authenticator,
            repository,
        }
    }

    /// Resolve the caller behind `headers`.
    ///
    /// Returns `Ok(None)` when there is nothing to establish: no bearer
    /// header, a token that fails to parse or validate, or an identity that
    /// is already present on the request.
    pub async fn establish(
        &self,
        headers: &HeaderMap,
        current: Option<&AuthenticatedUser>,
    ) -> Result<Option<AuthenticatedUser>, GateError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(None);
        };

        let subject = match self.authenticator.jwt().subject_of(token) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable bearer token");
                return Ok(None);
            }
        };

        if current.is_some() {
            return Ok(None);
        }

        let username = Username::new(subject.clone())
            .map_err(|_| GateError::UnknownSubject(subject.clone()))?;

        let user = self
            .repository
            .find_by_username(&username)
            .await?
            .ok_or(GateError::UnknownSubject(subject))?;

        if !self.authenticator.jwt().is_valid(token, user.username.as_str()) {
            tracing::debug!(username = %user.username, "Bearer token failed validation");
            return Ok(None);
        }

        Ok(Some(AuthenticatedUser::from(&user)))
    }
}

/// Token carried by an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// Middleware running the gate on every request and storing the resolved
/// identity in the request extensions
pub async fn authenticate<UR: UserRepository>(
    State(gate): State<AuthenticationGate<UR>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = req.extensions().get::<AuthenticatedUser>().cloned();
    let headers = req.headers();

    let established = gate
        .establish(headers, current.as_ref())
        .await
        .map_err(|e| {
            match &e {
                GateError::UnknownSubject(subject) => {
                    tracing::warn!(subject = %subject, "Token subject not found");
                }
                GateError::Lookup(err) => {
                    tracing::error!(error = %err, "Identity lookup failed");
                }
            }
            e
        })?;

    if let Some(user) = established {
        tracing::debug!(username = %user.username, "Request authenticated");
        req.extensions_mut().insert(user);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use auth::JwtHandler;
    use auth::PasswordHasher;
    use auth::SigningKey;
    use axum::body::Body;
    use axum::http::HeaderValue;
    use axum::http::StatusCode;
    use axum::middleware;
    use axum::routing::get;
    use axum::Extension;
    use axum::Router;
    use chrono::Duration;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::models::NewUser;
    use crate::domain::user::models::Profile;
    use crate::outbound::repositories::InMemoryUserRepository;

    fn authenticator() -> Arc<Authenticator> {
        let key = SigningKey::from_bytes(b"middleware-test-secret-of-32-bytes!".to_vec()).unwrap();
        let jwt = JwtHandler::new(&key, Duration::hours(1)).unwrap();
        Arc::new(
            Authenticator::new(jwt)
                .with_password_hasher(PasswordHasher::with_params(8, 1, 1).unwrap()),
        )
    }

    async fn repository_with(username: &str) -> Arc<InMemoryUserRepository> {
        let repository = Arc::new(InMemoryUserRepository::new());
        repository
            .save(NewUser {
                username: Username::new(username.to_string()).unwrap(),
                password_hash: "unused".to_string(),
                role: Role::User,
                profile: Profile::new(
                    "Alice".to_string(),
                    "Liddell".to_string(),
                    "UK".to_string(),
                )
                .unwrap(),
            })
            .await
            .unwrap();
        repository
    }

    async fn whoami(user: Option<Extension<AuthenticatedUser>>) -> String {
        match user {
            Some(Extension(user)) => user.username.as_str().to_string(),
            None => "anonymous".to_string(),
        }
    }

    fn app(gate: AuthenticationGate<InMemoryUserRepository>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(
                gate,
                authenticate::<InMemoryUserRepository>,
            ))
    }

    async fn call(app: Router, authorization: Option<String>) -> (StatusCode, String) {
        let mut request = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }

        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();

        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_no_header_passes_anonymously() {
        let gate = AuthenticationGate::new(authenticator(), repository_with("alice").await);

        let (status, body) = call(app(gate), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_valid_token_attaches_identity() {
        let authenticator = authenticator();
        let token = authenticator.issue_token("alice").unwrap();
        let gate = AuthenticationGate::new(authenticator, repository_with("alice").await);

        let (status, body) = call(app(gate), Some(format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice");
    }

    #[tokio::test]
    async fn test_unusable_tokens_pass_anonymously() {
        let authenticator = authenticator();
        let token = authenticator.issue_token("alice").unwrap();
        let gate = AuthenticationGate::new(authenticator, repository_with("alice").await);

        let mut tampered = token.clone();
        tampered.push('x');

        for value in [
            format!("Bearer {}", tampered),
            format!("bearer {}", token),
            format!("Basic {}", token),
            "Bearer ".to_string(),
            "Bearer not-a-token".to_string(),
        ] {
            let (status, body) = call(app(gate.clone()), Some(value.clone())).await;
            assert_eq!(status, StatusCode::OK, "header {:?}", value);
            assert_eq!(body, "anonymous", "header {:?}", value);
        }
    }

    #[tokio::test]
    async fn test_unknown_subject_is_rejected() {
        let authenticator = authenticator();
        let token = authenticator.issue_token("ghost").unwrap();
        let gate = AuthenticationGate::new(authenticator, repository_with("alice").await);

        let (status, body) = call(app(gate), Some(format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid or expired token"));
    }

    #[tokio::test]
    async fn test_existing_identity_is_kept() {
        let authenticator = authenticator();
        let token = authenticator.issue_token("ghost").unwrap();
        let gate = AuthenticationGate::new(authenticator, repository_with("alice").await);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        let user = repository_with("bob")
            .await
            .find_by_username(&Username::new("bob".to_string()).unwrap())
            .await
            .unwrap()
            .unwrap();
        let current = AuthenticatedUser::from(&user);

        let established = gate.establish(&headers, Some(&current)).await.unwrap();

        assert!(established.is_none());
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
