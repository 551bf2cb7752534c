use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::handler::Handler;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::authorization::authorize;
use super::authorization::AccessRule;
use super::handlers::hello::hello;
use super::handlers::login::login;
use super::handlers::not_found;
use super::handlers::register::register;
use super::middleware::authenticate;
use super::middleware::AuthenticationGate;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::SessionService;

pub struct AppState<UR>
where
    UR: UserRepository,
{
    pub session_service: Arc<SessionService<UR>>,
}

impl<UR> Clone for AppState<UR>
where
    UR: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            session_service: Arc::clone(&self.session_service),
        }
    }
}

pub fn create_router<UR: UserRepository>(
    session_service: Arc<SessionService<UR>>,
    gate: AuthenticationGate<UR>,
) -> Router {
    let state = AppState { session_service };

    let public_routes = Router::new()
        .route("/auth/login", post(login::<UR>))
        .route("/auth/register", post(register::<UR>))
        .route_layer(middleware::from_fn_with_state(
            AccessRule::Anonymous,
            authorize,
        ));

    let protected_routes = Router::new()
        .route("/api/v1/hello", get(hello))
        .route_layer(middleware::from_fn_with_state(
            AccessRule::Authenticated,
            authorize,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found.layer(middleware::from_fn_with_state(
            AccessRule::Authenticated,
            authorize,
        )))
        .layer(middleware::from_fn_with_state(gate, authenticate::<UR>))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
