use axum::extract::Query;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct HelloParams {
    #[serde(default = "default_name")]
    name: String,
}

fn default_name() -> String {
    "World".to_string()
}

/// Greeting for authenticated callers.
pub async fn hello(
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<HelloParams>,
) -> ApiSuccess<String> {
    tracing::debug!(username = %user.username, "Serving greeting");

    ApiSuccess::new(StatusCode::OK, format!("Hello {}", params.name))
}
