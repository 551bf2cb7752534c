use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::ports::SessionServicePort;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::router::AppState;

pub async fn login<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    state
        .session_service
        .login(&body.username, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|ref outcome| ApiSuccess::new(StatusCode::OK, outcome.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    #[serde(rename = "userID")]
    pub user_id: String,
}

impl From<&LoginOutcome> for LoginResponseData {
    fn from(outcome: &LoginOutcome) -> Self {
        Self {
            token: outcome.token.clone(),
            user_id: outcome.user_id.to_string(),
        }
    }
}
