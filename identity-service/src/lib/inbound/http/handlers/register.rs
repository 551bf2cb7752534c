use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Password;
use crate::domain::user::models::Profile;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::RegisterOutcome;
use crate::domain::user::models::Username;
use crate::domain::user::ports::SessionServicePort;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::router::AppState;
use crate::user::errors::PasswordError;
use crate::user::errors::ProfileError;
use crate::user::errors::UsernameError;

pub async fn register<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .session_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref outcome| ApiSuccess::new(StatusCode::OK, outcome.into()))
}

/// HTTP request body for registration (raw JSON, every field required)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    firstname: String,
    lastname: String,
    country: String,
}

#[derive(Debug, Clone, Error)]
pub enum ParseRegisterRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordError),

    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let username = Username::new(self.username)?;
        let password = Password::new(self.password)?;
        let profile = Profile::new(self.firstname, self.lastname, self.country)?;
        Ok(RegisterCommand::new(username, password, profile))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub token: String,
}

impl From<&RegisterOutcome> for RegisterResponseData {
    fn from(outcome: &RegisterOutcome) -> Self {
        Self {
            token: outcome.token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str, country: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            firstname: "Bob".to_string(),
            lastname: "Builder".to_string(),
            country: country.to_string(),
        }
    }

    #[test]
    fn test_valid_request_becomes_command() {
        let command = request("bob", "secret", "NZ").try_into_command().unwrap();

        assert_eq!(command.username.as_str(), "bob");
        assert_eq!(command.password.expose(), "secret");
        assert_eq!(command.profile.country(), "NZ");
    }

    #[test]
    fn test_invalid_fields_rejected() {
        assert!(matches!(
            request("b", "secret", "NZ").try_into_command(),
            Err(ParseRegisterRequestError::Username(_))
        ));
        assert!(matches!(
            request("bob", "", "NZ").try_into_command(),
            Err(ParseRegisterRequestError::Password(_))
        ));
        assert!(matches!(
            request("bob", "secret", " ").try_into_command(),
            Err(ParseRegisterRequestError::Profile(_))
        ));
    }
}
