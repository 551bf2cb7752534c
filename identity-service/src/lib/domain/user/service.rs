use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::RegisterOutcome;
use crate::domain::user::models::Role;
use crate::domain::user::verifier::CredentialVerifier;
use crate::user::errors::UserError;
use crate::user::ports::SessionServicePort;
use crate::user::ports::UserRepository;

/// Login and registration use cases.
///
/// Concrete implementation of SessionServicePort; collaborators are passed in
/// at construction.
pub struct SessionService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    verifier: CredentialVerifier<UR>,
}

impl<UR> SessionService<UR>
where
    UR: UserRepository,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Identity lookup and persistence
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        let verifier = CredentialVerifier::new(Arc::clone(&repository), Arc::clone(&authenticator));

        Self {
            repository,
            authenticator,
            verifier,
        }
    }
}

#[async_trait]
impl<UR> SessionServicePort for SessionService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, UserError> {
        let user = match self.verifier.verify(username, password).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "Login rejected");
                return Err(e);
            }
        };

        let token = self.authenticator.issue_token(user.username.as_str())?;

        tracing::info!(user_id = %user.id, username = %user.username, "Login succeeded");

        Ok(LoginOutcome {
            token,
            user_id: user.id,
        })
    }

    async fn register(&self, command: RegisterCommand) -> Result<RegisterOutcome, UserError> {
        let password_hash = self
            .authenticator
            .hash_password(command.password.expose())?;

        let new_user = NewUser {
            username: command.username,
            password_hash,
            role: Role::User,
            profile: command.profile,
        };

        let user = self.repository.save(new_user).await.map_err(|e| {
            tracing::warn!(error = %e, "Registration rejected");
            e
        })?;

        let token = self.authenticator.issue_token(user.username.as_str())?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(RegisterOutcome { token })
    }
}
