use std::sync::Arc;

use auth::Authenticator;

use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Checks a username/password pair against the stored identity.
pub struct CredentialVerifier<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> CredentialVerifier<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    /// Resolve the identity for `username` and check `password` against its digest.
    ///
    /// A username that fails validation cannot be stored, so it is reported as
    /// `NotFound` without touching the repository.
    ///
    /// # Errors
    /// * `NotFound` - No identity with this username
    /// * `InvalidCredentials` - Password does not match
    /// * `Hashing` - Stored digest is corrupt
    /// * `DatabaseError` - Lookup failed
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, UserError> {
        let username = Username::new(username.to_string())
            .map_err(|_| UserError::NotFound(username.to_string()))?;

        let user = self
            .repository
            .find_by_username(&username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        self.authenticator
            .verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}
