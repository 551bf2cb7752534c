use async_trait::async_trait;

use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::RegisterOutcome;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

/// Port for the login and registration use cases.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify credentials and issue a session token.
    ///
    /// # Arguments
    /// * `username` - Raw username as submitted
    /// * `password` - Plaintext password as submitted
    ///
    /// # Returns
    /// Token for the identity together with its identifier
    ///
    /// # Errors
    /// * `NotFound` - No identity with this username
    /// * `InvalidCredentials` - Password does not match
    /// * `Hashing` / `Token` / `DatabaseError` - Collaborator failure
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, UserError>;

    /// Create a new `USER` identity and issue its first session token.
    ///
    /// # Arguments
    /// * `command` - Validated username, password and profile
    ///
    /// # Returns
    /// Token for the new identity
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `Hashing` / `Token` / `DatabaseError` - Collaborator failure
    async fn register(&self, command: RegisterCommand) -> Result<RegisterOutcome, UserError>;
}

/// Identity lookup and persistence.
///
/// Results are never cached by callers: each call reflects the current stored state.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Persist a new user, assigning its identifier.
    ///
    /// # Returns
    /// Stored user entity
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `DatabaseError` - Storage operation failed
    async fn save(&self, user: NewUser) -> Result<User, UserError>;
}
