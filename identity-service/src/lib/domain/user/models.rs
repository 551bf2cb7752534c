use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::user::errors::PasswordError;
use crate::user::errors::ProfileError;
use crate::user::errors::RoleError;
use crate::user::errors::UsernameError;

/// Stored identity record.
///
/// Owned by the repository; the session flows only read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
    pub profile: Profile,
}

/// Identity that has not been persisted yet.
///
/// The repository assigns the [`UserId`] when it is first saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
    pub profile: Profile,
}

impl NewUser {
    /// Attach an identifier, producing the persisted record.
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            role: self.role,
            profile: self.profile,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Access role. Every self-registered identity is a `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Authorities granted by this role, as placed in the authenticated context.
    pub fn authorities(&self) -> Vec<String> {
        vec![format!("ROLE_{}", self.as_str())]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(RoleError(other.to_string())),
        }
    }
}

/// Personal details captured at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    first_name: String,
    last_name: String,
    country: String,
}

impl Profile {
    const MAX_LENGTH: usize = 100;

    /// Build a profile; every field is required.
    ///
    /// # Errors
    /// * `Missing` - A field is empty or whitespace
    /// * `TooLong` - A field exceeds 100 characters
    pub fn new(
        first_name: String,
        last_name: String,
        country: String,
    ) -> Result<Self, ProfileError> {
        Ok(Self {
            first_name: Self::required("firstname", first_name)?,
            last_name: Self::required("lastname", last_name)?,
            country: Self::required("country", country)?,
        })
    }

    fn required(field: &'static str, value: String) -> Result<String, ProfileError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            Err(ProfileError::Missing { field })
        } else if value.chars().count() > Self::MAX_LENGTH {
            Err(ProfileError::TooLong {
                field,
                max: Self::MAX_LENGTH,
            })
        } else {
            Ok(value)
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

/// Plaintext password, alive only for the duration of a login or register call.
///
/// `Debug` is redacted so the value cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// # Errors
    /// * `Missing` - Password is empty
    pub fn new(password: String) -> Result<Self, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Missing);
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new identity with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub password: Password,
    pub profile: Profile,
}

impl RegisterCommand {
    pub fn new(username: Username, password: Password, profile: Profile) -> Self {
        Self {
            username,
            password,
            profile,
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub user_id: UserId,
}

/// Result of a successful registration. Carries no identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub token: String,
}
