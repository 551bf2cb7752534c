use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::Profile;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::RoleError;
use crate::user::errors::UserError;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    first_name: String,
    last_name: String,
    country: String,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    /// Stored rows that no longer satisfy the model are corrupt data, not caller input.
    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |e: &dyn std::fmt::Display| {
            UserError::DatabaseError(format!("corrupt user row {}: {}", id, e))
        };

        Ok(User {
            id: UserId(id),
            username: Username::new(row.username).map_err(|e| corrupt(&e))?,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(|e: RoleError| corrupt(&e))?,
            profile: Profile::new(row.first_name, row.last_name, row.country)
                .map_err(|e| corrupt(&e))?,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, first_name, last_name, country
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn save(&self, user: NewUser) -> Result<User, UserError> {
        let id = UserId::new();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, first_name, last_name, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id.0)
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.profile.first_name())
        .bind(user.profile.last_name())
        .bind(user.profile.country())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("users_username_key")
                {
                    return UserError::DuplicateUsername(user.username.as_str().to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user.with_id(id))
    }
}
