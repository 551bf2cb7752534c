use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local identity store keyed by username.
///
/// Used when no database is configured, and by tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a stored identity. Returns whether one existed.
    pub async fn remove(&self, username: &Username) -> bool {
        self.users.write().await.remove(username.as_str()).is_some()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(username.as_str()).cloned())
    }

    async fn save(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.contains_key(user.username.as_str()) {
            return Err(UserError::DuplicateUsername(
                user.username.as_str().to_string(),
            ));
        }

        let user = user.with_id(UserId::new());
        users.insert(user.username.as_str().to_string(), user.clone());

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::models::Profile;
    use crate::domain::user::models::Role;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: Username::new(username.to_string()).unwrap(),
            password_hash: "$argon2id$hash".to_string(),
            role: Role::User,
            profile: Profile::new("First".to_string(), "Last".to_string(), "IT".to_string())
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn test_save_assigns_distinct_ids() {
        let repository = InMemoryUserRepository::new();

        let alice = repository.save(new_user("alice")).await.unwrap();
        let bob = repository.save(new_user("bob")).await.unwrap();

        assert_ne!(alice.id, bob.id);
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let repository = InMemoryUserRepository::new();
        let saved = repository.save(new_user("alice")).await.unwrap();

        let found = repository
            .find_by_username(&Username::new("alice".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(found, Some(saved));

        let missing = repository
            .find_by_username(&Username::new("carol".to_string()).unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_save_duplicate_username() {
        let repository = InMemoryUserRepository::new();
        repository.save(new_user("bob")).await.unwrap();

        let result = repository.save(new_user("bob")).await;
        assert!(matches!(result, Err(UserError::DuplicateUsername(name)) if name == "bob"));
    }

    #[tokio::test]
    async fn test_remove() {
        let repository = InMemoryUserRepository::new();
        repository.save(new_user("alice")).await.unwrap();
        let alice = Username::new("alice".to_string()).unwrap();

        assert!(repository.remove(&alice).await);
        assert!(!repository.remove(&alice).await);
        assert!(repository.find_by_username(&alice).await.unwrap().is_none());
    }
}
