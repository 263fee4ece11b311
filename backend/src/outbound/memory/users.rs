//! In-memory [`UserRepository`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserId};

/// User store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    records: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            records: Mutex::new(users.into_iter().map(|user| (user.id, user)).collect()),
        }
    }

    fn records(&self) -> MutexGuard<'_, HashMap<UserId, User>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.records().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .records()
            .values()
            .find(|user| user.profile.email == email)
            .cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut records = self.records();
        if records.contains_key(&user.id) {
            return Err(UserRepositoryError::duplicate(user.id.to_string()));
        }
        records.insert(user.id, user.clone());
        Ok(())
    }

    async fn save(&self, user: &User, expected_revision: u32) -> Result<(), UserRepositoryError> {
        let mut records = self.records();
        let Some(stored) = records.get_mut(&user.id) else {
            return Err(UserRepositoryError::missing(user.id.to_string()));
        };
        if stored.revision != expected_revision {
            return Err(UserRepositoryError::revision_mismatch(
                expected_revision,
                stored.revision,
            ));
        }
        *stored = user.clone();
        Ok(())
    }
}
