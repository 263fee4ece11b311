//! User registration.
//!
//! Credentials are owned by a separate authentication collaborator, so
//! users created here carry none.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::optimistic::map_user_repository_error;
use super::ports::{UserRepository, UsersCommand};
use super::{Error, FriendProfile, User, UserId, UserProfile};

fn require(field: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(
            Error::invalid_request(format!("{field} must not be empty")).with_details(json!({
                "field": field,
                "code": "empty_field",
            })),
        );
    }
    Ok(())
}

/// Service implementing [`UsersCommand`].
#[derive(Clone)]
pub struct UserDirectoryService<U> {
    users: Arc<U>,
}

impl<U> UserDirectoryService<U> {
    /// Create the service over a user store.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> UsersCommand for UserDirectoryService<U>
where
    U: UserRepository,
{
    async fn register(&self, profile: UserProfile) -> Result<FriendProfile, Error> {
        require("pseudo", &profile.pseudo)?;
        require("email", &profile.email)?;

        let user = User::new(UserId::random(), profile);
        self.users
            .insert(&user)
            .await
            .map_err(map_user_repository_error)?;
        info!(user_id = %user.id, "user registered");
        Ok(user.public_profile())
    }
}
