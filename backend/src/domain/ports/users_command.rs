//! Driving port for registering users.

use async_trait::async_trait;

use crate::domain::{Error, FriendProfile, UserProfile, UserId};

/// Domain use-case port for user registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create a user without credentials and return its public profile.
    async fn register(&self, profile: UserProfile) -> Result<FriendProfile, Error>;
}

/// Fixture command assigning a random id without storing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsersCommand;

#[async_trait]
impl UsersCommand for FixtureUsersCommand {
    async fn register(&self, profile: UserProfile) -> Result<FriendProfile, Error> {
        Ok(crate::domain::User::new(UserId::random(), profile).public_profile())
    }
}
