//! Driving port for editing a user's friend edges.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// Domain use-case port for friend mutations.
///
/// Both operations return the user's friend ids after the change.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendsCommand: Send + Sync {
    /// Add `friend_id` to `user_id`'s friends. Idempotent.
    async fn add_friend(&self, user_id: &UserId, friend_id: &UserId)
    -> Result<Vec<UserId>, Error>;

    /// Remove `friend_id` from `user_id`'s friends. Absent ids are a no-op.
    async fn remove_friend(
        &self,
        user_id: &UserId,
        friend_id: &UserId,
    ) -> Result<Vec<UserId>, Error>;
}

/// Fixture command echoing the requested change against an empty set.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFriendsCommand;

#[async_trait]
impl FriendsCommand for FixtureFriendsCommand {
    async fn add_friend(
        &self,
        _user_id: &UserId,
        friend_id: &UserId,
    ) -> Result<Vec<UserId>, Error> {
        Ok(vec![*friend_id])
    }

    async fn remove_friend(
        &self,
        _user_id: &UserId,
        _friend_id: &UserId,
    ) -> Result<Vec<UserId>, Error> {
        Ok(Vec::new())
    }
}
