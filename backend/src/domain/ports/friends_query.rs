//! Driving port for reading a user's friends.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, FriendProfile, UserId};

/// Result of assembling a friend list.
///
/// `unresolved` counts friend ids whose record could not be found. They are
/// omitted from `friends`; callers that only want the profiles can ignore
/// the count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FriendListing {
    /// Resolved friend profiles in lookup completion order.
    pub friends: Vec<FriendProfile>,
    /// Friend ids that resolved to no user.
    pub unresolved: usize,
}

/// Domain use-case port for listing friends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendsQuery: Send + Sync {
    /// Public profiles of everyone `user_id` has added as a friend.
    async fn list_friends(&self, user_id: &UserId) -> Result<FriendListing, Error>;

    /// Public profile of the user registered under `email`, so a client
    /// can learn the id to befriend.
    async fn look_up_by_email(&self, email: &str) -> Result<FriendProfile, Error>;
}

/// Fixture query: every user is friendless.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFriendsQuery;

#[async_trait]
impl FriendsQuery for FixtureFriendsQuery {
    async fn list_friends(&self, _user_id: &UserId) -> Result<FriendListing, Error> {
        Ok(FriendListing::default())
    }

    async fn look_up_by_email(&self, email: &str) -> Result<FriendProfile, Error> {
        Err(Error::not_found(format!("no user registered under {email}")))
    }
}
