//! Friend graph operations.
//!
//! Friend edges are directed: adding B to A's friends leaves B's record
//! untouched. Listing resolves every friend id concurrently through
//! [`FanOut`]. The owner lookup is primary and its failure aborts the call.
//! A friend id that resolves to nothing is subordinate: it is left out of
//! the result and only counted. Store failures in any branch are surfaced.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use super::fan_out::FanOut;
use super::optimistic::{
    AttemptError, DEFAULT_WRITE_ATTEMPTS, map_user_repository_error, retry_on_conflict,
};
use super::ports::{FriendListing, FriendsCommand, FriendsQuery, UserRepository};
use super::{Error, FriendProfile, User, UserId};

/// Friend graph service implementing the friend driving ports.
#[derive(Clone)]
pub struct FriendGraphService<U> {
    users: Arc<U>,
    fan_out: FanOut,
    write_attempts: u32,
}

impl<U> FriendGraphService<U> {
    /// Service with default deadline and write attempts.
    pub fn new(users: Arc<U>) -> Self {
        Self {
            users,
            fan_out: FanOut::default(),
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
        }
    }

    /// Override the fan-out coordinator.
    #[must_use]
    pub fn with_fan_out(mut self, fan_out: FanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Override how many read-modify-write attempts a mutation may take.
    #[must_use]
    pub fn with_write_attempts(mut self, attempts: u32) -> Self {
        self.write_attempts = attempts;
        self
    }
}

impl<U> FriendGraphService<U>
where
    U: UserRepository,
{
    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn ensure_exists(&self, id: &UserId) -> Result<(), Error> {
        self.load_user(id).await.map(|_| ())
    }

    /// Public profiles of every friend of `user_id`.
    pub async fn list_friends(&self, user_id: &UserId) -> Result<FriendListing, Error> {
        let user = self.load_user(user_id).await?;
        if user.friends.is_empty() {
            return Ok(FriendListing::default());
        }

        let report = self
            .fan_out
            .run(user.friends, |friend_id| async move {
                self.users.find_by_id(&friend_id).await
            })
            .await?;

        let mut listing = FriendListing {
            friends: Vec::with_capacity(report.len()),
            unresolved: 0,
        };
        for outcome in report.into_outcomes() {
            match outcome.result {
                Ok(Some(friend)) => listing.friends.push(friend.public_profile()),
                Ok(None) => {
                    debug!(%user_id, friend_id = %outcome.key, "dangling friend id skipped");
                    listing.unresolved += 1;
                }
                Err(err) => return Err(map_user_repository_error(err)),
            }
        }
        Ok(listing)
    }

    /// Public profile of the user registered under `email`.
    ///
    /// Surrounding whitespace is ignored; the match is otherwise exact.
    pub async fn look_up_by_email(&self, email: &str) -> Result<FriendProfile, Error> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::invalid_request("email must not be empty")
                .with_details(json!({ "field": "email", "code": "missing_field" })));
        }
        self.users
            .find_by_email(email)
            .await
            .map_err(map_user_repository_error)?
            .map(|user| user.public_profile())
            .ok_or_else(|| Error::not_found(format!("no user registered under {email}")))
    }

    /// Add `friend_id` to `user_id`'s friends and return the resulting set.
    pub async fn add_friend(
        &self,
        user_id: &UserId,
        friend_id: &UserId,
    ) -> Result<Vec<UserId>, Error> {
        if user_id == friend_id {
            return Err(
                Error::invalid_request("users cannot befriend themselves").with_details(json!({
                    "field": "friendId",
                    "value": friend_id.to_string(),
                    "code": "self_friend",
                })),
            );
        }

        let friends = retry_on_conflict(self.write_attempts, |_| async move {
            let mut user = self.load_user(user_id).await?;
            self.ensure_exists(friend_id).await?;
            if !user.add_friend(*friend_id) {
                return Ok(user.friends);
            }
            let expected = user.bump_revision();
            self.users.save(&user, expected).await?;
            Ok::<_, AttemptError>(user.friends)
        })
        .await?;

        info!(%user_id, %friend_id, count = friends.len(), "friend added");
        Ok(friends)
    }

    /// Remove `friend_id` from `user_id`'s friends and return the resulting set.
    pub async fn remove_friend(
        &self,
        user_id: &UserId,
        friend_id: &UserId,
    ) -> Result<Vec<UserId>, Error> {
        let friends = retry_on_conflict(self.write_attempts, |_| async move {
            let mut user = self.load_user(user_id).await?;
            if !user.remove_friend(friend_id) {
                return Ok(user.friends);
            }
            let expected = user.bump_revision();
            self.users.save(&user, expected).await?;
            Ok::<_, AttemptError>(user.friends)
        })
        .await?;

        info!(%user_id, %friend_id, count = friends.len(), "friend removed");
        Ok(friends)
    }
}

#[async_trait]
impl<U> FriendsQuery for FriendGraphService<U>
where
    U: UserRepository,
{
    async fn list_friends(&self, user_id: &UserId) -> Result<FriendListing, Error> {
        FriendGraphService::list_friends(self, user_id).await
    }

    async fn look_up_by_email(&self, email: &str) -> Result<FriendProfile, Error> {
        FriendGraphService::look_up_by_email(self, email).await
    }
}

#[async_trait]
impl<U> FriendsCommand for FriendGraphService<U>
where
    U: UserRepository,
{
    async fn add_friend(
        &self,
        user_id: &UserId,
        friend_id: &UserId,
    ) -> Result<Vec<UserId>, Error> {
        FriendGraphService::add_friend(self, user_id, friend_id).await
    }

    async fn remove_friend(
        &self,
        user_id: &UserId,
        friend_id: &UserId,
    ) -> Result<Vec<UserId>, Error> {
        FriendGraphService::remove_friend(self, user_id, friend_id).await
    }
}

#[cfg(test)]
#[path = "friends_tests.rs"]
mod tests;
