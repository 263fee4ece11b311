//! User records and the identifiers that link them together.
//!
//! A [`User`] owns two relationship collections mutated by the domain
//! services: `friends` (directed, duplicate-free, never self-referencing)
//! and `shared_with_me` (codes of lists other users shared with this one,
//! duplicates tolerated). Credentials are carried opaquely and never leave
//! the domain through [`FriendProfile`].

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ListCode;

/// Validation errors returned when parsing a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was empty or whitespace.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
}

/// Stable user identifier stored as a UUID.
///
/// # Examples
/// ```
/// use listshare::domain::UserId;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// assert!(UserId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from textual input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Public profile fields supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Given name.
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Family name.
    #[schema(example = "Lovelace")]
    pub last_name: String,
    /// Public handle shown to friends.
    #[schema(example = "ada")]
    pub pseudo: String,
    /// Contact address, used to look users up.
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Credential material owned by the authentication collaborator.
///
/// The domain stores and forwards these bytes untouched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Password hash.
    pub hash: String,
    /// Per-user salt.
    pub salt: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials { .. }")
    }
}

/// Persisted user record.
///
/// `revision` starts at 1 on insert and is bumped by every conditional
/// save; see [`User::bump_revision`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identity.
    pub id: UserId,
    /// Public profile fields.
    pub profile: UserProfile,
    /// Opaque credential material, absent for users created without a
    /// password.
    pub credentials: Option<Credentials>,
    /// Directed friend edges in insertion order.
    pub friends: Vec<UserId>,
    /// Codes of lists shared with this user, in arrival order.
    pub shared_with_me: Vec<ListCode>,
    /// Optimistic concurrency stamp.
    pub revision: u32,
}

impl User {
    /// A fresh user with no relationships at revision 1.
    pub fn new(id: UserId, profile: UserProfile) -> Self {
        Self {
            id,
            profile,
            credentials: None,
            friends: Vec::new(),
            shared_with_me: Vec::new(),
            revision: 1,
        }
    }

    /// Whether `friend_id` is already a friend.
    pub fn has_friend(&self, friend_id: &UserId) -> bool {
        self.friends.contains(friend_id)
    }

    /// Append `friend_id` unless already present.
    ///
    /// Returns `false` when the set was left unchanged.
    pub fn add_friend(&mut self, friend_id: UserId) -> bool {
        if self.has_friend(&friend_id) {
            return false;
        }
        self.friends.push(friend_id);
        true
    }

    /// Remove the first occurrence of `friend_id`.
    ///
    /// Returns `false` when the id was absent.
    pub fn remove_friend(&mut self, friend_id: &UserId) -> bool {
        match self.friends.iter().position(|id| id == friend_id) {
            Some(index) => {
                self.friends.remove(index);
                true
            }
            None => false,
        }
    }

    /// Record that the list identified by `code` was shared with this user.
    ///
    /// Repeated shares accumulate duplicates.
    pub fn receive_share(&mut self, code: ListCode) {
        self.shared_with_me.push(code);
    }

    /// Advance the revision ahead of a conditional save and return the
    /// revision the store is expected to still hold.
    pub fn bump_revision(&mut self) -> u32 {
        let expected = self.revision;
        self.revision = expected.saturating_add(1);
        expected
    }

    /// Projection safe to expose to other users.
    pub fn public_profile(&self) -> FriendProfile {
        FriendProfile {
            id: self.id,
            first_name: self.profile.first_name.clone(),
            last_name: self.profile.last_name.clone(),
            pseudo: self.profile.pseudo.clone(),
            email: self.profile.email.clone(),
            shared_with_me: self.shared_with_me.clone(),
        }
    }
}

/// A user as seen by someone else: credentials and friend edges removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendProfile {
    /// Identity.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Public handle.
    pub pseudo: String,
    /// Contact address.
    pub email: String,
    /// Codes of lists shared with this user.
    #[schema(value_type = Vec<String>)]
    pub shared_with_me: Vec<ListCode>,
}
