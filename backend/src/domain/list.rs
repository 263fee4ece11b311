//! Shared list records and their shareable codes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Number of characters in a [`ListCode`].
pub const LIST_CODE_LEN: usize = 8;

/// Validation errors returned when parsing a [`ListCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListCodeValidationError {
    /// Code was empty or whitespace.
    #[error("list code must not be empty")]
    Empty,
    /// Code had the wrong length or contained non hexadecimal characters.
    #[error("list code must be {LIST_CODE_LEN} lowercase hexadecimal characters")]
    Malformed,
}

/// Short shareable handle identifying a list independently of its storage id.
///
/// Codes are eight lowercase hexadecimal characters: two four-character
/// tokens concatenated.
///
/// # Examples
/// ```
/// use listshare::domain::ListCode;
///
/// let code = ListCode::new("00ff10ab").expect("valid code");
/// assert_eq!(code.as_str(), "00ff10ab");
/// assert!(ListCode::new("00FF10AB").is_err());
/// assert!(ListCode::new("abc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "3f9a0c7e")]
pub struct ListCode(String);

impl ListCode {
    /// Validate and construct a [`ListCode`].
    pub fn new(code: impl Into<String>) -> Result<Self, ListCodeValidationError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ListCodeValidationError::Empty);
        }
        let well_formed = code.len() == LIST_CODE_LEN
            && code
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(ListCodeValidationError::Malformed);
        }
        Ok(Self(code))
    }

    /// Join two four-character tokens into a code.
    pub fn from_tokens(head: &str, tail: &str) -> Result<Self, ListCodeValidationError> {
        Self::new(format!("{head}{tail}"))
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ListCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ListCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<ListCode> for String {
    fn from(value: ListCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for ListCode {
    type Error = ListCodeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Storage identity of a list, distinct from its [`ListCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct ListId(Uuid);

impl ListId {
    /// Generate a new random identifier.
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

/// A user a list is shared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Invitee {
    /// The invited user.
    #[serde(rename = "id")]
    pub user_id: UserId,
    /// Display name captured when the invitation was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudo: Option<String>,
}

impl Invitee {
    /// Invitee without a display name.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            pseudo: None,
        }
    }
}

/// Persisted shared list.
///
/// `code` is immutable once assigned and `shared_with` is written once at
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedList {
    /// Storage identity.
    pub id: ListId,
    /// Shareable handle.
    pub code: ListCode,
    /// Creator of the list.
    pub owner: UserId,
    /// Title.
    #[schema(example = "Groceries")]
    pub name: String,
    /// Users the list was shared with at creation.
    pub shared_with: Vec<Invitee>,
    /// Free-form list body, stored verbatim.
    #[schema(value_type = Object)]
    pub content: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for list creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewList {
    /// Creator.
    pub owner: UserId,
    /// Title.
    pub name: String,
    /// Caller-chosen code; generated when absent.
    pub code: Option<ListCode>,
    /// Users to share with.
    pub shared_with: Vec<Invitee>,
    /// Free-form list body.
    pub content: Value,
}

impl NewList {
    /// Materialise the record under `code`.
    pub fn into_list(self, code: ListCode) -> SharedList {
        SharedList {
            id: ListId::random(),
            code,
            owner: self.owner,
            name: self.name,
            shared_with: self.shared_with,
            content: self.content,
            created_at: Utc::now(),
        }
    }
}
