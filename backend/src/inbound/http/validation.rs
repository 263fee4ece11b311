//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{Error, ListCode, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidListCode,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidListCode => "invalid_list_code",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: Option<&str>) -> Error {
    let details = match value {
        Some(value) => json!({ "field": field.as_str(), "value": value, "code": code.as_str() }),
        None => json!({ "field": field.as_str(), "code": code.as_str() }),
    };
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        format!("missing required field: {}", field.as_str()),
        ErrorCode::MissingField,
        None,
    )
}

/// Parse a user id path segment.
///
/// Blank segments are reported as missing rather than malformed.
pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    if value.trim().is_empty() {
        return Err(missing_field_error(field));
    }
    UserId::new(value).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            Some(value),
        )
    })
}

pub(crate) fn parse_list_code(value: &str, field: FieldName) -> Result<ListCode, Error> {
    if value.trim().is_empty() {
        return Err(missing_field_error(field));
    }
    ListCode::new(value).map_err(|err| {
        field_error(
            field,
            format!("{}: {err}", field.as_str()),
            ErrorCode::InvalidListCode,
            Some(value),
        )
    })
}
