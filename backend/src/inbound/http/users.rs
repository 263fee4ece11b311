//! User registration handler.
//!
//! ```text
//! POST /api/v1/users
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, FriendProfile, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error};

/// Request payload for registering a user.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Public handle; required.
    pub pseudo: Option<String>,
    /// Contact address, used for friend lookups.
    pub email: Option<String>,
}

fn parse_register_request(payload: RegisterUserRequest) -> Result<UserProfile, Error> {
    Ok(UserProfile {
        first_name: payload.first_name.unwrap_or_default(),
        last_name: payload.last_name.unwrap_or_default(),
        pseudo: payload
            .pseudo
            .ok_or_else(|| missing_field_error(FieldName::new("pseudo")))?,
        email: payload
            .email
            .ok_or_else(|| missing_field_error(FieldName::new("email")))?,
    })
}

/// Register a user with no friends and nothing shared yet.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered user", body = FriendProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserRequest>,
) -> ApiResult<HttpResponse> {
    let profile = parse_register_request(payload.into_inner())?;
    let user = state.users_command.register(profile).await?;
    Ok(HttpResponse::Created().json(user))
}
