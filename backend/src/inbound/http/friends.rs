//! Friend graph HTTP handlers.
//!
//! ```text
//! GET    /api/v1/friends/{userId}
//! POST   /api/v1/friends/{friendEmail}
//! PUT    /api/v1/friends/{userId}/{friendId}
//! DELETE /api/v1/friends/{userId}/{friendId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{Error, FriendProfile, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id};

/// Response header carrying the number of friend ids that resolved to no
/// user. Omitted when every friend resolved.
pub const UNRESOLVED_FRIENDS_HEADER: &str = "x-unresolved-friends";

const USER_ID: FieldName = FieldName::new("userId");
const FRIEND_ID: FieldName = FieldName::new("friendId");

fn parse_edge(path: web::Path<(String, String)>) -> Result<(UserId, UserId), Error> {
    let (user_id, friend_id) = path.into_inner();
    Ok((
        parse_user_id(&user_id, USER_ID)?,
        parse_user_id(&friend_id, FRIEND_ID)?,
    ))
}

/// List the public profiles of a user's friends.
#[utoipa::path(
    get,
    path = "/api/v1/friends/{userId}",
    params(("userId" = String, Path, description = "User whose friends are listed")),
    responses(
        (
            status = 200,
            description = "Friend profiles",
            headers(("x-unresolved-friends" = u64, description = "Friend ids with no user record")),
            body = [FriendProfile]
        ),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 504, description = "Friend lookups timed out", body = Error)
    ),
    tags = ["friends"],
    operation_id = "listFriends"
)]
#[get("/friends/{userId}")]
pub async fn list_friends(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_id(&path.into_inner(), USER_ID)?;
    let listing = state.friends_query.list_friends(&user_id).await?;

    let mut response = HttpResponse::Ok();
    if listing.unresolved > 0 {
        response.insert_header((UNRESOLVED_FRIENDS_HEADER, listing.unresolved.to_string()));
    }
    Ok(response.json(listing.friends))
}

/// Find a prospective friend by email address.
#[utoipa::path(
    post,
    path = "/api/v1/friends/{friendEmail}",
    params(("friendEmail" = String, Path, description = "Email address to look up")),
    responses(
        (status = 200, description = "Public profile of the matching user", body = FriendProfile),
        (status = 400, description = "Blank email", body = Error),
        (status = 404, description = "No user with that email", body = Error)
    ),
    tags = ["friends"],
    operation_id = "lookUpFriend"
)]
#[post("/friends/{friendEmail}")]
pub async fn look_up_friend(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<FriendProfile>> {
    let profile = state
        .friends_query
        .look_up_by_email(&path.into_inner())
        .await?;
    Ok(web::Json(profile))
}

/// Add a friend; repeating the call is a no-op.
#[utoipa::path(
    put,
    path = "/api/v1/friends/{userId}/{friendId}",
    params(
        ("userId" = String, Path, description = "User whose friend set changes"),
        ("friendId" = String, Path, description = "Friend to add or remove")
    ),
    responses(
        (status = 200, description = "Updated friend ids", body = [UserId]),
        (status = 400, description = "Invalid ids or self-friendship", body = Error),
        (status = 404, description = "Unknown user or friend", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["friends"],
    operation_id = "addFriend"
)]
#[put("/friends/{userId}/{friendId}")]
pub async fn add_friend(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<UserId>>> {
    let (user_id, friend_id) = parse_edge(path)?;
    let friends = state.friends_command.add_friend(&user_id, &friend_id).await?;
    Ok(web::Json(friends))
}

/// Remove a friend; removing an absent friend is a no-op.
#[utoipa::path(
    delete,
    path = "/api/v1/friends/{userId}/{friendId}",
    params(
        ("userId" = String, Path, description = "User whose friend set changes"),
        ("friendId" = String, Path, description = "Friend to add or remove")
    ),
    responses(
        (status = 200, description = "Updated friend ids", body = [UserId]),
        (status = 400, description = "Invalid ids", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["friends"],
    operation_id = "removeFriend"
)]
#[delete("/friends/{userId}/{friendId}")]
pub async fn remove_friend(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<UserId>>> {
    let (user_id, friend_id) = parse_edge(path)?;
    let friends = state
        .friends_command
        .remove_friend(&user_id, &friend_id)
        .await?;
    Ok(web::Json(friends))
}
