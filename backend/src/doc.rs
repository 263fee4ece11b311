//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every inbound HTTP path together with the domain
//! payload schemas. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, FriendProfile, Invitee, ListCode, SharedList, UserId};
use crate::inbound::http::lists::{CreateListRequest, InviteeRequest, ListCodeResponse};
use crate::inbound::http::users::RegisterUserRequest;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "listshare API",
        description = "Friend graph and shared list endpoints with health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::friends::list_friends,
        crate::inbound::http::friends::look_up_friend,
        crate::inbound::http::friends::add_friend,
        crate::inbound::http::friends::remove_friend,
        crate::inbound::http::lists::generate_list_code,
        crate::inbound::http::lists::create_list,
        crate::inbound::http::lists::get_list,
        crate::inbound::http::lists::delete_list,
        crate::inbound::http::lists::lists_for_owner,
        crate::inbound::http::lists::shared_lists,
        crate::inbound::http::users::register_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        FriendProfile,
        Invitee,
        ListCode,
        SharedList,
        UserId,
        CreateListRequest,
        InviteeRequest,
        ListCodeResponse,
        RegisterUserRequest
    )),
    tags(
        (name = "friends", description = "Friend graph operations"),
        (name = "lists", description = "Shared list creation, lookup and deletion"),
        (name = "users", description = "User registration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("FriendProfile", "sharedWithMe")]
    #[case("SharedList", "sharedWith")]
    #[case("CreateListRequest", "sharedWith")]
    fn schemas_use_wire_field_names(#[case] schema: &str, #[case] field: &str) {
        assert!(object_fields(schema).iter().any(|f| f == field));
    }

    #[rstest]
    fn friend_profile_schema_hides_private_fields() {
        let fields = object_fields("FriendProfile");
        assert!(!fields.iter().any(|f| f == "friends" || f == "hash"));
    }

    #[rstest]
    #[case("/api/v1/friends/{userId}")]
    #[case("/api/v1/friends/{friendEmail}")]
    #[case("/api/v1/friends/{userId}/{friendId}")]
    #[case("/api/v1/listCode")]
    #[case("/api/v1/lists")]
    #[case("/api/v1/lists/{code}")]
    #[case("/api/v1/listsOwner/{ownerId}")]
    #[case("/api/v1/sharedLists/{userId}")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }
}
