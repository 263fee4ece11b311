//! Shared list HTTP handlers.
//!
//! ```text
//! GET    /api/v1/listCode
//! POST   /api/v1/lists
//! GET    /api/v1/lists/{code}
//! DELETE /api/v1/lists/{code}
//! GET    /api/v1/listsOwner/{ownerId}
//! GET    /api/v1/sharedLists/{userId}
//! ```
//!
//! `POST /lists` answers as soon as the list is stored; invitees see the
//! list in their shared lists once background propagation finishes.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::{Error, Invitee, ListCode, NewList, SharedList};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_list_code, parse_user_id,
};

/// Response payload for `GET /listCode`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListCodeResponse {
    /// Code no stored list carries at issue time.
    pub code: ListCode,
}

/// Invitee entry as supplied by clients.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InviteeRequest {
    /// Invited user's id.
    pub id: Option<String>,
    /// Display name kept alongside the id.
    pub pseudo: Option<String>,
}

/// Request payload for creating a list.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    /// Creator's user id.
    pub owner: Option<String>,
    /// Title.
    pub name: Option<String>,
    /// Caller-chosen code; generated when absent.
    pub code: Option<String>,
    /// Users to share the list with.
    pub shared_with: Option<Vec<InviteeRequest>>,
    /// List body; an empty object when absent.
    #[schema(value_type = Object)]
    pub content: Option<Value>,
}

fn invalid_invitee_error(index: usize, value: &str) -> Error {
    Error::invalid_request("sharedWith must contain valid user ids").with_details(json!({
        "field": "sharedWith",
        "index": index,
        "value": value,
        "code": "invalid_uuid",
    }))
}

fn parse_invitees(invitees: Vec<InviteeRequest>) -> Result<Vec<Invitee>, Error> {
    invitees
        .into_iter()
        .enumerate()
        .map(|(index, invitee)| {
            let raw = invitee.id.unwrap_or_default();
            let user_id = parse_user_id(&raw, FieldName::new("sharedWith"))
                .map_err(|_| invalid_invitee_error(index, &raw))?;
            Ok(Invitee {
                user_id,
                pseudo: invitee.pseudo,
            })
        })
        .collect()
}

fn parse_create_request(payload: CreateListRequest) -> Result<NewList, Error> {
    let owner = payload
        .owner
        .ok_or_else(|| missing_field_error(FieldName::new("owner")))?;
    let name = payload
        .name
        .ok_or_else(|| missing_field_error(FieldName::new("name")))?;
    let code = payload
        .code
        .map(|code| parse_list_code(&code, FieldName::new("code")))
        .transpose()?;

    Ok(NewList {
        owner: parse_user_id(&owner, FieldName::new("owner"))?,
        name,
        code,
        shared_with: parse_invitees(payload.shared_with.unwrap_or_default())?,
        content: payload.content.unwrap_or_else(|| json!({})),
    })
}

/// Issue a code no stored list carries yet.
#[utoipa::path(
    get,
    path = "/api/v1/listCode",
    responses(
        (status = 200, description = "Fresh list code", body = ListCodeResponse),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "generateListCode"
)]
#[get("/listCode")]
pub async fn generate_list_code(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<ListCodeResponse>> {
    let code = state.list_codes.generate_code().await?;
    Ok(web::Json(ListCodeResponse { code }))
}

/// Create a list and share it with its invitees.
#[utoipa::path(
    post,
    path = "/api/v1/lists",
    request_body = CreateListRequest,
    responses(
        (status = 201, description = "List stored; sharing continues in the background", body = SharedList),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Code already taken", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "createList"
)]
#[post("/lists")]
pub async fn create_list(
    state: web::Data<HttpState>,
    payload: web::Json<CreateListRequest>,
) -> ApiResult<HttpResponse> {
    let new_list = parse_create_request(payload.into_inner())?;
    let list = state.lists_command.create_list(new_list).await?;
    Ok(HttpResponse::Created().json(list))
}

/// Fetch a list by its shareable code.
#[utoipa::path(
    get,
    path = "/api/v1/lists/{code}",
    params(("code" = String, Path, description = "Eight lowercase hex characters")),
    responses(
        (status = 200, description = "The list", body = SharedList),
        (status = 400, description = "Malformed code", body = Error),
        (status = 404, description = "No list carries the code", body = Error)
    ),
    tags = ["lists"],
    operation_id = "getList"
)]
#[get("/lists/{code}")]
pub async fn get_list(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SharedList>> {
    let code = parse_list_code(&path.into_inner(), FieldName::new("code"))?;
    let list = state.lists_query.get_list(&code).await?;
    Ok(web::Json(list))
}

/// Delete a list by its shareable code.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{code}",
    params(("code" = String, Path, description = "Eight lowercase hex characters")),
    responses(
        (status = 204, description = "List deleted"),
        (status = 400, description = "Malformed code", body = Error),
        (status = 404, description = "No list carries the code", body = Error)
    ),
    tags = ["lists"],
    operation_id = "deleteList"
)]
#[delete("/lists/{code}")]
pub async fn delete_list(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let code = parse_list_code(&path.into_inner(), FieldName::new("code"))?;
    state.lists_command.delete_list(&code).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Lists created by `ownerId`, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/listsOwner/{ownerId}",
    params(("ownerId" = String, Path, description = "Owner user id")),
    responses(
        (status = 200, description = "Owned lists; empty when there are none", body = [SharedList]),
        (status = 400, description = "Invalid owner id", body = Error)
    ),
    tags = ["lists"],
    operation_id = "listsForOwner"
)]
#[get("/listsOwner/{ownerId}")]
pub async fn lists_for_owner(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SharedList>>> {
    let owner = parse_user_id(&path.into_inner(), FieldName::new("ownerId"))?;
    let lists = state.lists_query.lists_owned_by(&owner).await?;
    Ok(web::Json(lists))
}

/// Lists other users have shared with `userId`.
#[utoipa::path(
    get,
    path = "/api/v1/sharedLists/{userId}",
    params(("userId" = String, Path, description = "Recipient user id")),
    responses(
        (status = 200, description = "Shared lists", body = [SharedList]),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["lists"],
    operation_id = "sharedLists"
)]
#[get("/sharedLists/{userId}")]
pub async fn shared_lists(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SharedList>>> {
    let user_id = parse_user_id(&path.into_inner(), FieldName::new("userId"))?;
    let lists = state.lists_query.shared_lists_for(&user_id).await?;
    Ok(web::Json(lists))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::{
        FIXTURE_LIST_CODE, MockListCodeQuery, MockSharedListCommand, MockSharedListQuery,
    };

    const OWNER: &str = "11111111-1111-4111-8111-111111111111";
    const INVITEE: &str = "22222222-2222-4222-8222-222222222222";

    async fn call(
        state: HttpState,
        request: actix_test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/api/v1")
                    .service(generate_list_code)
                    .service(create_list)
                    .service(get_list)
                    .service(delete_list)
                    .service(lists_for_owner)
                    .service(shared_lists),
            ),
        )
        .await;
        actix_test::call_service(&app, request.to_request()).await
    }

    fn valid_request() -> CreateListRequest {
        CreateListRequest {
            owner: Some(OWNER.into()),
            name: Some("Groceries".into()),
            code: None,
            shared_with: Some(vec![InviteeRequest {
                id: Some(INVITEE.into()),
                pseudo: Some("bob".into()),
            }]),
            content: Some(json!({"items": ["milk"]})),
        }
    }

    #[rstest]
    fn parse_create_request_builds_invitees() {
        let parsed = parse_create_request(valid_request()).expect("valid request");
        assert_eq!(parsed.owner, UserId::new(OWNER).expect("owner"));
        assert_eq!(parsed.shared_with.len(), 1);
        assert_eq!(parsed.shared_with[0].pseudo.as_deref(), Some("bob"));
        assert!(parsed.code.is_none());
    }

    #[rstest]
    #[case::owner(CreateListRequest { owner: None, ..valid_request() }, "owner")]
    #[case::name(CreateListRequest { name: None, ..valid_request() }, "name")]
    #[case::code(CreateListRequest { code: Some("XYZ".into()), ..valid_request() }, "code")]
    #[case::invitee(
        CreateListRequest {
            shared_with: Some(vec![InviteeRequest { id: None, pseudo: None }]),
            ..valid_request()
        },
        "sharedWith"
    )]
    fn parse_create_request_names_the_bad_field(
        #[case] request: CreateListRequest,
        #[case] field: &str,
    ) {
        let err = parse_create_request(request).expect_err("invalid request");
        let reported = err
            .details()
            .and_then(|d| d.get("field"))
            .and_then(Value::as_str);
        assert_eq!(reported, Some(field));
    }

    #[rstest]
    fn missing_content_defaults_to_empty_object() {
        let parsed = parse_create_request(CreateListRequest {
            content: None,
            ..valid_request()
        })
        .expect("valid request");
        assert_eq!(parsed.content, json!({}));
    }

    #[rstest]
    #[actix_web::test]
    async fn list_code_is_wrapped_in_an_object() {
        let mut codes = MockListCodeQuery::new();
        codes
            .expect_generate_code()
            .times(1)
            .return_once(|| Ok(ListCode::new("c0ffee00").expect("code")));
        let state = HttpState {
            list_codes: Arc::new(codes),
            ..HttpState::fixture()
        };

        let response = call(state, actix_test::TestRequest::get().uri("/api/v1/listCode")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body, json!({"code": "c0ffee00"}));
    }

    #[rstest]
    #[actix_web::test]
    async fn create_list_answers_201_with_the_stored_list() {
        let response = call(
            HttpState::fixture(),
            actix_test::TestRequest::post()
                .uri("/api/v1/lists")
                .set_json(valid_request()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("code").and_then(Value::as_str), Some(FIXTURE_LIST_CODE));
        assert_eq!(
            body.pointer("/sharedWith/0/id").and_then(Value::as_str),
            Some(INVITEE)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn taken_code_is_a_conflict() {
        let mut command = MockSharedListCommand::new();
        command
            .expect_create_list()
            .withf(|list| list.code.as_ref().map(ListCode::as_str) == Some("0badc0de"))
            .return_once(|_| Err(Error::conflict("list code 0badc0de is already taken")));
        let state = HttpState {
            lists_command: Arc::new(command),
            ..HttpState::fixture()
        };

        let response = call(
            state,
            actix_test::TestRequest::post()
                .uri("/api/v1/lists")
                .set_json(CreateListRequest {
                    code: Some("0badc0de".into()),
                    ..valid_request()
                }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_code_is_not_found() {
        let response = call(
            HttpState::fixture(),
            actix_test::TestRequest::get().uri("/api/v1/lists/deadbeef"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn shared_lists_are_returned_as_an_array() {
        let mut query = MockSharedListQuery::new();
        query
            .expect_shared_lists_for()
            .withf(|id| id.to_string() == INVITEE)
            .return_once(|_| Ok(Vec::new()));
        let state = HttpState {
            lists_query: Arc::new(query),
            ..HttpState::fixture()
        };

        let response = call(
            state,
            actix_test::TestRequest::get().uri(&format!("/api/v1/sharedLists/{INVITEE}")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body, json!([]));
    }

    #[rstest]
    #[actix_web::test]
    async fn deleting_a_list_answers_204() {
        let mut command = MockSharedListCommand::new();
        command
            .expect_delete_list()
            .withf(|code| code.as_str() == "0badc0de")
            .times(1)
            .return_once(|_| Ok(()));
        let state = HttpState {
            lists_command: Arc::new(command),
            ..HttpState::fixture()
        };

        let response = call(
            state,
            actix_test::TestRequest::delete().uri("/api/v1/lists/0badc0de"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[case::unknown("deadbeef", StatusCode::NOT_FOUND)]
    #[case::malformed("NOTACODE", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn deleting_a_missing_or_malformed_code_fails(
        #[case] code: &str,
        #[case] expected: StatusCode,
    ) {
        let response = call(
            HttpState::fixture(),
            actix_test::TestRequest::delete().uri(&format!("/api/v1/lists/{code}")),
        )
        .await;
        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn owner_without_lists_gets_an_empty_array() {
        let mut query = MockSharedListQuery::new();
        query
            .expect_lists_owned_by()
            .withf(|id| id.to_string() == OWNER)
            .times(1)
            .return_once(|_| Ok(Vec::new()));
        let state = HttpState {
            lists_query: Arc::new(query),
            ..HttpState::fixture()
        };

        let response = call(
            state,
            actix_test::TestRequest::get().uri(&format!("/api/v1/listsOwner/{OWNER}")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body, json!([]));
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_owner_id_names_the_field() {
        let response = call(
            HttpState::fixture(),
            actix_test::TestRequest::get().uri("/api/v1/listsOwner/nope"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.pointer("/details/field").and_then(Value::as_str),
            Some("ownerId")
        );
    }
}
