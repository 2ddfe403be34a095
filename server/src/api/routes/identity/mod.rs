//! Identity API endpoints
//!
//! One POST endpoint per identity operation, mounted under `/api/v1`.

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::domain::identity::{
    CreateGroup, CreateUser, DescribeGroupsRequest, DescribeUsersRequest, IdentityService,
};

use types::{
    BindingDto, ComparePasswordResponse, CreateGroupRequest, CreateUserRequest,
    DescribeGroupsResponse, DescribeUsersResponse, GroupDto, GroupIdsRequest, GroupSetResponse,
    JoinGroupResponse, LeaveGroupResponse, MembershipRequest, ModifyPasswordResponse,
    PasswordRequest, UserDto, UserIdsRequest, UserIdsResponse, UserSetResponse,
};

/// Shared state for identity endpoints
#[derive(Clone)]
pub struct IdentityApiState {
    pub identity: IdentityService,
}

/// Build identity API routes
pub fn routes(identity: IdentityService) -> Router<()> {
    let state = IdentityApiState { identity };

    Router::new()
        .route("/users", post(create_user))
        .route("/users/describe", post(describe_users))
        .route("/users/by-groups", post(get_users_by_group_ids))
        .route("/users/ids-by-groups", post(get_user_ids_by_group_ids))
        .route("/groups", post(create_group))
        .route("/groups/describe", post(describe_groups))
        .route("/groups/join", post(join_group))
        .route("/groups/leave", post(leave_group))
        .route("/groups/by-users", post(get_groups_by_user_ids))
        .route("/passwords/compare", post(compare_password))
        .route("/passwords/modify", post(modify_password))
        .with_state(state)
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let user = state
        .identity
        .create_user(CreateUser {
            username: body.username,
            email: body.email,
            phone_number: body.phone_number,
            description: body.description,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// List users matching filters, search word and paging
#[utoipa::path(
    post,
    path = "/api/v1/users/describe",
    tag = "users",
    request_body = DescribeUsersRequest,
    responses(
        (status = 200, description = "Matching users", body = DescribeUsersResponse),
        (status = 400, description = "Malformed body, oversized filter or invalid sort key")
    )
)]
pub async fn describe_users(
    State(state): State<IdentityApiState>,
    ValidatedJson(req): ValidatedJson<DescribeUsersRequest>,
) -> Result<Json<DescribeUsersResponse>, ApiError> {
    let page = state.identity.describe_users(&req).await?;
    Ok(Json(DescribeUsersResponse {
        user_set: page.users.into_iter().map(UserDto::from).collect(),
        total_count: page.total,
    }))
}

/// Distinct members of the given groups
#[utoipa::path(
    post,
    path = "/api/v1/users/by-groups",
    tag = "users",
    request_body = GroupIdsRequest,
    responses((status = 200, description = "Group members", body = UserSetResponse))
)]
pub async fn get_users_by_group_ids(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<GroupIdsRequest>,
) -> Result<Json<UserSetResponse>, ApiError> {
    let users = state.identity.get_users_by_group_ids(&body.group_ids).await?;
    Ok(Json(UserSetResponse {
        user_set: users.into_iter().map(UserDto::from).collect(),
    }))
}

/// Distinct member ids of the given groups
#[utoipa::path(
    post,
    path = "/api/v1/users/ids-by-groups",
    tag = "users",
    request_body = GroupIdsRequest,
    responses((status = 200, description = "Member ids", body = UserIdsResponse))
)]
pub async fn get_user_ids_by_group_ids(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<GroupIdsRequest>,
) -> Result<Json<UserIdsResponse>, ApiError> {
    let user_ids = state
        .identity
        .get_user_ids_by_group_ids(&body.group_ids)
        .await?;
    Ok(Json(UserIdsResponse { user_ids }))
}

/// Create a group, optionally under a parent
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    tag = "groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupDto),
        (status = 404, description = "Parent group not found")
    )
)]
pub async fn create_group(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupDto>), ApiError> {
    let group = state
        .identity
        .create_group(CreateGroup {
            parent_group_id: body.parent_group_id,
            name: body.name,
            description: body.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(GroupDto::from(group))))
}

/// List groups matching filters, root groups, search word and paging
#[utoipa::path(
    post,
    path = "/api/v1/groups/describe",
    tag = "groups",
    request_body = DescribeGroupsRequest,
    responses(
        (status = 200, description = "Matching groups", body = DescribeGroupsResponse),
        (status = 400, description = "Malformed body, oversized filter or invalid sort key")
    )
)]
pub async fn describe_groups(
    State(state): State<IdentityApiState>,
    ValidatedJson(req): ValidatedJson<DescribeGroupsRequest>,
) -> Result<Json<DescribeGroupsResponse>, ApiError> {
    let page = state.identity.describe_groups(&req).await?;
    Ok(Json(DescribeGroupsResponse {
        group_set: page.groups.into_iter().map(GroupDto::from).collect(),
        total_count: page.total,
    }))
}

/// Add every user to every group
#[utoipa::path(
    post,
    path = "/api/v1/groups/join",
    tag = "groups",
    request_body = MembershipRequest,
    responses(
        (status = 200, description = "Bindings created", body = JoinGroupResponse),
        (status = 403, description = "A user is already in a group"),
        (status = 404, description = "Unknown user or group")
    )
)]
pub async fn join_group(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<MembershipRequest>,
) -> Result<Json<JoinGroupResponse>, ApiError> {
    let bindings = state
        .identity
        .join_group(&body.user_ids, &body.group_ids)
        .await?;
    Ok(Json(JoinGroupResponse {
        bindings: bindings.into_iter().map(BindingDto::from).collect(),
    }))
}

/// Remove every user from every group
#[utoipa::path(
    post,
    path = "/api/v1/groups/leave",
    tag = "groups",
    request_body = MembershipRequest,
    responses(
        (status = 200, description = "Bindings removed", body = LeaveGroupResponse),
        (status = 403, description = "A user is not in a group")
    )
)]
pub async fn leave_group(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<MembershipRequest>,
) -> Result<Json<LeaveGroupResponse>, ApiError> {
    let removed = state
        .identity
        .leave_group(&body.user_ids, &body.group_ids)
        .await?;
    Ok(Json(LeaveGroupResponse { removed }))
}

/// Distinct groups of the given users
#[utoipa::path(
    post,
    path = "/api/v1/groups/by-users",
    tag = "groups",
    request_body = UserIdsRequest,
    responses((status = 200, description = "Groups", body = GroupSetResponse))
)]
pub async fn get_groups_by_user_ids(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<UserIdsRequest>,
) -> Result<Json<GroupSetResponse>, ApiError> {
    let groups = state.identity.get_groups_by_user_ids(&body.user_ids).await?;
    Ok(Json(GroupSetResponse {
        group_set: groups.into_iter().map(GroupDto::from).collect(),
    }))
}

/// Check a password against the stored hash
#[utoipa::path(
    post,
    path = "/api/v1/passwords/compare",
    tag = "passwords",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Comparison result", body = ComparePasswordResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn compare_password(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<PasswordRequest>,
) -> Result<Json<ComparePasswordResponse>, ApiError> {
    let is_match = state
        .identity
        .compare_password(&body.user_id, &body.password)
        .await?;
    Ok(Json(ComparePasswordResponse { is_match }))
}

/// Replace a user's password
#[utoipa::path(
    post,
    path = "/api/v1/passwords/modify",
    tag = "passwords",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = ModifyPasswordResponse),
        (status = 400, description = "Empty password"),
        (status = 404, description = "User not found")
    )
)]
pub async fn modify_password(
    State(state): State<IdentityApiState>,
    ValidatedJson(body): ValidatedJson<PasswordRequest>,
) -> Result<Json<ModifyPasswordResponse>, ApiError> {
    state
        .identity
        .modify_password(&body.user_id, &body.password)
        .await?;
    Ok(Json(ModifyPasswordResponse {
        user_id: body.user_id,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::api::extractors::MAX_ID_BATCH;
    use crate::data::SqliteService;

    async fn app() -> Router {
        let db = SqliteService::in_memory().await.unwrap();
        routes(IdentityService::new(Arc::new(db)))
    }

    async fn post_json(
        app: &Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_create_and_describe_users() {
        let app = app().await;
        let (status, user) = post_json(
            &app,
            "/users",
            serde_json::json!({"username": "ann", "email": "ann@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(user["user_id"].as_str().unwrap().starts_with("usr-"));
        assert!(user.get("password").is_none());

        let (status, page) = post_json(
            &app,
            "/users/describe",
            serde_json::json!({"search_word": "ANN"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total_count"], 1);
        assert_eq!(page["user_set"][0]["username"], "ann");
    }

    #[tokio::test]
    async fn test_validation_errors_are_bad_request() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/users",
            serde_json::json!({"username": "ann", "email": "nope"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");

        let (status, body) =
            post_json(&app, "/groups/join", serde_json::json!({"user_ids": ["usr-1"]})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid argument: empty user id or group id");
    }

    #[tokio::test]
    async fn test_describe_rejects_bad_bodies_as_json() {
        let app = app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/users/describe")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"user_id\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "JSON_PARSE_ERROR");

        let too_many: Vec<String> = (0..=MAX_ID_BATCH).map(|i| format!("usr-{i}")).collect();
        let (status, body) = post_json(
            &app,
            "/users/describe",
            serde_json::json!({"user_id": too_many}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");

        let (status, body) = post_json(
            &app,
            "/groups/describe",
            serde_json::json!({"root_group_id": too_many}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_membership_flow() {
        let app = app().await;
        let (_, user) = post_json(
            &app,
            "/users",
            serde_json::json!({"username": "bob", "email": "bob@example.com"}),
        )
        .await;
        let (status, group) = post_json(&app, "/groups", serde_json::json!({"name": "ops"})).await;
        assert_eq!(status, StatusCode::CREATED);

        let membership = serde_json::json!({
            "user_ids": [user["user_id"]],
            "group_ids": [group["group_id"]],
        });
        let (status, joined) = post_json(&app, "/groups/join", membership.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(joined["bindings"].as_array().unwrap().len(), 1);

        let (status, body) = post_json(&app, "/groups/join", membership.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "PERMISSION_DENIED");

        let (_, groups) = post_json(
            &app,
            "/groups/by-users",
            serde_json::json!({"user_ids": [user["user_id"]]}),
        )
        .await;
        assert_eq!(groups["group_set"][0]["name"], "ops");

        let (status, left) = post_json(&app, "/groups/leave", membership).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(left["removed"], 1);
    }

    #[tokio::test]
    async fn test_password_endpoints() {
        let app = app().await;
        let (_, user) = post_json(
            &app,
            "/users",
            serde_json::json!({"username": "cy", "email": "cy@example.com", "password": "old"}),
        )
        .await;
        let user_id = user["user_id"].clone();

        let (status, body) = post_json(
            &app,
            "/passwords/modify",
            serde_json::json!({"user_id": user_id, "password": "new"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], user_id);

        let (_, body) = post_json(
            &app,
            "/passwords/compare",
            serde_json::json!({"user_id": user_id, "password": "new"}),
        )
        .await;
        assert_eq!(body["is_match"], true);

        let (status, body) = post_json(
            &app,
            "/passwords/compare",
            serde_json::json!({"user_id": "usr-missing", "password": "x"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_group_with_missing_parent() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/groups",
            serde_json::json!({"name": "child", "parent_group_id": "gid-missing"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}
