//! OpenAPI specification

use axum::http::header;
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, identity};
use crate::domain::identity::{DescribeGroupsRequest, DescribeUsersRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "IM API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Identity manager: users, groups and memberships"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "users", description = "User management"),
        (name = "groups", description = "Groups and memberships"),
        (name = "passwords", description = "Password checks and changes")
    ),
    paths(
        health::health,
        identity::create_user,
        identity::describe_users,
        identity::get_users_by_group_ids,
        identity::get_user_ids_by_group_ids,
        identity::create_group,
        identity::describe_groups,
        identity::join_group,
        identity::leave_group,
        identity::get_groups_by_user_ids,
        identity::compare_password,
        identity::modify_password,
    ),
    components(schemas(
        health::HealthResponse,
        DescribeUsersRequest,
        DescribeGroupsRequest,
        identity::types::UserDto,
        identity::types::GroupDto,
        identity::types::BindingDto,
        identity::types::CreateUserRequest,
        identity::types::CreateGroupRequest,
        identity::types::DescribeUsersResponse,
        identity::types::DescribeGroupsResponse,
        identity::types::MembershipRequest,
        identity::types::JoinGroupResponse,
        identity::types::LeaveGroupResponse,
        identity::types::UserIdsRequest,
        identity::types::GroupIdsRequest,
        identity::types::GroupSetResponse,
        identity::types::UserSetResponse,
        identity::types::UserIdsResponse,
        identity::types::PasswordRequest,
        identity::types::ComparePasswordResponse,
        identity::types::ModifyPasswordResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}
