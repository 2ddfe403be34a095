//! Identity API types
//!
//! Shared by the route handlers and by [`crate::client::ImClient`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::validate_id_list;
use crate::data::types::{GroupRow, UserGroupBindingRow, UserRow};

/// User as returned by the API (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,
    pub status: String,
    pub create_time: i64,
    pub update_time: i64,
    pub status_time: i64,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            email: row.email,
            phone_number: row.phone_number,
            description: row.description,
            status: row.status,
            create_time: row.create_time,
            update_time: row.update_time,
            status_time: row.status_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GroupDto {
    pub group_id: String,
    pub parent_group_id: String,
    pub group_path: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub create_time: i64,
    pub update_time: i64,
    pub status_time: i64,
}

impl From<GroupRow> for GroupDto {
    fn from(row: GroupRow) -> Self {
        Self {
            group_id: row.group_id,
            parent_group_id: row.parent_group_id,
            group_path: row.group_path,
            name: row.name,
            description: row.description,
            status: row.status,
            create_time: row.create_time,
            update_time: row.update_time,
            status_time: row.status_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BindingDto {
    pub id: String,
    pub user_id: String,
    pub group_id: String,
    pub create_time: i64,
}

impl From<UserGroupBindingRow> for BindingDto {
    fn from(row: UserGroupBindingRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            group_id: row.group_id,
            create_time: row.create_time,
        }
    }
}

/// Request body for creating a user
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 32, message = "Phone number must be at most 32 characters"))]
    pub phone_number: String,
    #[serde(default)]
    #[validate(length(max = 1024, message = "Description must be at most 1024 characters"))]
    pub description: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for creating a group; omit `parent_group_id` for a root group
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub parent_group_id: String,
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1024, message = "Description must be at most 1024 characters"))]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DescribeUsersResponse {
    pub user_set: Vec<UserDto>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DescribeGroupsResponse {
    pub group_set: Vec<GroupDto>,
    pub total_count: u64,
}

/// Users × groups for join and leave
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct MembershipRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_id_list"))]
    pub user_ids: Vec<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_id_list"))]
    pub group_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JoinGroupResponse {
    pub bindings: Vec<BindingDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveGroupResponse {
    pub removed: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserIdsRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_id_list"))]
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct GroupIdsRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_id_list"))]
    pub group_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupSetResponse {
    pub group_set: Vec<GroupDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSetResponse {
    pub user_set: Vec<UserDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserIdsResponse {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PasswordRequest {
    #[validate(length(min = 1, max = 256, message = "user_id must be 1-256 characters"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password must be at most 1024 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComparePasswordResponse {
    pub is_match: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModifyPasswordResponse {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_validation() {
        let ok = CreateUserRequest {
            username: "ann".into(),
            email: "ann@example.com".into(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = CreateUserRequest {
            username: "".into(),
            email: "not-an-email".into(),
            ..Default::default()
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_membership_request_defaults() {
        let req: MembershipRequest = serde_json::from_str(r#"{"user_ids": ["usr-1"]}"#).unwrap();
        assert!(req.group_ids.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_user_dto_from_row() {
        let dto = UserDto::from(UserRow {
            user_id: "usr-1".into(),
            email: "a@example.com".into(),
            create_time: 7,
            ..Default::default()
        });
        assert_eq!(dto.user_id, "usr-1");
        assert_eq!(dto.create_time, 7);
    }
}
