//! Identity request and response types
//!
//! The describe requests double as filter requests: their capability tables
//! tell the query chain which fields map to which columns.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::filters::{FieldDescriptor, FieldValue, FilterRequest, Paginated};
use crate::data::types::{GroupRow, UserRow};

/// Input for creating a user
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,
    /// Plain-text password; hashed before storage. Empty leaves no password set.
    pub password: String,
}

/// Input for creating a group; an empty parent creates a root group
#[derive(Debug, Clone, Default)]
pub struct CreateGroup {
    pub parent_group_id: String,
    pub name: String,
    pub description: String,
}

/// Filters for listing users
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct DescribeUsersRequest {
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub user_id: Vec<String>,
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub username: Vec<String>,
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub email: Vec<String>,
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub phone_number: Vec<String>,
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub status: Vec<String>,
    #[validate(length(max = 1024, message = "Search word must be at most 1024 characters"))]
    pub search_word: String,
    pub sort_key: String,
    pub reverse: bool,
    pub offset: u32,
    pub limit: u32,
    /// `None` returns every column, an empty list returns only the total
    pub display_columns: Option<Vec<String>>,
}

impl FilterRequest for DescribeUsersRequest {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        const FIELDS: &[FieldDescriptor<DescribeUsersRequest>] = &[
            FieldDescriptor::new("user_id,omitempty", |r: &DescribeUsersRequest| {
                FieldValue::StrList(&r.user_id)
            }),
            FieldDescriptor::new("username,omitempty", |r: &DescribeUsersRequest| {
                FieldValue::StrList(&r.username)
            }),
            FieldDescriptor::new("email,omitempty", |r: &DescribeUsersRequest| {
                FieldValue::StrList(&r.email)
            }),
            FieldDescriptor::new("phone_number,omitempty", |r: &DescribeUsersRequest| {
                FieldValue::StrList(&r.phone_number)
            }),
            FieldDescriptor::new("status,omitempty", |r: &DescribeUsersRequest| {
                FieldValue::StrList(&r.status)
            }),
            FieldDescriptor::new("search_word,omitempty", |r: &DescribeUsersRequest| {
                FieldValue::Str(&r.search_word)
            }),
        ];
        FIELDS
    }

    fn sort_key(&self) -> Option<&str> {
        Some(self.sort_key.as_str()).filter(|k| !k.is_empty())
    }

    fn reverse(&self) -> bool {
        self.reverse
    }
}

impl Paginated for DescribeUsersRequest {
    fn offset(&self) -> u32 {
        self.offset
    }

    fn limit(&self) -> u32 {
        self.limit
    }
}

/// Filters for listing groups
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct DescribeGroupsRequest {
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub group_id: Vec<String>,
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub parent_group_id: Vec<String>,
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub name: Vec<String>,
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub status: Vec<String>,
    /// Restrict to the subtrees rooted at these groups
    #[validate(custom(function = "crate::api::extractors::validate_id_list"))]
    pub root_group_id: Vec<String>,
    #[validate(length(max = 1024, message = "Search word must be at most 1024 characters"))]
    pub search_word: String,
    pub sort_key: String,
    pub reverse: bool,
    pub offset: u32,
    pub limit: u32,
    pub display_columns: Option<Vec<String>>,
}

impl FilterRequest for DescribeGroupsRequest {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        const FIELDS: &[FieldDescriptor<DescribeGroupsRequest>] = &[
            FieldDescriptor::new("group_id,omitempty", |r: &DescribeGroupsRequest| {
                FieldValue::StrList(&r.group_id)
            }),
            FieldDescriptor::new("parent_group_id,omitempty", |r: &DescribeGroupsRequest| {
                FieldValue::StrList(&r.parent_group_id)
            }),
            FieldDescriptor::new("name,omitempty", |r: &DescribeGroupsRequest| {
                FieldValue::StrList(&r.name)
            }),
            FieldDescriptor::new("status,omitempty", |r: &DescribeGroupsRequest| {
                FieldValue::StrList(&r.status)
            }),
            FieldDescriptor::new("search_word,omitempty", |r: &DescribeGroupsRequest| {
                FieldValue::Str(&r.search_word)
            }),
        ];
        FIELDS
    }

    fn sort_key(&self) -> Option<&str> {
        Some(self.sort_key.as_str()).filter(|k| !k.is_empty())
    }

    fn reverse(&self) -> bool {
        self.reverse
    }
}

impl Paginated for DescribeGroupsRequest {
    fn offset(&self) -> u32 {
        self.offset
    }

    fn limit(&self) -> u32 {
        self.limit
    }
}

/// A page of users plus the total matching the filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPage {
    pub users: Vec<UserRow>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPage {
    pub groups: Vec<GroupRow>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_request_deserializes_with_defaults() {
        let req: DescribeUsersRequest =
            serde_json::from_str(r#"{"email": ["a@example.com"], "limit": 5}"#).unwrap();
        assert_eq!(req.email, vec!["a@example.com"]);
        assert_eq!(req.limit, 5);
        assert!(req.display_columns.is_none());
        assert_eq!(FilterRequest::sort_key(&req), None);
    }

    #[test]
    fn test_empty_display_columns_is_kept() {
        let req: DescribeGroupsRequest =
            serde_json::from_str(r#"{"display_columns": []}"#).unwrap();
        assert_eq!(req.display_columns, Some(vec![]));
    }

    #[test]
    fn test_capability_table_columns() {
        let columns: Vec<&str> = DescribeGroupsRequest::fields()
            .iter()
            .map(|f| f.column())
            .collect();
        assert_eq!(
            columns,
            vec!["group_id", "parent_group_id", "name", "status", "search_word"]
        );
    }
}
