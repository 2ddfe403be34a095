//! Row types for the identity tables
//!
//! Timestamps are unix seconds. Rows loaded through a narrowed projection
//! carry default values for the columns that were not selected.

use serde::{Deserialize, Serialize};

// ============================================================================
// User types
// ============================================================================

/// User row from database (the password hash is never loaded into it)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
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

/// Fields supplied when creating a user
#[derive(Debug, Clone, Default)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub description: &'a str,
    /// Already-hashed password (PHC string)
    pub password_hash: &'a str,
}

// ============================================================================
// Group types
// ============================================================================

/// Group row from database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRow {
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

#[derive(Debug, Clone, Default)]
pub struct NewGroup<'a> {
    /// Empty for a root group
    pub parent_group_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
}

// ============================================================================
// Binding types
// ============================================================================

/// Membership of one user in one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroupBindingRow {
    pub id: String,
    pub user_id: String,
    pub group_id: String,
    pub create_time: i64,
}
