//! SQLite repositories
//!
//! Row types (UserRow, GroupRow, etc.) live in `crate::data::types`.

pub mod binding;
pub mod group;
pub mod user;

pub use binding::{
    delete_bindings, get_user_group_bindings, get_user_ids_by_group_ids, insert_bindings,
};
pub use group::{count_groups, create_group, get_groups_by_user_ids, list_groups};
pub use user::{
    count_users, create_user, get_password_hash, get_users_by_group_ids, list_users,
    update_password,
};
