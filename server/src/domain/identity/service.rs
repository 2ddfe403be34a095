//! Identity service
//!
//! Users, groups, and the bindings between them. List operations run
//! through the filter chain; membership changes are all-or-nothing.

use std::sync::Arc;

use crate::data::SqliteService;
use crate::data::filters::columns::{
    COLUMN_CREATE_TIME, COLUMN_PARENT_GROUP_ID, TABLE_GROUP, TABLE_USER,
};
use crate::data::filters::{Chain, FilterRequest, TableMetadata, get_display_columns};
use crate::data::sqlite::repositories;
use crate::data::types::{GroupRow, NewGroup, NewUser, UserGroupBindingRow, UserRow};
use crate::utils::crypto::{hash_password, md5_hex, verify_password};

use super::error::IdentityError;
use super::types::{
    CreateGroup, CreateUser, DescribeGroupsRequest, DescribeUsersRequest, GroupPage, UserPage,
};

/// Trimmed, non-empty, first-seen order
fn normalize_ids(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if !id.is_empty() && !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

#[derive(Clone)]
pub struct IdentityService {
    db: Arc<SqliteService>,
    metadata: Arc<TableMetadata>,
}

impl IdentityService {
    pub fn new(db: Arc<SqliteService>) -> Self {
        Self::with_metadata(db, Arc::new(TableMetadata::identity()))
    }

    pub fn with_metadata(db: Arc<SqliteService>, metadata: Arc<TableMetadata>) -> Self {
        Self { db, metadata }
    }

    /// Sort keys end up in ORDER BY unquoted, so only real columns pass.
    fn check_sort_key<R: FilterRequest>(&self, req: &R, table: &str) -> Result<(), IdentityError> {
        if let Some(key) = req.sort_key()
            && !self.metadata.full_columns(table).iter().any(|c| c == key)
        {
            return Err(IdentityError::invalid(format!(
                "unknown sort key '{}' for {}",
                key, table
            )));
        }
        Ok(())
    }

    pub async fn create_user(&self, input: CreateUser) -> Result<UserRow, IdentityError> {
        let username = input.username.trim();
        let email = input.email.trim();
        if username.is_empty() || email.is_empty() {
            return Err(IdentityError::invalid("empty username or email"));
        }

        let password_hash = if input.password.is_empty() {
            String::new()
        } else {
            let password = input.password.clone();
            tokio::task::spawn_blocking(move || hash_password(&password)).await??
        };

        let user = repositories::create_user(
            self.db.pool(),
            &NewUser {
                username,
                email,
                phone_number: input.phone_number.trim(),
                description: &input.description,
                password_hash: &password_hash,
            },
        )
        .await?;

        tracing::info!(user_id = %user.user_id, "User created");
        Ok(user)
    }

    pub async fn create_group(&self, input: CreateGroup) -> Result<GroupRow, IdentityError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(IdentityError::invalid("empty group name"));
        }
        let parent_group_id = input.parent_group_id.trim();

        let group = repositories::create_group(
            self.db.pool(),
            &NewGroup {
                parent_group_id,
                name,
                description: &input.description,
            },
        )
        .await?
        .ok_or_else(|| {
            IdentityError::not_found(format!("parent group {} not found", parent_group_id))
        })?;

        tracing::info!(group_id = %group.group_id, path = %group.group_path, "Group created");
        Ok(group)
    }

    pub async fn describe_users(
        &self,
        req: &DescribeUsersRequest,
    ) -> Result<UserPage, IdentityError> {
        self.check_sort_key(req, TABLE_USER)?;

        let columns = get_display_columns(
            req.display_columns.as_deref(),
            self.metadata.full_columns(TABLE_USER),
        );
        let query = Chain::new(&self.metadata, TABLE_USER)
            .select(columns)
            .build_filter_conditions(req, TABLE_USER, &[])
            .add_query_order_dir(req, COLUMN_CREATE_TIME)
            .paginate(req)
            .into_query();

        let total = repositories::count_users(self.db.pool(), &query).await?;
        if query.has_empty_projection() {
            return Ok(UserPage {
                users: Vec::new(),
                total,
            });
        }
        let users = repositories::list_users(self.db.pool(), &query).await?;
        Ok(UserPage { users, total })
    }

    pub async fn describe_groups(
        &self,
        req: &DescribeGroupsRequest,
    ) -> Result<GroupPage, IdentityError> {
        self.check_sort_key(req, TABLE_GROUP)?;

        let columns = get_display_columns(
            req.display_columns.as_deref(),
            self.metadata.full_columns(TABLE_GROUP),
        );
        let query = Chain::new(&self.metadata, TABLE_GROUP)
            .select(columns)
            .build_filter_conditions(req, TABLE_GROUP, &[COLUMN_PARENT_GROUP_ID])
            .build_root_group_id_conditions(&normalize_ids(&req.root_group_id))
            .add_query_order_dir(req, COLUMN_CREATE_TIME)
            .paginate(req)
            .into_query();

        let total = repositories::count_groups(self.db.pool(), &query).await?;
        if query.has_empty_projection() {
            return Ok(GroupPage {
                groups: Vec::new(),
                total,
            });
        }
        let groups = repositories::list_groups(self.db.pool(), &query).await?;
        Ok(GroupPage { groups, total })
    }

    /// Bind every user to every group. Fails if any pair is already bound.
    pub async fn join_group(
        &self,
        user_ids: &[String],
        group_ids: &[String],
    ) -> Result<Vec<UserGroupBindingRow>, IdentityError> {
        let (user_ids, group_ids) = (normalize_ids(user_ids), normalize_ids(group_ids));
        if user_ids.is_empty() || group_ids.is_empty() {
            return Err(IdentityError::invalid("empty user id or group id"));
        }

        let existing =
            repositories::get_user_group_bindings(self.db.pool(), &user_ids, &group_ids).await?;
        if !existing.is_empty() {
            return Err(IdentityError::denied("user already in group"));
        }

        let pairs: Vec<(String, String)> = user_ids
            .iter()
            .flat_map(|u| group_ids.iter().map(move |g| (u.clone(), g.clone())))
            .collect();
        let bindings = repositories::insert_bindings(self.db.pool(), &pairs).await?;

        tracing::info!(
            users = user_ids.len(),
            groups = group_ids.len(),
            "Users joined groups"
        );
        Ok(bindings)
    }

    /// Unbind every user from every group. Every pair must currently be bound.
    pub async fn leave_group(
        &self,
        user_ids: &[String],
        group_ids: &[String],
    ) -> Result<u64, IdentityError> {
        let (user_ids, group_ids) = (normalize_ids(user_ids), normalize_ids(group_ids));
        if user_ids.is_empty() || group_ids.is_empty() {
            return Err(IdentityError::invalid("empty user id or group id"));
        }

        let existing =
            repositories::get_user_group_bindings(self.db.pool(), &user_ids, &group_ids).await?;
        if existing.len() != user_ids.len() * group_ids.len() {
            return Err(IdentityError::denied("user not in group"));
        }

        let removed = repositories::delete_bindings(self.db.pool(), &user_ids, &group_ids).await?;
        tracing::info!(removed, "Users left groups");
        Ok(removed)
    }

    pub async fn get_groups_by_user_ids(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<GroupRow>, IdentityError> {
        let groups =
            repositories::get_groups_by_user_ids(self.db.pool(), &normalize_ids(user_ids)).await?;
        Ok(groups)
    }

    pub async fn get_users_by_group_ids(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<UserRow>, IdentityError> {
        let users =
            repositories::get_users_by_group_ids(self.db.pool(), &normalize_ids(group_ids)).await?;
        Ok(users)
    }

    pub async fn get_user_ids_by_group_ids(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<String>, IdentityError> {
        let ids = repositories::get_user_ids_by_group_ids(self.db.pool(), &normalize_ids(group_ids))
            .await?;
        Ok(ids)
    }

    /// Whether `password` matches the user's stored hash
    pub async fn compare_password(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<bool, IdentityError> {
        let stored = repositories::get_password_hash(self.db.pool(), user_id)
            .await?
            .ok_or_else(|| IdentityError::not_found(format!("user {} not found", user_id)))?;

        let matched = if stored.is_empty() {
            false
        } else {
            let attempt = password.to_string();
            tokio::task::spawn_blocking(move || verify_password(&attempt, &stored)).await??
        };

        if !matched {
            tracing::warn!(%user_id, password_md5 = %md5_hex(password), "Password mismatch");
        }
        Ok(matched)
    }

    pub async fn modify_password(&self, user_id: &str, password: &str) -> Result<(), IdentityError> {
        if password.is_empty() {
            return Err(IdentityError::invalid("empty password"));
        }

        let attempt = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&attempt)).await??;

        if !repositories::update_password(self.db.pool(), user_id, &hash).await? {
            return Err(IdentityError::not_found(format!("user {} not found", user_id)));
        }
        tracing::info!(%user_id, "Password modified");
        Ok(())
    }
}
