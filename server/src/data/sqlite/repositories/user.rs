//! User repository for SQLite operations

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use crate::core::constants::{STATUS_ACTIVE, USER_ID_PREFIX};
use crate::data::filters::{SelectQuery, SqlValue};
use crate::data::sqlite::SqliteError;
use crate::data::sqlite::query::{bind_all, count_rows, fetch_rows, int, text};
use crate::data::types::{NewUser, UserRow};
use crate::utils::sql::placeholders;

const USER_COLUMNS_SQL: &str = "u.user_id, u.username, u.email, u.phone_number, u.description, \
                                u.status, u.create_time, u.update_time, u.status_time";

/// Decode a user row, tolerating columns missing from the projection
fn user_from_row(row: &SqliteRow) -> UserRow {
    UserRow {
        user_id: text(row, "user_id"),
        username: text(row, "username"),
        email: text(row, "email"),
        phone_number: text(row, "phone_number"),
        description: text(row, "description"),
        status: text(row, "status"),
        create_time: int(row, "create_time"),
        update_time: int(row, "update_time"),
        status_time: int(row, "status_time"),
    }
}

/// Create a new user with a generated `usr-` id
pub async fn create_user(pool: &SqlitePool, new: &NewUser<'_>) -> Result<UserRow, SqliteError> {
    let user_id = format!("{}{}", USER_ID_PREFIX, cuid2::create_id());
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO "user" (user_id, username, email, phone_number, description, password,
                            status, create_time, update_time, status_time)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user_id)
    .bind(new.username)
    .bind(new.email)
    .bind(new.phone_number)
    .bind(new.description)
    .bind(new.password_hash)
    .bind(STATUS_ACTIVE)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "user"))?;

    Ok(UserRow {
        user_id,
        username: new.username.to_string(),
        email: new.email.to_string(),
        phone_number: new.phone_number.to_string(),
        description: new.description.to_string(),
        status: STATUS_ACTIVE.to_string(),
        create_time: now,
        update_time: now,
        status_time: now,
    })
}

/// Stored password hash; `None` when the user does not exist
pub async fn get_password_hash(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<String>, SqliteError> {
    let hash = sqlx::query_scalar::<_, String>(r#"SELECT password FROM "user" WHERE user_id = ?"#)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(hash)
}

/// Replace the password hash and bump `update_time`. Returns false if no such user.
pub async fn update_password(
    pool: &SqlitePool,
    user_id: &str,
    password_hash: &str,
) -> Result<bool, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let result = sqlx::query(r#"UPDATE "user" SET password = ?, update_time = ? WHERE user_id = ?"#)
        .bind(password_hash)
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Users matching a query built by the filter chain
pub async fn list_users(pool: &SqlitePool, query: &SelectQuery) -> Result<Vec<UserRow>, SqliteError> {
    let rows = fetch_rows(pool, query).await?;
    Ok(rows.iter().map(user_from_row).collect())
}

pub async fn count_users(pool: &SqlitePool, query: &SelectQuery) -> Result<u64, SqliteError> {
    count_rows(pool, query).await
}

/// Distinct members of any of the given groups
pub async fn get_users_by_group_ids(
    pool: &SqlitePool,
    group_ids: &[String],
) -> Result<Vec<UserRow>, SqliteError> {
    if group_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        r#"
        SELECT DISTINCT {}
        FROM "user" u
        JOIN user_group_binding b ON b.user_id = u.user_id
        WHERE b.group_id IN ({})
        ORDER BY u.create_time DESC, u.user_id
        "#,
        USER_COLUMNS_SQL,
        placeholders(group_ids.len())
    );
    let values: Vec<SqlValue> = group_ids.iter().map(|id| SqlValue::from(id.as_str())).collect();
    let rows = bind_all(sqlx::query(&sql), &values).fetch_all(pool).await?;
    Ok(rows.iter().map(user_from_row).collect())
}
