//! Group repository for SQLite operations

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use crate::core::constants::{GROUP_ID_PREFIX, GROUP_PATH_SEPARATOR, STATUS_ACTIVE};
use crate::data::filters::{SelectQuery, SqlValue};
use crate::data::sqlite::SqliteError;
use crate::data::sqlite::query::{bind_all, count_rows, fetch_rows, int, text};
use crate::data::types::{GroupRow, NewGroup};
use crate::utils::sql::placeholders;

const GROUP_COLUMNS_SQL: &str = "g.group_id, g.parent_group_id, g.group_path, g.name, \
                                 g.description, g.status, g.create_time, g.update_time, g.status_time";

fn group_from_row(row: &SqliteRow) -> GroupRow {
    GroupRow {
        group_id: text(row, "group_id"),
        parent_group_id: text(row, "parent_group_id"),
        group_path: text(row, "group_path"),
        name: text(row, "name"),
        description: text(row, "description"),
        status: text(row, "status"),
        create_time: int(row, "create_time"),
        update_time: int(row, "update_time"),
        status_time: int(row, "status_time"),
    }
}

/// Create a group under `parent_group_id` (or at the root when empty).
///
/// The path is the parent's path followed by the new id and a separator.
/// Returns `None` when the parent does not exist.
pub async fn create_group(
    pool: &SqlitePool,
    new: &NewGroup<'_>,
) -> Result<Option<GroupRow>, SqliteError> {
    let group_id = format!("{}{}", GROUP_ID_PREFIX, cuid2::create_id());
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    let parent_path = if new.parent_group_id.is_empty() {
        String::new()
    } else {
        let path: Option<String> =
            sqlx::query_scalar(r#"SELECT group_path FROM "group" WHERE group_id = ?"#)
                .bind(new.parent_group_id)
                .fetch_optional(&mut *tx)
                .await?;
        match path {
            Some(p) => p,
            None => return Ok(None),
        }
    };
    let group_path = format!("{}{}{}", parent_path, group_id, GROUP_PATH_SEPARATOR);

    sqlx::query(
        r#"
        INSERT INTO "group" (group_id, parent_group_id, group_path, name, description,
                             status, create_time, update_time, status_time)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&group_id)
    .bind(new.parent_group_id)
    .bind(&group_path)
    .bind(new.name)
    .bind(new.description)
    .bind(STATUS_ACTIVE)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| SqliteError::from_write(e, "group"))?;

    tx.commit().await?;

    Ok(Some(GroupRow {
        group_id,
        parent_group_id: new.parent_group_id.to_string(),
        group_path,
        name: new.name.to_string(),
        description: new.description.to_string(),
        status: STATUS_ACTIVE.to_string(),
        create_time: now,
        update_time: now,
        status_time: now,
    }))
}

pub async fn list_groups(
    pool: &SqlitePool,
    query: &SelectQuery,
) -> Result<Vec<GroupRow>, SqliteError> {
    let rows = fetch_rows(pool, query).await?;
    Ok(rows.iter().map(group_from_row).collect())
}

pub async fn count_groups(pool: &SqlitePool, query: &SelectQuery) -> Result<u64, SqliteError> {
    count_rows(pool, query).await
}

/// Distinct groups any of the given users belong to
pub async fn get_groups_by_user_ids(
    pool: &SqlitePool,
    user_ids: &[String],
) -> Result<Vec<GroupRow>, SqliteError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        r#"
        SELECT DISTINCT {}
        FROM "group" g
        JOIN user_group_binding b ON b.group_id = g.group_id
        WHERE b.user_id IN ({})
        ORDER BY g.create_time DESC, g.group_id
        "#,
        GROUP_COLUMNS_SQL,
        placeholders(user_ids.len())
    );
    let values: Vec<SqlValue> = user_ids.iter().map(|id| SqlValue::from(id.as_str())).collect();
    let rows = bind_all(sqlx::query(&sql), &values).fetch_all(pool).await?;
    Ok(rows.iter().map(group_from_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::{Chain, TableMetadata, columns};
    use crate::data::sqlite::SqliteService;

    fn new_group<'a>(parent_group_id: &'a str, name: &'a str) -> NewGroup<'a> {
        NewGroup {
            parent_group_id,
            name,
            description: "",
        }
    }

    #[tokio::test]
    async fn test_root_and_child_paths() {
        let db = SqliteService::in_memory().await.unwrap();

        let root = create_group(db.pool(), &new_group("", "root"))
            .await
            .unwrap()
            .unwrap();
        assert!(root.group_id.starts_with(GROUP_ID_PREFIX));
        assert_eq!(root.group_path, format!("{}.", root.group_id));
        assert_eq!(root.parent_group_id, "");

        let child = create_group(db.pool(), &new_group(&root.group_id, "child"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            child.group_path,
            format!("{}.{}.", root.group_id, child.group_id)
        );

        let meta = TableMetadata::identity();
        let mut query = Chain::new(&meta, columns::TABLE_GROUP).into_query();
        query.and_where(
            format!("{} = ?", columns::COLUMN_GROUP_ID),
            [SqlValue::from(child.group_id.as_str())],
        );
        assert_eq!(list_groups(db.pool(), &query).await.unwrap(), vec![child]);
    }

    #[tokio::test]
    async fn test_missing_parent_returns_none() {
        let db = SqliteService::in_memory().await.unwrap();
        let created = create_group(db.pool(), &new_group("gid-missing", "orphan"))
            .await
            .unwrap();
        assert!(created.is_none());

        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM "group""#)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_groups_by_user_ids_empty_input() {
        let db = SqliteService::in_memory().await.unwrap();
        assert!(get_groups_by_user_ids(db.pool(), &[]).await.unwrap().is_empty());
    }
}
