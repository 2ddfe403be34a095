//! Execution of built [`SelectQuery`]s against SQLite

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};

use super::SqliteError;
use crate::data::filters::{SelectQuery, SqlValue};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Bind values to `?` placeholders in order
pub fn bind_all<'q>(mut query: SqliteQuery<'q>, values: &[SqlValue]) -> SqliteQuery<'q> {
    for value in values {
        query = match value {
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Int(i) => query.bind(*i),
        };
    }
    query
}

/// Run the SELECT and return raw rows
pub async fn fetch_rows(pool: &SqlitePool, query: &SelectQuery) -> Result<Vec<SqliteRow>, SqliteError> {
    let sql = query.to_sql();
    let params = query.params();
    tracing::trace!(%sql, params = params.len(), "Executing select");
    let rows = bind_all(sqlx::query(&sql), &params).fetch_all(pool).await?;
    Ok(rows)
}

/// Count rows matching the query's filters (ignores order and paging)
pub async fn count_rows(pool: &SqlitePool, query: &SelectQuery) -> Result<u64, SqliteError> {
    let sql = query.count_sql();
    tracing::trace!(%sql, params = query.params.len(), "Executing count");
    let row = bind_all(sqlx::query(&sql), query.filter_params())
        .fetch_one(pool)
        .await?;
    let total: i64 = row.try_get(0)?;
    Ok(u64::try_from(total).unwrap_or_default())
}

/// Text column, or empty when it was not projected
pub fn text(row: &SqliteRow, column: &str) -> String {
    row.try_get::<String, _>(column).unwrap_or_default()
}

/// Integer column, or zero when it was not projected
pub fn int(row: &SqliteRow, column: &str) -> i64 {
    row.try_get::<i64, _>(column).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::{Chain, TableMetadata, columns};
    use crate::data::sqlite::SqliteService;

    #[tokio::test]
    async fn test_fetch_and_count_with_bound_params() {
        let db = SqliteService::in_memory().await.unwrap();
        for (id, name, t) in [("gid-a", "alpha", 1_i64), ("gid-b", "beta", 2), ("gid-c", "gamma", 3)] {
            sqlx::query(
                r#"INSERT INTO "group" (group_id, group_path, name, create_time, update_time, status_time)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(id)
            .bind(format!("{}.", id))
            .bind(name)
            .bind(t)
            .bind(t)
            .bind(t)
            .execute(db.pool())
            .await
            .unwrap();
        }

        let meta = TableMetadata::identity();
        let mut query = Chain::new(&meta, columns::TABLE_GROUP).into_query();
        query.and_where(
            "group_id IN (?, ?)".to_string(),
            [SqlValue::from("gid-a"), SqlValue::from("gid-c")],
        );
        query.limit = Some(1);
        query.offset = Some(1);
        query.order_by = Some((
            columns::COLUMN_CREATE_TIME.to_string(),
            crate::data::filters::SortDirection::Asc,
        ));

        assert_eq!(count_rows(db.pool(), &query).await.unwrap(), 2);

        let rows = fetch_rows(db.pool(), &query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(text(&rows[0], "group_id"), "gid-c");
        assert_eq!(int(&rows[0], "create_time"), 3);
        assert_eq!(text(&rows[0], "not_a_column"), "");
    }
}
