//! User-group binding repository for SQLite operations

use sqlx::SqlitePool;

use crate::core::constants::BINDING_ID_PREFIX;
use crate::data::filters::SqlValue;
use crate::data::sqlite::SqliteError;
use crate::data::sqlite::query::{bind_all, int, text};
use crate::data::types::UserGroupBindingRow;
use crate::utils::sql::placeholders;

fn id_values(ids: &[String]) -> Vec<SqlValue> {
    ids.iter().map(|id| SqlValue::from(id.as_str())).collect()
}

/// Existing bindings between any of `user_ids` and any of `group_ids`
pub async fn get_user_group_bindings(
    pool: &SqlitePool,
    user_ids: &[String],
    group_ids: &[String],
) -> Result<Vec<UserGroupBindingRow>, SqliteError> {
    if user_ids.is_empty() || group_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id, user_id, group_id, create_time FROM user_group_binding \
         WHERE user_id IN ({}) AND group_id IN ({}) ORDER BY create_time, id",
        placeholders(user_ids.len()),
        placeholders(group_ids.len())
    );
    let mut values = id_values(user_ids);
    values.extend(id_values(group_ids));

    let rows = bind_all(sqlx::query(&sql), &values).fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| UserGroupBindingRow {
            id: text(row, "id"),
            user_id: text(row, "user_id"),
            group_id: text(row, "group_id"),
            create_time: int(row, "create_time"),
        })
        .collect())
}

/// Insert one binding per (user, group) pair, all or nothing
pub async fn insert_bindings(
    pool: &SqlitePool,
    pairs: &[(String, String)],
) -> Result<Vec<UserGroupBindingRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;
    let mut inserted = Vec::with_capacity(pairs.len());

    for (user_id, group_id) in pairs {
        let id = format!("{}{}", BINDING_ID_PREFIX, cuid2::create_id());
        sqlx::query(
            "INSERT INTO user_group_binding (id, user_id, group_id, create_time) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(group_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| SqliteError::from_write(e, "binding"))?;

        inserted.push(UserGroupBindingRow {
            id,
            user_id: user_id.clone(),
            group_id: group_id.clone(),
            create_time: now,
        });
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Remove every binding between `user_ids` and `group_ids`; returns rows deleted
pub async fn delete_bindings(
    pool: &SqlitePool,
    user_ids: &[String],
    group_ids: &[String],
) -> Result<u64, SqliteError> {
    if user_ids.is_empty() || group_ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "DELETE FROM user_group_binding WHERE user_id IN ({}) AND group_id IN ({})",
        placeholders(user_ids.len()),
        placeholders(group_ids.len())
    );
    let mut values = id_values(user_ids);
    values.extend(id_values(group_ids));

    let result = bind_all(sqlx::query(&sql), &values).execute(pool).await?;
    Ok(result.rows_affected())
}

/// Distinct member ids of the given groups
pub async fn get_user_ids_by_group_ids(
    pool: &SqlitePool,
    group_ids: &[String],
) -> Result<Vec<String>, SqliteError> {
    if group_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT DISTINCT user_id FROM user_group_binding WHERE group_id IN ({}) ORDER BY user_id",
        placeholders(group_ids.len())
    );
    let rows = bind_all(sqlx::query(&sql), &id_values(group_ids))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(|row| text(row, "user_id")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::{create_group, create_user};
    use crate::data::types::{NewGroup, NewUser};

    async fn seed(db: &SqliteService) -> (Vec<String>, Vec<String>) {
        let mut users = Vec::new();
        for name in ["ann", "bob"] {
            let email = format!("{}@example.com", name);
            let user = create_user(
                db.pool(),
                &NewUser {
                    username: name,
                    email: &email,
                    password_hash: "hash",
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            users.push(user.user_id);
        }

        let mut groups = Vec::new();
        for name in ["ops", "dev"] {
            let group = create_group(
                db.pool(),
                &NewGroup {
                    name,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
            groups.push(group.group_id);
        }
        (users, groups)
    }

    #[tokio::test]
    async fn test_insert_query_delete() {
        let db = SqliteService::in_memory().await.unwrap();
        let (users, groups) = seed(&db).await;

        let pairs: Vec<(String, String)> = users
            .iter()
            .flat_map(|u| groups.iter().map(move |g| (u.clone(), g.clone())))
            .collect();
        let inserted = insert_bindings(db.pool(), &pairs).await.unwrap();
        assert_eq!(inserted.len(), 4);
        assert!(inserted.iter().all(|b| b.id.starts_with(BINDING_ID_PREFIX)));

        let found = get_user_group_bindings(db.pool(), &users[..1], &groups)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let ids = get_user_ids_by_group_ids(db.pool(), &groups).await.unwrap();
        assert_eq!(ids.len(), 2);

        let deleted = delete_bindings(db.pool(), &users[..1], &groups).await.unwrap();
        assert_eq!(deleted, 2);
        let ids = get_user_ids_by_group_ids(db.pool(), &groups).await.unwrap();
        assert_eq!(ids, vec![users[1].clone()]);
    }

    #[tokio::test]
    async fn test_duplicate_pair_rolls_back_batch() {
        let db = SqliteService::in_memory().await.unwrap();
        let (users, groups) = seed(&db).await;

        insert_bindings(db.pool(), &[(users[0].clone(), groups[0].clone())])
            .await
            .unwrap();

        let err = insert_bindings(
            db.pool(),
            &[
                (users[1].clone(), groups[0].clone()),
                (users[0].clone(), groups[0].clone()),
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SqliteError::Conflict(_)));

        let found = get_user_group_bindings(db.pool(), &users, &groups).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_group_is_missing_reference() {
        let db = SqliteService::in_memory().await.unwrap();
        let (users, _) = seed(&db).await;

        let err = insert_bindings(db.pool(), &[(users[0].clone(), "gid-missing".to_string())])
            .await
            .unwrap_err();
        assert!(matches!(err, SqliteError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_empty_inputs_short_circuit() {
        let db = SqliteService::in_memory().await.unwrap();
        assert!(get_user_group_bindings(db.pool(), &[], &[]).await.unwrap().is_empty());
        assert_eq!(delete_bindings(db.pool(), &[], &["x".into()]).await.unwrap(), 0);
        assert!(get_user_ids_by_group_ids(db.pool(), &[]).await.unwrap().is_empty());
    }
}
