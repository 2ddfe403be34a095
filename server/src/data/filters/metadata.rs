//! Per-table column metadata consulted by the query chain
//!
//! Built once at startup and shared read-only across requests.

use std::collections::{HashMap, HashSet};

/// Table and column names of the identity schema
pub mod columns {
    pub const TABLE_USER: &str = "user";
    pub const TABLE_GROUP: &str = "group";
    pub const TABLE_USER_GROUP_BINDING: &str = "user_group_binding";

    pub const COLUMN_ID: &str = "id";
    pub const COLUMN_USER_ID: &str = "user_id";
    pub const COLUMN_GROUP_ID: &str = "group_id";
    pub const COLUMN_PARENT_GROUP_ID: &str = "parent_group_id";
    pub const COLUMN_GROUP_PATH: &str = "group_path";
    pub const COLUMN_USERNAME: &str = "username";
    pub const COLUMN_NAME: &str = "name";
    pub const COLUMN_EMAIL: &str = "email";
    pub const COLUMN_PHONE_NUMBER: &str = "phone_number";
    pub const COLUMN_DESCRIPTION: &str = "description";
    pub const COLUMN_PASSWORD: &str = "password";
    pub const COLUMN_STATUS: &str = "status";
    pub const COLUMN_CREATE_TIME: &str = "create_time";
    pub const COLUMN_UPDATE_TIME: &str = "update_time";
    pub const COLUMN_STATUS_TIME: &str = "status_time";

    /// Displayable user columns (the password hash is never projected)
    pub const USER_COLUMNS: &[&str] = &[
        COLUMN_USER_ID,
        COLUMN_USERNAME,
        COLUMN_EMAIL,
        COLUMN_PHONE_NUMBER,
        COLUMN_DESCRIPTION,
        COLUMN_STATUS,
        COLUMN_CREATE_TIME,
        COLUMN_UPDATE_TIME,
        COLUMN_STATUS_TIME,
    ];

    pub const GROUP_COLUMNS: &[&str] = &[
        COLUMN_GROUP_ID,
        COLUMN_PARENT_GROUP_ID,
        COLUMN_GROUP_PATH,
        COLUMN_NAME,
        COLUMN_DESCRIPTION,
        COLUMN_STATUS,
        COLUMN_CREATE_TIME,
        COLUMN_UPDATE_TIME,
        COLUMN_STATUS_TIME,
    ];

    pub const BINDING_COLUMNS: &[&str] =
        &[COLUMN_ID, COLUMN_USER_ID, COLUMN_GROUP_ID, COLUMN_CREATE_TIME];

    pub const USER_INDEXED: &[&str] = &[
        COLUMN_USER_ID,
        COLUMN_USERNAME,
        COLUMN_EMAIL,
        COLUMN_PHONE_NUMBER,
        COLUMN_STATUS,
    ];

    pub const GROUP_INDEXED: &[&str] = &[
        COLUMN_GROUP_ID,
        COLUMN_PARENT_GROUP_ID,
        COLUMN_NAME,
        COLUMN_STATUS,
    ];

    pub const BINDING_INDEXED: &[&str] = &[COLUMN_USER_ID, COLUMN_GROUP_ID];

    pub const USER_SEARCHABLE: &[&str] = &[
        COLUMN_USER_ID,
        COLUMN_USERNAME,
        COLUMN_EMAIL,
        COLUMN_PHONE_NUMBER,
        COLUMN_DESCRIPTION,
    ];

    pub const GROUP_SEARCHABLE: &[&str] = &[
        COLUMN_GROUP_ID,
        COLUMN_PARENT_GROUP_ID,
        COLUMN_NAME,
        COLUMN_DESCRIPTION,
    ];
}

/// Which columns of each table are indexed, searchable, and displayable
#[derive(Debug, Clone, Default)]
pub struct TableMetadata {
    indexed: HashMap<String, HashSet<String>>,
    searchable: HashMap<String, Vec<String>>,
    search_tables: HashSet<String>,
    full_columns: HashMap<String, Vec<String>>,
}

impl TableMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table. A non-empty `searchable` list makes it search-capable.
    pub fn with_table(
        mut self,
        table: &str,
        full: &[&str],
        indexed: &[&str],
        searchable: &[&str],
    ) -> Self {
        self.full_columns
            .insert(table.to_string(), to_strings(full));
        self.indexed.insert(
            table.to_string(),
            indexed.iter().map(|c| c.to_string()).collect(),
        );
        if !searchable.is_empty() {
            self.searchable
                .insert(table.to_string(), to_strings(searchable));
            self.search_tables.insert(table.to_string());
        }
        self
    }

    /// Metadata for the user, group, and binding tables
    pub fn identity() -> Self {
        use columns::*;
        Self::new()
            .with_table(TABLE_USER, USER_COLUMNS, USER_INDEXED, USER_SEARCHABLE)
            .with_table(TABLE_GROUP, GROUP_COLUMNS, GROUP_INDEXED, GROUP_SEARCHABLE)
            .with_table(TABLE_USER_GROUP_BINDING, BINDING_COLUMNS, BINDING_INDEXED, &[])
    }

    pub fn is_indexed(&self, table: &str, column: &str) -> bool {
        self.indexed
            .get(table)
            .is_some_and(|cols| cols.contains(column))
    }

    pub fn is_search_table(&self, table: &str) -> bool {
        self.search_tables.contains(table)
    }

    pub fn searchable_columns(&self, table: &str) -> &[String] {
        self.searchable.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn full_columns(&self, table: &str) -> &[String] {
        self.full_columns.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `column` is a known column of any registered table
    pub fn is_known_column(&self, column: &str) -> bool {
        self.full_columns
            .values()
            .any(|cols| cols.iter().any(|c| c == column))
    }
}

fn to_strings(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::columns::*;
    use super::*;

    #[test]
    fn identity_metadata_lookups() {
        let meta = TableMetadata::identity();

        assert!(meta.is_indexed(TABLE_USER, COLUMN_EMAIL));
        assert!(!meta.is_indexed(TABLE_USER, COLUMN_DESCRIPTION));
        assert!(meta.is_indexed(TABLE_USER_GROUP_BINDING, COLUMN_GROUP_ID));
        assert!(!meta.is_indexed("missing", COLUMN_USER_ID));

        assert!(meta.is_search_table(TABLE_USER));
        assert!(meta.is_search_table(TABLE_GROUP));
        assert!(!meta.is_search_table(TABLE_USER_GROUP_BINDING));

        assert_eq!(meta.searchable_columns(TABLE_GROUP).len(), GROUP_SEARCHABLE.len());
        assert!(meta.searchable_columns(TABLE_USER_GROUP_BINDING).is_empty());
        assert_eq!(meta.full_columns(TABLE_USER)[0], COLUMN_USER_ID);
    }

    #[test]
    fn password_is_never_displayable() {
        let meta = TableMetadata::identity();
        assert!(!meta.full_columns(TABLE_USER).iter().any(|c| c == COLUMN_PASSWORD));
        assert!(!meta.is_known_column(COLUMN_PASSWORD));
        assert!(meta.is_known_column(COLUMN_CREATE_TIME));
    }
}
