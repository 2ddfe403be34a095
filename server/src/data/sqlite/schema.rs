//! SQLite schema definitions
//!
//! Fresh databases get the complete schema at the current version; existing
//! databases are brought forward by the migrations in `migrations.rs`.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS "user" (
    user_id TEXT PRIMARY KEY,
    username TEXT NOT NULL CHECK(length(username) >= 1 AND length(username) <= 255),
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3),
    phone_number TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    password TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'active',
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL,
    status_time INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_username ON "user"(username);
CREATE INDEX IF NOT EXISTS idx_user_status ON "user"(status);
CREATE INDEX IF NOT EXISTS idx_user_create_time ON "user"(create_time);

-- =============================================================================
-- 2. Groups (tree: group_path is the dot-terminated chain of ancestor ids)
-- =============================================================================
CREATE TABLE IF NOT EXISTS "group" (
    group_id TEXT PRIMARY KEY,
    parent_group_id TEXT NOT NULL DEFAULT '',
    group_path TEXT NOT NULL,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 255),
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'active',
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL,
    status_time INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_group_parent ON "group"(parent_group_id);
CREATE INDEX IF NOT EXISTS idx_group_create_time ON "group"(create_time);
CREATE INDEX IF NOT EXISTS idx_group_path ON "group"(group_path);

-- =============================================================================
-- 3. User-group bindings (references users + groups)
-- =============================================================================
CREATE TABLE IF NOT EXISTS user_group_binding (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES "user"(user_id) ON DELETE CASCADE,
    group_id TEXT NOT NULL REFERENCES "group"(group_id) ON DELETE CASCADE,
    create_time INTEGER NOT NULL,
    UNIQUE(user_id, group_id)
);

CREATE INDEX IF NOT EXISTS idx_binding_group ON user_group_binding(group_id);
"#;

/// v2: index the group path for root-group subtree filters
pub const MIGRATION_V2: &str = r#"CREATE INDEX IF NOT EXISTS idx_group_path ON "group"(group_path)"#;
