// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "IM";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "im";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".im";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "im.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "IM_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "IM_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "IM_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "IM_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "IM_LOG";

/// Default log filter when neither IM_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,im_server=info";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 9119;

/// Maximum JSON request body size (1MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Timeout applied by the HTTP client to every request
pub const CLIENT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "IM_DATA_DIR";

/// Environment variable to override the database file path
pub const ENV_DB_PATH: &str = "IM_DB_PATH";

/// Environment variable for the connection pool size
pub const ENV_DB_MAX_CONNECTIONS: &str = "IM_DB_MAX_CONNECTIONS";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "im.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks after a shutdown signal
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Identity
// =============================================================================

/// Prefix of generated user ids
pub const USER_ID_PREFIX: &str = "usr-";

/// Prefix of generated group ids
pub const GROUP_ID_PREFIX: &str = "gid-";

/// Prefix of generated binding ids
pub const BINDING_ID_PREFIX: &str = "ugb-";

/// Separator terminating each id in a group path
pub const GROUP_PATH_SEPARATOR: &str = ".";

/// Status given to newly created users and groups
pub const STATUS_ACTIVE: &str = "active";
