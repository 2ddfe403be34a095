//! Data storage layer
//!
//! - `sqlite` - Transactional database holding users, groups and bindings
//! - `filters` - Request-to-SQL filter builder shared by list endpoints
//! - `types` - Row types returned by the repositories

pub mod filters;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteService;
pub use types::{GroupRow, UserGroupBindingRow, UserRow};
