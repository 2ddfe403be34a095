//! Shared data types for the storage layer

mod transactional;

pub use transactional::{GroupRow, NewGroup, NewUser, UserGroupBindingRow, UserRow};
