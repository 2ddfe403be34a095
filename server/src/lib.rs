//! IM server: identity management over a JSON API
//!
//! - `core` - CLI, configuration, storage paths, shutdown
//! - `data` - SQLite storage, repositories and the query filter builder
//! - `domain` - Identity service (users, groups, memberships, passwords)
//! - `api` - axum routes and server
//! - `client` - HTTP client for the API

pub mod api;
mod app;
pub mod client;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
