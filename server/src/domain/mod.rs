//! Domain logic
//!
//! - `identity` - Users, groups, memberships and passwords

pub mod identity;

pub use identity::{IdentityError, IdentityService};
