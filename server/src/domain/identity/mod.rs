//! Identity management: users, groups, and memberships

mod error;
mod service;
mod types;

pub use error::IdentityError;
pub use service::IdentityService;
pub use types::{
    CreateGroup, CreateUser, DescribeGroupsRequest, DescribeUsersRequest, GroupPage, UserPage,
};
