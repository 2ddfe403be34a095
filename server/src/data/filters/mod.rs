//! Query filter system
//!
//! Turns request objects into parameterized SELECT statements. Each request
//! type declares a static capability table ([`FieldDescriptor`]s); the
//! [`Chain`] walks it against [`TableMetadata`] to decide which fields become
//! `IN` predicates and how free-text search expands.
//!
//! ## Usage
//!
//! ```no_run
//! use im_server::data::filters::{Chain, TableMetadata, columns};
//! use im_server::domain::identity::DescribeUsersRequest;
//!
//! let meta = TableMetadata::identity();
//! let req = DescribeUsersRequest::default();
//! let query = Chain::new(&meta, columns::TABLE_USER)
//!     .build_filter_conditions(&req, columns::TABLE_USER, &[])
//!     .add_query_order_dir(&req, columns::COLUMN_CREATE_TIME)
//!     .paginate(&req)
//!     .into_query();
//! let sql = query.to_sql();
//! ```

mod builder;
mod metadata;
mod query;
mod request;
mod types;

pub use builder::{
    Chain, DEFAULT_LIMIT, DEFAULT_OFFSET, DEFAULT_SELECT_LIMIT, get_display_columns, get_limit,
    get_limit_from_request, get_offset, get_offset_from_request,
};
pub use metadata::{TableMetadata, columns};
pub use query::{SelectQuery, SortDirection};
pub use request::{
    FieldDescriptor, FilterRequest, Paginated, SEARCH_WORD_COLUMN, UNMAPPED_COLUMN, column_from_tag,
};
pub use types::{FieldValue, FilterValue, SqlParams, SqlValue};
