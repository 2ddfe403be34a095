//! Query chain
//!
//! Translates a request's capability table into WHERE predicates, ordering,
//! and paging over a single table. The chain only builds SQL; executing it is
//! up to the repositories.

use super::metadata::{TableMetadata, columns::COLUMN_GROUP_PATH};
use super::query::{SelectQuery, SortDirection};
use super::request::{FilterRequest, Paginated, SEARCH_WORD_COLUMN};
use super::types::{FilterValue, SqlValue};
use crate::utils::sql::{contains_pattern, escape_like_pattern, like_clause, placeholders};

pub const DEFAULT_OFFSET: u32 = 0;
pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_SELECT_LIMIT: u32 = 200;

/// Suffix marking identifier columns, which are matched exactly in search
const ID_SUFFIX: &str = "_id";

/// Builder over a [`SelectQuery`]; every step consumes and returns the chain
#[derive(Debug)]
pub struct Chain<'a> {
    meta: &'a TableMetadata,
    query: SelectQuery,
}

impl<'a> Chain<'a> {
    pub fn new(meta: &'a TableMetadata, table: &str) -> Self {
        Self {
            meta,
            query: SelectQuery::new(table),
        }
    }

    pub fn into_query(self) -> SelectQuery {
        self.query
    }

    /// Restrict the projection (see [`get_display_columns`])
    pub fn select(mut self, columns: Vec<String>) -> Self {
        self.query = self.query.with_columns(columns);
        self
    }

    /// Attach `IN` predicates for indexed fields and the free-text search
    /// clause when `table` is search-capable.
    pub fn build_filter_conditions<R: FilterRequest>(
        mut self,
        req: &R,
        table: &str,
        exclude_columns: &[&str],
    ) -> Self {
        for field in R::fields() {
            let column = field.column();

            if self.meta.is_indexed(table, column)
                && let Some(value) = FilterValue::normalize(field.value(req))
            {
                self.query.and_where(
                    format!("{} IN ({})", column, placeholders(value.len())),
                    value.into_sql_values(),
                );
            }

            if column == SEARCH_WORD_COLUMN && self.meta.is_search_table(table) {
                let value = FilterValue::normalize(field.value(req));
                self = self.build_search_conditions(value, table, exclude_columns);
            }
        }
        self
    }

    fn build_search_conditions(
        mut self,
        value: Option<FilterValue>,
        table: &str,
        exclude_columns: &[&str],
    ) -> Self {
        let Some(value) = value else {
            return self;
        };
        let Some(terms) = value.as_strings() else {
            tracing::warn!(table, ?value, "Search word is not a list of strings, ignoring");
            return self;
        };

        let columns: Vec<&str> = self
            .meta
            .searchable_columns(table)
            .iter()
            .map(String::as_str)
            .filter(|c| !exclude_columns.contains(c))
            .collect();

        for term in terms {
            let mut clauses = Vec::with_capacity(columns.len());
            let mut values = Vec::with_capacity(columns.len());
            for column in &columns {
                if column.ends_with(ID_SUFFIX) {
                    clauses.push(format!("{} = ?", column));
                    values.push(SqlValue::from(term.as_str()));
                } else {
                    clauses.push(like_clause(&format!("LOWER({})", column)));
                    values.push(SqlValue::Text(contains_pattern(term)));
                }
            }
            if clauses.is_empty() {
                continue;
            }
            self.query
                .and_where(format!("({})", clauses.join(" OR ")), values);
        }
        self
    }

    /// OR together substring matches of each id against `group_path`
    pub fn build_root_group_id_conditions(mut self, root_group_ids: &[String]) -> Self {
        if root_group_ids.is_empty() {
            return self;
        }
        let clauses: Vec<String> = root_group_ids
            .iter()
            .map(|_| like_clause(COLUMN_GROUP_PATH))
            .collect();
        let values = root_group_ids
            .iter()
            .map(|id| SqlValue::Text(format!("%{}%", escape_like_pattern(id.trim()))));
        self.query
            .and_where(format!("({})", clauses.join(" OR ")), values);
        self
    }

    /// `ORDER BY <sort key or default_column> <DESC | ASC when reversed>`
    pub fn add_query_order_dir<R: FilterRequest>(mut self, req: &R, default_column: &str) -> Self {
        let column = req
            .sort_key()
            .filter(|k| !k.is_empty())
            .unwrap_or(default_column);
        if !self.meta.is_known_column(column) {
            tracing::warn!(column, table = %self.query.table, "Sorting by unknown column");
        }
        let direction = if req.reverse() {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        self.query.order_by = Some((column.to_string(), direction));
        self
    }

    /// Apply `LIMIT ? OFFSET ?` from the request's paging values
    pub fn paginate<R: Paginated>(mut self, req: &R) -> Self {
        self.query.limit = Some(get_limit_from_request(req));
        self.query.offset = Some(get_offset_from_request(req));
        self
    }
}

pub fn get_limit(limit: u32) -> u32 {
    match limit {
        0 => DEFAULT_LIMIT,
        l if l > DEFAULT_SELECT_LIMIT => DEFAULT_SELECT_LIMIT,
        l => l,
    }
}

pub fn get_offset(offset: u32) -> u32 {
    if offset == 0 { DEFAULT_OFFSET } else { offset }
}

pub fn get_limit_from_request<R: Paginated>(req: &R) -> u32 {
    get_limit(req.limit())
}

pub fn get_offset_from_request<R: Paginated>(req: &R) -> u32 {
    get_offset(req.offset())
}

/// Resolve a requested projection against a table's columns.
///
/// `None` selects everything, `Some([])` selects nothing, otherwise the
/// requested columns that exist, in request order.
pub fn get_display_columns<S: AsRef<str>>(
    display_columns: Option<&[String]>,
    whole_columns: &[S],
) -> Vec<String> {
    match display_columns {
        None => whole_columns.iter().map(|c| c.as_ref().to_string()).collect(),
        Some(requested) => requested
            .iter()
            .filter(|c| whole_columns.iter().any(|w| w.as_ref() == c.as_str()))
            .cloned()
            .collect(),
    }
}
