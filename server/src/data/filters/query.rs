//! Parameterized SELECT statement

use super::types::{SqlParams, SqlValue};
use crate::utils::sql::quote_ident;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// SELECT over a single table with AND-ed WHERE clauses
///
/// `columns == None` projects every column. Clauses hold `?` placeholders
/// whose values live in `params` in the same order.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub conditions: Vec<String>,
    pub params: SqlParams,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: None,
            conditions: Vec::new(),
            params: SqlParams::default(),
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// AND a clause into the WHERE list together with its bound values
    pub fn and_where(&mut self, clause: String, values: impl IntoIterator<Item = SqlValue>) {
        self.conditions.push(clause);
        self.params.values.extend(values);
    }

    fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Full statement. `LIMIT`/`OFFSET` placeholders are bound after the
    /// filter values (see [`SelectQuery::params`]).
    pub fn to_sql(&self) -> String {
        let projection = match &self.columns {
            Some(cols) if !cols.is_empty() => cols
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            _ => "*".to_string(),
        };

        let mut sql = format!(
            "SELECT {} FROM {}{}",
            projection,
            quote_ident(&self.table),
            self.where_sql()
        );

        if let Some((column, dir)) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {} {}", column, dir.as_sql()));
        }
        if self.limit.is_some() {
            sql.push_str(" LIMIT ?");
            if self.offset.is_some() {
                sql.push_str(" OFFSET ?");
            }
        }
        sql
    }

    /// `COUNT(*)` over the same filters, ignoring order and paging
    pub fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_ident(&self.table),
            self.where_sql()
        )
    }

    /// Values for [`SelectQuery::count_sql`]
    pub fn filter_params(&self) -> &[SqlValue] {
        &self.params.values
    }

    /// Values for [`SelectQuery::to_sql`], paging values last
    pub fn params(&self) -> Vec<SqlValue> {
        let mut params = self.params.clone();
        if let Some(limit) = self.limit {
            params.push(i64::from(limit));
            if let Some(offset) = self.offset {
                params.push(i64::from(offset));
            }
        }
        params.values
    }

    /// Whether the projection was narrowed down to nothing
    pub fn has_empty_projection(&self) -> bool {
        matches!(&self.columns, Some(cols) if cols.is_empty())
    }
}
