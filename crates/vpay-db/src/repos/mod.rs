//! Repository modules implementing store operations for all vpay entities.
//!
//! Each module adds methods to `VpayService` via `impl VpayService` blocks.
//! List operations take a filter struct: every `Some` field becomes an
//! equality condition, joined with `AND`.

pub mod control;
pub mod extraction;
pub mod processing_log;
pub mod reference;
pub mod validation;

/// Ordering on an entity's timestamp column. Ties break on insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Accumulates `column = ?N` conditions and their positional parameters.
#[derive(Debug, Default)]
pub(crate) struct Conditions {
    clauses: Vec<String>,
    params: Vec<libsql::Value>,
}

impl Conditions {
    pub(crate) fn eq(&mut self, column: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.clauses
            .push(format!("{column} = ?{}", self.params.len()));
    }

    pub(crate) fn eq_opt<T: Into<libsql::Value>>(&mut self, column: &str, value: Option<T>) {
        if let Some(value) = value {
            self.eq(column, value);
        }
    }

    /// Finish into `WHERE ...` (or empty) plus the parameter list.
    pub(crate) fn into_sql(self) -> (String, Vec<libsql::Value>) {
        let where_clause = if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        };
        (where_clause, self.params)
    }
}

/// Render `ORDER BY <column> <dir>, rowid <dir> [LIMIT n]`.
pub(crate) fn order_and_limit(column: &str, order: SortOrder, limit: Option<u32>) -> String {
    let dir = order.as_sql();
    limit.map_or_else(
        || format!("ORDER BY {column} {dir}, rowid {dir}"),
        |limit| format!("ORDER BY {column} {dir}, rowid {dir} LIMIT {limit}"),
    )
}
