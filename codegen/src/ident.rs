//! `table.column` argument parsing.
//!
//! Identifiers are spliced into the script verbatim, so only plain unquoted
//! SQL identifiers are accepted: ASCII letters, digits and `_`, not starting
//! with a digit.

use std::fmt;
use std::str::FromStr;

use crate::error::EmitError;

/// Separator between the table and column parts.
pub const SEPARATOR: char = '.';

/// A geometry column, addressed by table and column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    /// Table name.
    pub table: String,
    /// Geometry column name.
    pub column: String,
}

impl TableColumn {
    /// `table.column`, as it appears in qualified SQL references.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}{SEPARATOR}{}", self.table, self.column)
    }
}

impl fmt::Display for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.table, self.column)
    }
}

impl FromStr for TableColumn {
    type Err = EmitError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| EmitError::InvalidTableColumnSpec {
            spec: spec.to_string(),
            reason,
        };

        let (table, column) = spec
            .split_once(SEPARATOR)
            .ok_or_else(|| invalid("missing '.' between table and column"))?;
        if column.contains(SEPARATOR) {
            return Err(invalid("more than one '.'"));
        }
        if let Some(reason) = identifier_problem(table).or_else(|| identifier_problem(column)) {
            return Err(invalid(reason));
        }

        Ok(Self {
            table: table.to_string(),
            column: column.to_string(),
        })
    }
}

fn identifier_problem(ident: &str) -> Option<&'static str> {
    let mut chars = ident.chars();
    match chars.next() {
        None => Some("empty table or column name"),
        Some(c) if c.is_ascii_digit() => Some("identifier starts with a digit"),
        Some(c) if !is_ident_char(c) || !chars.all(is_ident_char) => {
            Some("identifiers may only contain ASCII letters, digits and '_'")
        }
        Some(_) => None,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
