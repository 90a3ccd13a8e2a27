//! Roll keys with an optional row filter
//!
//! `attacks(name=Sword).damage` addresses the `damage` roll of the row of
//! `attacks` whose `name` column equals `Sword`. Parsed by hand to keep the
//! domain free of a regex dependency.

use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// `parent(column=value)` clause on the first segment of a roll key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub table: String,
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollKey {
    filter: Option<RowFilter>,
    /// Path after the filtered segment, or the whole key when unfiltered.
    path: String,
}

impl RollKey {
    pub fn filter(&self) -> Option<&RowFilter> {
        self.filter.as_ref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Key into the roll table: `parent.<rest>` for filtered keys.
    pub fn schema_key(&self) -> String {
        match &self.filter {
            Some(filter) => format!("{}.{}", filter.table, self.path),
            None => self.path.clone(),
        }
    }
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for RollKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(DomainError::parse("Empty roll key"));
        }

        // Filter values may contain dots and parens; the path after the filter never does.
        if let Some(open) = input.find('(') {
            let close = input
                .rfind(')')
                .filter(|close| *close > open)
                .ok_or_else(|| DomainError::parse(format!("Unclosed filter in roll key '{}'", input)))?;

            let table = &input[..open];
            let clause = &input[open + 1..close];
            let rest = &input[close + 1..];

            let (column, value) = clause.split_once('=').ok_or_else(|| {
                DomainError::parse(format!("Filter must read column=value in '{}'", input))
            })?;

            if !is_word(table) || !is_word(column) || value.is_empty() {
                return Err(DomainError::parse(format!("Malformed roll filter in '{}'", input)));
            }

            let path = rest.strip_prefix('.').unwrap_or_default();
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(DomainError::parse(format!(
                    "Roll key '{}' has no path after its filter",
                    input
                )));
            }

            return Ok(RollKey {
                filter: Some(RowFilter {
                    table: table.to_string(),
                    column: column.to_string(),
                    value: value.to_string(),
                }),
                path: path.to_string(),
            });
        }

        if input.contains(')') || input.split('.').any(str::is_empty) {
            return Err(DomainError::parse(format!("Malformed roll key '{}'", input)));
        }

        Ok(RollKey {
            filter: None,
            path: input.to_string(),
        })
    }
}

impl fmt::Display for RollKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(filter) => write!(
                f,
                "{}({}={}).{}",
                filter.table, filter.column, filter.value, self.path
            ),
            None => write!(f, "{}", self.path),
        }
    }
}
