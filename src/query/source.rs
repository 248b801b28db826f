//! Description of the table tiles are read from.
//!
//! Table and column names cannot be bound as query parameters, so they are
//! checked once at startup and only ever rendered in quoted form.

use std::fmt;

use crate::error::ConfigError;

// =============================================================================
// Identifier
// =============================================================================

/// A validated SQL identifier, optionally schema-qualified (`schema.table`).
///
/// Each part must start with a letter or underscore and contain only ASCII
/// letters, digits and underscores. Rendering always double-quotes every part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    parts: Vec<String>,
}

impl Identifier {
    /// Parse a single, unqualified identifier (e.g. a column name).
    pub fn column(field: &'static str, value: &str) -> Result<Self, ConfigError> {
        let name = value.trim();
        if !is_plain_identifier(name) {
            return Err(ConfigError::InvalidIdentifier {
                field,
                value: value.to_string(),
            });
        }
        Ok(Self {
            parts: vec![name.to_string()],
        })
    }

    /// Parse a table name, optionally qualified with one schema.
    pub fn table(field: &'static str, value: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = value.trim().split('.').collect();
        if parts.len() > 2 || !parts.iter().all(|p| is_plain_identifier(p)) {
            return Err(ConfigError::InvalidIdentifier {
                field,
                value: value.to_string(),
            });
        }
        Ok(Self {
            parts: parts.into_iter().map(str::to_string).collect(),
        })
    }

    /// Render as a quoted SQL identifier, e.g. `"data"."roads"`.
    pub fn quoted(&self) -> String {
        self.parts
            .iter()
            .map(|p| format!("\"{}\"", p))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// =============================================================================
// SourceTable
// =============================================================================

/// The table, geometry column and attributes that make up the tile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    /// Table to read features from
    pub table: Identifier,

    /// SRID of the stored geometry
    pub srid: i32,

    /// Geometry column
    pub geom_column: Identifier,

    /// Attribute columns copied into each feature
    pub attr_columns: Vec<Identifier>,
}

impl SourceTable {
    /// Build a source description from configuration strings.
    ///
    /// `attr_columns` is a comma-separated list such as `"id, level"`. It may be
    /// empty, in which case features carry geometry only.
    pub fn new(
        table: &str,
        srid: i32,
        geom_column: &str,
        attr_columns: &str,
    ) -> Result<Self, ConfigError> {
        if table.trim().is_empty() {
            return Err(ConfigError::Missing("table"));
        }
        if srid <= 0 {
            return Err(ConfigError::OutOfRange {
                field: "srid",
                message: format!("{} is not a valid SRID", srid),
            });
        }

        let attr_columns = attr_columns
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| Identifier::column("attr_columns", c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            table: Identifier::table("table", table)?,
            srid,
            geom_column: Identifier::column("geom_column", geom_column)?,
            attr_columns,
        })
    }
}
