//! Identifiers for the pgvector table holding article embeddings.

use crate::error::StoreError;

/// Schema the embeddings live in (the "database" of the original document store).
pub const DEFAULT_SCHEMA: &str = "wiki";
/// Table holding `{title, embedding}` rows.
pub const DEFAULT_TABLE: &str = "embeddings";
/// Name of the approximate nearest-neighbor index over `embedding`.
pub const DEFAULT_INDEX: &str = "wiki_vectorindex";

/// Fully-qualified Postgres table name (schema + table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    schema: String,
    table: String,
}

impl TableName {
    /// Builds a new table identifier.
    pub fn new<S, T>(schema: S, table: T) -> Result<Self, StoreError>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let schema = schema.into();
        let table = table.into();
        if schema.trim().is_empty() {
            return Err(StoreError::InvalidIdentifier(
                "schema name is required".to_string(),
            ));
        }
        if table.trim().is_empty() {
            return Err(StoreError::InvalidIdentifier(
                "table name is required".to_string(),
            ));
        }
        Ok(Self { schema, table })
    }

    /// Fully-qualified table reference with quoted identifiers.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }

    /// Returns the raw schema string.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the raw table string.
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

/// Quotes Postgres identifiers, escaping embedded quotes.
pub fn quote_ident(input: &str) -> String {
    let escaped = input.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}
