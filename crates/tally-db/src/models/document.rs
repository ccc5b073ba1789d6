//! Document row model

use sqlx::types::Json;
use sqlx::FromRow;

use tally_core::{DocPath, Document, RepoResult};

/// Database model for the documents table
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub path: String,
    pub data: Json<Document>,
}

impl DocumentRow {
    /// Split into a validated path and the document body
    pub fn into_parts(self) -> RepoResult<(DocPath, Document)> {
        Ok((DocPath::parse(self.path)?, self.data.0))
    }
}
