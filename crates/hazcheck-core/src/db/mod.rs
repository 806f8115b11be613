//! Local document store
//!
//! SQLite-backed collection of user-uploaded reference documents with
//! per-document trust weights. Weight is a ranking hint consumed by the
//! context aggregator; it never affects how a document's text was
//! extracted.

mod documents;
mod schema;

pub use documents::{DocumentType, LocalDocumentRecord};
pub use schema::Database;

use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate an opaque document id from a content hash
pub fn docid_from_hash(hash: &str) -> String {
    hash.chars().take(12).collect()
}

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::DATA_DIR_NAME)
            .join("documents.sqlite")
    }
}
