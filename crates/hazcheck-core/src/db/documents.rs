//! Document operations

use super::{docid_from_hash, hash_content, Database};
use crate::context::{SourceContext, SourceType};
use crate::error::{HazCheckError, Result};
use chrono::Utc;
use rusqlite::params;
use std::fmt;
use std::str::FromStr;

/// How a stored document's text was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Pdf,
    Text,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Text => "text",
        })
    }
}

impl FromStr for DocumentType {
    type Err = HazCheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pdf" => Ok(DocumentType::Pdf),
            "text" => Ok(DocumentType::Text),
            other => Err(HazCheckError::Config(format!(
                "unknown document type: {other}"
            ))),
        }
    }
}

/// Persisted reference document
#[derive(Debug, Clone)]
pub struct LocalDocumentRecord {
    /// Opaque id, generated once from the content hash
    pub id: String,
    pub name: String,
    pub content: String,
    /// Ranking hint 0-100 consumed by the context aggregator
    pub weight: u8,
    pub doc_type: DocumentType,
    pub created_at: String,
}

impl Database {
    /// Persist a document, generating its id. Returns the stored record.
    pub fn save_document(
        &self,
        name: &str,
        content: &str,
        weight: u8,
        doc_type: DocumentType,
    ) -> Result<LocalDocumentRecord> {
        let created_at = Utc::now().to_rfc3339();
        let id = docid_from_hash(&hash_content(&format!("{name}\n{created_at}\n{content}")));
        let record = LocalDocumentRecord {
            id,
            name: name.to_string(),
            content: content.to_string(),
            weight: weight.min(100),
            doc_type,
            created_at,
        };

        self.conn.execute(
            "INSERT INTO documents (id, name, content, weight, doc_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.name,
                record.content,
                record.weight,
                record.doc_type.to_string(),
                record.created_at
            ],
        )?;
        Ok(record)
    }

    /// Get one document by id
    pub fn get_document(&self, id: &str) -> Result<Option<LocalDocumentRecord>> {
        let result = self.conn.query_row(
            "SELECT id, name, content, weight, doc_type, created_at
             FROM documents WHERE id = ?1",
            params![id],
            row_to_record,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All documents, newest first
    pub fn get_all_documents(&self) -> Result<Vec<LocalDocumentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, content, weight, doc_type, created_at
             FROM documents ORDER BY created_at DESC",
        )?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Update a document's trust weight in place
    pub fn set_document_weight(&self, id: &str, weight: u8) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE documents SET weight = ?2 WHERE id = ?1",
            params![id, weight.min(100)],
        )?;
        if rows == 0 {
            return Err(HazCheckError::DocumentNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Delete a document by id
    pub fn delete_document(&self, id: &str) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(HazCheckError::DocumentNotFound(id.to_string()));
        }
        Ok(())
    }

    /// All stored documents as local-store contexts, newest first
    pub fn local_contexts(&self) -> Result<Vec<SourceContext>> {
        let contexts = self
            .get_all_documents()?
            .into_iter()
            .map(|doc| {
                SourceContext::new(
                    doc.name.clone(),
                    SourceType::LocalStore,
                    doc.content,
                    doc.weight,
                )
                .with_uri(format!("doc://{}", doc.id))
            })
            .collect();
        Ok(contexts)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<LocalDocumentRecord> {
    let doc_type: String = row.get(4)?;
    Ok(LocalDocumentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        weight: row.get::<_, i64>(3)?.clamp(0, 100) as u8,
        doc_type: doc_type.parse().unwrap_or(DocumentType::Text),
        created_at: row.get(5)?,
    })
}
