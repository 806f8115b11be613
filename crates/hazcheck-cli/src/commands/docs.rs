//! Local document store commands

use crate::app::{DocsAction, DocsArgs};
use crate::commands::{cancel_on_ctrl_c, read_document_text};
use anyhow::Result;
use hazcheck_core::db::DocumentType;
use hazcheck_core::extract::MediaType;
use hazcheck_core::Database;

pub async fn run(args: DocsArgs, db: &Database) -> Result<()> {
    match args.action {
        DocsAction::Add { file, name, weight } => {
            let display_name = name.unwrap_or_else(|| {
                file.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unnamed")
                    .to_string()
            });
            let doc_type = match MediaType::from_path(&file) {
                Some(MediaType::Pdf) => DocumentType::Pdf,
                _ => DocumentType::Text,
            };

            let cancel = cancel_on_ctrl_c();
            let content = read_document_text(&file, &cancel).await?;
            let record = db.save_document(&display_name, &content, weight, doc_type)?;
            println!(
                "Added '{}' as {} ({} chars, weight {})",
                record.name,
                record.id,
                record.content.len(),
                record.weight
            );
        }
        DocsAction::List => {
            let docs = db.get_all_documents()?;
            if docs.is_empty() {
                println!("No documents");
            } else {
                for doc in docs {
                    println!(
                        "{}  {:<30} weight {:>3}  {}  {}",
                        doc.id, doc.name, doc.weight, doc.doc_type, doc.created_at
                    );
                }
            }
        }
        DocsAction::Remove { id } => {
            db.delete_document(&id)?;
            println!("Removed document {id}");
        }
        DocsAction::Weight { id, weight } => {
            db.set_document_weight(&id, weight)?;
            println!("Set weight of {id} to {}", weight.min(100));
        }
    }
    Ok(())
}
