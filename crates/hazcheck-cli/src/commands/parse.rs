//! SDS field extraction command

use crate::app::{OutputFormat, ParseArgs};
use crate::commands::{build_client, cancel_on_ctrl_c, read_document_text};
use crate::output;
use crate::progress::{self, StallNotice};
use anyhow::Result;
use hazcheck_core::config::Settings;
use hazcheck_core::connector::McpContextFetcher;
use hazcheck_core::pipeline::ValidationPipeline;
use hazcheck_core::Database;
use hazcheck_mcp::SessionPool;
use std::sync::Arc;

pub async fn run(args: ParseArgs, db: &Database, format: OutputFormat) -> Result<()> {
    let settings = Settings::load()?;
    let cancel = cancel_on_ctrl_c();
    let text = read_document_text(&args.file, &cancel).await?;

    let client = build_client(&settings)?;
    let pool = Arc::new(SessionPool::new());
    let fetcher = McpContextFetcher::new(pool);
    let pipeline =
        ValidationPipeline::new(db, &fetcher, &client, &settings).on_stage(progress::print_stage);

    let notice = StallNotice::start();
    let fields = pipeline.parse_document(&text, &cancel).await;
    notice.finish();

    output::print_sds_fields(&fields?, format)
}
