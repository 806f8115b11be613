//! Shipment validation command

use crate::app::{OutputFormat, ValidateArgs};
use crate::commands::{build_client, cancel_on_ctrl_c, read_document_text};
use crate::output;
use crate::progress::{self, StallNotice};
use anyhow::Result;
use hazcheck_core::config::Settings;
use hazcheck_core::connector::McpContextFetcher;
use hazcheck_core::pipeline::ValidationPipeline;
use hazcheck_core::shipment::HazmatShipment;
use hazcheck_core::Database;
use hazcheck_mcp::SessionPool;
use std::sync::Arc;

pub async fn run(args: ValidateArgs, db: &Database, format: OutputFormat) -> Result<()> {
    let settings = Settings::load()?;
    let shipment: HazmatShipment =
        serde_json::from_str(&std::fs::read_to_string(&args.shipment)?)?;

    let cancel = cancel_on_ctrl_c();
    let sds_text = match &args.sds {
        Some(path) => Some(read_document_text(path, &cancel).await?),
        None => None,
    };

    let client = build_client(&settings)?;
    let pool = Arc::new(SessionPool::new());
    let fetcher = McpContextFetcher::new(Arc::clone(&pool));
    let pipeline =
        ValidationPipeline::new(db, &fetcher, &client, &settings).on_stage(progress::print_stage);

    let notice = StallNotice::start();
    let result = pipeline
        .validate_shipment(&shipment, sds_text.as_deref(), &cancel)
        .await;
    notice.finish();
    pool.reset().await;

    output::print_validation_result(&result?, format)
}
