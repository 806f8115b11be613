//! Screenshot validation command

use crate::app::{OutputFormat, ScreenshotArgs};
use crate::commands::{build_client, cancel_on_ctrl_c};
use crate::output;
use crate::progress::{self, StallNotice};
use anyhow::{bail, Result};
use hazcheck_core::config::Settings;
use hazcheck_core::connector::McpContextFetcher;
use hazcheck_core::extract::MediaType;
use hazcheck_core::llm::InlineImage;
use hazcheck_core::pipeline::ValidationPipeline;
use hazcheck_core::Database;
use hazcheck_mcp::SessionPool;
use std::sync::Arc;

pub async fn run(args: ScreenshotArgs, db: &Database, format: OutputFormat) -> Result<()> {
    let media = MediaType::from_path(&args.image);
    let Some(media) = media.filter(MediaType::is_image) else {
        bail!("screenshot must be an image file: {}", args.image.display());
    };

    let settings = Settings::load()?;
    let image = InlineImage {
        mime_type: media.mime().to_string(),
        data: std::fs::read(&args.image)?,
    };

    let cancel = cancel_on_ctrl_c();
    let client = build_client(&settings)?;
    let pool = Arc::new(SessionPool::new());
    let fetcher = McpContextFetcher::new(Arc::clone(&pool));
    let pipeline =
        ValidationPipeline::new(db, &fetcher, &client, &settings).on_stage(progress::print_stage);

    let notice = StallNotice::start();
    let result = pipeline.validate_screenshot(image, &cancel).await;
    notice.finish();
    pool.reset().await;

    output::print_validation_result(&result?, format)
}
