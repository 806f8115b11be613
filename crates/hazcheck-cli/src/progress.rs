//! Progress reporting for extraction and validation

use hazcheck_core::extract::ExtractProgress;
use hazcheck_core::pipeline::PipelineStage;
use std::io::{self, Write};
use std::time::Duration;

/// Render an extraction progress event on stderr, in place.
pub fn print_extract(event: ExtractProgress) {
    let line = match event {
        ExtractProgress::Initializing => "Reading document...".to_string(),
        ExtractProgress::ReadingTextLayer => "Reading text layer...".to_string(),
        ExtractProgress::Rasterizing { page, total } => {
            format!("Rasterizing page {page}/{total}...")
        }
        ExtractProgress::Recognizing {
            page,
            total,
            percent,
        } => format!("Recognizing page {page}/{total} ({percent}%)..."),
    };
    eprint!("\r{line:<50}");
    io::stderr().flush().ok();
}

/// Render a pipeline stage on stderr.
pub fn print_stage(stage: PipelineStage) {
    let line = match stage {
        PipelineStage::GatheringContext => "Gathering reference context...",
        PipelineStage::ParsingDocument => "Extracting SDS fields...",
        PipelineStage::ReadingScreenshot => "Reading the screenshot...",
        PipelineStage::Analyzing => "Analyzing...",
    };
    eprint!("\r{line:<50}");
    io::stderr().flush().ok();
}

pub fn clear_line() {
    eprint!("\r{:<50}\r", "");
    io::stderr().flush().ok();
}

/// One-shot notice printed when a request runs long. Purely
/// informational; the request keeps running until done or Ctrl-C.
pub struct StallNotice {
    handle: tokio::task::JoinHandle<()>,
}

const STALL_AFTER: Duration = Duration::from_secs(30);

impl StallNotice {
    pub fn start() -> Self {
        let handle = tokio::spawn(async {
            tokio::time::sleep(STALL_AFTER).await;
            eprintln!(
                "\nStill working. Slow knowledge servers or large documents \
                 can take a while; press Ctrl-C to cancel."
            );
        });
        Self { handle }
    }

    pub fn finish(self) {
        self.handle.abort();
        clear_line();
    }
}
