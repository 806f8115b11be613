//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hazcheck")]
#[command(
    author,
    version,
    about = "Dangerous-goods shipment compliance checks from the command line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a declared shipment
    Validate(ValidateArgs),

    /// Extract transport fields from an SDS document
    Parse(ParseArgs),

    /// Validate a screenshot of a shipment declaration form
    Screenshot(ScreenshotArgs),

    /// Manage the local reference document store
    Docs(DocsArgs),

    /// Manage knowledge servers
    Servers(ServersArgs),

    /// Show or change settings
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Shipment declaration as a JSON file
    pub shipment: PathBuf,

    /// Safety data sheet to cross-check (pdf, image, or plain text)
    #[arg(long)]
    pub sds: Option<PathBuf>,
}

#[derive(Args)]
pub struct ParseArgs {
    /// Document to extract fields from (pdf, image, or plain text)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ScreenshotArgs {
    /// Screenshot image of the declaration form
    pub image: PathBuf,
}

#[derive(Args)]
pub struct DocsArgs {
    #[command(subcommand)]
    pub action: DocsAction,
}

#[derive(Subcommand)]
pub enum DocsAction {
    /// Add a document (pdf and images are OCR'd, anything else is read as text)
    Add {
        file: PathBuf,
        /// Display name; defaults to the file name
        #[arg(long)]
        name: Option<String>,
        /// Trust weight 0-100
        #[arg(long, default_value = "50")]
        weight: u8,
    },
    /// List stored documents
    List,
    /// Remove a document by id
    #[command(alias = "rm")]
    Remove { id: String },
    /// Change a document's trust weight
    Weight { id: String, weight: u8 },
}

#[derive(Args)]
pub struct ServersArgs {
    #[command(subcommand)]
    pub action: ServersAction,
}

#[derive(Subcommand)]
pub enum ServersAction {
    /// Add a knowledge server
    Add {
        name: String,
        /// SSE endpoint URL
        url: String,
        /// Trust weight 0-100 applied to this server's context
        #[arg(long, default_value = "50")]
        weight: u8,
    },
    /// List configured servers
    List,
    /// Remove a server
    #[command(alias = "rm")]
    Remove { name: String },
    /// Enable a server
    Enable { name: String },
    /// Disable a server without removing it
    Disable { name: String },
    /// Change a server's trust weight
    Weight { name: String, weight: u8 },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print current settings (credential redacted)
    Show,
    /// Set a settings key
    Set { key: String, value: String },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
