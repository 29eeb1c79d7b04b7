//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vitrine: render a content-managed site from a headless content store
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: vitrine.toml)
    #[arg(short = 'C', long, default_value = "vitrine.toml")]
    pub config: PathBuf,

    /// Read documents from an NDJSON dataset export instead of the remote store
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch every routable document and export the site as static HTML
    Build {
        /// Clean output directory completely before building
        #[arg(long)]
        clean: bool,

        /// Minify the html content
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        minify: Option<bool>,

        /// Output directory path (relative to project root)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve the site, rendering each page from fresh content on request
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch a single document by id and print it as JSON
    Fetch {
        /// Document `_id`
        id: String,
    },

    /// List image blocks embedded in post bodies
    Images {
        /// Print the report as JSON instead of log lines
        #[arg(long)]
        json: bool,
    },

    /// Print the authoring schema as JSON
    Schema,
}

impl Cli {
    /// Whether the command talks to the content store at all.
    pub const fn needs_store(&self) -> bool {
        !matches!(self.command, Commands::Schema)
    }
}
