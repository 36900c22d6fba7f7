//! Segsieve: post-segmentation object extraction and cataloging.
//!
//! Segsieve takes a color image plus the dense per-pixel class-label grid
//! an external segmentation model produced for it, partitions the pixels
//! into per-class masks, and turns each run into a consistent artifact
//! set: isolated per-class JPEG images, records in an append-only catalog
//! store, an on-disk frame/object directory layout, and a JSON
//! detected-objects report.
//!
//! # Modules
//!
//! - [`catalog`]: the fixed class-id → class-name table
//! - [`grid`]: label grids and segmentation results
//! - [`validation`]: input validation (extents, label range)
//! - [`extract`]: the label-to-object grouping engine
//! - [`encode`]: per-class JPEG encoding
//! - [`fetch`]: source-image acquisition (HTTP / file)
//! - [`persist`]: record store, output layout, directory provisioning
//! - [`report`]: the detected-objects report document
//! - [`pipeline`]: run orchestration and the caller-owned run context
//! - [`error`]: error types for segsieve operations

pub mod catalog;
pub mod encode;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod grid;
pub mod persist;
pub mod pipeline;
pub mod report;
pub mod validation;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::catalog::ClassCatalog;
use crate::fetch::{FileFetcher, HttpFetcher};
use crate::grid::io_png::MaskFileProvider;
use crate::persist::SqliteStore;
use crate::pipeline::{PipelineConfig, RunContext};

pub use error::SegsieveError;

/// The segsieve CLI application.
#[derive(Parser)]
#[command(name = "segsieve")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Extract and catalog per-class objects from one segmented image.
    Process(ProcessArgs),

    /// Print the class catalog (id and name per class).
    Classes,
}

/// Arguments for the process subcommand.
#[derive(clap::Args)]
struct ProcessArgs {
    /// Image source: an http(s) URL or a local file path.
    source: String,

    /// Grayscale PNG label mask (pixel value at (x, y) = class id).
    #[arg(long)]
    mask: PathBuf,

    /// Output root directory for frames, objects, and the report.
    #[arg(long, default_value = "./images")]
    out: PathBuf,

    /// SQLite catalog database.
    #[arg(long, default_value = "catalog.db")]
    db: PathBuf,

    /// JPEG quality for encoded artifacts (1-100).
    #[arg(long, default_value_t = encode::DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Key each run's report by run id instead of overwriting one file.
    #[arg(long)]
    versioned_reports: bool,
}

/// Run the segsieve CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), SegsieveError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Process(args)) => run_process(args),
        Some(Commands::Classes) => {
            let catalog = ClassCatalog::pascal_voc();
            for (id, name) in catalog.iter() {
                println!("{:>3}  {}", id.as_u16(), name);
            }
            Ok(())
        }
        None => {
            println!("segsieve {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Post-segmentation object extraction and cataloging.");
            println!();
            println!("Run 'segsieve --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the process subcommand.
fn run_process(args: ProcessArgs) -> Result<(), SegsieveError> {
    let catalog = ClassCatalog::pascal_voc();
    let mut store = SqliteStore::open(&args.db)?;
    let ctx = RunContext::new(PipelineConfig {
        output_root: args.out,
        quality: args.quality,
        versioned_reports: args.versioned_reports,
    });
    let provider = MaskFileProvider::new(&args.mask);

    let result = if fetch::is_remote_source(&args.source) {
        pipeline::run_source(
            &ctx,
            &mut store,
            &HttpFetcher::default(),
            &provider,
            &catalog,
            &args.source,
        )
    } else {
        pipeline::run_source(
            &ctx,
            &mut store,
            &FileFetcher,
            &provider,
            &catalog,
            &args.source,
        )
    };

    match result {
        Ok(summary) => {
            println!(
                "run {}: {} class(es) extracted: {}",
                summary.run_id,
                summary.classes.len(),
                summary.classes.join(", ")
            );
            println!("report written to {}", summary.report_path.display());
            Ok(())
        }
        // A failed fetch skips the run; the process stays healthy for
        // further invocations.
        Err(SegsieveError::Fetch {
            source_name,
            message,
        }) => {
            warn!(source = %source_name, %message, "fetch failed, run skipped");
            println!("Cannot retrieve image. Please check source: {source_name}");
            Ok(())
        }
        Err(other) => Err(other),
    }
}
