use std::path::PathBuf;
use thiserror::Error;

/// The main error type for segsieve operations.
#[derive(Debug, Error)]
pub enum SegsieveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "label grid is {grid_width}x{grid_height} but color image is {image_width}x{image_height}"
    )]
    DimensionMismatch {
        grid_width: u32,
        grid_height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("label {label} at ({x}, {y}) is out of range for a catalog with {classes} class(es)")]
    InvalidLabel {
        label: u16,
        x: u32,
        y: u32,
        classes: usize,
    },

    #[error("cannot retrieve image from '{source_name}': {message}")]
    Fetch {
        source_name: String,
        message: String,
    },

    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode class image: {message}")]
    Encode { message: String },

    #[error("record store operation '{operation}' failed: {message}")]
    Persistence {
        operation: &'static str,
        message: String,
    },

    #[error("run cancelled before grouping")]
    Cancelled,

    #[error("failed to read label grid from {path}: {message}")]
    MaskRead { path: PathBuf, message: String },

    #[error("failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse report: {0}")]
    ReportParse(#[source] serde_json::Error),
}
