//! Pipeline orchestration.
//!
//! One run takes one source image end to end: provision the output root,
//! fetch and decode the original, assign a run id, obtain and validate
//! the segmentation, persist the frame, group pixels into class masks,
//! then encode and persist one artifact set per class and write the
//! detected-objects report.
//!
//! All run state lives in a caller-owned [`RunContext`] - there are no
//! process-wide globals. The run counter is atomic, so contexts may be
//! shared across threads; directory provisioning tolerates concurrent
//! "already exists" races.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info};

use crate::catalog::ClassCatalog;
use crate::encode::{encode_rgba_jpeg, ClassImageEncoder, DEFAULT_JPEG_QUALITY};
use crate::error::SegsieveError;
use crate::extract::group_by_class;
use crate::fetch::ImageFetcher;
use crate::grid::SegmentationResult;
use crate::persist::{OutputLayout, RecordStore};
use crate::report::{build_report, write_report};
use crate::validation::validate_segmentation;

/// Produces a [`SegmentationResult`] for a decoded source image.
///
/// Inference itself is outside this crate; implementations adapt whatever
/// actually ran the model (or, for the CLI, a pre-computed mask file).
pub trait SegmentationProvider {
    fn segment(&self, image: &RgbaImage) -> Result<SegmentationResult, SegsieveError>;
}

/// Pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Root directory for all filesystem artifacts.
    pub output_root: PathBuf,
    /// JPEG quality for frame and class-image artifacts.
    pub quality: u8,
    /// Key report files by run id instead of overwriting one fixed path.
    pub versioned_reports: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("./images"),
            quality: DEFAULT_JPEG_QUALITY,
            versioned_reports: false,
        }
    }
}

/// Caller-owned state shared by every run: the monotonic run counter, the
/// output layout, and the encoder.
///
/// The counter starts at 1 and is consumed exactly once per run that
/// reaches a decoded image; a failed fetch consumes nothing. It is never
/// reset, and is not unique across processes.
pub struct RunContext {
    counter: AtomicU64,
    layout: OutputLayout,
    encoder: ClassImageEncoder,
    versioned_reports: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl RunContext {
    /// Creates a context from a configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            counter: AtomicU64::new(1),
            layout: OutputLayout::new(config.output_root),
            encoder: ClassImageEncoder::new(config.quality),
            versioned_reports: config.versioned_reports,
            cancel: None,
        }
    }

    /// Attaches a cancel flag, polled once per run at the safe
    /// cancellation point (after validation, before grouping).
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The output layout of this context.
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// The run id the next successful fetch will be assigned.
    pub fn next_pending_id(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    fn take_run_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

/// What one completed run produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub run_id: u64,
    /// Names of the classes present, in class-id order.
    pub classes: Vec<String>,
    pub frame_path: PathBuf,
    pub report_path: PathBuf,
}

/// Fetches `source` and processes it through the full pipeline.
///
/// The root and frames directories are provisioned before the fetch; a
/// fetch failure therefore leaves those directories (and nothing else)
/// behind, consumes no run id, and persists nothing. Every error after
/// the fetch is fatal to the run but may leave it partially persisted -
/// the record store and the filesystem are independent sinks with no
/// rollback.
pub fn run_source(
    ctx: &RunContext,
    store: &mut dyn RecordStore,
    fetcher: &dyn ImageFetcher,
    provider: &dyn SegmentationProvider,
    catalog: &ClassCatalog,
    source: &str,
) -> Result<RunSummary, SegsieveError> {
    ctx.layout.ensure_root()?;
    let fetched = fetcher.fetch(source)?;
    process_fetched(ctx, store, provider, catalog, &fetched.image)
}

/// Processes an already-fetched, decoded image.
///
/// Consumes one run id, obtains and validates the segmentation (a
/// validation failure is fatal with no partial output), then persists the
/// frame artifact and original record, groups, and persists per-class
/// artifacts and the report. See [`run_source`] for the
/// partial-persistence contract.
pub fn process_fetched(
    ctx: &RunContext,
    store: &mut dyn RecordStore,
    provider: &dyn SegmentationProvider,
    catalog: &ClassCatalog,
    image: &RgbaImage,
) -> Result<RunSummary, SegsieveError> {
    ctx.layout.ensure_root()?;

    // The image is fetched and decoded: this run now owns an id, no
    // matter how the rest of it goes.
    let run_id = ctx.take_run_id();

    let segmentation = provider.segment(image)?;
    validate_segmentation(&segmentation, catalog)?;

    // The one safe cancellation point: nothing has been persisted yet.
    if ctx.is_cancelled() {
        return Err(SegsieveError::Cancelled);
    }

    let original_jpeg = encode_rgba_jpeg(image, ctx.encoder.quality())?;
    let frame_path = ctx.layout.frame_path(run_id);
    fs::write(&frame_path, &original_jpeg)?;
    store.store_original_image(&original_jpeg)?;

    let masks = group_by_class(&segmentation);
    let (width, height) = segmentation.label_grid.dimensions();

    let mut classes = Vec::with_capacity(masks.len());
    for (class_id, mask) in &masks {
        // Validation bounds every label, so the lookup cannot miss.
        let name = catalog.name(*class_id).unwrap_or("unknown");

        let encoded = ctx.encoder.encode(mask, width, height)?;
        store.register_class(name)?;
        store.store_class_image(name, &encoded)?;

        ctx.layout.ensure_class_dir(name)?;
        let image_path = ctx.layout.class_image_path(run_id, name);
        fs::write(&image_path, &encoded)?;

        debug!(class = name, pixels = mask.len(), path = %image_path.display(), "class artifact persisted");
        classes.push(name.to_string());
    }

    let report = build_report(&masks, catalog, &original_jpeg);
    let report_path = ctx
        .layout
        .report_path(ctx.versioned_reports.then_some(run_id));
    write_report(&report_path, &report)?;

    info!(
        run_id,
        classes = classes.len(),
        report = %report_path.display(),
        "run persisted"
    );

    Ok(RunSummary {
        run_id,
        classes,
        frame_path,
        report_path,
    })
}
