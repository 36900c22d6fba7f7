//! Output directory layout and idempotent provisioning.
//!
//! One root holds everything a pipeline writes:
//!
//! ```text
//! <root>/
//!   frames/<run_id>.jpeg
//!   objects/<class_name>/frame_<run_id>_<class_name>.jpeg
//!   detected_objects.json          (or detected_objects_<run_id>.json)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SegsieveError;

/// Idempotent directory creation: succeeds silently when the directory
/// already exists (including concurrent-creation races), fails with
/// [`SegsieveError::DirectoryCreate`] for any other OS-level failure.
pub fn ensure_directory(path: &Path) -> Result<(), SegsieveError> {
    fs::create_dir_all(path).map_err(|source| SegsieveError::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// Deterministic artifact paths under a single output root.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Creates a layout rooted at `root`. Nothing is created on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one original frame per run.
    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    /// Directory holding per-class subdirectories.
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join("objects")
    }

    /// The per-class subdirectory for `class_name`.
    pub fn class_dir(&self, class_name: &str) -> PathBuf {
        self.objects_dir().join(class_name)
    }

    /// Path of the original frame artifact for a run.
    pub fn frame_path(&self, run_id: u64) -> PathBuf {
        self.frames_dir().join(format!("{run_id}.jpeg"))
    }

    /// Path of one class-image artifact for a run.
    pub fn class_image_path(&self, run_id: u64, class_name: &str) -> PathBuf {
        self.class_dir(class_name)
            .join(format!("frame_{run_id}_{class_name}.jpeg"))
    }

    /// Path of the detected-objects report. With `run_id = None` this is
    /// the fixed path that every run overwrites; with a run id the report
    /// is versioned alongside the other artifacts.
    pub fn report_path(&self, run_id: Option<u64>) -> PathBuf {
        match run_id {
            Some(id) => self.root.join(format!("detected_objects_{id}.json")),
            None => self.root.join("detected_objects.json"),
        }
    }

    /// Provisions the root and frames directories.
    pub fn ensure_root(&self) -> Result<(), SegsieveError> {
        ensure_directory(&self.root)?;
        ensure_directory(&self.frames_dir())
    }

    /// Lazily provisions the subdirectory for one class, returning it.
    pub fn ensure_class_dir(&self, class_name: &str) -> Result<PathBuf, SegsieveError> {
        let dir = self.class_dir(class_name);
        ensure_directory(&dir)?;
        Ok(dir)
    }
}
