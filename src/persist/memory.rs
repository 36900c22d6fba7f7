//! In-memory record store for tests.

use std::collections::BTreeSet;

use super::RecordStore;
use crate::error::SegsieveError;

/// A [`RecordStore`] holding everything in memory.
///
/// Supports injecting a single-operation failure so tests can exercise
/// the pipeline's abort-without-rollback behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub originals: Vec<Vec<u8>>,
    pub classes: BTreeSet<String>,
    pub class_images: Vec<(String, Vec<u8>)>,
    fail_operation: Option<&'static str>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call to `operation` fail until cleared.
    pub fn fail_on(&mut self, operation: &'static str) {
        self.fail_operation = Some(operation);
    }

    fn check(&self, operation: &'static str) -> Result<(), SegsieveError> {
        if self.fail_operation == Some(operation) {
            return Err(SegsieveError::Persistence {
                operation,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn store_original_image(&mut self, blob: &[u8]) -> Result<(), SegsieveError> {
        self.check("store_original_image")?;
        self.originals.push(blob.to_vec());
        Ok(())
    }

    fn register_class(&mut self, name: &str) -> Result<(), SegsieveError> {
        self.check("register_class")?;
        self.classes.insert(name.to_string());
        Ok(())
    }

    fn store_class_image(&mut self, name: &str, blob: &[u8]) -> Result<(), SegsieveError> {
        self.check("store_class_image")?;
        self.class_images.push((name.to_string(), blob.to_vec()));
        Ok(())
    }
}
