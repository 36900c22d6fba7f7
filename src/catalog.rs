//! The class catalog: a fixed, ordered table of class names indexed by id.
//!
//! Label grids refer to classes by integer id; the catalog is the only
//! place those ids are turned into human-readable names. It is an
//! immutable array indexed by [`ClassId`], with name lookup as a derived
//! view - there is no dynamic name-keyed dictionary anywhere in the
//! pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The PASCAL VOC class table used by the default catalog.
///
/// Index 0 is always the background class.
pub const PASCAL_VOC_CLASSES: [&str; 21] = [
    "background",
    "aeroplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "diningtable",
    "dog",
    "horse",
    "motorbike",
    "person",
    "pottedplant",
    "sheep",
    "sofa",
    "train",
    "tv",
];

/// A class identifier: the integer value stored in a label grid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u16);

impl ClassId {
    /// The background class id.
    pub const BACKGROUND: ClassId = ClassId(0);

    /// Creates a new ClassId.
    #[inline]
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the underlying u16 value.
    #[inline]
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the id as a usize, for indexing the catalog table.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ClassId {
    fn from(id: u16) -> Self {
        ClassId::new(id)
    }
}

/// The fixed, ordered catalog of class names for one pipeline.
///
/// A label value `L` in a grid is valid iff `L < catalog.len()`; the
/// validator enforces this before any lookup happens. Custom catalogs must
/// not contain a class named `"image"` - that key is reserved for the
/// embedded source image in the detected-objects report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassCatalog {
    names: Vec<String>,
}

impl ClassCatalog {
    /// Creates a catalog from an ordered list of names (index = class id).
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// The default 21-class PASCAL VOC catalog.
    pub fn pascal_voc() -> Self {
        Self::new(PASCAL_VOC_CLASSES.iter().map(|s| s.to_string()).collect())
    }

    /// Number of classes in the catalog.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the catalog has no classes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns true if `id` indexes a class in this catalog.
    pub fn contains(&self, id: ClassId) -> bool {
        id.index() < self.names.len()
    }

    /// Looks up the name for a class id.
    pub fn name(&self, id: ClassId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Derived reverse view: the id for a class name, if present.
    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| ClassId::new(i as u16))
    }

    /// Iterates (id, name) pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (ClassId::new(i as u16), name.as_str()))
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::pascal_voc()
    }
}
