//! Type definitions for file share responses

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Entries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    /// Path relative to the share root, as the caller spells it
    pub path: String,
}

/// A file as shown to callers. `is_too_large` is fixed when the entry is
/// built; the format flags are derived from the name on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub is_too_large: bool,
}

impl FileEntry {
    pub fn is_supported_image(&self) -> bool {
        matches!(extension_of(&self.name).as_deref(), Some("png" | "jpg" | "jpeg"))
    }

    pub fn supports_text_extraction(&self) -> bool {
        matches!(extension_of(&self.name).as_deref(), Some("pdf" | "docx"))
    }
}

impl Serialize for FileEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileEntry", 6)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("is_too_large", &self.is_too_large)?;
        state.serialize_field("is_supported_image", &self.is_supported_image())?;
        state.serialize_field("supports_text_extraction", &self.supports_text_extraction())?;
        state.end()
    }
}

/// Lowercased extension of a file name
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileSystemEntry {
    Folder(FolderEntry),
    File(FileEntry),
}

// ============================================================================
// Listings
// ============================================================================

/// One folder scan. Entries keep the order the directory enumeration
/// produced, which is platform dependent and not sorted.
#[derive(Debug, Clone, Serialize)]
pub struct FolderListing {
    pub folder: FolderEntry,
    pub subfolders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
    /// The scan stopped at the entry cap with entries left unread
    pub truncated: bool,
}

impl FolderListing {
    pub fn new(folder: FolderEntry, entries: Vec<FileSystemEntry>, truncated: bool) -> Self {
        let mut subfolders = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            match entry {
                FileSystemEntry::Folder(folder) => subfolders.push(folder),
                FileSystemEntry::File(file) => files.push(file),
            }
        }
        Self {
            folder,
            subfolders,
            files,
            truncated,
        }
    }

    pub fn len(&self) -> usize {
        self.subfolders.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Metadata
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<String> for MetadataScalar {
    fn from(value: String) -> Self {
        MetadataScalar::Text(value)
    }
}

impl From<&str> for MetadataScalar {
    fn from(value: &str) -> Self {
        MetadataScalar::Text(value.to_string())
    }
}

impl From<i64> for MetadataScalar {
    fn from(value: i64) -> Self {
        MetadataScalar::Integer(value)
    }
}

/// A single value, or every value in source order when a key repeats
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Single(MetadataScalar),
    Multiple(Vec<MetadataScalar>),
}

impl MetadataValue {
    /// Collapse collected values: one value stays a scalar.
    pub fn from_values(mut values: Vec<MetadataScalar>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(MetadataValue::Single),
            _ => Some(MetadataValue::Multiple(values)),
        }
    }
}

pub type MetadataMap = BTreeMap<String, MetadataValue>;

#[derive(Debug, Clone, Serialize)]
pub struct FileMetadataResult {
    pub file: FileEntry,
    pub modified: Option<DateTime<Utc>>,
    pub metadata: MetadataMap,
}
