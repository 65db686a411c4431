//! Format-aware file metadata
//!
//! The file type is sniffed from content, not taken from the extension.
//! Images report their dimensions, PDFs their info dictionary, and ZIP based
//! containers (OOXML documents included) their entry count and document
//! properties.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use zip::ZipArchive;

use crate::extract::{docx, pdf, ExtractError};
use crate::types::{MetadataMap, MetadataScalar, MetadataValue};

/// Produces format-specific metadata for one file
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<MetadataMap, ExtractError>;
}

/// Collects values per key, keeping repeats in insertion order.
#[derive(Debug, Default)]
struct MetadataBuilder {
    values: BTreeMap<String, Vec<MetadataScalar>>,
}

impl MetadataBuilder {
    fn push(&mut self, key: &str, value: impl Into<MetadataScalar>) {
        self.values
            .entry(key.to_string())
            .or_default()
            .push(value.into());
    }

    fn extend(&mut self, fields: Vec<(&'static str, MetadataScalar)>) {
        for (key, value) in fields {
            self.push(key, value);
        }
    }

    fn build(self) -> MetadataMap {
        self.values
            .into_iter()
            .filter_map(|(key, values)| MetadataValue::from_values(values).map(|v| (key, v)))
            .collect()
    }
}

/// Sniffs files by content. PNG, JPEG and other images the `image` crate can
/// read report dimensions; PDF and ZIP/OOXML files report document
/// properties. Any other recognised type reports its MIME type and extension.
///
/// PDFs larger than `max_parse_size`, and ZIP members that expand past it,
/// are not parsed; the result carries `deep_parse_skipped` instead. `0`
/// parses everything.
#[derive(Debug, Clone, Copy)]
pub struct ContainerMetadataExtractor {
    max_parse_size: u64,
}

impl ContainerMetadataExtractor {
    pub fn new(max_parse_size: u64) -> Self {
        Self { max_parse_size }
    }

    fn image(&self, path: &Path, builder: &mut MetadataBuilder) -> Result<(), ExtractError> {
        let reader = image::ImageReader::open(path)?
            .with_guessed_format()
            .map_err(|e| ExtractError::unreadable("image", e))?;
        if let Some(format) = reader.format() {
            builder.push("format", format!("{:?}", format).to_lowercase());
        }
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ExtractError::unreadable("image", e))?;
        builder.push("width", i64::from(width));
        builder.push("height", i64::from(height));
        Ok(())
    }

    fn pdf(&self, path: &Path, builder: &mut MetadataBuilder) -> Result<(), ExtractError> {
        let size = fs::metadata(path)?.len();
        if self.max_parse_size != 0 && size > self.max_parse_size {
            tracing::debug!(
                "Skipping PDF parse for {} ({} bytes > {})",
                path.display(),
                size,
                self.max_parse_size
            );
            builder.push("deep_parse_skipped", MetadataScalar::Bool(true));
            return Ok(());
        }
        let contents = fs::read(path)?;
        builder.extend(pdf::metadata(&contents)?);
        Ok(())
    }

    fn zip(&self, path: &Path, builder: &mut MetadataBuilder) -> Result<(), ExtractError> {
        let file = BufReader::new(File::open(path)?);
        let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::unreadable("zip", e))?;
        builder.push("file_count", archive.len() as i64);
        match docx::core_properties(&mut archive, self.max_parse_size) {
            Ok(fields) => builder.extend(fields),
            Err(ExtractError::TooLarge { name, size, .. }) => {
                tracing::debug!(
                    "Skipping {} in {} ({} bytes > {})",
                    name,
                    path.display(),
                    size,
                    self.max_parse_size
                );
                builder.push("deep_parse_skipped", MetadataScalar::Bool(true));
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

impl MetadataExtractor for ContainerMetadataExtractor {
    fn extract(&self, path: &Path) -> Result<MetadataMap, ExtractError> {
        let kind = infer::get_from_path(path)?
            .ok_or_else(|| ExtractError::unreadable("file", "unrecognized content"))?;

        let mut builder = MetadataBuilder::default();
        builder.push("mime_type", kind.mime_type());
        builder.push("extension", kind.extension());

        match kind.mime_type() {
            "image/png" | "image/jpeg" => self.image(path, &mut builder)?,
            "application/pdf" => self.pdf(path, &mut builder)?,
            mime if mime == "application/zip"
                || mime.starts_with("application/vnd.openxmlformats") =>
            {
                self.zip(path, &mut builder)?
            }
            mime => match image::ImageFormat::from_mime_type(mime) {
                Some(format) if format.reading_enabled() => self.image(path, &mut builder)?,
                _ => tracing::debug!("No metadata reader for {}", mime),
            },
        }

        Ok(builder.build())
    }
}
