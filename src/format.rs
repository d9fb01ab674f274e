//! Manifest output formats.
//!
//! The XML document has a single form; the two manifests that accompany it
//! can be written as JSON or CSV. [`ManifestFormat`] selects the writer
//! without pulling in CLI dependencies.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(all(feature = "csv-output", feature = "json"))]
//! # fn example() -> chatexport::Result<()> {
//! use chatexport::core::media::MediaManifest;
//! use chatexport::format::{ManifestFormat, media_manifest_to_string};
//!
//! let media = MediaManifest::new();
//! let csv = media_manifest_to_string(&media, ManifestFormat::Csv)?;
//! assert!(csv.starts_with("Key;"));
//!
//! let format = ManifestFormat::from_path("media.json")?;
//! assert_eq!(format, ManifestFormat::Json);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::media::{AuxFileManifest, MediaManifest};
use crate::error::ExportError;

/// Output format for the media and aux manifests.
///
/// ```rust
/// use chatexport::format::ManifestFormat;
/// use std::str::FromStr;
///
/// let format = ManifestFormat::from_str("csv").unwrap();
/// assert_eq!(format.extension(), "csv");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ManifestFormat {
    /// JSON array of entries, in key order.
    #[default]
    Json,

    /// CSV with semicolon delimiter and a header row.
    Csv,
}

impl ManifestFormat {
    /// File extension without dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ManifestFormat::Json => "json",
            ManifestFormat::Csv => "csv",
        }
    }

    pub fn all() -> &'static [ManifestFormat] {
        &[ManifestFormat::Json, ManifestFormat::Csv]
    }

    /// Case-insensitive lookup by extension.
    fn from_extension(ext: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    fn expected() -> String {
        Self::all()
            .iter()
            .map(ManifestFormat::extension)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Detects the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        Self::from_extension(ext).ok_or_else(|| {
            ExportError::invalid_format(
                "manifest",
                format!(
                    "Unknown file extension: '.{ext}'. Expected one of: {}",
                    Self::expected()
                ),
            )
        })
    }
}

impl std::fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestFormat::Json => write!(f, "JSON"),
            ManifestFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl std::str::FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ManifestFormat::from_extension(s).ok_or_else(|| {
            format!(
                "Unknown format: '{s}'. Expected one of: {}",
                ManifestFormat::expected()
            )
        })
    }
}

fn feature_missing(format: ManifestFormat) -> ExportError {
    let feature = match format {
        ManifestFormat::Json => "json",
        ManifestFormat::Csv => "csv-output",
    };
    ExportError::invalid_format(
        "manifest",
        format!("Manifest format {format} requires the '{feature}' feature to be enabled"),
    )
}

/// Writes the media manifest in the given format.
#[allow(unused_variables)]
pub fn write_media_manifest(
    manifest: &MediaManifest,
    path: impl AsRef<Path>,
    format: ManifestFormat,
) -> Result<(), ExportError> {
    match format {
        #[cfg(feature = "json")]
        ManifestFormat::Json => crate::core::output::write_media_json(manifest, path),
        #[cfg(feature = "csv-output")]
        ManifestFormat::Csv => crate::core::output::write_media_csv(manifest, path),
        #[allow(unreachable_patterns)]
        _ => Err(feature_missing(format)),
    }
}

/// Writes the aux manifest in the given format.
#[allow(unused_variables)]
pub fn write_aux_manifest(
    manifest: &AuxFileManifest,
    path: impl AsRef<Path>,
    format: ManifestFormat,
) -> Result<(), ExportError> {
    match format {
        #[cfg(feature = "json")]
        ManifestFormat::Json => crate::core::output::write_aux_json(manifest, path),
        #[cfg(feature = "csv-output")]
        ManifestFormat::Csv => crate::core::output::write_aux_csv(manifest, path),
        #[allow(unreachable_patterns)]
        _ => Err(feature_missing(format)),
    }
}

/// Renders the media manifest to a string.
#[allow(unused_variables)]
pub fn media_manifest_to_string(
    manifest: &MediaManifest,
    format: ManifestFormat,
) -> Result<String, ExportError> {
    match format {
        #[cfg(feature = "json")]
        ManifestFormat::Json => crate::core::output::media_to_json(manifest),
        #[cfg(feature = "csv-output")]
        ManifestFormat::Csv => crate::core::output::media_to_csv(manifest),
        #[allow(unreachable_patterns)]
        _ => Err(feature_missing(format)),
    }
}

/// Renders the aux manifest to a string.
#[allow(unused_variables)]
pub fn aux_manifest_to_string(
    manifest: &AuxFileManifest,
    format: ManifestFormat,
) -> Result<String, ExportError> {
    match format {
        #[cfg(feature = "json")]
        ManifestFormat::Json => crate::core::output::aux_to_json(manifest),
        #[cfg(feature = "csv-output")]
        ManifestFormat::Csv => crate::core::output::aux_to_csv(manifest),
        #[allow(unreachable_patterns)]
        _ => Err(feature_missing(format)),
    }
}
