//! Document and manifest writers.
//!
//! - [`write_document`] - writes the serialized XML document
//! - [`write_media_json`] / [`media_to_json`] and [`write_aux_json`] / [`aux_to_json`]
//!   - JSON arrays - requires `json` feature
//! - [`write_media_csv`] / [`media_to_csv`] and [`write_aux_csv`] / [`aux_to_csv`]
//!   - CSV with semicolon delimiter - requires `csv-output` feature
//!
//! Manifests are consumed by a packaging stage, so both formats keep the
//! manifest's key order.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "json")]
//! # fn main() -> chatexport::Result<()> {
//! use chatexport::core::media::{AuxFileManifest, MediaManifest};
//! use chatexport::core::output::{write_aux_json, write_document, write_media_json};
//!
//! let media = MediaManifest::new();
//! let aux = AuxFileManifest::new();
//!
//! write_document("<chatExport/>\n", "chat.xml")?;
//! write_media_json(&media, "media.json")?;
//! write_aux_json(&aux, "files.json")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "json"))]
//! # fn main() {}
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json")]
mod json_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{aux_to_csv, media_to_csv, write_aux_csv, write_media_csv};
#[cfg(feature = "json")]
pub use json_writer::{aux_to_json, media_to_json, write_aux_json, write_media_json};

/// Writes a serialized document to a file.
pub fn write_document(document: &str, output_path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(output_path)?;
    file.write_all(document.as_bytes())?;
    file.flush()?;
    Ok(())
}
