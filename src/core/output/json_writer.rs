//! JSON manifest writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::core::media::{AuxFileManifest, MediaManifest, aux_entries};
use crate::error::Result;

/// Flat media row. The key is repeated inside each entry, so the manifest is
/// written as an array rather than an object.
#[derive(Serialize)]
struct JsonMediaEntry<'a> {
    key: &'a str,
    attachment_id: u64,
    data_ref: &'a str,
    recipient_id: u64,
    thread_id: u64,
    date: String,
    outgoing: bool,
    content_type: &'a str,
    generated_path: &'a str,
}

/// Converts a media manifest to a JSON array, in key order.
///
/// # Format
/// ```json
/// [
///   {"key": "k1", "attachment_id": 1, "data_ref": "...", "generated_path": "media/images/..."}
/// ]
/// ```
pub fn media_to_json(manifest: &MediaManifest) -> Result<String> {
    let entries: Vec<JsonMediaEntry<'_>> = manifest
        .values()
        .map(|e| JsonMediaEntry {
            key: &e.key,
            attachment_id: e.attachment_id,
            data_ref: &e.data_ref,
            recipient_id: e.recipient_id,
            thread_id: e.thread_id,
            date: e.date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            outgoing: e.outgoing,
            content_type: &e.content_type,
            generated_path: &e.generated_path,
        })
        .collect();

    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Converts an aux manifest to a JSON array of `{key, raw_reference}`.
pub fn aux_to_json(manifest: &AuxFileManifest) -> Result<String> {
    Ok(serde_json::to_string_pretty(&aux_entries(manifest))?)
}

pub fn write_media_json(manifest: &MediaManifest, output_path: impl AsRef<Path>) -> Result<()> {
    let json = media_to_json(manifest)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn write_aux_json(manifest: &AuxFileManifest, output_path: impl AsRef<Path>) -> Result<()> {
    let json = aux_to_json(manifest)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
