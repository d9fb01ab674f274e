//! CSV manifest writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::media::{AuxFileManifest, MediaManifest};
use crate::error::{ExportError, Result};

const MEDIA_HEADER: [&str; 9] = [
    "Key",
    "AttachmentId",
    "DataRef",
    "RecipientId",
    "ThreadId",
    "Date",
    "Outgoing",
    "ContentType",
    "GeneratedPath",
];

const AUX_HEADER: [&str; 2] = ["Key", "RawReference"];

/// Writes the media manifest to any writer.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `Key;AttachmentId;DataRef;RecipientId;ThreadId;Date;Outgoing;ContentType;GeneratedPath`
/// - Encoding: UTF-8
fn media_csv_to<W: Write>(manifest: &MediaManifest, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(out);
    writer.write_record(MEDIA_HEADER)?;

    for entry in manifest.values() {
        writer.write_record([
            entry.key.clone(),
            entry.attachment_id.to_string(),
            entry.data_ref.clone(),
            entry.recipient_id.to_string(),
            entry.thread_id.to_string(),
            entry.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.outgoing.to_string(),
            entry.content_type.clone(),
            entry.generated_path.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn aux_csv_to<W: Write>(manifest: &AuxFileManifest, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(out);
    writer.write_record(AUX_HEADER)?;

    for (key, raw_reference) in manifest {
        writer.write_record([key, raw_reference])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_media_csv(manifest: &MediaManifest, output_path: impl AsRef<Path>) -> Result<()> {
    media_csv_to(manifest, File::create(output_path)?)
}

pub fn write_aux_csv(manifest: &AuxFileManifest, output_path: impl AsRef<Path>) -> Result<()> {
    aux_csv_to(manifest, File::create(output_path)?)
}

/// Converts the media manifest to a CSV string.
pub fn media_to_csv(manifest: &MediaManifest) -> Result<String> {
    let mut buf = Vec::new();
    media_csv_to(manifest, &mut buf)?;
    into_utf8(buf)
}

/// Converts the aux manifest to a CSV string.
pub fn aux_to_csv(manifest: &AuxFileManifest) -> Result<String> {
    let mut buf = Vec::new();
    aux_csv_to(manifest, &mut buf)?;
    into_utf8(buf)
}

fn into_utf8(buf: Vec<u8>) -> Result<String> {
    String::from_utf8(buf).map_err(|e| ExportError::invalid_format("CSV", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::media::MediaManifestEntry;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    #[test]
    fn test_media_to_csv() {
        let mut m = MediaManifest::new();
        m.insert(
            "k1".into(),
            MediaManifestEntry {
                key: "k1".into(),
                attachment_id: 3,
                data_ref: "parts/3".into(),
                recipient_id: 2,
                thread_id: 1,
                date: Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 0).unwrap(),
                outgoing: false,
                content_type: "image/png".into(),
                generated_path: "media/images/1-3.png".into(),
            },
        );

        let csv = media_to_csv(&m).unwrap();
        assert!(csv.starts_with("Key;AttachmentId;DataRef"));
        assert!(csv.contains("k1;3;parts/3;2;1;2024-06-15 12:30:00;false;image/png;media/images/1-3.png"));
    }

    #[test]
    fn test_write_aux_csv() {
        let mut aux = AuxFileManifest::new();
        aux.insert("b".into(), "ref-b".into());
        aux.insert("a".into(), "ref-a".into());

        let temp_file = NamedTempFile::new().unwrap();
        write_aux_csv(&aux, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["Key;RawReference", "a;ref-a", "b;ref-b"]);
    }
}
