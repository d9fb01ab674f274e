//! Tests for output writers (XML document, JSON and CSV manifests)

use chatexport::core::media::{AuxFileManifest, MediaManifest, MediaManifestEntry};
use chatexport::core::output::{
    aux_to_csv, aux_to_json, media_to_csv, media_to_json, write_aux_csv, write_aux_json,
    write_document, write_media_csv, write_media_json,
};
use chatexport::format::{ManifestFormat, write_aux_manifest, write_media_manifest};
use chrono::{TimeZone, Utc};
use std::fs;
use tempfile::tempdir;

fn sample_media() -> MediaManifest {
    let mut media = MediaManifest::new();
    for (key, id, outgoing) in [("b-key", 2u64, true), ("a-key", 1, false)] {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        media.insert(
            key.to_string(),
            MediaManifestEntry {
                key: key.to_string(),
                attachment_id: id,
                data_ref: format!("content://parts/{id}"),
                recipient_id: 7,
                thread_id: 3,
                date,
                outgoing,
                content_type: "image/jpeg".to_string(),
                generated_path: format!("media/images/{}-{id}.jpg", date.timestamp_millis()),
            },
        );
    }
    media
}

fn sample_aux() -> AuxFileManifest {
    let mut aux = AuxFileManifest::new();
    aux.insert("2/photo".to_string(), "content://contacts/photo/2".to_string());
    aux.insert("doc;1".to_string(), "file:///sdcard/a \"b\".pdf".to_string());
    aux
}

// ============================================================================
// Document Writer Tests
// ============================================================================

mod document_writer_tests {
    use super::*;

    #[test]
    fn test_write_document_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.xml");
        let document = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<chatExport>\n    <chat period=\"x\"/>\n</chatExport>\n";

        write_document(document, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), document);
    }

    #[test]
    fn test_write_document_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.xml");
        fs::write(&path, "old content that is longer").unwrap();

        write_document("<a/>\n", &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<a/>\n");
    }

    #[test]
    fn test_write_document_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("chat.xml");

        let err = write_document("<a/>\n", &path).unwrap_err();
        assert!(err.is_io());
    }
}

// ============================================================================
// JSON Writer Tests
// ============================================================================

mod json_writer_tests {
    use super::*;

    #[test]
    fn test_media_json_is_array_in_key_order() {
        let json = media_to_json(&sample_media()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["key"], "a-key");
        assert_eq!(entries[1]["key"], "b-key");
        assert_eq!(entries[1]["outgoing"], true);
        assert_eq!(entries[0]["date"], "2024-01-15T10:30:00Z");
        assert_eq!(
            entries[0]["generated_path"],
            "media/images/1705314600000-1.jpg"
        );
    }

    #[test]
    fn test_aux_json_entries() {
        let json = aux_to_json(&sample_aux()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["key"], "2/photo");
        assert_eq!(value[0]["raw_reference"], "content://contacts/photo/2");
        assert_eq!(value[1]["raw_reference"], "file:///sdcard/a \"b\".pdf");
    }

    #[test]
    fn test_empty_manifests() {
        assert_eq!(media_to_json(&MediaManifest::new()).unwrap(), "[]");
        assert_eq!(aux_to_json(&AuxFileManifest::new()).unwrap(), "[]");
    }

    #[test]
    fn test_write_json_files() {
        let dir = tempdir().unwrap();
        let media_path = dir.path().join("media.json");
        let aux_path = dir.path().join("files.json");

        write_media_json(&sample_media(), &media_path).unwrap();
        write_aux_json(&sample_aux(), &aux_path).unwrap();

        let media = fs::read_to_string(&media_path).unwrap();
        assert!(media.contains("content://parts/1"));
        let aux = fs::read_to_string(&aux_path).unwrap();
        assert!(aux.contains("2/photo"));
    }
}

// ============================================================================
// CSV Writer Tests
// ============================================================================

mod csv_writer_tests {
    use super::*;

    #[test]
    fn test_media_csv_header_and_rows() {
        let csv = media_to_csv(&sample_media()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("Key;AttachmentId;DataRef;RecipientId;ThreadId;Date;Outgoing;ContentType;GeneratedPath")
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("a-key;1;content://parts/1;7;3;2024-01-15 10:30:00;false;"));
        assert!(lines.next().unwrap().starts_with("b-key;2;"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_aux_csv_quotes_delimiter() {
        let csv = aux_to_csv(&sample_aux()).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "doc;1");
        assert_eq!(&rows[1][1], "file:///sdcard/a \"b\".pdf");
    }

    #[test]
    fn test_empty_aux_csv_has_header() {
        assert_eq!(aux_to_csv(&AuxFileManifest::new()).unwrap(), "Key;RawReference\n");
    }

    #[test]
    fn test_write_csv_files() {
        let dir = tempdir().unwrap();
        let media_path = dir.path().join("media.csv");
        let aux_path = dir.path().join("files.csv");

        write_media_csv(&sample_media(), &media_path).unwrap();
        write_aux_csv(&sample_aux(), &aux_path).unwrap();

        assert_eq!(fs::read_to_string(&media_path).unwrap().lines().count(), 3);
        assert_eq!(fs::read_to_string(&aux_path).unwrap().lines().count(), 3);
    }
}

// ============================================================================
// Format Dispatch Tests
// ============================================================================

mod format_dispatch_tests {
    use super::*;

    #[test]
    fn test_dispatch_by_format() {
        let dir = tempdir().unwrap();

        for format in ManifestFormat::all() {
            let path = dir
                .path()
                .join(format!("media.{}", format.extension()));
            write_media_manifest(&sample_media(), &path, *format).unwrap();
            assert!(path.exists());
        }

        let json = fs::read_to_string(dir.path().join("media.json")).unwrap();
        assert!(json.trim_start().starts_with('['));
        let csv = fs::read_to_string(dir.path().join("media.csv")).unwrap();
        assert!(csv.starts_with("Key;"));
    }

    #[test]
    fn test_format_from_output_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("files.CSV");
        let format = ManifestFormat::from_path(&path).unwrap();
        assert_eq!(format, ManifestFormat::Csv);

        write_aux_manifest(&sample_aux(), &path, format).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("Key;RawReference"));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        assert!(ManifestFormat::from_path("files.xml").is_err());
        assert!(ManifestFormat::from_path("files").is_err());
    }
}
