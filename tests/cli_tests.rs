//! Additional tests for the CLI module and manifest format parsing

use chatexport::cli::{Args, ManifestFormat as CliFormat};
use chatexport::format::ManifestFormat;
use clap::Parser;
use std::str::FromStr;

fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
    let mut argv = vec!["chatexport", "snapshot.json"];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv)
}

#[test]
fn test_format_from_str_all_variants() {
    assert_eq!(ManifestFormat::from_str("json").unwrap(), ManifestFormat::Json);
    assert_eq!(ManifestFormat::from_str("csv").unwrap(), ManifestFormat::Csv);

    // Case variations
    assert_eq!(ManifestFormat::from_str("JSON").unwrap(), ManifestFormat::Json);
    assert_eq!(ManifestFormat::from_str("Csv").unwrap(), ManifestFormat::Csv);
}

#[test]
fn test_format_from_str_invalid() {
    let err = ManifestFormat::from_str("xml").unwrap_err();
    assert!(err.contains("xml"));
    assert!(err.contains("json, csv"));
    assert!(ManifestFormat::from_str("").is_err());
}

#[test]
fn test_format_metadata() {
    let extensions: Vec<&str> = ManifestFormat::all().iter().map(|f| f.extension()).collect();
    assert_eq!(extensions, vec!["json", "csv"]);
    assert_eq!(ManifestFormat::default(), ManifestFormat::Json);
    assert_eq!(ManifestFormat::Json.to_string(), "JSON");
}

#[test]
fn test_format_serde_lowercase() {
    let json = serde_json::to_string(&ManifestFormat::Csv).unwrap();
    assert_eq!(json, "\"csv\"");
    let parsed: ManifestFormat = serde_json::from_str("\"json\"").unwrap();
    assert_eq!(parsed, ManifestFormat::Json);
}

#[test]
fn test_cli_format_converts() {
    assert_eq!(ManifestFormat::from(CliFormat::Json), ManifestFormat::Json);
    assert_eq!(ManifestFormat::from(CliFormat::Csv), ManifestFormat::Csv);
    assert_eq!(CliFormat::Csv.extension(), "csv");
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_thread_is_required() {
    assert!(parse(&[]).is_err());
    assert!(parse(&["--thread", "abc"]).is_err());
}

#[test]
fn test_minimal_arguments() {
    let args = parse(&["-t", "12"]).unwrap();
    assert_eq!(args.snapshot, "snapshot.json");
    assert_eq!(args.thread, 12);
    assert!(args.from.is_none());
    assert!(args.until.is_none());
    assert!(!args.progress);
    assert_eq!(args.utc_offset, 0);
}

#[test]
fn test_all_flags() {
    let args = parse(&[
        "--thread",
        "3",
        "--from",
        "2024-01-01",
        "--until",
        "2024-01-31",
        "--output",
        "jan.xml",
        "--format",
        "csv",
        "--utc-offset",
        "-90",
        "--indent",
        "0",
        "--no-declaration",
        "--progress",
    ])
    .unwrap();

    assert_eq!(args.format, CliFormat::Csv);
    assert!(args.progress);

    let config = args.export_config();
    assert_eq!(config.utc_offset_minutes, -90);
    assert_eq!(config.indent, 0);
    assert!(!config.xml_declaration);
    assert!(config.validate().is_ok());

    let (from, until) = args.date_range().unwrap();
    assert_eq!(from.unwrap().to_string(), "2024-01-01");
    assert_eq!(until.unwrap().to_string(), "2024-01-31");

    assert_eq!(args.media_manifest_path(), "jan_media.csv");
    assert_eq!(args.aux_manifest_path(), "jan_files.csv");
}

#[test]
fn test_unknown_format_rejected() {
    assert!(parse(&["-t", "1", "-f", "xml"]).is_err());
}

#[test]
fn test_explicit_manifest_paths_win() {
    let args = parse(&[
        "-t",
        "1",
        "--media-manifest",
        "m.json",
        "--aux-manifest",
        "a.json",
        "-f",
        "csv",
    ])
    .unwrap();
    assert_eq!(args.media_manifest_path(), "m.json");
    assert_eq!(args.aux_manifest_path(), "a.json");
}

#[test]
fn test_invalid_date_reported() {
    let args = parse(&["-t", "1", "--from", "2024-13-01"]).unwrap();
    let err = args.date_range().unwrap_err();
    assert!(err.is_invalid_date());
    assert!(err.to_string().contains("2024-13-01"));
}

#[test]
fn test_out_of_range_offset_fails_validation() {
    let args = parse(&["-t", "1", "--utc-offset", "1440"]).unwrap();
    assert!(args.export_config().validate().is_err());
}
