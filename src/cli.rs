//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`ManifestFormat`] - manifest format options
//!
//! # Example
//!
//! ```rust
//! use chatexport::cli::Args;
//! use clap::Parser;
//!
//! let args = Args::parse_from(["chatexport", "snapshot.json", "--thread", "7", "-f", "csv"]);
//! let config = args.export_config();
//! assert_eq!(config.indent, 4);
//! assert_eq!(args.media_manifest_path(), "chat_export_media.csv");
//! ```

use std::path::Path;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::error::Result;
use crate::loader::parse_date;
use crate::model::ThreadId;

/// Export one conversation window into an XML document plus media and
/// external-file manifests.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatexport")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatexport snapshot.json --thread 7
    chatexport snapshot.json -t 7 --from 2024-01-01 --until 2024-01-31 -o january.xml
    chatexport snapshot.json -t 7 -f csv --utc-offset 120
    chatexport snapshot.json -t 7 --media-manifest media.json --aux-manifest files.json")]
pub struct Args {
    /// Path to the conversation snapshot (JSON)
    pub snapshot: String,

    /// Thread to export
    #[arg(short, long)]
    pub thread: ThreadId,

    /// First day to export (YYYY-MM-DD), defaults to the thread's first day
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Last day to export (YYYY-MM-DD), defaults to the thread's last day
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,

    /// Path to the XML document
    #[arg(short, long, default_value = "chat_export.xml")]
    pub output: String,

    /// Path to the media manifest, derived from --output by default
    #[arg(long, value_name = "FILE")]
    pub media_manifest: Option<String>,

    /// Path to the external-file manifest, derived from --output by default
    #[arg(long, value_name = "FILE")]
    pub aux_manifest: Option<String>,

    /// Manifest format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ManifestFormat,

    /// Local time zone as minutes east of UTC
    #[arg(long, value_name = "MINUTES", default_value_t = 0, allow_negative_numbers = true)]
    pub utc_offset: i32,

    /// Spaces per nesting level in the document
    #[arg(long, value_name = "N", default_value_t = 4)]
    pub indent: usize,

    /// Omit the `<?xml ...?>` declaration
    #[arg(long)]
    pub no_declaration: bool,

    /// Print progress to stderr
    #[arg(long)]
    pub progress: bool,
}

impl Args {
    /// Export configuration from the formatting flags.
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig::new()
            .with_utc_offset_minutes(self.utc_offset)
            .with_indent(self.indent)
            .with_xml_declaration(!self.no_declaration)
    }

    /// Parses `--from` and `--until`, if given.
    pub fn date_range(&self) -> Result<(Option<chrono::NaiveDate>, Option<chrono::NaiveDate>)> {
        let from = self.from.as_deref().map(parse_date).transpose()?;
        let until = self.until.as_deref().map(parse_date).transpose()?;
        Ok((from, until))
    }

    pub fn media_manifest_path(&self) -> String {
        self.media_manifest
            .clone()
            .unwrap_or_else(|| self.derived_path("media"))
    }

    pub fn aux_manifest_path(&self) -> String {
        self.aux_manifest
            .clone()
            .unwrap_or_else(|| self.derived_path("files"))
    }

    /// `<output stem>_<suffix>.<format extension>` next to the document.
    fn derived_path(&self, suffix: &str) -> String {
        let output = Path::new(&self.output);
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("chat_export");
        let name = format!("{stem}_{suffix}.{}", self.format.extension());
        match output.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.join(name).to_string_lossy().into_owned(),
            None => name,
        }
    }
}

/// Manifest format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    /// JSON array of entries
    #[default]
    Json,

    /// CSV with semicolon delimiter
    Csv,
}

impl ManifestFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        crate::format::ManifestFormat::from(*self).extension()
    }
}

impl std::fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::format::ManifestFormat::from(*self))
    }
}

// Conversion to library format type
impl From<ManifestFormat> for crate::format::ManifestFormat {
    fn from(format: ManifestFormat) -> crate::format::ManifestFormat {
        match format {
            ManifestFormat::Json => crate::format::ManifestFormat::Json,
            ManifestFormat::Csv => crate::format::ManifestFormat::Csv,
        }
    }
}
