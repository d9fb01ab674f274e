//! Configuration for document rendering.
//!
//! This module provides a plain configuration struct for library usage,
//! without any CLI framework dependencies.
//!
//! # Date formatting contract
//!
//! All timestamps are converted to a fixed UTC offset before formatting.
//! Patterns use chrono's `strftime` syntax:
//!
//! | Field          | Default        | Example        | Used for                    |
//! |----------------|----------------|----------------|-----------------------------|
//! | `day_format`   | `%d %b,%Y`     | `01 Jan,2024`  | `Log[date]`, export period  |
//! | `time_format`  | `%H:%M`        | `10:00`        | `message[time]`, reactions  |
//! | `date_format`  | `%b %-d, %Y`   | `Jan 1, 2024`  | link preview and quote dates|
//!
//! # Example
//!
//! ```rust
//! use chatexport::config::ExportConfig;
//!
//! let config = ExportConfig::new()
//!     .with_utc_offset_minutes(120)
//!     .with_indent(2);
//!
//! assert!(config.validate().is_ok());
//! ```

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Largest accepted UTC offset, in minutes (±23:59).
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Rendering settings for one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Offset applied to every timestamp, in minutes east of UTC (default: 0)
    pub utc_offset_minutes: i32,

    /// Pattern for calendar days (default: `%d %b,%Y`)
    pub day_format: String,

    /// Pattern for times of day (default: `%H:%M`)
    pub time_format: String,

    /// Pattern for standalone dates (default: `%b %-d, %Y`)
    pub date_format: String,

    /// Spaces per nesting level in the serialized document (default: 4)
    pub indent: usize,

    /// Emit the `<?xml ...?>` declaration (default: true)
    pub xml_declaration: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            day_format: "%d %b,%Y".to_string(),
            time_format: "%H:%M".to_string(),
            date_format: "%b %-d, %Y".to_string(),
            indent: 4,
            xml_declaration: true,
        }
    }
}

impl ExportConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the UTC offset in minutes.
    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Sets the calendar day pattern.
    #[must_use]
    pub fn with_day_format(mut self, pattern: impl Into<String>) -> Self {
        self.day_format = pattern.into();
        self
    }

    /// Sets the time of day pattern.
    #[must_use]
    pub fn with_time_format(mut self, pattern: impl Into<String>) -> Self {
        self.time_format = pattern.into();
        self
    }

    /// Sets the standalone date pattern.
    #[must_use]
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    /// Sets the indentation width.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Enables or disables the XML declaration.
    #[must_use]
    pub fn with_xml_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }

    /// Returns the configured offset.
    pub fn offset(&self) -> Result<FixedOffset> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ExportError::configuration(format!(
                "UTC offset {} minutes is out of range",
                self.utc_offset_minutes
            )));
        }
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ExportError::configuration(format!(
                "UTC offset {} minutes is out of range",
                self.utc_offset_minutes
            ))
        })
    }

    /// Checks the offset and every date pattern.
    ///
    /// A configuration that passes validation never fails while formatting.
    pub fn validate(&self) -> Result<()> {
        self.offset()?;
        for (field, pattern) in [
            ("day_format", &self.day_format),
            ("time_format", &self.time_format),
            ("date_format", &self.date_format),
        ] {
            if pattern.is_empty() {
                return Err(ExportError::configuration(format!("{field} is empty")));
            }
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(ExportError::configuration(format!(
                    "{field} '{pattern}' is not a valid date pattern"
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    fn local(&self, ts: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = self.offset().unwrap_or_else(|_| Utc.fix());
        ts.with_timezone(&offset)
    }

    /// Formats the local calendar day of `ts`. Records sharing this value
    /// belong to the same `Log`.
    pub fn format_day(&self, ts: DateTime<Utc>) -> String {
        self.local(ts).format(&self.day_format).to_string()
    }

    pub fn format_time(&self, ts: DateTime<Utc>) -> String {
        self.local(ts).format(&self.time_format).to_string()
    }

    pub fn format_date(&self, ts: DateTime<Utc>) -> String {
        self.local(ts).format(&self.date_format).to_string()
    }

    /// Date and time joined by a space.
    pub fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        format!("{} {}", self.format_date(ts), self.format_time(ts))
    }
}
