//! Document assembly.
//!
//! [`DocumentBuilder`] turns one thread and date window into a serialized
//! XML document plus the media and aux manifests:
//!
//! ```text
//! chatExport
//!  chat [period]
//!   members: contact* | group[id]{title, memberCount, contact*}
//!   chat_records
//!    Log[date]* -> turn[author]* -> message[id, time?, status?, deleted?, expiresIn?, mismatched_identities?]
//!      body -> (mention* | shared_contact | link* | quote | media_content) + text? + reactions?
//! ```
//!
//! The export is all-or-nothing: it returns a complete [`Export`] or an
//! error. Failures confined to one message (an unknown quote author, a link
//! preview without attachment metadata) are logged and the message keeps an
//! empty `body`.
//!
//! # Example
//!
//! ```rust
//! use chatexport::config::ExportConfig;
//! use chatexport::document::DocumentBuilder;
//! use chatexport::model::{Direction, Facet, MessageRecord, Participant, ThreadRecipient};
//! use chatexport::store::MemoryStore;
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! let sent = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
//! let store = MemoryStore::new(1)
//!     .with_participant(Participant::new(1, "Me").myself())
//!     .with_participant(Participant::new(2, "Bob"))
//!     .with_thread(7, ThreadRecipient::Direct { recipient_id: 2 })
//!     .with_message(
//!         MessageRecord::new(1, 7, 1, sent)
//!             .with_direction(Direction::Outgoing)
//!             .with_facet(Facet::Sent)
//!             .with_body("Hello"),
//!     );
//!
//! let builder = DocumentBuilder::new(&store, ExportConfig::default())?;
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let export = builder.export(7, day, day)?;
//!
//! assert!(export.document.contains("<text>Hello</text>"));
//! assert_eq!(export.stats.records_rendered, 1);
//! # Ok::<(), chatexport::ExportError>(())
//! ```

pub mod attachment;
mod body;

use std::ptr;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::core::classify::delivery_status;
use crate::core::media::{AuxFileManifest, MediaCollector, MediaManifest};
use crate::core::mentions::{DisplayNameMentions, MentionResolver};
use crate::error::{ExportError, Result};
use crate::loader::{ExportSource, ExportWindow};
use crate::markup::{Element, Serializer};
use crate::model::{MessageRecord, Participant, ThreadId};
use crate::participants::members_element;
use crate::progress::{Progress, ProgressCallback};

use body::{BodyContext, body_element};

/// Counters collected while exporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Records returned by the loader.
    pub records_loaded: usize,
    /// Records written as a `turn`.
    pub records_rendered: usize,
    pub view_once_skipped: usize,
    /// Remote-deleted records, rendered without body.
    pub deleted: usize,
    /// Number of `Log` elements.
    pub days: usize,
    /// Records whose body failed and was left empty.
    pub degraded: usize,
    pub media_entries: usize,
    pub aux_entries: usize,
    /// Media keys recorded more than once.
    pub media_overwrites: usize,
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct Export {
    /// Serialized XML document.
    pub document: String,
    /// The tree the document was serialized from.
    pub root: Element,
    pub media: MediaManifest,
    pub aux_files: AuxFileManifest,
    pub stats: ExportStats,
}

/// Records of one local calendar day, in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'r> {
    /// The formatted day, written into `Log[date]`.
    pub date: String,
    pub records: Vec<&'r MessageRecord>,
}

/// Splits ascending records into calendar days, skipping view-once records.
///
/// A new group starts whenever the formatted day differs from the previous
/// kept record's day.
pub fn day_groups<'r>(records: &'r [MessageRecord], config: &ExportConfig) -> Vec<DayGroup<'r>> {
    let mut groups: Vec<DayGroup<'r>> = Vec::new();

    for record in records.iter().filter(|r| !r.is_view_once) {
        let date = config.format_day(record.sent_at);
        match groups.last_mut() {
            Some(group) if group.date == date => group.records.push(record),
            _ => groups.push(DayGroup {
                date,
                records: vec![record],
            }),
        }
    }

    groups
}

/// Builds export documents from an [`ExportSource`].
pub struct DocumentBuilder<'a, S: ExportSource + ?Sized> {
    source: &'a S,
    config: ExportConfig,
    offset: FixedOffset,
    mentions: Option<&'a dyn MentionResolver>,
    progress: Option<ProgressCallback>,
}

impl<'a, S: ExportSource + ?Sized> DocumentBuilder<'a, S> {
    /// Creates a builder.
    ///
    /// Fails with [`ExportError::Configuration`] if the configuration does
    /// not validate.
    pub fn new(source: &'a S, config: ExportConfig) -> Result<Self> {
        config.validate()?;
        let offset = config.offset()?;
        Ok(Self {
            source,
            config,
            offset,
            mentions: None,
            progress: None,
        })
    }

    /// Sets a callback invoked once per processed record.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Replaces the default display-name mention resolver.
    #[must_use]
    pub fn with_mention_resolver(mut self, resolver: &'a dyn MentionResolver) -> Self {
        self.mentions = Some(resolver);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Window covering `from` to `until` as local calendar days.
    pub fn window(&self, from: NaiveDate, until: NaiveDate) -> Result<ExportWindow> {
        ExportWindow::for_days(from, until, self.offset)
    }

    /// Exports `thread_id` between two local calendar days, inclusive.
    pub fn export(&self, thread_id: ThreadId, from: NaiveDate, until: NaiveDate) -> Result<Export> {
        let window = self.window(from, until)?;
        self.export_window(thread_id, &window)
    }

    /// Exports `thread_id` within an explicit window.
    pub fn export_window(&self, thread_id: ThreadId, window: &ExportWindow) -> Result<Export> {
        info!(thread = thread_id, start = %window.start, end = %window.end, "exporting thread");

        let me = self
            .source
            .self_participant()
            .ok_or_else(|| ExportError::configuration("self participant is unknown"))?;

        let mut collector = MediaCollector::new();
        let members = members_element(self.source, thread_id, &mut collector)?;

        // The cursor lives only inside this block.
        let mut records: Vec<MessageRecord> = {
            let cursor = self.source.open(thread_id, window)?;
            cursor.collect()
        };
        records.reverse();

        let mut stats = ExportStats {
            records_loaded: records.len(),
            view_once_skipped: records.iter().filter(|r| r.is_view_once).count(),
            ..ExportStats::default()
        };

        let default_mentions = DisplayNameMentions::new(self.source);
        let ctx = BodyContext {
            source: self.source,
            mentions: self.mentions.unwrap_or(&default_mentions),
            config: &self.config,
            thread_id,
        };

        let mut chat_records = Element::new("chat_records");
        let mut processed = 0;
        let mut replay = records.iter();

        for group in day_groups(&records, &self.config) {
            debug!(date = %group.date, records = group.records.len(), "opening day");
            stats.days += 1;

            let mut log = Element::new("Log").with_attr("date", group.date);
            for record in group.records {
                log.push(self.turn_element(&ctx, record, &me, &mut collector, &mut stats));
                stats.records_rendered += 1;
                // view-once records between the previous record and this one
                processed += replay.by_ref().take_while(|r| !ptr::eq(*r, record)).count() + 1;
                self.report(processed, &stats);
            }
            chat_records.push(log);
        }

        let trailing = replay.count();
        if trailing > 0 {
            processed += trailing;
            self.report(processed, &stats);
        }

        let period = format!(
            "{} - {}",
            self.config.format_day(window.start),
            self.config.format_day(window.end)
        );
        let root = Element::new("chatExport").with_child(
            Element::new("chat")
                .with_attr("period", period)
                .with_child(members)
                .with_child(chat_records),
        );

        let document = Serializer::new()
            .with_indent(self.config.indent)
            .with_declaration(self.config.xml_declaration)
            .serialize(&root)?;

        stats.media_overwrites = collector.overwrites();
        let (media, aux_files) = collector.into_manifests();
        stats.media_entries = media.len();
        stats.aux_entries = aux_files.len();

        info!(
            rendered = stats.records_rendered,
            days = stats.days,
            degraded = stats.degraded,
            media = stats.media_entries,
            "export finished"
        );

        Ok(Export {
            document,
            root,
            media,
            aux_files,
            stats,
        })
    }

    fn report(&self, processed: usize, stats: &ExportStats) {
        if let Some(callback) = &self.progress {
            callback(Progress::new(processed, Some(stats.records_loaded)).with_days(stats.days));
        }
    }

    fn turn_element(
        &self,
        ctx: &BodyContext<'_, S>,
        record: &MessageRecord,
        me: &Participant,
        collector: &mut MediaCollector,
        stats: &mut ExportStats,
    ) -> Element {
        let author = if record.is_outgoing() {
            me.given_name().to_string()
        } else if let Some(sender) = self.source.participant(record.sender_id) {
            sender.given_name().to_string()
        } else {
            warn!(message = record.id, sender = record.sender_id, "sender could not be resolved");
            "Unknown".to_string()
        };

        let mut message = Element::new("message").with_attr("id", record.id.to_string());

        if record.is_remote_deleted {
            message.set_attr("deleted", "true");
            stats.deleted += 1;
        } else {
            message.set_attr("time", self.config.format_time(record.sent_at));
            if record.is_outgoing() {
                message.set_attr("status", delivery_status(record).as_str());
            }

            let mut scratch = MediaCollector::new();
            match body_element(ctx, record, &mut scratch) {
                Ok(body) => {
                    collector.absorb(scratch);
                    message.push(body);
                }
                Err(e) => {
                    warn!(message = record.id, error = %e, "rendering message with empty body");
                    stats.degraded += 1;
                    message.push(Element::new("body"));
                }
            }

            if record.expires_in_ms > 0 {
                message.set_attr("expiresIn", (record.expires_in_ms / 1000).to_string());
            }
            if !record.mismatched_identities.is_empty() {
                let ids: Vec<String> = record
                    .mismatched_identities
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                message.set_attr("mismatched_identities", ids.join(","));
            }
        }

        Element::new("turn")
            .with_attr("author", author)
            .with_child(message)
    }
}
