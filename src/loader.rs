//! Collaborator seams and the export window.
//!
//! The exporter never talks to storage directly. It reads through four
//! traits:
//!
//! - [`ConversationLoader`] - a scoped cursor over one thread's records
//! - [`AttachmentLookup`] - attachment metadata by id
//! - [`ParticipantResolver`] - recipients, the self participant and thread recipients
//! - [`MentionResolver`](crate::core::mentions::MentionResolver) - mention display form
//!
//! [`ExportSource`] bundles the first three; anything implementing all of
//! them is a source. [`MemoryStore`](crate::store::MemoryStore) is the
//! in-crate implementation.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{ExportError, Result};
use crate::model::{
    Attachment, AttachmentId, MessageId, MessageRecord, Participant, RecipientId, ThreadId,
    ThreadRecipient,
};

/// Inclusive time window of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExportWindow {
    /// Creates a window from explicit bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(ExportError::configuration(format!(
                "export window ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window from the start of `from` to the last millisecond of `until`,
    /// both local calendar days in `offset`.
    pub fn for_days(from: NaiveDate, until: NaiveDate, offset: FixedOffset) -> Result<Self> {
        if until < from {
            return Err(ExportError::configuration(format!(
                "export window ends ({until}) before it starts ({from})"
            )));
        }

        let start = start_of_day(from, offset)?;
        let end = until
            .checked_add_days(Days::new(1))
            .map(|next| start_of_day(next, offset))
            .transpose()?
            .map(|next| next - chrono::Duration::milliseconds(1))
            .ok_or_else(|| ExportError::configuration(format!("date {until} is out of range")))?;

        Ok(Self { start, end })
    }

    /// Returns `true` if `ts` lies within the window, bounds included.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

fn start_of_day(day: NaiveDate, offset: FixedOffset) -> Result<DateTime<Utc>> {
    offset
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ExportError::configuration(format!("date {day} is out of range")))
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ExportError::invalid_date(input))
}

/// A cursor over records, most recent first.
///
/// The cursor is released when dropped.
pub trait RecordCursor: Iterator<Item = MessageRecord> {}

impl<T: Iterator<Item = MessageRecord>> RecordCursor for T {}

/// Supplies the records of one thread.
pub trait ConversationLoader {
    /// Opens a cursor over the records of `thread_id` sent within `window`,
    /// ordered by `sent_at` descending.
    fn open(
        &self,
        thread_id: ThreadId,
        window: &ExportWindow,
    ) -> Result<Box<dyn RecordCursor + '_>>;

    /// Sent time of a quoted message, if it is still stored.
    fn quoted_timestamp(
        &self,
        _thread_id: ThreadId,
        _message_id: MessageId,
    ) -> Option<DateTime<Utc>> {
        None
    }
}

pub trait AttachmentLookup {
    fn attachment(&self, id: AttachmentId) -> Option<Attachment>;
}

pub trait ParticipantResolver {
    fn participant(&self, id: RecipientId) -> Option<Participant>;

    /// The exporting user.
    fn self_participant(&self) -> Option<Participant>;

    fn thread_recipient(&self, thread_id: ThreadId) -> Option<ThreadRecipient>;
}

/// Everything the document builder reads from.
pub trait ExportSource: ConversationLoader + AttachmentLookup + ParticipantResolver {}

impl<T: ConversationLoader + AttachmentLookup + ParticipantResolver + ?Sized> ExportSource for T {}
