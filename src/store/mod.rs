//! In-memory export source.
//!
//! [`MemoryStore`] implements every collaborator trait of
//! [`loader`](crate::loader) over plain collections. It backs the CLI (loaded
//! from a JSON snapshot, see [`Snapshot`]) and the test suite.
//!
//! # Example
//!
//! ```rust
//! use chatexport::loader::{ConversationLoader, ExportWindow};
//! use chatexport::model::{MessageRecord, Participant, ThreadRecipient};
//! use chatexport::store::MemoryStore;
//! use chrono::{TimeZone, Utc};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
//!
//! let store = MemoryStore::new(1)
//!     .with_participant(Participant::new(1, "Me").myself())
//!     .with_thread(7, ThreadRecipient::Direct { recipient_id: 2 })
//!     .with_message(MessageRecord::new(1, 7, 2, t0))
//!     .with_message(MessageRecord::new(2, 7, 2, t1));
//!
//! let window = ExportWindow::new(t0, t1)?;
//! let ids: Vec<u64> = store.open(7, &window)?.map(|r| r.id).collect();
//! assert_eq!(ids, vec![2, 1]); // most recent first
//! # Ok::<(), chatexport::ExportError>(())
//! ```

#[cfg(feature = "json")]
mod snapshot;

#[cfg(feature = "json")]
pub use snapshot::{Snapshot, SnapshotThread};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::loader::{
    AttachmentLookup, ConversationLoader, ExportWindow, ParticipantResolver, RecordCursor,
};
use crate::model::{
    Attachment, AttachmentId, MessageId, MessageRecord, Participant, RecipientId, ThreadId,
    ThreadRecipient,
};

/// Collaborator implementation over in-memory collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    self_id: RecipientId,
    participants: HashMap<RecipientId, Participant>,
    threads: HashMap<ThreadId, ThreadRecipient>,
    messages: Vec<MessageRecord>,
    attachments: HashMap<AttachmentId, Attachment>,
    opened: AtomicUsize,
    released: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store whose exporting user is `self_id`.
    pub fn new(self_id: RecipientId) -> Self {
        Self {
            self_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.insert(participant.id, participant);
        self
    }

    #[must_use]
    pub fn with_thread(mut self, thread_id: ThreadId, recipient: ThreadRecipient) -> Self {
        self.threads.insert(thread_id, recipient);
        self
    }

    #[must_use]
    pub fn with_message(mut self, record: MessageRecord) -> Self {
        self.messages.push(record);
        self
    }

    /// Registers attachment metadata for [`AttachmentLookup`].
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.insert(attachment.id, attachment);
        self
    }

    pub fn self_id(&self) -> RecipientId {
        self.self_id
    }

    /// Number of stored records across all threads.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of cursors opened so far.
    pub fn cursors_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of cursors dropped so far.
    pub fn cursors_released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Earliest and latest `sent_at` of a thread, if it has records.
    pub fn thread_date_range(&self, thread_id: ThreadId) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut sent = self
            .messages
            .iter()
            .filter(|r| r.thread_id == thread_id)
            .map(|r| r.sent_at);
        let first = sent.next()?;
        Some(sent.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts))))
    }
}

/// Cursor over a pre-sorted selection. Counts its own release.
struct StoreCursor<'a> {
    records: std::vec::IntoIter<MessageRecord>,
    released: &'a AtomicUsize,
}

impl Iterator for StoreCursor<'_> {
    type Item = MessageRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl Drop for StoreCursor<'_> {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl ConversationLoader for MemoryStore {
    fn open(
        &self,
        thread_id: ThreadId,
        window: &ExportWindow,
    ) -> Result<Box<dyn RecordCursor + '_>> {
        let mut selected: Vec<MessageRecord> = self
            .messages
            .iter()
            .filter(|r| r.thread_id == thread_id && window.contains(r.sent_at))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then(b.id.cmp(&a.id)));

        debug!(thread = thread_id, records = selected.len(), "opening cursor");
        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(StoreCursor {
            records: selected.into_iter(),
            released: &self.released,
        }))
    }

    fn quoted_timestamp(&self, thread_id: ThreadId, message_id: MessageId) -> Option<DateTime<Utc>> {
        self.messages
            .iter()
            .find(|r| r.thread_id == thread_id && r.id == message_id)
            .map(|r| r.sent_at)
    }
}

impl AttachmentLookup for MemoryStore {
    fn attachment(&self, id: AttachmentId) -> Option<Attachment> {
        self.attachments.get(&id).cloned()
    }
}

impl ParticipantResolver for MemoryStore {
    fn participant(&self, id: RecipientId) -> Option<Participant> {
        self.participants.get(&id).cloned()
    }

    fn self_participant(&self) -> Option<Participant> {
        self.participants.get(&self.self_id).cloned()
    }

    fn thread_recipient(&self, thread_id: ThreadId) -> Option<ThreadRecipient> {
        self.threads.get(&thread_id).cloned()
    }
}
