//! JSON conversation snapshots.
//!
//! A snapshot is one JSON object holding everything an export reads:
//!
//! ```json
//! {
//!   "self_id": 1,
//!   "participants": [{"id": 1, "display_name": "Me", "is_self": true}],
//!   "threads": [{"id": 7, "recipient": {"kind": "direct", "recipient_id": 2}}],
//!   "attachments": [],
//!   "messages": [{"id": 1, "thread_id": 7, "sender_id": 2,
//!                 "sent_at": "2024-01-01T10:00:00Z", "received_at": "2024-01-01T10:00:00Z",
//!                 "facets": ["push"], "body": "Hi"}]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::MemoryStore;
use crate::error::{ExportError, Result};
use crate::model::{Attachment, MessageRecord, Participant, RecipientId, ThreadId, ThreadRecipient};

/// Serialized form of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub self_id: RecipientId,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub threads: Vec<SnapshotThread>,
    /// Attachment metadata for link-preview thumbnails.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotThread {
    pub id: ThreadId,
    pub recipient: ThreadRecipient,
}

impl MemoryStore {
    /// Builds a store from a parsed snapshot.
    ///
    /// Fails with [`ExportError::InvalidFormat`] if the self participant is
    /// not among the participants.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        if !snapshot.participants.iter().any(|p| p.id == snapshot.self_id) {
            return Err(ExportError::invalid_format(
                "snapshot",
                format!("self participant {} is not listed", snapshot.self_id),
            ));
        }

        let store = snapshot.participants.into_iter().fold(
            MemoryStore::new(snapshot.self_id),
            MemoryStore::with_participant,
        );
        let store = snapshot
            .threads
            .into_iter()
            .fold(store, |s, t| s.with_thread(t.id, t.recipient));
        let store = snapshot
            .attachments
            .into_iter()
            .fold(store, MemoryStore::with_attachment);
        Ok(snapshot
            .messages
            .into_iter()
            .fold(store, MemoryStore::with_message))
    }

    /// Parses a snapshot from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(content).map_err(|e| ExportError::snapshot(e, None))?;
        Self::from_snapshot(snapshot)
    }

    /// Reads and parses a snapshot file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| ExportError::snapshot(e, Some(path.to_path_buf())))?;

        info!(
            path = %path.display(),
            participants = snapshot.participants.len(),
            messages = snapshot.messages.len(),
            "loaded snapshot"
        );
        Self::from_snapshot(snapshot)
    }
}
