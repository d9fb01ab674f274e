//! Media reference collection.
//!
//! While the document is assembled, every attachment that has a local
//! payload is recorded in the [`MediaManifest`] under its content key, and
//! every payload that lives elsewhere is recorded in the [`AuxFileManifest`].
//! A packaging stage later copies the referenced files next to the
//! document, at the `content_path` written into the markup.
//!
//! Both manifests are ordered maps. Recording a key twice keeps the last
//! entry; the number of such overwrites is reported in the export stats.
//!
//! # Example
//!
//! ```
//! use chatexport::core::media::{MediaCollector, MediaOrigin, MediaPlacement};
//! use chatexport::model::Attachment;
//! use chrono::{TimeZone, Utc};
//!
//! let origin = MediaOrigin {
//!     recipient_id: 2,
//!     thread_id: 7,
//!     date: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
//!     outgoing: false,
//! };
//! let photo = Attachment::new(1, "image/jpeg")
//!     .with_key("k1")
//!     .with_data("store://parts/part42");
//!
//! let mut collector = MediaCollector::new();
//! let placement = collector.collect(&photo, &origin);
//!
//! assert_eq!(placement.content_path(), "media/images/1700000000000-part42.jpg");
//! let (media, aux) = collector.into_manifests();
//! assert!(media.contains_key("k1"));
//! assert!(aux.is_empty());
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::model::{Attachment, AttachmentId, RecipientId, ThreadId};

/// A media payload the packaging stage must copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaManifestEntry {
    pub key: String,
    pub attachment_id: AttachmentId,
    pub data_ref: String,
    pub recipient_id: RecipientId,
    pub thread_id: ThreadId,
    pub date: DateTime<Utc>,
    pub outgoing: bool,
    pub content_type: String,
    pub generated_path: String,
}

/// A file outside local storage, referenced by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuxFileEntry {
    pub key: String,
    pub raw_reference: String,
}

/// Content key -> media entry.
pub type MediaManifest = BTreeMap<String, MediaManifestEntry>;

/// Key -> raw external reference.
pub type AuxFileManifest = BTreeMap<String, String>;

/// Turns an aux manifest into flat entries, in key order.
pub fn aux_entries(manifest: &AuxFileManifest) -> Vec<AuxFileEntry> {
    manifest
        .iter()
        .map(|(key, raw_reference)| AuxFileEntry {
            key: key.clone(),
            raw_reference: raw_reference.clone(),
        })
        .collect()
}

/// Where an attachment's payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaOrigin {
    pub recipient_id: RecipientId,
    pub thread_id: ThreadId,
    /// Timestamp used in the generated file name.
    pub date: DateTime<Utc>,
    pub outgoing: bool,
}

/// Outcome of [`MediaCollector::collect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPlacement {
    /// The payload was never downloaded.
    NotDownloaded,
    /// Recorded in the media manifest.
    Stored { path: String },
    /// Recorded in the aux manifest under the attachment key.
    External,
    /// Marked as downloaded but nothing references the payload.
    Missing,
}

impl MediaPlacement {
    /// Value of the `content_path` element; empty unless stored.
    pub fn content_path(&self) -> &str {
        match self {
            MediaPlacement::Stored { path } => path,
            _ => "",
        }
    }

    /// Value of the `downloaded` attribute, if one is written.
    pub fn downloaded_attr(&self) -> Option<&'static str> {
        match self {
            MediaPlacement::NotDownloaded => Some("false"),
            _ => None,
        }
    }
}

/// Accumulates both manifests for one export.
#[derive(Debug, Default)]
pub struct MediaCollector {
    media: MediaManifest,
    aux: AuxFileManifest,
    overwrites: usize,
}

impl MediaCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places one attachment and records it in the matching manifest.
    pub fn collect(&mut self, attachment: &Attachment, origin: &MediaOrigin) -> MediaPlacement {
        if !attachment.has_data {
            return MediaPlacement::NotDownloaded;
        }

        let key = attachment.dedup_key();

        if let Some(data_ref) = attachment.data_ref.as_deref() {
            let path = content_path(&attachment.content_type, origin.date, data_ref);
            let entry = MediaManifestEntry {
                key: key.clone(),
                attachment_id: attachment.id,
                data_ref: data_ref.to_string(),
                recipient_id: origin.recipient_id,
                thread_id: origin.thread_id,
                date: origin.date,
                outgoing: origin.outgoing,
                content_type: attachment.content_type.clone(),
                generated_path: path.clone(),
            };
            self.record_media(key, entry);
            return MediaPlacement::Stored { path };
        }

        if let Some(external) = attachment.external_ref.as_deref() {
            self.record_aux(key, external);
            return MediaPlacement::External;
        }

        debug!(attachment = attachment.id, "attachment has data but no reference");
        MediaPlacement::Missing
    }

    /// Inserts a media entry. The last write for a key wins; the replaced
    /// entry is returned.
    pub fn record_media(
        &mut self,
        key: impl Into<String>,
        entry: MediaManifestEntry,
    ) -> Option<MediaManifestEntry> {
        let key = key.into();
        let previous = self.media.insert(key.clone(), entry);
        if previous.is_some() {
            self.overwrites += 1;
            debug!(key = %key, "media entry replaced");
        }
        previous
    }

    /// Inserts an aux entry. The last write for a key wins.
    pub fn record_aux(
        &mut self,
        key: impl Into<String>,
        raw_reference: impl Into<String>,
    ) -> Option<String> {
        self.aux.insert(key.into(), raw_reference.into())
    }

    pub fn media(&self) -> &MediaManifest {
        &self.media
    }

    pub fn aux(&self) -> &AuxFileManifest {
        &self.aux
    }

    /// Number of media keys recorded more than once.
    pub fn overwrites(&self) -> usize {
        self.overwrites
    }

    /// Moves every entry of `other` into `self`, in `other`'s key order.
    ///
    /// Used to commit the entries of one message only once its body has
    /// rendered successfully.
    pub fn absorb(&mut self, other: MediaCollector) {
        self.overwrites += other.overwrites;
        for (key, entry) in other.media {
            self.record_media(key, entry);
        }
        self.aux.extend(other.aux);
    }

    /// Hands both manifests off.
    pub fn into_manifests(self) -> (MediaManifest, AuxFileManifest) {
        (self.media, self.aux)
    }
}

// ============================================================================
// Content paths
// ============================================================================

/// Directory inside the archive for a content type.
pub fn media_dir(content_type: &str) -> &'static str {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.starts_with("image/") {
        "media/images/"
    } else if content_type.starts_with("video/") {
        "media/videos/"
    } else if content_type.starts_with("audio/") {
        "media/audio/"
    } else {
        "media/documents/"
    }
}

/// File extension for well-known content types.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let ext = match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" => "heic",
        "video/mp4" => "mp4",
        "video/3gpp" => "3gp",
        "video/quicktime" => "mov",
        "video/webm" => "webm",
        "audio/aac" => "aac",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/mp4" => "m4a",
        "application/pdf" => "pdf",
        "application/zip" => "zip",
        "text/plain" => "txt",
        "text/x-vcard" | "text/vcard" => "vcf",
        _ => return None,
    };
    Some(ext)
}

/// Last path segment of a reference, ignoring query and fragment.
pub fn last_segment(reference: &str) -> &str {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("file")
}

/// Path component of a reference URI (`content://contacts/photo/7` ->
/// `/photo/7`). References without a scheme are returned unchanged.
pub fn reference_path(reference: &str) -> &str {
    match reference.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |slash| &rest[slash..]),
        None => reference,
    }
}

/// Archive path for a payload: `<dir><millis>-<segment>[.<ext>]`.
///
/// Deterministic in its three inputs.
pub fn content_path(content_type: &str, timestamp: DateTime<Utc>, data_ref: &str) -> String {
    let segment = last_segment(data_ref);
    let mut name = format!("{}-{}", timestamp.timestamp_millis(), segment);
    if !segment.contains('.') {
        if let Some(ext) = extension_for(content_type) {
            name.push('.');
            name.push_str(ext);
        }
    }
    format!("{}{}", media_dir(content_type), name)
}
