//! Snapshot types for one export run.
//!
//! Every type here is an immutable snapshot handed to the exporter by its
//! collaborators. The exporter never mutates them; it only reads them while
//! building the document.
//!
//! # Overview
//!
//! - [`MessageRecord`] - one stored message, with its classification facets
//! - [`Participant`] - recipient metadata
//! - [`ThreadRecipient`] - who a thread talks to (one person or a group)
//! - [`Attachment`], [`Quote`], [`Reaction`], [`Mention`], [`SharedContact`],
//!   [`LinkPreview`] - message body parts
//!
//! # Example
//!
//! ```
//! use chatexport::model::{Direction, Facet, MessageRecord};
//! use chrono::{TimeZone, Utc};
//!
//! let sent = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
//! let msg = MessageRecord::new(1, 7, 2, sent)
//!     .with_direction(Direction::Outgoing)
//!     .with_facet(Facet::Push)
//!     .with_body("Hello");
//!
//! assert!(msg.is_outgoing());
//! assert!(msg.has(Facet::Push));
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message identifier.
pub type MessageId = u64;
/// Thread (conversation) identifier.
pub type ThreadId = u64;
/// Recipient identifier.
pub type RecipientId = u64;
/// Attachment identifier.
pub type AttachmentId = u64;

/// Whether a message was received or sent by the exporting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Incoming,
    Outgoing,
}

/// A boolean classification input carried by a [`MessageRecord`].
///
/// Several facets may be set at once. The classifier decides which one
/// wins; see [`classify`](crate::core::classify::classify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    KeyExchange,
    EndSession,
    Joined,
    IncomingAudioCall,
    IncomingVideoCall,
    OutgoingAudioCall,
    OutgoingVideoCall,
    MissedAudioCall,
    MissedVideoCall,
    GroupCall,
    VerificationStatusChange,
    ProfileChange,
    PendingInsecureSmsFallback,
    Pending,
    Failed,
    ForcedSms,
    IdentityUpdate,
    IdentityDefault,
    IdentityVerified,
    BundleKeyExchange,
    ContentBundleKeyExchange,
    CorruptedKeyExchange,
    InvalidVersionKeyExchange,
    GroupV1Migration,
    FailedDecryption,
    ExpirationTimerUpdate,
    SelfCreatedGroup,
    GroupUpdate,
    GroupQuit,
    GroupAction,
    CallLog,
    Update,
    GroupV2,
    Push,
    Sent,
    Delivered,
    RemoteRead,
}

/// One stored message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: MessageId,
    pub thread_id: ThreadId,
    /// Individual author. For outgoing messages this is normally the self
    /// participant, but the exporter attributes outgoing turns to self
    /// regardless.
    pub sender_id: RecipientId,
    pub sent_at: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub facets: BTreeSet<Facet>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub quote: Option<Quote>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    #[serde(default)]
    pub shared_contacts: Vec<SharedContact>,
    #[serde(default)]
    pub link_previews: Vec<LinkPreview>,
    /// Disappearing-message timer in milliseconds, `0` when disabled.
    #[serde(default)]
    pub expires_in_ms: u64,
    #[serde(default)]
    pub mismatched_identities: Vec<RecipientId>,
    #[serde(default)]
    pub is_remote_deleted: bool,
    #[serde(default)]
    pub is_view_once: bool,
    /// Localized static description for update and call events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_text: Option<String>,
}

impl MessageRecord {
    /// Creates an incoming message with an empty body and no facets.
    ///
    /// `received_at` defaults to `sent_at`.
    pub fn new(
        id: MessageId,
        thread_id: ThreadId,
        sender_id: RecipientId,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            thread_id,
            sender_id,
            sent_at,
            received_at: sent_at,
            direction: Direction::Incoming,
            facets: BTreeSet::new(),
            body: String::new(),
            attachments: Vec::new(),
            quote: None,
            reactions: Vec::new(),
            mentions: Vec::new(),
            shared_contacts: Vec::new(),
            link_previews: Vec::new(),
            expires_in_ms: 0,
            mismatched_identities: Vec::new(),
            is_remote_deleted: false,
            is_view_once: false,
            system_text: None,
        }
    }

    /// Returns `true` if the facet is set.
    pub fn has(&self, facet: Facet) -> bool {
        self.facets.contains(&facet)
    }

    pub fn is_outgoing(&self) -> bool {
        self.direction == Direction::Outgoing
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.insert(facet);
        self
    }

    #[must_use]
    pub fn with_facets(mut self, facets: impl IntoIterator<Item = Facet>) -> Self {
        self.facets.extend(facets);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    #[must_use]
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quote = Some(quote);
        self
    }

    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    #[must_use]
    pub fn with_mention(mut self, mention: Mention) -> Self {
        self.mentions.push(mention);
        self
    }

    #[must_use]
    pub fn with_shared_contact(mut self, contact: SharedContact) -> Self {
        self.shared_contacts.push(contact);
        self
    }

    #[must_use]
    pub fn with_link_preview(mut self, preview: LinkPreview) -> Self {
        self.link_previews.push(preview);
        self
    }

    #[must_use]
    pub fn with_expires_in_ms(mut self, expires_in_ms: u64) -> Self {
        self.expires_in_ms = expires_in_ms;
        self
    }

    #[must_use]
    pub fn with_mismatched_identity(mut self, recipient: RecipientId) -> Self {
        self.mismatched_identities.push(recipient);
        self
    }

    #[must_use]
    pub fn remote_deleted(mut self) -> Self {
        self.is_remote_deleted = true;
        self
    }

    #[must_use]
    pub fn view_once(mut self) -> Self {
        self.is_view_once = true;
        self
    }

    #[must_use]
    pub fn with_system_text(mut self, text: impl Into<String>) -> Self {
        self.system_text = Some(text.into());
        self
    }
}

/// A person's profile name as they set it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileName {
    pub given_name: String,
    #[serde(default)]
    pub family_name: Option<String>,
}

impl ProfileName {
    /// Given and family name joined by a space.
    pub fn full_name(&self) -> String {
        match self.family_name.as_deref() {
            Some(family) if !family.is_empty() => format!("{} {}", self.given_name, family),
            _ => self.given_name.clone(),
        }
    }
}

/// How the exporting user relates to a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The exporting user.
    Myself,
    SystemContact,
    Blocked,
}

impl Relation {
    /// Returns the value written into the `relation` element.
    pub fn tag(&self) -> &'static str {
        match self {
            Relation::Myself => "self",
            Relation::SystemContact => "system_contact",
            Relation::Blocked => "blocked",
        }
    }
}

/// Recipient metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: RecipientId,
    pub display_name: String,
    #[serde(default)]
    pub profile_name: Option<ProfileName>,
    /// Set when the exporting user gave this person a custom name.
    #[serde(default)]
    pub user_set_display_name: bool,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub system_contact: bool,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default = "default_true")]
    pub registered: bool,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub about_emoji: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Raw reference to the system-contact photo.
    #[serde(default)]
    pub photo_ref: Option<String>,
    /// Raw reference to the system-contact entry.
    #[serde(default)]
    pub contact_ref: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Participant {
    /// Creates a registered participant with nothing but a display name.
    pub fn new(id: RecipientId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            profile_name: None,
            user_set_display_name: false,
            is_self: false,
            system_contact: false,
            blocked: false,
            registered: true,
            about: None,
            about_emoji: None,
            email: None,
            phone: None,
            photo_ref: None,
            contact_ref: None,
        }
    }

    /// Name used as the `author` of turns and quotes.
    ///
    /// Falls back to the display name when no profile given name is set.
    pub fn given_name(&self) -> &str {
        match &self.profile_name {
            Some(name) if !name.given_name.trim().is_empty() => &name.given_name,
            _ => &self.display_name,
        }
    }

    /// Collapses the relation flags with priority self > system contact > blocked.
    pub fn relation(&self) -> Option<Relation> {
        if self.is_self {
            Some(Relation::Myself)
        } else if self.system_contact {
            Some(Relation::SystemContact)
        } else if self.blocked {
            Some(Relation::Blocked)
        } else {
            None
        }
    }

    /// About text prefixed by its emoji, if any.
    pub fn combined_about(&self) -> Option<String> {
        match (self.about_emoji.as_deref(), self.about.as_deref()) {
            (Some(emoji), Some(about)) if !about.is_empty() => Some(format!("{emoji} {about}")),
            (None, Some(about)) if !about.is_empty() => Some(about.to_string()),
            (Some(emoji), _) if !emoji.is_empty() => Some(emoji.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn with_profile_name(mut self, given: impl Into<String>, family: Option<&str>) -> Self {
        self.profile_name = Some(ProfileName {
            given_name: given.into(),
            family_name: family.map(ToString::to_string),
        });
        self
    }

    #[must_use]
    pub fn myself(mut self) -> Self {
        self.is_self = true;
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// The other side of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThreadRecipient {
    Direct {
        recipient_id: RecipientId,
    },
    Group {
        group_id: String,
        title: String,
        members: Vec<RecipientId>,
    },
}

/// Sticker data of an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    pub sticker_id: u64,
    pub emoji: String,
    #[serde(default)]
    pub borderless: bool,
}

/// Shared location of an attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: String,
}

/// Broad media category of an attachment, used for the `metadata` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Audio,
    Video,
    Location,
    Sticker,
    Image,
    Document,
    Unknown,
}

/// Attachment metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    #[serde(default)]
    pub file_name: Option<String>,
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub duration_sec: Option<u64>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Stable content key used for media deduplication.
    #[serde(default)]
    pub key: String,
    /// Reference to the locally stored payload.
    #[serde(default)]
    pub data_ref: Option<String>,
    /// Reference to a payload that lives outside local storage.
    #[serde(default)]
    pub external_ref: Option<String>,
    #[serde(default)]
    pub has_data: bool,
    #[serde(default)]
    pub voice_note: bool,
    #[serde(default)]
    pub upload_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sticker: Option<Sticker>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub video_edited: bool,
    #[serde(default)]
    pub video_trimmed: bool,
}

impl Attachment {
    /// Creates an attachment without local data.
    pub fn new(id: AttachmentId, content_type: impl Into<String>) -> Self {
        Self {
            id,
            file_name: None,
            content_type: content_type.into(),
            size: 0,
            width: None,
            height: None,
            duration_sec: None,
            caption: None,
            key: String::new(),
            data_ref: None,
            external_ref: None,
            has_data: false,
            voice_note: false,
            upload_timestamp: None,
            sticker: None,
            location: None,
            video_edited: false,
            video_trimmed: false,
        }
    }

    /// Key used in the media and auxiliary manifests.
    ///
    /// Attachments stored without a content key fall back to their id.
    pub fn dedup_key(&self) -> String {
        if self.key.is_empty() {
            format!("attachment-{}", self.id)
        } else {
            self.key.clone()
        }
    }

    /// Classifies the attachment for metadata rendering.
    ///
    /// Order: audio, video, location, sticker, image, document, unknown.
    pub fn kind(&self) -> AttachmentKind {
        let content_type = self.content_type.to_ascii_lowercase();
        if content_type.starts_with("audio/") {
            AttachmentKind::Audio
        } else if content_type.starts_with("video/") {
            AttachmentKind::Video
        } else if self.location.is_some() {
            AttachmentKind::Location
        } else if self.sticker.is_some() {
            AttachmentKind::Sticker
        } else if content_type.starts_with("image/") {
            AttachmentKind::Image
        } else if content_type.starts_with("application/") || content_type.starts_with("text/") {
            AttachmentKind::Document
        } else {
            AttachmentKind::Unknown
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Marks the payload as locally available under `data_ref`.
    #[must_use]
    pub fn with_data(mut self, data_ref: impl Into<String>) -> Self {
        self.has_data = true;
        self.data_ref = Some(data_ref.into());
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_upload_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.upload_timestamp = Some(ts);
        self
    }
}

/// A reply's abbreviated rendering of the message it responds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Id of the quoted message.
    pub id: MessageId,
    pub author_id: RecipientId,
    #[serde(default)]
    pub display_text: Option<String>,
    #[serde(default)]
    pub original_missing: bool,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub author_id: RecipientId,
    pub emoji: String,
    pub received_at: DateTime<Utc>,
}

/// A mention placeholder inside a message body.
///
/// `start` and `length` count characters of the stored body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub recipient_id: RecipientId,
    pub start: usize,
    pub length: usize,
}

/// Label category of a shared-contact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactFieldType {
    #[default]
    Home,
    Mobile,
    Work,
    Custom,
}

impl ContactFieldType {
    pub fn name(&self) -> &'static str {
        match self {
            ContactFieldType::Home => "HOME",
            ContactFieldType::Mobile => "MOBILE",
            ContactFieldType::Work => "WORK",
            ContactFieldType::Custom => "CUSTOM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEmail {
    #[serde(default, rename = "type")]
    pub kind: ContactFieldType,
    #[serde(default)]
    pub label: Option<String>,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPhone {
    #[serde(default, rename = "type")]
    pub kind: ContactFieldType,
    #[serde(default)]
    pub label: Option<String>,
    pub number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(default, rename = "type")]
    pub kind: ContactFieldType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub po_box: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// A contact card shared inside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedContact {
    pub display_name: String,
    #[serde(default)]
    pub emails: Vec<ContactEmail>,
    #[serde(default)]
    pub phones: Vec<ContactPhone>,
    #[serde(default)]
    pub postal_addresses: Vec<PostalAddress>,
}

/// A rendered preview of a URL contained in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPreview {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Thumbnail attachment, resolved through
    /// [`AttachmentLookup`](crate::loader::AttachmentLookup).
    #[serde(default)]
    pub attachment_id: Option<AttachmentId>,
}
