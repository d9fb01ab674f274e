//! Message classification.
//!
//! Every [`MessageRecord`] carries a set of [`Facet`]s. Several may be set at
//! once (an outgoing message is usually also `Sent`), so classification walks
//! one ordered table of `(predicate, tag)` pairs and returns the first match.
//! The same table drives [`document_shape`], so the two can never disagree.
//!
//! # Example
//!
//! ```
//! use chatexport::core::classify::{classify, document_shape, DocumentShape, Tag};
//! use chatexport::model::{Direction, Facet, MessageRecord};
//! use chrono::Utc;
//!
//! let record = MessageRecord::new(1, 1, 1, Utc::now())
//!     .with_direction(Direction::Outgoing)
//!     .with_facet(Facet::Sent);
//!
//! assert_eq!(classify(&record), Tag::Outgoing);
//! assert_eq!(classify(&record).wire_name(), "OUTGOING");
//! assert_eq!(document_shape(&record), DocumentShape::Text);
//! ```

use std::fmt;

use crate::model::{Facet, MessageRecord};

/// Kind of a call event message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    IncomingAudio,
    IncomingVideo,
    OutgoingAudio,
    OutgoingVideo,
    MissedAudio,
}

/// The single classification of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    KeyExchange,
    EndSession,
    Joined,
    CallEvent(CallKind),
    VerificationChange,
    ProfileChange,
    PendingInsecureFallback,
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
    Outgoing,
    Sent,
    Unknown,
}

/// Coarse body layout selected by a [`Tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentShape {
    /// User-authored content: the message text is rendered.
    Text,
    /// A call log entry: `text{type, msg_type, system_message?}`.
    CallLog,
    /// Any other event: `text{msg_type, system_message?}`.
    System,
}

/// Test applied to a record while walking [`PRECEDENCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Predicate {
    Has(Facet),
    Outgoing,
}

impl Predicate {
    fn matches(self, record: &MessageRecord) -> bool {
        match self {
            Predicate::Has(facet) => record.has(facet),
            Predicate::Outgoing => record.is_outgoing(),
        }
    }
}

/// Classification order. The first matching row wins.
const PRECEDENCE: &[(Predicate, Tag)] = &[
    (Predicate::Has(Facet::KeyExchange), Tag::KeyExchange),
    (Predicate::Has(Facet::EndSession), Tag::EndSession),
    (Predicate::Has(Facet::Joined), Tag::Joined),
    (
        Predicate::Has(Facet::IncomingAudioCall),
        Tag::CallEvent(CallKind::IncomingAudio),
    ),
    (
        Predicate::Has(Facet::IncomingVideoCall),
        Tag::CallEvent(CallKind::IncomingVideo),
    ),
    (
        Predicate::Has(Facet::OutgoingAudioCall),
        Tag::CallEvent(CallKind::OutgoingAudio),
    ),
    (
        Predicate::Has(Facet::OutgoingVideoCall),
        Tag::CallEvent(CallKind::OutgoingVideo),
    ),
    (
        Predicate::Has(Facet::MissedAudioCall),
        Tag::CallEvent(CallKind::MissedAudio),
    ),
    (
        Predicate::Has(Facet::VerificationStatusChange),
        Tag::VerificationChange,
    ),
    (Predicate::Has(Facet::ProfileChange), Tag::ProfileChange),
    (
        Predicate::Has(Facet::PendingInsecureSmsFallback),
        Tag::PendingInsecureFallback,
    ),
    (Predicate::Has(Facet::Pending), Tag::Pending),
    (Predicate::Has(Facet::Failed), Tag::Failed),
    (Predicate::Has(Facet::ForcedSms), Tag::ForcedSms),
    (Predicate::Has(Facet::IdentityUpdate), Tag::IdentityUpdate),
    (Predicate::Has(Facet::IdentityDefault), Tag::IdentityDefault),
    (Predicate::Has(Facet::IdentityVerified), Tag::IdentityVerified),
    (Predicate::Has(Facet::BundleKeyExchange), Tag::BundleKeyExchange),
    (
        Predicate::Has(Facet::ContentBundleKeyExchange),
        Tag::ContentBundleKeyExchange,
    ),
    (
        Predicate::Has(Facet::CorruptedKeyExchange),
        Tag::CorruptedKeyExchange,
    ),
    (
        Predicate::Has(Facet::InvalidVersionKeyExchange),
        Tag::InvalidVersionKeyExchange,
    ),
    (Predicate::Has(Facet::GroupV1Migration), Tag::GroupV1Migration),
    (Predicate::Has(Facet::FailedDecryption), Tag::FailedDecryption),
    (
        Predicate::Has(Facet::ExpirationTimerUpdate),
        Tag::ExpirationTimerUpdate,
    ),
    (Predicate::Has(Facet::SelfCreatedGroup), Tag::SelfCreatedGroup),
    (Predicate::Has(Facet::GroupUpdate), Tag::GroupUpdate),
    (Predicate::Has(Facet::GroupQuit), Tag::GroupQuit),
    (Predicate::Has(Facet::GroupAction), Tag::GroupAction),
    (Predicate::Has(Facet::CallLog), Tag::CallLog),
    (Predicate::Has(Facet::Update), Tag::Update),
    (Predicate::Has(Facet::GroupV2), Tag::GroupV2),
    (Predicate::Has(Facet::Push), Tag::Push),
    (Predicate::Outgoing, Tag::Outgoing),
    (Predicate::Has(Facet::Sent), Tag::Sent),
];

/// Maps a record to exactly one [`Tag`].
pub fn classify(record: &MessageRecord) -> Tag {
    PRECEDENCE
        .iter()
        .find(|(predicate, _)| predicate.matches(record))
        .map_or(Tag::Unknown, |&(_, tag)| tag)
}

/// Body layout of a record, derived from [`classify`].
pub fn document_shape(record: &MessageRecord) -> DocumentShape {
    classify(record).shape()
}

impl Tag {
    /// Stable identifier written into `msg_type`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Tag::KeyExchange => "KEY_EXCHANGE",
            Tag::EndSession => "END_SESSION",
            Tag::Joined => "MEMBER_HAS_JOINED",
            Tag::CallEvent(CallKind::IncomingAudio) => "INCOMING_AUDIO_CALL",
            Tag::CallEvent(CallKind::IncomingVideo) => "INCOMING_VIDEO_CALL",
            Tag::CallEvent(CallKind::OutgoingAudio) => "OUTGOING_AUDIO_CALL",
            Tag::CallEvent(CallKind::OutgoingVideo) => "OUTGOING_VIDEO_CALL",
            Tag::CallEvent(CallKind::MissedAudio) => "IS_MISSED_AUDIO_CALL",
            Tag::VerificationChange => "VERIFICATION_STATUS_CHANGE",
            Tag::ProfileChange => "PROFILE_CHANGE",
            Tag::PendingInsecureFallback => "PENDING_INSECURE_SMS_FALLBACK",
            Tag::Pending => "PENDING",
            Tag::Failed => "FAILED",
            Tag::ForcedSms => "FORCED_SMS",
            Tag::IdentityUpdate => "IDENTITY_UPDATE",
            Tag::IdentityDefault => "IDENTITY_DEFAULT",
            Tag::IdentityVerified => "IDENTITY_VERIFIED",
            Tag::BundleKeyExchange => "BUNDLE_KEY_EXCHANGE",
            Tag::ContentBundleKeyExchange => "CONTENT_BUNDLE_KEY_ENCHANGE",
            Tag::CorruptedKeyExchange => "CORRUPTED_KEY_EXCHANGE",
            Tag::InvalidVersionKeyExchange => "INVALID_KEY_EXCHANGE",
            Tag::GroupV1Migration => "GROUP_V1_MIGRATION",
            Tag::FailedDecryption => "FAILED_DESCRIPTION",
            Tag::ExpirationTimerUpdate => "EXPIRATION_TIMER_UPDATE",
            Tag::SelfCreatedGroup => "SELF_CREATED_GROUP",
            Tag::GroupUpdate => "GROUP_UPDATE",
            Tag::GroupQuit => "GROUP_QUIT",
            Tag::GroupAction => "GROUP_ACTION",
            Tag::CallLog => "CALL_LOG",
            Tag::Update => "UPDATE",
            Tag::GroupV2 => "GROUP_V2",
            Tag::Push => "PUSH",
            Tag::Outgoing => "OUTGOING",
            Tag::Sent => "SENT",
            Tag::Unknown => "UNKNOWN",
        }
    }

    pub fn shape(&self) -> DocumentShape {
        match self {
            Tag::Outgoing | Tag::Push => DocumentShape::Text,
            Tag::CallLog => DocumentShape::CallLog,
            _ => DocumentShape::System,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Human-readable label for a call log entry, written into `text[type]`.
pub fn call_label(record: &MessageRecord) -> &'static str {
    const LABELS: &[(Facet, &str)] = &[
        (Facet::GroupCall, "GROUP CALL"),
        (Facet::IncomingAudioCall, "INCOMING AUDIO CALL"),
        (Facet::IncomingVideoCall, "INCOMING VIDEO CALL"),
        (Facet::MissedAudioCall, "MISSED AUDIO CALL"),
        (Facet::MissedVideoCall, "MISSED VIDEO CALL"),
        (Facet::OutgoingAudioCall, "OUTGOING AUDIO CALL"),
        (Facet::OutgoingVideoCall, "OUTGOING VIDEO CALL"),
    ];

    LABELS
        .iter()
        .find(|(facet, _)| record.has(*facet))
        .map_or("UNKNOWN", |&(_, label)| label)
}

/// Delivery state of an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    Read,
    Delivered,
    Sent,
    Pending,
    Unknown,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Read => "READ",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most advanced delivery state: read > delivered > sent > pending.
pub fn delivery_status(record: &MessageRecord) -> DeliveryStatus {
    if record.has(Facet::RemoteRead) {
        DeliveryStatus::Read
    } else if record.has(Facet::Delivered) {
        DeliveryStatus::Delivered
    } else if record.has(Facet::Sent) {
        DeliveryStatus::Sent
    } else if record.has(Facet::Pending) {
        DeliveryStatus::Pending
    } else {
        DeliveryStatus::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;
    use chrono::{TimeZone, Utc};

    fn record() -> MessageRecord {
        MessageRecord::new(1, 1, 2, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
    }

    fn table_facets() -> Vec<Facet> {
        PRECEDENCE
            .iter()
            .filter_map(|(predicate, _)| match predicate {
                Predicate::Has(facet) => Some(*facet),
                Predicate::Outgoing => None,
            })
            .collect()
    }

    #[test]
    fn test_no_facets_is_unknown() {
        assert_eq!(classify(&record()), Tag::Unknown);
        assert_eq!(document_shape(&record()), DocumentShape::System);
    }

    #[test]
    fn test_outgoing_beats_sent() {
        let r = record()
            .with_direction(Direction::Outgoing)
            .with_facet(Facet::Sent);
        assert_eq!(classify(&r), Tag::Outgoing);
    }

    #[test]
    fn test_sent_without_outgoing() {
        let r = record().with_facet(Facet::Sent);
        assert_eq!(classify(&r), Tag::Sent);
    }

    #[test]
    fn test_every_facet_alone_maps_to_its_row() {
        for (predicate, tag) in PRECEDENCE {
            let r = match predicate {
                Predicate::Has(facet) => record().with_facet(*facet),
                Predicate::Outgoing => record().with_direction(Direction::Outgoing),
            };
            assert_eq!(classify(&r), *tag, "{predicate:?}");
        }
    }

    #[test]
    fn test_pairwise_earlier_row_wins() {
        let facets = table_facets();
        for (i, earlier) in facets.iter().enumerate() {
            for later in &facets[i + 1..] {
                let r = record().with_facet(*earlier).with_facet(*later);
                let expected = classify(&record().with_facet(*earlier));
                assert_eq!(classify(&r), expected, "{earlier:?} vs {later:?}");
            }
        }
    }

    #[test]
    fn test_push_beats_outgoing() {
        let r = record()
            .with_direction(Direction::Outgoing)
            .with_facet(Facet::Push);
        assert_eq!(classify(&r), Tag::Push);
        assert_eq!(document_shape(&r), DocumentShape::Text);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(
            document_shape(&record().with_facet(Facet::CallLog)),
            DocumentShape::CallLog
        );
        assert_eq!(
            document_shape(&record().with_facet(Facet::IncomingAudioCall)),
            DocumentShape::System
        );
        assert_eq!(
            document_shape(&record().with_facet(Facet::GroupUpdate)),
            DocumentShape::System
        );
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(Tag::Joined.wire_name(), "MEMBER_HAS_JOINED");
        assert_eq!(
            Tag::CallEvent(CallKind::IncomingAudio).to_string(),
            "INCOMING_AUDIO_CALL"
        );
        assert_eq!(Tag::FailedDecryption.wire_name(), "FAILED_DESCRIPTION");
        assert_eq!(
            Tag::CallEvent(CallKind::MissedAudio).wire_name(),
            "IS_MISSED_AUDIO_CALL"
        );
        assert_eq!(
            Tag::ContentBundleKeyExchange.wire_name(),
            "CONTENT_BUNDLE_KEY_ENCHANGE"
        );
        assert_eq!(Tag::InvalidVersionKeyExchange.wire_name(), "INVALID_KEY_EXCHANGE");
    }

    #[test]
    fn test_call_label_order() {
        let r = record()
            .with_facet(Facet::CallLog)
            .with_facet(Facet::GroupCall)
            .with_facet(Facet::IncomingAudioCall);
        assert_eq!(call_label(&r), "GROUP CALL");

        let r = record()
            .with_facet(Facet::MissedVideoCall)
            .with_facet(Facet::OutgoingAudioCall);
        assert_eq!(call_label(&r), "MISSED VIDEO CALL");

        assert_eq!(call_label(&record()), "UNKNOWN");
    }

    #[test]
    fn test_delivery_status_order() {
        let r = record()
            .with_facet(Facet::Pending)
            .with_facet(Facet::Sent)
            .with_facet(Facet::Delivered);
        assert_eq!(delivery_status(&r), DeliveryStatus::Delivered);

        let r = r.with_facet(Facet::RemoteRead);
        assert_eq!(delivery_status(&r).to_string(), "READ");

        assert_eq!(delivery_status(&record()), DeliveryStatus::Unknown);
    }
}
