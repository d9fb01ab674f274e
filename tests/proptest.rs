//! Property-based tests for chatexport.
//!
//! These tests generate random records and bodies to find edge cases.

use proptest::prelude::*;

use chatexport::config::ExportConfig;
use chatexport::core::classify::{DocumentShape, Tag, classify, document_shape};
use chatexport::core::codec::{decode, escape};
use chatexport::core::mentions::substitute_display_names;
use chatexport::document::day_groups;
use chatexport::model::{Direction, Facet, Mention, MessageRecord};
use chrono::{TimeZone, Utc};

const ALL_FACETS: &[Facet] = &[
    Facet::KeyExchange,
    Facet::EndSession,
    Facet::Joined,
    Facet::IncomingAudioCall,
    Facet::IncomingVideoCall,
    Facet::OutgoingAudioCall,
    Facet::OutgoingVideoCall,
    Facet::MissedAudioCall,
    Facet::MissedVideoCall,
    Facet::GroupCall,
    Facet::VerificationStatusChange,
    Facet::ProfileChange,
    Facet::PendingInsecureSmsFallback,
    Facet::Pending,
    Facet::Failed,
    Facet::ForcedSms,
    Facet::IdentityUpdate,
    Facet::IdentityDefault,
    Facet::IdentityVerified,
    Facet::BundleKeyExchange,
    Facet::ContentBundleKeyExchange,
    Facet::CorruptedKeyExchange,
    Facet::InvalidVersionKeyExchange,
    Facet::GroupV1Migration,
    Facet::FailedDecryption,
    Facet::ExpirationTimerUpdate,
    Facet::SelfCreatedGroup,
    Facet::GroupUpdate,
    Facet::GroupQuit,
    Facet::GroupAction,
    Facet::CallLog,
    Facet::Update,
    Facet::GroupV2,
    Facet::Push,
    Facet::Sent,
    Facet::Delivered,
    Facet::RemoteRead,
];

/// Random facet set and direction on an otherwise empty record
fn arb_record() -> impl Strategy<Value = MessageRecord> {
    (
        prop::collection::vec(prop::sample::select(ALL_FACETS.to_vec()), 0..6),
        any::<bool>(),
    )
        .prop_map(|(facets, outgoing)| {
            let direction = if outgoing {
                Direction::Outgoing
            } else {
                Direction::Incoming
            };
            MessageRecord::new(1, 1, 1, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
                .with_direction(direction)
                .with_facets(facets)
        })
}

/// Bodies heavy on markup-significant characters
fn arb_body() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "Hello", "<", ">", "&", "\"", "'", "=", "SGVsbG8=", "PGI+", "Привет", "🔥", " ",
            "&amp;", "\n",
        ]),
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

/// Ascending timestamps spread over about a week
fn arb_timestamps(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..7 * 86_400, 0..max_len).prop_map(|mut secs| {
        secs.sort_unstable();
        secs
    })
}

fn has_raw_markup(s: &str) -> bool {
    // every '&' must start one of the five entities
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        let tail = &rest[pos..];
        if !["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"]
            .iter()
            .any(|e| tail.starts_with(e))
        {
            return true;
        }
        rest = &rest[pos + 1..];
    }
    s.contains(['<', '>', '"', '\''])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ============================================
    // CLASSIFICATION PROPERTIES
    // ============================================

    /// Shape always follows the tag
    #[test]
    fn shape_consistent_with_tag(record in arb_record()) {
        let tag = classify(&record);
        prop_assert_eq!(document_shape(&record), tag.shape());
    }

    /// Only the explicit call-log facet produces a call-log shape
    #[test]
    fn call_log_shape_requires_call_log_facet(record in arb_record()) {
        if document_shape(&record) == DocumentShape::CallLog {
            prop_assert!(record.has(Facet::CallLog));
        }
    }

    /// Unknown only when nothing matched
    #[test]
    fn unknown_only_without_signals(record in arb_record()) {
        if classify(&record) == Tag::Unknown {
            prop_assert!(!record.is_outgoing());
            prop_assert!(!record.has(Facet::Push));
            prop_assert!(!record.has(Facet::Sent));
        }
    }

    /// Delivery facets never change the tag
    #[test]
    fn delivery_facets_do_not_reclassify(record in arb_record()) {
        let before = classify(&record);
        let after = classify(&record.clone().with_facets([Facet::Delivered, Facet::RemoteRead]));
        prop_assert_eq!(before, after);
    }

    // ============================================
    // CODEC PROPERTIES
    // ============================================

    /// Escaped text never contains raw markup
    #[test]
    fn escape_never_leaks_markup(body in arb_body()) {
        prop_assert!(!has_raw_markup(&escape(&body)));
    }

    /// Decoded display text never contains raw markup
    #[test]
    fn decode_never_leaks_markup(body in arb_body()) {
        if let Some(text) = decode(&body) {
            prop_assert!(!has_raw_markup(text.as_str()));
        } else {
            prop_assert!(body.is_empty());
        }
    }

    /// Bodies that do not end in '=' are only escaped
    #[test]
    fn plain_bodies_are_escaped_verbatim(body in arb_body()) {
        prop_assume!(!body.is_empty() && !body.ends_with('='));
        prop_assert_eq!(decode(&body).unwrap().into_inner(), escape(&body));
    }

    /// Arbitrary strings never panic
    #[test]
    fn decode_never_panics(body in ".{0,40}") {
        let _ = decode(&body);
    }

    // ============================================
    // DAY GROUPING PROPERTIES
    // ============================================

    /// Groups partition the kept records in order
    #[test]
    fn day_groups_preserve_order(secs in arb_timestamps(40), offset in -720i32..=840) {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records: Vec<MessageRecord> = secs
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let record = MessageRecord::new(i as u64, 1, 1, base + chrono::Duration::seconds(*s));
                if i % 7 == 3 { record.view_once() } else { record }
            })
            .collect();
        let config = ExportConfig::new().with_utc_offset_minutes(offset);

        let groups = day_groups(&records, &config);
        let flattened: Vec<u64> = groups.iter().flat_map(|g| g.records.iter().map(|r| r.id)).collect();
        let expected: Vec<u64> = records.iter().filter(|r| !r.is_view_once).map(|r| r.id).collect();
        prop_assert_eq!(flattened, expected);

        for group in &groups {
            prop_assert!(!group.records.is_empty());
            for record in &group.records {
                prop_assert_eq!(&config.format_day(record.sent_at), &group.date);
            }
        }
        for pair in groups.windows(2) {
            prop_assert_ne!(&pair[0].date, &pair[1].date);
        }
    }

    // ============================================
    // MENTION PROPERTIES
    // ============================================

    /// Resolved mentions point at "@name" inside the new body
    #[test]
    fn mentions_point_at_names(
        prefix in "[a-z ]{0,8}",
        middle in "[a-z ]{0,8}",
        suffix in "[a-zё ]{0,8}",
    ) {
        let body = format!("{prefix}\u{fffc}{middle}\u{fffc}{suffix}");
        let first = prefix.chars().count();
        let second = first + 1 + middle.chars().count();
        let mentions = [
            Mention { recipient_id: 2, start: second, length: 1 },
            Mention { recipient_id: 1, start: first, length: 1 },
        ];

        let resolved = substitute_display_names(&body, &mentions, |id| match id {
            1 => Some("Alice".to_string()),
            _ => Some("Иван".to_string()),
        })
        .unwrap();

        let chars: Vec<char> = resolved.body.chars().collect();
        prop_assert_eq!(resolved.mentions.len(), 2);
        for mention in &resolved.mentions {
            prop_assert!(mention.start + mention.length <= chars.len());
            let span: String = chars[mention.start..mention.start + mention.length].iter().collect();
            prop_assert_eq!(span, format!("@{}", mention.name));
        }
        prop_assert!(
            !resolved.body.contains('\u{fffc}'),
            "placeholder left in body: {:?}",
            resolved.body
        );
    }

    /// Out-of-range mentions are dropped without touching the body
    #[test]
    fn out_of_range_mentions_dropped(body in "[a-z]{0,10}", start in 0usize..30) {
        let len = body.chars().count();
        prop_assume!(start >= len);
        let resolved = substitute_display_names(
            &body,
            &[Mention { recipient_id: 1, start, length: 1 }],
            |_| Some("X".to_string()),
        )
        .unwrap();
        prop_assert_eq!(resolved.body, body);
        prop_assert!(resolved.mentions.is_empty());
    }
}
