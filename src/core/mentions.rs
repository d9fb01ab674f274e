//! Mention substitution.
//!
//! Stored bodies contain a placeholder span for each mention. Before
//! rendering, every span is replaced by `@` plus the mentioned person's
//! display name, and the mention offsets are shifted to match the new body.
//! Offsets count characters, not bytes.

use tracing::debug;

use crate::error::RecordError;
use crate::loader::ParticipantResolver;
use crate::model::{Mention, RecipientId};

/// A mention positioned in the display body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMention {
    pub recipient_id: RecipientId,
    pub name: String,
    pub start: usize,
    pub length: usize,
}

/// Body with mentions substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
    pub body: String,
    pub mentions: Vec<ResolvedMention>,
}

/// Maps a stored body and its raw mentions to display form.
pub trait MentionResolver {
    fn resolve(&self, body: &str, mentions: &[Mention]) -> Result<ResolvedBody, RecordError>;
}

/// Default resolver, naming mentions after the participant's display name.
pub struct DisplayNameMentions<'a, P: ?Sized> {
    participants: &'a P,
}

impl<'a, P: ParticipantResolver + ?Sized> DisplayNameMentions<'a, P> {
    pub fn new(participants: &'a P) -> Self {
        Self { participants }
    }
}

impl<P: ParticipantResolver + ?Sized> MentionResolver for DisplayNameMentions<'_, P> {
    fn resolve(&self, body: &str, mentions: &[Mention]) -> Result<ResolvedBody, RecordError> {
        substitute_display_names(body, mentions, |id| {
            self.participants.participant(id).map(|p| p.display_name)
        })
    }
}

/// Replaces each mention span with `@name`.
///
/// Spans that overlap an earlier span or run past the end of the body are
/// dropped. An unknown mentioned recipient fails the whole body.
pub fn substitute_display_names<F>(
    body: &str,
    mentions: &[Mention],
    mut name_of: F,
) -> Result<ResolvedBody, RecordError>
where
    F: FnMut(RecipientId) -> Option<String>,
{
    let chars: Vec<char> = body.chars().collect();
    let mut sorted: Vec<&Mention> = mentions.iter().collect();
    sorted.sort_by_key(|m| (m.start, m.length));

    let mut out = String::with_capacity(body.len());
    let mut resolved = Vec::with_capacity(sorted.len());
    let mut cursor = 0usize;
    let mut out_len = 0usize;

    for mention in sorted {
        let end = mention.start.saturating_add(mention.length);
        if mention.start < cursor || end > chars.len() {
            debug!(
                recipient = mention.recipient_id,
                start = mention.start,
                "skipping mention outside the body"
            );
            continue;
        }

        let name = name_of(mention.recipient_id)
            .ok_or(RecordError::UnknownParticipant(mention.recipient_id))?;

        out.extend(&chars[cursor..mention.start]);
        out_len += mention.start - cursor;

        let replacement = format!("@{name}");
        let replacement_len = replacement.chars().count();
        resolved.push(ResolvedMention {
            recipient_id: mention.recipient_id,
            name,
            start: out_len,
            length: replacement_len,
        });
        out.push_str(&replacement);
        out_len += replacement_len;
        cursor = end;
    }
    out.extend(&chars[cursor..]);

    Ok(ResolvedBody {
        body: out,
        mentions: resolved,
    })
}
