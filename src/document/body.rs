//! `body` elements.
//!
//! A body holds at most one primary content block, chosen in this order:
//! mentions, shared contact, link previews, quote, media. After it comes the
//! text block selected by the record's [`DocumentShape`], then reactions.

use tracing::warn;

use crate::config::ExportConfig;
use crate::core::classify::{DocumentShape, call_label, classify};
use crate::core::codec::decode;
use crate::core::media::{MediaCollector, MediaOrigin};
use crate::core::mentions::{MentionResolver, ResolvedMention};
use crate::document::attachment::attachment_element;
use crate::error::RecordError;
use crate::loader::ExportSource;
use crate::markup::Element;
use crate::model::{
    Attachment, LinkPreview, MessageRecord, Quote, Reaction, SharedContact, ThreadId,
};

/// Everything a body needs besides the record itself.
pub(crate) struct BodyContext<'a, S: ?Sized> {
    pub source: &'a S,
    pub mentions: &'a dyn MentionResolver,
    pub config: &'a ExportConfig,
    pub thread_id: ThreadId,
}

/// Renders the `body` of one record.
///
/// Media placements are recorded into `collector`; callers pass a scratch
/// collector and commit it only on success.
pub(crate) fn body_element<S: ExportSource + ?Sized>(
    ctx: &BodyContext<'_, S>,
    record: &MessageRecord,
    collector: &mut MediaCollector,
) -> Result<Element, RecordError> {
    let mut body = Element::new("body");
    let mut text_rendered = false;

    if !record.mentions.is_empty() {
        let resolved = ctx.mentions.resolve(&record.body, &record.mentions)?;
        for mention in &resolved.mentions {
            body.push(mention_element(mention));
        }
        text_rendered = push_text(&mut body, &resolved.body);
    } else if let Some(contact) = record.shared_contacts.first() {
        body.push(shared_contact_element(contact));
    } else if !record.link_previews.is_empty() {
        for preview in &record.link_previews {
            body.push(link_element(ctx, record, preview, collector)?);
        }
    } else if let Some(quote) = &record.quote {
        body.push(quote_element(ctx, record, quote, collector)?);
        text_rendered = push_text(&mut body, &record.body);
    } else if !record.attachments.is_empty() {
        let mut media = Element::new("media_content");
        for attachment in &record.attachments {
            let origin = media_origin(ctx, record, attachment);
            let (element, _) = attachment_element(attachment, &origin, collector);
            media.push(element);
        }
        body.push(media);
    }

    let tag = classify(record);
    match tag.shape() {
        DocumentShape::Text => {
            if !text_rendered {
                push_text(&mut body, &record.body);
            }
        }
        DocumentShape::CallLog => {
            let mut text = Element::new("text")
                .with_child(Element::text_element("type", call_label(record)))
                .with_child(Element::text_element("msg_type", tag.wire_name()));
            push_system_message(&mut text, record);
            body.push(text);
        }
        DocumentShape::System => {
            let mut text =
                Element::new("text").with_child(Element::text_element("msg_type", tag.wire_name()));
            push_system_message(&mut text, record);
            body.push(text);
        }
    }

    if !record.reactions.is_empty() {
        body.push(reactions_element(ctx, &record.reactions));
    }

    Ok(body)
}

/// Appends a decoded `text` element. Returns `true` if one was written.
fn push_text(body: &mut Element, raw: &str) -> bool {
    match decode(raw) {
        Some(text) => {
            body.push(Element::new("text").with_raw(text.into_inner()));
            true
        }
        None => false,
    }
}

fn push_system_message(text: &mut Element, record: &MessageRecord) {
    if let Some(message) = record.system_text.as_deref().filter(|m| !m.is_empty()) {
        text.push(Element::text_element("system_message", message));
    }
}

/// Payload origin. Media attachments are named after their upload time,
/// everything else after the record's sent time.
fn media_origin<S: ?Sized>(
    ctx: &BodyContext<'_, S>,
    record: &MessageRecord,
    attachment: &Attachment,
) -> MediaOrigin {
    MediaOrigin {
        recipient_id: record.sender_id,
        thread_id: ctx.thread_id,
        date: attachment.upload_timestamp.unwrap_or(record.sent_at),
        outgoing: record.is_outgoing(),
    }
}

fn record_origin<S: ?Sized>(ctx: &BodyContext<'_, S>, record: &MessageRecord) -> MediaOrigin {
    MediaOrigin {
        recipient_id: record.sender_id,
        thread_id: ctx.thread_id,
        date: record.sent_at,
        outgoing: record.is_outgoing(),
    }
}

// ============================================================================
// Primary content
// ============================================================================

fn mention_element(mention: &ResolvedMention) -> Element {
    Element::new("mention")
        .with_attr("id", mention.recipient_id.to_string())
        .with_child(Element::text_element("name", mention.name.as_str()))
        .with_child(Element::text_element("start", mention.start.to_string()))
        .with_child(Element::text_element(
            "mention_length",
            mention.length.to_string(),
        ))
}

fn shared_contact_element(contact: &SharedContact) -> Element {
    let mut element = Element::new("shared_contact").with_child(Element::text_element(
        "display_name",
        contact.display_name.as_str(),
    ));

    for email in &contact.emails {
        let mut e = Element::new("email").with_attr("type", email.kind.name());
        if let Some(label) = &email.label {
            e.push(Element::text_element("label", label.as_str()));
        }
        e.push(Element::text_element("address", email.address.as_str()));
        element.push(e);
    }

    for phone in &contact.phones {
        let mut e = Element::new("phone").with_attr("type", phone.kind.name());
        if let Some(label) = &phone.label {
            e.push(Element::text_element("label", label.as_str()));
        }
        e.push(Element::text_element("number", phone.number.as_str()));
        element.push(e);
    }

    for address in &contact.postal_addresses {
        let mut e = Element::new("postal_address").with_attr("type", address.kind.name());
        if let Some(label) = &address.label {
            e.push(Element::text_element("label", label.as_str()));
        }
        for (name, value) in [
            ("street", &address.street),
            ("postal_code", &address.postal_code),
            ("neighborhood", &address.neighborhood),
            ("po_box", &address.po_box),
            ("city", &address.city),
            ("country", &address.country),
        ] {
            e.push(Element::text_element(name, value.as_deref().unwrap_or_default()));
        }
        element.push(e);
    }

    element
}

fn link_element<S: ExportSource + ?Sized>(
    ctx: &BodyContext<'_, S>,
    record: &MessageRecord,
    preview: &LinkPreview,
    collector: &mut MediaCollector,
) -> Result<Element, RecordError> {
    let mut link = Element::new("link")
        .with_attr("title", preview.title.as_str())
        .with_child(Element::text_element("url", preview.url.as_str()))
        .with_child(Element::text_element(
            "description",
            preview.description.as_str(),
        ));

    if let Some(id) = preview.attachment_id {
        let thumbnail = ctx
            .source
            .attachment(id)
            .ok_or(RecordError::MissingAttachment(id))?;
        let placement = collector.collect(&thumbnail, &record_origin(ctx, record));

        let mut element = Element::new("link_preview").with_attr("id", thumbnail.id.to_string());
        if !thumbnail.content_type.is_empty() {
            element.set_attr("content_type", thumbnail.content_type.as_str());
        }
        if let Some(name) = &thumbnail.file_name {
            element.push(Element::text_element("filename", name.as_str()));
        }
        if !placement.content_path().is_empty() {
            element.push(Element::text_element(
                "content_path",
                placement.content_path(),
            ));
        }
        link.push(element);
    }

    if let Some(date) = preview.date {
        link.push(Element::text_element("date", ctx.config.format_date(date)));
    }

    Ok(link)
}

fn quote_element<S: ExportSource + ?Sized>(
    ctx: &BodyContext<'_, S>,
    record: &MessageRecord,
    quote: &Quote,
    collector: &mut MediaCollector,
) -> Result<Element, RecordError> {
    let author = ctx
        .source
        .participant(quote.author_id)
        .ok_or(RecordError::UnknownParticipant(quote.author_id))?;

    let mut element = Element::new("quote")
        .with_attr("id", quote.id.to_string())
        .with_child(Element::text_element("author", author.given_name()));

    if let Some(text) = &quote.display_text {
        element.push(Element::text_element("quote_text", text.as_str()));
    }
    if quote.original_missing {
        element.push(Element::text_element("original", "is_missing"));
    }
    match &quote.attachment {
        Some(attachment) => {
            let origin = record_origin(ctx, record);
            let (attachment, _) = attachment_element(attachment, &origin, collector);
            element.push(attachment);
        }
        None if quote.display_text.is_none() => {
            element.push(Element::text_element("attachment", "is_missing"));
        }
        None => {}
    }

    let timestamp = ctx
        .source
        .quoted_timestamp(ctx.thread_id, quote.id)
        .map_or_else(|| "Unknown".to_string(), |ts| ctx.config.format_timestamp(ts));
    element.push(Element::text_element("timestamp", timestamp));

    Ok(element)
}

fn reactions_element<S: ExportSource + ?Sized>(
    ctx: &BodyContext<'_, S>,
    reactions: &[Reaction],
) -> Element {
    let mut element = Element::new("reactions");
    for reaction in reactions {
        let author = match ctx.source.participant(reaction.author_id) {
            Some(p) => p.display_name,
            None => {
                warn!(recipient = reaction.author_id, "reaction author could not be resolved");
                "Unknown".to_string()
            }
        };
        element.push(
            Element::new("reaction")
                .with_attr("author_id", reaction.author_id.to_string())
                .with_child(Element::text_element("author", author))
                .with_child(Element::text_element(
                    "time",
                    ctx.config.format_timestamp(reaction.received_at),
                ))
                .with_child(Element::text_element("emoji", reaction.emoji.as_str())),
        );
    }
    element
}
