//! `attachment` elements and their metadata.

use crate::core::media::{MediaCollector, MediaOrigin, MediaPlacement};
use crate::markup::Element;
use crate::model::{Attachment, AttachmentKind};

/// Human-readable size with base-1024 units and at most one decimal.
///
/// ```
/// use chatexport::document::attachment::pretty_size;
///
/// assert_eq!(pretty_size(512), "512 B");
/// assert_eq!(pretty_size(1536), "1.5 kB");
/// assert_eq!(pretty_size(3 * 1024 * 1024), "3 MB");
/// ```
pub fn pretty_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        return format!("{bytes} B");
    }
    let rounded = format!("{value:.1}");
    let trimmed = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{trimmed} {}", UNITS[unit])
}

/// Builds an `attachment` element and places its payload.
///
/// Returns the element together with the placement so callers can reuse the
/// content path.
pub fn attachment_element(
    attachment: &Attachment,
    origin: &MediaOrigin,
    collector: &mut MediaCollector,
) -> (Element, MediaPlacement) {
    let placement = collector.collect(attachment, origin);

    let mut element = Element::new("attachment").with_attr("id", attachment.id.to_string());
    if !attachment.key.is_empty() {
        element.set_attr("key", attachment.key.as_str());
    }
    if let Some(downloaded) = placement.downloaded_attr() {
        element.set_attr("downloaded", downloaded);
    }
    if let Some(name) = &attachment.file_name {
        element.push(Element::text_element("filename", name.as_str()));
    }
    element.push(metadata_element(attachment));
    element.push(Element::text_element(
        "content_path",
        placement.content_path(),
    ));

    (element, placement)
}

/// Builds the `metadata` element: size plus one kind-specific child.
pub fn metadata_element(attachment: &Attachment) -> Element {
    let kind = match attachment.kind() {
        AttachmentKind::Audio => {
            let mut audio = typed("audio", attachment);
            if attachment.voice_note {
                audio.set_attr("is", "voice_note");
            }
            push_caption(&mut audio, attachment);
            if let Some(duration) = attachment.duration_sec {
                audio.push(Element::text_element("duration_sec", duration.to_string()));
            }
            audio
        }
        AttachmentKind::Video => {
            let mut video = typed("video", attachment);
            push_dimensions(&mut video, attachment);
            push_caption(&mut video, attachment);
            if attachment.video_edited {
                video.push(Element::text_element("video_edited", "true"));
            }
            if attachment.video_trimmed {
                video.push(Element::text_element("video_trim", "true"));
            }
            if let Some(duration) = attachment.duration_sec {
                video.push(Element::text_element("duration_sec", duration.to_string()));
            }
            video
        }
        AttachmentKind::Location => {
            let mut location = Element::new("location");
            if let Some(place) = &attachment.location {
                location.push(Element::text_element(
                    "description",
                    place.description.as_str(),
                ));
                location.push(Element::text_element("latitude", place.latitude.to_string()));
                location.push(Element::text_element(
                    "longitude",
                    place.longitude.to_string(),
                ));
            }
            location
        }
        AttachmentKind::Sticker => {
            let mut sticker = Element::new("sticker");
            if let Some(data) = &attachment.sticker {
                sticker.set_attr("id", data.sticker_id.to_string());
                sticker.set_attr("content_type", attachment.content_type.as_str());
                if data.borderless {
                    sticker.push(Element::text_element("is_borderless", "true"));
                }
                sticker.push(Element::text_element("emoji", data.emoji.as_str()));
            }
            push_name(&mut sticker, attachment);
            sticker
        }
        AttachmentKind::Image => {
            let mut image = typed("image", attachment);
            push_dimensions(&mut image, attachment);
            push_caption(&mut image, attachment);
            image
        }
        AttachmentKind::Document => typed("document", attachment),
        AttachmentKind::Unknown => typed("unknown", attachment),
    };

    Element::new("metadata")
        .with_child(Element::text_element("size", pretty_size(attachment.size)))
        .with_child(kind)
}

/// Kind element with `content_type` and optional `name`.
fn typed(name: &str, attachment: &Attachment) -> Element {
    let mut element =
        Element::new(name).with_attr("content_type", attachment.content_type.as_str());
    push_name(&mut element, attachment);
    element
}

fn push_name(element: &mut Element, attachment: &Attachment) {
    if let Some(name) = &attachment.file_name {
        element.push(Element::text_element("name", name.as_str()));
    }
}

fn push_caption(element: &mut Element, attachment: &Attachment) {
    if let Some(caption) = &attachment.caption {
        element.push(Element::text_element("caption", caption.as_str()));
    }
}

fn push_dimensions(element: &mut Element, attachment: &Attachment) {
    element.push(Element::text_element(
        "width",
        attachment.width.unwrap_or(0).to_string(),
    ));
    element.push(Element::text_element(
        "height",
        attachment.height.unwrap_or(0).to_string(),
    ));
}
