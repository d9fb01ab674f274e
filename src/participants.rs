//! The `members` section of a document.
//!
//! A group thread renders one `group` element with its registered members.
//! A direct thread renders the counterpart followed by the exporting user.
//! System-contact photo and entry references are recorded into the aux
//! manifest under `<recipient id>/photo` and `<recipient id>/contact`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::core::media::{MediaCollector, reference_path};
use crate::error::{ExportError, Result};
use crate::loader::ParticipantResolver;
use crate::markup::Element;
use crate::model::{Participant, ThreadId, ThreadRecipient};

/// Ten-digit North American numbers, with or without the country code.
static NANP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+?1)?(\d{3})(\d{3})(\d{4})$").unwrap());

/// Formats a phone number for display.
///
/// North American numbers become `+1 555-123-4567`; anything else is
/// returned trimmed but otherwise unchanged.
pub fn format_phone(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    match NANP.captures(&compact) {
        Some(caps) => format!("+1 {}-{}-{}", &caps[1], &caps[2], &caps[3]),
        None => raw.trim().to_string(),
    }
}

/// Builds the `members` element for a thread.
///
/// Fails with a configuration error when the thread's recipient, the
/// counterpart of a direct thread or the self participant is unknown.
pub fn members_element<R: ParticipantResolver + ?Sized>(
    resolver: &R,
    thread_id: ThreadId,
    collector: &mut MediaCollector,
) -> Result<Element> {
    let recipient = resolver.thread_recipient(thread_id).ok_or_else(|| {
        ExportError::configuration(format!("thread {thread_id} has no recipient"))
    })?;

    let mut members = Element::new("members");

    match recipient {
        ThreadRecipient::Group {
            group_id,
            title,
            members: ids,
        } => {
            let registered: Vec<Participant> = ids
                .iter()
                .filter_map(|&id| {
                    let participant = resolver.participant(id);
                    if participant.is_none() {
                        warn!(recipient = id, "group member could not be resolved");
                    }
                    participant
                })
                .filter(|p| p.registered)
                .collect();

            let mut group = Element::new("group")
                .with_attr("id", group_id)
                .with_child(Element::text_element("title", title))
                .with_child(Element::text_element(
                    "memberCount",
                    registered.len().to_string(),
                ));
            for member in &registered {
                group.push(contact_element(member, collector));
            }
            members.push(group);
        }
        ThreadRecipient::Direct { recipient_id } => {
            let counterpart = resolver.participant(recipient_id).ok_or_else(|| {
                ExportError::configuration(format!(
                    "recipient {recipient_id} of thread {thread_id} could not be resolved"
                ))
            })?;
            let me = resolver
                .self_participant()
                .ok_or_else(|| ExportError::configuration("self participant is unknown"))?;

            members.push(contact_element(&counterpart, collector));
            members.push(contact_element(&me, collector));
        }
    }

    Ok(members)
}

/// Builds one `contact` element.
pub fn contact_element(participant: &Participant, collector: &mut MediaCollector) -> Element {
    let mut contact = Element::new("contact")
        .with_attr("id", participant.id.to_string())
        .with_attr("name", participant.display_name.as_str());

    if participant.user_set_display_name {
        if let Some(profile) = &participant.profile_name {
            contact.push(Element::text_element("profile_name", profile.full_name()));
        }
    }
    if let Some(relation) = participant.relation() {
        contact.push(Element::text_element("relation", relation.tag()));
    }
    if let Some(about) = participant.combined_about() {
        contact.push(Element::text_element("about", about));
    }
    if let Some(email) = &participant.email {
        contact.push(Element::text_element("email", email.as_str()));
    }
    if let Some(phone) = &participant.phone {
        contact.push(Element::text_element("phone", format_phone(phone)));
    }
    if let Some(photo) = &participant.photo_ref {
        contact.push(Element::text_element(
            "contact_photo_uri",
            reference_path(photo),
        ));
        collector.record_aux(format!("{}/photo", participant.id), photo.as_str());
    }
    if let Some(entry) = &participant.contact_ref {
        contact.push(Element::text_element("contact_uri", reference_path(entry)));
        collector.record_aux(format!("{}/contact", participant.id), entry.as_str());
    }

    contact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecipientId;
    use std::collections::HashMap;

    struct Directory {
        people: HashMap<RecipientId, Participant>,
        thread: Option<ThreadRecipient>,
    }

    impl ParticipantResolver for Directory {
        fn participant(&self, id: RecipientId) -> Option<Participant> {
            self.people.get(&id).cloned()
        }

        fn self_participant(&self) -> Option<Participant> {
            self.people.values().find(|p| p.is_self).cloned()
        }

        fn thread_recipient(&self, _thread_id: ThreadId) -> Option<ThreadRecipient> {
            self.thread.clone()
        }
    }

    fn directory(thread: ThreadRecipient) -> Directory {
        let mut people = HashMap::new();
        people.insert(1, Participant::new(1, "Me").myself());
        people.insert(2, Participant::new(2, "Bob"));
        let mut carol = Participant::new(3, "Carol");
        carol.registered = false;
        people.insert(3, carol);
        Directory {
            people,
            thread: Some(thread),
        }
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("5551234567"), "+1 555-123-4567");
        assert_eq!(format_phone("+1 (555) 123-4567"), "+1 555-123-4567");
        assert_eq!(format_phone(" +44 20 7946 0958 "), "+44 20 7946 0958");
    }

    #[test]
    fn test_direct_thread_counterpart_then_self() {
        let dir = directory(ThreadRecipient::Direct { recipient_id: 2 });
        let mut collector = MediaCollector::new();
        let members = members_element(&dir, 1, &mut collector).unwrap();

        let ids: Vec<&str> = members
            .children_named("contact")
            .filter_map(|c| c.attr("id"))
            .collect();
        assert_eq!(ids, vec!["2", "1"]);
        let me = members.children_named("contact").nth(1).unwrap();
        assert_eq!(me.child("relation").unwrap().text(), "self");
    }

    #[test]
    fn test_group_lists_registered_members() {
        let dir = directory(ThreadRecipient::Group {
            group_id: "g1".into(),
            title: "Team".into(),
            members: vec![1, 2, 3, 99],
        });
        let mut collector = MediaCollector::new();
        let members = members_element(&dir, 1, &mut collector).unwrap();

        let group = members.child("group").unwrap();
        assert_eq!(group.attr("id"), Some("g1"));
        assert_eq!(group.child("title").unwrap().text(), "Team");
        assert_eq!(group.child("memberCount").unwrap().text(), "2");
        assert_eq!(group.children_named("contact").count(), 2);
    }

    #[test]
    fn test_unknown_thread_is_configuration_error() {
        let mut dir = directory(ThreadRecipient::Direct { recipient_id: 2 });
        dir.thread = None;
        let err = members_element(&dir, 1, &mut MediaCollector::new()).unwrap_err();
        assert!(err.is_configuration());

        let dir = directory(ThreadRecipient::Direct { recipient_id: 42 });
        let err = members_element(&dir, 1, &mut MediaCollector::new()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_contact_details_and_aux_refs() {
        let mut p = Participant::new(7, "Dana")
            .with_profile_name("Dana", Some("Scully"))
            .with_phone("555 123 4567");
        p.user_set_display_name = true;
        p.system_contact = true;
        p.email = Some("dana@example.org".into());
        p.photo_ref = Some("content://contacts/photo/7".into());
        p.contact_ref = Some("content://contacts/lookup/7".into());

        let mut collector = MediaCollector::new();
        let contact = contact_element(&p, &mut collector);

        assert_eq!(contact.attr("name"), Some("Dana"));
        assert_eq!(contact.child("profile_name").unwrap().text(), "Dana Scully");
        assert_eq!(contact.child("relation").unwrap().text(), "system_contact");
        assert_eq!(contact.child("phone").unwrap().text(), "+1 555-123-4567");
        assert_eq!(contact.child("contact_photo_uri").unwrap().text(), "/photo/7");

        let aux = collector.aux();
        assert_eq!(aux["7/photo"], "content://contacts/photo/7");
        assert_eq!(aux["7/contact"], "content://contacts/lookup/7");
    }

    #[test]
    fn test_profile_name_only_when_user_set() {
        let p = Participant::new(2, "Bob").with_profile_name("Robert", None);
        let contact = contact_element(&p, &mut MediaCollector::new());
        assert!(contact.child("profile_name").is_none());
        assert!(contact.child("relation").is_none());
    }
}
