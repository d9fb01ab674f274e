//! Core export logic for chatexport.
//!
//! This module contains the pure, collaborator-free building blocks:
//! - [`classify`] - Message classification and delivery status
//! - [`codec`] - Body text escaping and the base64 heuristic
//! - [`media`] - Media and external-file manifests
//! - [`mentions`] - Mention substitution
//! - [`output`] - Document and manifest writers (JSON, CSV)
//!
//! # Quick Start
//!
//! ```rust
//! use chatexport::core::{classify, decode, Tag};
//! use chatexport::model::{Facet, MessageRecord};
//! use chrono::Utc;
//!
//! let record = MessageRecord::new(1, 1, 1, Utc::now()).with_facet(Facet::GroupUpdate);
//! assert_eq!(classify(&record), Tag::GroupUpdate);
//! assert_eq!(decode("hi").unwrap().as_str(), "hi");
//! ```

pub mod classify;
pub mod codec;
pub mod media;
pub mod mentions;
pub mod output;

// Re-export main types for convenience
pub use classify::{
    CallKind, DeliveryStatus, DocumentShape, Tag, call_label, classify, delivery_status,
    document_shape,
};
pub use codec::{DisplayText, decode, escape, looks_encoded};
pub use media::{
    AuxFileEntry, AuxFileManifest, MediaCollector, MediaManifest, MediaManifestEntry, MediaOrigin,
    MediaPlacement,
};
pub use mentions::{DisplayNameMentions, MentionResolver, ResolvedBody, ResolvedMention};

pub use output::write_document;
#[cfg(feature = "csv-output")]
pub use output::{aux_to_csv, media_to_csv, write_aux_csv, write_media_csv};
#[cfg(feature = "json")]
pub use output::{aux_to_json, media_to_json, write_aux_json, write_media_json};
