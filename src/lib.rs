//! # chatexport
//!
//! A Rust library for exporting one messenger conversation, over a date
//! window, into a single human-readable XML document plus two manifests that
//! tell a packaging stage which files to copy next to it.
//!
//! ## Overview
//!
//! An export reads from four collaborators and writes three artifacts:
//!
//! - **In**: a record cursor, an attachment lookup, a participant resolver and
//!   a mention resolver (see [`loader`])
//! - **Out**: the XML document, the media manifest (locally stored payloads)
//!   and the aux manifest (external references such as contact photos)
//!
//! Every stored message is classified into exactly one [`Tag`](core::Tag),
//! which decides whether it renders as text, as a call log entry or as a
//! system notice. Records are grouped into local calendar days and rendered
//! in ascending time order.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatexport::prelude::*;
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! fn main() -> Result<()> {
//!     let sent = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
//!     let store = MemoryStore::new(1)
//!         .with_participant(Participant::new(1, "Me").myself())
//!         .with_participant(Participant::new(2, "Alice"))
//!         .with_thread(10, ThreadRecipient::Direct { recipient_id: 2 })
//!         .with_message(
//!             MessageRecord::new(1, 10, 2, sent)
//!                 .with_facet(Facet::Push)
//!                 .with_body("See you <soon> & bring snacks"),
//!         );
//!
//!     let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//!     let export = DocumentBuilder::new(&store, ExportConfig::default())?.export(10, day, day)?;
//!
//!     assert!(export.document.contains("See you &lt;soon&gt; &amp; bring snacks"));
//!     assert!(export.media.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## From a snapshot file
//!
//! ```rust,no_run
//! # #[cfg(feature = "json")]
//! # fn main() -> chatexport::Result<()> {
//! use chatexport::prelude::*;
//! use chrono::NaiveDate;
//!
//! let store = MemoryStore::from_path("snapshot.json")?;
//! let builder = DocumentBuilder::new(&store, ExportConfig::new().with_utc_offset_minutes(60))?;
//! let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let until = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
//! let export = builder.export(7, from, until)?;
//!
//! write_document(&export.document, "january.xml")?;
//! write_media_manifest(&export.media, "january_media.json", ManifestFormat::Json)?;
//! write_aux_manifest(&export.aux_files, "january_files.json", ManifestFormat::Json)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "json"))]
//! # fn main() {}
//! ```
//!
//! ## Module Structure
//!
//! - [`model`] - Snapshot types ([`MessageRecord`](model::MessageRecord), [`Participant`](model::Participant), ...)
//! - [`loader`] - Collaborator traits and the [`ExportWindow`](loader::ExportWindow)
//! - [`core`] - Pure building blocks
//!   - [`core::classify`] - Message classification
//!   - [`core::codec`] - Text escaping and base64 heuristic
//!   - [`core::media`] - Media and aux manifests
//!   - [`core::mentions`] - Mention substitution
//!   - [`core::output`] - Document and manifest writers
//! - [`document`] - [`DocumentBuilder`](document::DocumentBuilder) and element renderers
//! - [`participants`] - The `members` section
//! - [`markup`] - Minimal XML tree and serializer
//! - [`store`] - [`MemoryStore`](store::MemoryStore), an in-memory source
//! - [`config`] - [`ExportConfig`](config::ExportConfig)
//! - [`format`] - [`ManifestFormat`](format::ManifestFormat) and writers
//! - [`progress`] - Progress reporting
//! - [`cli`] - CLI types (requires `cli` feature)
//! - [`error`] - Error types ([`ExportError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod document;
pub mod error;
pub mod format;
pub mod loader;
pub mod markup;
pub mod model;
pub mod participants;
pub mod progress;
pub mod store;

// Re-export the main types at the crate root for convenience
pub use error::{ExportError, RecordError, Result};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatexport::prelude::*;
/// ```
pub mod prelude {
    // Error types
    pub use crate::error::{ExportError, RecordError, Result};

    // Configuration
    pub use crate::config::ExportConfig;

    // Snapshot model
    pub use crate::model::{
        Attachment, Direction, Facet, LinkPreview, Mention, MessageRecord, Participant, Quote,
        Reaction, SharedContact, ThreadRecipient,
    };

    // Collaborators
    pub use crate::loader::{
        AttachmentLookup, ConversationLoader, ExportSource, ExportWindow, ParticipantResolver,
    };
    pub use crate::core::mentions::MentionResolver;
    pub use crate::store::MemoryStore;

    // Assembly
    pub use crate::document::{DocumentBuilder, Export, ExportStats};

    // Classification
    pub use crate::core::classify::{DocumentShape, Tag, classify};

    // Manifests and output
    pub use crate::core::media::{AuxFileManifest, MediaManifest};
    pub use crate::core::output::write_document;
    pub use crate::format::{ManifestFormat, write_aux_manifest, write_media_manifest};

    // Progress
    pub use crate::progress::{Progress, ProgressCallback};
}
