//! Live template instances and the pieces a host needs around them.
//!
//! * [`instance`] keeps one expansion in sync with the document.
//! * [`matcher`] finds templates whose trigger matches at the cursor.
//! * [`library`] loads template files per language.
//! * [`host`] is a reference host over an in-memory buffer.

pub mod diagnostic;
pub mod document;
pub mod error;
pub mod host;
pub mod instance;
pub mod library;
pub mod matcher;

pub use diagnostic::Diagnostic;
pub use document::Document;
pub use error::LibraryError;
pub use host::{BufferHost, render_snippet};
pub use instance::{Expansion, ExpansionRequest, Instance, Part, PartKind, UpdateOutcome};
pub use library::{FileError, Library};
pub use matcher::{Candidate, MatchOutcome, MatchRequest, match_templates};
