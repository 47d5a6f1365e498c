//! Export bundles and media resolution.
//!
//! A chat export arrives either as a lone transcript or as a bundle: the transcript plus the
//! photos, voice notes and documents it mentions. [`resolve_bundle`] selects the transcript,
//! materializes media into a session-scoped [`MediaStore`](crate::models::MediaStore) and builds
//! the read-only [`MediaTable`](crate::models::MediaTable) used while parsing.

pub mod bundle;
pub mod diagnostics;
pub mod resolver;

pub use bundle::{Bundle, DirectoryBundle, MemoryBundle};
pub use diagnostics::{CollectedDiagnostics, Diagnostic, DiagnosticSink, LogDiagnostics};
pub use resolver::{
    CANONICAL_TRANSCRIPT_NAME, ResolvedBundle, Transcript, resolve_bundle, select_transcript,
};
