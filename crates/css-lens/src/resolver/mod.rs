//! The class-usage resolver: scanning, path resolution, extraction and
//! matching for one document, driven by host events.

pub(crate) mod cache;
pub(crate) mod error;
pub(crate) mod host;
pub(crate) mod orchestrator;
pub(crate) mod session;
pub(crate) mod sink;
pub(crate) mod state;

pub use cache::{DEFAULT_CACHE_ENTRIES, ExtractionCache, content_hash};
pub use error::ResolveError;
pub use host::{EditorHost, HostEvent, resolve_import_path};
pub use orchestrator::{CssSourceRef, Resolution, ResolveOutcome, Resolver, ResolverOptions};
pub use session::LensSession;
pub use sink::{DiagnosticSink, TracingSink};
pub use state::ResolveState;
