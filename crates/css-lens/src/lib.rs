pub mod css;
pub mod document;
pub mod resolver;
pub mod scan;
pub mod server;

pub use css::{Annotation, CommandExtractor, ExtractionError, Rule, RuleExtractor, RuleSet};
pub use document::{Document, DocumentStore};
pub use resolver::{
    DiagnosticSink, EditorHost, HostEvent, LensSession, Resolution, ResolveError, ResolveOutcome, ResolveState,
    Resolver, ResolverOptions, TracingSink,
};
pub use scan::{RegexUsageScanner, UsageScanner, UsageSite};
pub use server::CssLensServer;
