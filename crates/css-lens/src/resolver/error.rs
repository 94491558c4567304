use std::path::PathBuf;

/// Why a resolution produced no annotations.
///
/// Everything except [`ResolveError::StaleResult`] is turned into a
/// diagnostic [`Resolution`](super::Resolution) at the orchestrator
/// boundary; stale results are dropped without any visible effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no .css import found")]
    NoCssImportFound,
    #[error("could not resolve '{specifier}': {reason}")]
    PathResolutionFailed { specifier: String, reason: String },
    #[error("rule extraction failed for {}: {message}", path.display())]
    ExtractionFailed { path: PathBuf, message: String },
    #[error("result for v{version} superseded by v{latest}")]
    StaleResult { version: i32, latest: i32 },
}

impl ResolveError {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResult { .. })
    }
}
