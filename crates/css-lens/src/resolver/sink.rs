use dashmap::DashMap;
use tower_lsp::lsp_types::Url;
use tracing::warn;

use super::error::ResolveError;

/// Receives resolution failures meant for the user.
///
/// Injected into the [`Resolver`](super::Resolver) so tests and hosts can
/// capture or forward reports. Each distinct failure is delivered at most
/// once per document until that document resolves successfully again.
pub trait DiagnosticSink: Send + Sync {
    fn report(
        &self,
        uri: &Url,
        error: &ResolveError,
    );
}

/// Default sink: writes failures to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(
        &self,
        uri: &Url,
        error: &ResolveError,
    ) {
        warn!("No CSS context for {uri}: {error}");
    }
}

/// Failures already reported per document.
#[derive(Debug, Default)]
pub(crate) struct FailureLedger {
    reported: DashMap<Url, Vec<ResolveError>>,
}

impl FailureLedger {
    /// Record `error` for `uri`; `true` when this cause has not been
    /// reported for the document since its last successful resolution.
    pub(crate) fn should_report(
        &self,
        uri: &Url,
        error: &ResolveError,
    ) -> bool {
        let mut reported = self.reported.entry(uri.clone()).or_default();
        if reported.contains(error) {
            return false;
        }
        reported.push(error.clone());
        true
    }

    pub(crate) fn clear(
        &self,
        uri: &Url,
    ) {
        self.reported.remove(uri);
    }
}

#[cfg(test)]
#[path = "../../tests/src/resolver/sink_tests.rs"]
mod tests;
