use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::RwLock;
use tower_lsp::lsp_types::Url;
use tracing::debug;

use super::{
    cache::{DEFAULT_CACHE_ENTRIES, ExtractionCache, content_hash},
    error::ResolveError,
    host::EditorHost,
    sink::{DiagnosticSink, FailureLedger},
    state::{ResolveState, RunState},
};
use crate::{
    css::{Annotation, ClassIndex, RuleExtractor, match_usages},
    scan::{CssImport, DEFAULT_BINDING, RegexUsageScanner, UsageScanner, UsageSite, find_css_imports},
};

const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// The stylesheet a document imports, and where the host located it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSourceRef {
    /// Import source as written in the document.
    pub imported_path: String,
    pub resolved_absolute_path: Option<PathBuf>,
}

/// Result of one resolution run for one document version.
///
/// On failure `annotations` is empty and `failure` carries the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub uri: Url,
    pub version: i32,
    pub css_source: Option<CssSourceRef>,
    pub annotations: Vec<Annotation>,
    pub failure: Option<ResolveError>,
    /// Terminal state of the run: `Ready` or `Error`.
    pub state: ResolveState,
}

impl Resolution {
    pub fn is_ready(&self) -> bool {
        self.state == ResolveState::Ready
    }

    fn resolved_path(&self) -> Option<&Path> {
        self.css_source.as_ref()?.resolved_absolute_path.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Ready(Resolution),
    /// A newer version of the document was requested while this run was in
    /// flight; nothing was stored or reported.
    Stale { version: i32, latest: i32 },
}

impl ResolveOutcome {
    pub fn into_resolution(self) -> Option<Resolution> {
        match self {
            ResolveOutcome::Ready(resolution) => Some(resolution),
            ResolveOutcome::Stale {
                ..
            } => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, ResolveOutcome::Stale { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Identifiers scanned as stylesheet bindings.
    pub bindings: Vec<String>,
    /// Also scan the local name of the document's CSS import.
    pub follow_import_binding: bool,
    pub extraction_timeout: Duration,
    pub cache_max_entries: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            bindings: vec![DEFAULT_BINDING.to_string()],
            follow_import_binding: true,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
            cache_max_entries: DEFAULT_CACHE_ENTRIES,
        }
    }
}

/// Resolves class usages of documents to the CSS rules defining them.
///
/// Every run is tagged with the document version it scanned. The resolver
/// keeps the latest requested version per document and drops any run that
/// has been overtaken by a newer one, so results are last-writer-wins by
/// version rather than by completion order.
pub struct Resolver {
    extractor: RwLock<Arc<dyn RuleExtractor>>,
    sink: Arc<dyn DiagnosticSink>,
    scanner: RwLock<Arc<dyn UsageScanner>>,
    custom_scanner: bool,
    options: RwLock<ResolverOptions>,
    cache: ExtractionCache,
    latest_versions: DashMap<Url, i32>,
    resolutions: DashMap<Url, Resolution>,
    failures: FailureLedger,
}

impl Resolver {
    pub fn new(
        extractor: Arc<dyn RuleExtractor>,
        sink: Arc<dyn DiagnosticSink>,
        options: ResolverOptions,
    ) -> Self {
        let scanner: Arc<dyn UsageScanner> = Arc::new(RegexUsageScanner::with_bindings(&options.bindings));
        Self {
            extractor: RwLock::new(extractor),
            sink,
            scanner: RwLock::new(scanner),
            custom_scanner: false,
            cache: ExtractionCache::new(options.cache_max_entries),
            options: RwLock::new(options),
            latest_versions: DashMap::new(),
            resolutions: DashMap::new(),
            failures: FailureLedger::default(),
        }
    }

    /// Replace the textual scanner. Binding settings no longer apply.
    pub fn with_scanner(
        mut self,
        scanner: Arc<dyn UsageScanner>,
    ) -> Self {
        *self.scanner.get_mut() = scanner;
        self.custom_scanner = true;
        self
    }

    pub async fn options(&self) -> ResolverOptions {
        self.options.read().await.clone()
    }

    pub async fn set_options(
        &self,
        options: ResolverOptions,
    ) {
        self.cache.set_max_entries(options.cache_max_entries);
        if !self.custom_scanner {
            *self.scanner.write().await = Arc::new(RegexUsageScanner::with_bindings(&options.bindings));
        }
        *self.options.write().await = options;
    }

    /// Swap the rule extractor and drop everything extracted by the old one.
    pub async fn set_extractor(
        &self,
        extractor: Arc<dyn RuleExtractor>,
    ) {
        *self.extractor.write().await = extractor;
        self.cache.clear();
    }

    pub fn cache(&self) -> &ExtractionCache {
        &self.cache
    }

    // ── version bookkeeping ─────────────────────────────────────────────

    /// Note that `version` of `uri` has been requested.
    ///
    /// Returns `false` when a newer version is already known, i.e. a run for
    /// `version` would be stale before it starts.
    pub fn record_version(
        &self,
        uri: &Url,
        version: i32,
    ) -> bool {
        self.begin(uri, version).is_ok()
    }

    /// Whether `version` is still the latest requested version of `uri`.
    pub fn is_current(
        &self,
        uri: &Url,
        version: i32,
    ) -> bool {
        self.latest_versions.get(uri).is_some_and(|latest| *latest == version)
    }

    fn begin(
        &self,
        uri: &Url,
        version: i32,
    ) -> Result<(), i32> {
        let mut latest = self.latest_versions.entry(uri.clone()).or_insert(version);
        if *latest > version {
            return Err(*latest);
        }
        *latest = version;
        Ok(())
    }

    /// The version that overtook `version`, if any. A forgotten document
    /// counts as overtaken.
    fn superseded_by(
        &self,
        uri: &Url,
        version: i32,
    ) -> Option<i32> {
        match self.latest_versions.get(uri) {
            Some(latest) if *latest == version => None,
            Some(latest) => Some(*latest),
            None => Some(version),
        }
    }

    // ── queries ─────────────────────────────────────────────────────────

    /// The most recent stored resolution for `uri`.
    pub fn latest_resolution(
        &self,
        uri: &Url,
    ) -> Option<Resolution> {
        self.resolutions.get(uri).map(|r| r.value().clone())
    }

    /// Documents whose last resolution used the stylesheet at `path`.
    pub fn documents_importing(
        &self,
        path: &Path,
    ) -> Vec<Url> {
        self.resolutions
            .iter()
            .filter(|entry| entry.value().resolved_path() == Some(path))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Drop all state for a closed document. In-flight runs become stale.
    pub fn forget(
        &self,
        uri: &Url,
    ) {
        self.latest_versions.remove(uri);
        self.resolutions.remove(uri);
        self.failures.clear(uri);
    }

    // ── resolution ──────────────────────────────────────────────────────

    /// Annotations for a lens request on `uri`.
    ///
    /// Served from the stored resolution when it matches the host's current
    /// version, otherwise resolved on demand. Failures and stale runs yield
    /// no annotations.
    pub async fn provide_annotations_for_lens(
        &self,
        host: &dyn EditorHost,
        uri: &Url,
    ) -> Vec<Annotation> {
        let Some((text, version)) = host.document_snapshot(uri) else {
            return Vec::new();
        };
        if let Some(resolution) = self.resolutions.get(uri)
            && resolution.version == version
        {
            return resolution.annotations.clone();
        }

        self.resolve(host, uri, &text, version).await.into_resolution().map(|r| r.annotations).unwrap_or_default()
    }

    /// Resolve every class usage in `text` (version `version` of `uri`).
    ///
    /// Never fails: missing imports, unresolvable paths and extractor errors
    /// come back as a [`Resolution`] with a `failure`, and runs overtaken by a
    /// newer version come back as [`ResolveOutcome::Stale`].
    pub async fn resolve(
        &self,
        host: &dyn EditorHost,
        uri: &Url,
        text: &str,
        version: i32,
    ) -> ResolveOutcome {
        let name = short_name(uri);
        if let Err(latest) = self.begin(uri, version) {
            debug!("Skipping {name} v{version}: v{latest} already requested");
            return ResolveOutcome::Stale {
                version,
                latest,
            };
        }

        let options = self.options.read().await.clone();
        let mut run = RunState::new(name.clone(), version);
        let mut css_source = None;
        let result = self.run(&mut run, host, uri, text, version, &options, &mut css_source).await;

        let (annotations, failure) = match result {
            Ok(annotations) => (annotations, None),
            Err(ResolveError::StaleResult {
                version,
                latest,
            }) => {
                debug!("Dropping stale result for {name} (v{version}, latest v{latest})");
                return ResolveOutcome::Stale {
                    version,
                    latest,
                };
            },
            Err(error) => (Vec::new(), Some(error)),
        };

        if let Some(latest) = self.superseded_by(uri, version) {
            debug!("Dropping stale result for {name} (v{version}, latest v{latest})");
            return ResolveOutcome::Stale {
                version,
                latest,
            };
        }

        match &failure {
            None => {
                run.advance(ResolveState::Ready);
                self.failures.clear(uri);
                debug!("Resolved {} usage(s) in {name} (v{version})", annotations.len());
            },
            Some(error) => {
                run.advance(ResolveState::Error);
                if self.failures.should_report(uri, error) {
                    self.sink.report(uri, error);
                } else {
                    debug!("Repeated failure for {name} (v{version}): {error}");
                }
            },
        }

        let resolution = Resolution {
            uri: uri.clone(),
            version,
            css_source,
            annotations,
            failure,
            state: run.state(),
        };
        self.store(resolution.clone());
        ResolveOutcome::Ready(resolution)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        run: &mut RunState,
        host: &dyn EditorHost,
        uri: &Url,
        text: &str,
        version: i32,
        options: &ResolverOptions,
        css_source: &mut Option<CssSourceRef>,
    ) -> Result<Vec<Annotation>, ResolveError> {
        run.advance(ResolveState::Scanning);
        let mut imports = find_css_imports(text);
        let import = imports.next();
        let skipped = imports.count();
        if let Some(first) = import.as_ref()
            && skipped > 0
        {
            debug!("{}: using {} of {} css imports", run.document(), first.specifier, skipped + 1);
        }
        let scanner = self.scanner_for(import.as_ref(), options).await;
        let usages: Vec<UsageSite> = scanner.scan(text, version).collect();

        run.advance(ResolveState::ResolvingPath);
        let import = import.ok_or(ResolveError::NoCssImportFound)?;
        let resolved = host.resolve_absolute_path(uri, &import.specifier);
        *css_source = Some(CssSourceRef {
            imported_path: import.specifier.clone(),
            resolved_absolute_path: resolved.clone(),
        });
        let path = resolved.ok_or_else(|| ResolveError::PathResolutionFailed {
            specifier: import.specifier.clone(),
            reason: "the editor could not map the import to a file".to_string(),
        })?;
        let source = host.read_css_source(&path).map_err(|error| ResolveError::PathResolutionFailed {
            specifier: import.specifier.clone(),
            reason: format!("{}: {error}", path.display()),
        })?;

        run.advance(ResolveState::ExtractingRules);
        let index = self.extract_rules(&path, &source, options.extraction_timeout).await?;
        if let Some(latest) = self.superseded_by(uri, version) {
            return Err(ResolveError::StaleResult {
                version,
                latest,
            });
        }

        run.advance(ResolveState::Matching);
        Ok(match_usages(&index, usages))
    }

    async fn scanner_for(
        &self,
        import: Option<&CssImport>,
        options: &ResolverOptions,
    ) -> Arc<dyn UsageScanner> {
        let base = Arc::clone(&*self.scanner.read().await);
        let binding = import.and_then(|import| import.binding.as_deref());
        match binding {
            Some(binding) if options.follow_import_binding => match base.for_binding(binding) {
                Some(extended) => extended,
                None => base,
            },
            _ => base,
        }
    }

    async fn extract_rules(
        &self,
        path: &Path,
        source: &str,
        timeout: Duration,
    ) -> Result<Arc<ClassIndex>, ResolveError> {
        let hash = content_hash(source);
        if let Some(index) = self.cache.get(path, hash) {
            return Ok(index);
        }

        let extractor = Arc::clone(&*self.extractor.read().await);
        let rule_set = match tokio::time::timeout(timeout, extractor.extract(source)).await {
            Ok(Ok(rule_set)) => rule_set,
            Ok(Err(error)) => {
                return Err(ResolveError::ExtractionFailed {
                    path: path.to_path_buf(),
                    message: error.to_string(),
                });
            },
            Err(_) => {
                return Err(ResolveError::ExtractionFailed {
                    path: path.to_path_buf(),
                    message: format!("extractor timed out after {} ms", timeout.as_millis()),
                });
            },
        };

        debug!("Extracted {} rule(s) from {}", rule_set.len(), path.display());
        let index = Arc::new(ClassIndex::build(rule_set));
        self.cache.insert(path.to_path_buf(), hash, Arc::clone(&index));
        Ok(index)
    }

    fn store(
        &self,
        resolution: Resolution,
    ) {
        match self.resolutions.entry(resolution.uri.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().version <= resolution.version {
                    entry.insert(resolution);
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(resolution);
            },
        }
    }
}

pub(crate) fn short_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or(uri.path()).to_owned()
}

#[cfg(test)]
#[path = "../../tests/src/resolver/orchestrator_tests.rs"]
mod tests;
