use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    css::DEFAULT_EXTRACTOR_COMMAND,
    resolver::{DEFAULT_CACHE_ENTRIES, ResolverOptions},
    scan::{DEFAULT_BINDING, is_identifier},
};

pub(crate) const SETTINGS_SECTION_KEY: &str = "css-lens";
pub(crate) const CONFIG_FILENAME: &str = "css-lens.toml";
const MAX_DEBOUNCE_MS: u64 = 5000;
const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 60_000;
const MIN_CACHE_ENTRIES: usize = 1;
const MAX_CACHE_ENTRIES: usize = 1024;
const MIN_LENS_DECLARATIONS: usize = 1;
const MAX_LENS_DECLARATIONS: usize = 20;

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ServerSettings {
    pub(crate) scanner: ScannerSettings,
    pub(crate) resolution: ResolutionSettings,
    pub(crate) extractor: ExtractorSettings,
    pub(crate) cache: CacheSettings,
    pub(crate) lens: LensSettings,
    pub(crate) logging: LoggingSettings,
}

impl ServerSettings {
    pub(crate) fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<ServerSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    /// Merge a `css-lens.toml` document. Keys use the same camelCase names as
    /// the LSP payload; a top-level `[css-lens]` table is accepted too.
    pub(crate) fn merged_with_toml(
        &self,
        content: &str,
    ) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(content)?;
        let value = serde_json::to_value(table).unwrap_or(Value::Null);
        Ok(self.merged_with_payload(&value))
    }

    /// Merge the nearest `css-lens.toml` above `start`, if any. Unreadable
    /// or malformed files are logged and skipped.
    pub(crate) fn merged_with_config_file(
        &self,
        start: &Path,
    ) -> Self {
        let Some(path) = find_config_file(start) else {
            return self.clone();
        };
        let merged = std::fs::read_to_string(&path)
            .map_err(|error| error.to_string())
            .and_then(|content| self.merged_with_toml(&content).map_err(|error| error.to_string()));
        match merged {
            Ok(settings) => settings,
            Err(error) => {
                warn!("Ignoring {}: {error}", path.display());
                self.clone()
            },
        }
    }

    pub(crate) fn to_resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            bindings: self.scanner.bindings.clone(),
            follow_import_binding: self.scanner.follow_import_binding,
            extraction_timeout: Duration::from_millis(self.resolution.timeout_ms),
            cache_max_entries: self.cache.max_entries,
        }
    }

    fn apply_patch(
        &mut self,
        patch: ServerSettingsPatch,
    ) {
        if let Some(scanner) = patch.scanner {
            self.scanner.apply_patch(scanner);
        }
        if let Some(resolution) = patch.resolution {
            self.resolution.apply_patch(resolution);
        }
        if let Some(extractor) = patch.extractor {
            self.extractor.apply_patch(extractor);
        }
        if let Some(cache) = patch.cache {
            self.cache.apply_patch(cache);
        }
        if let Some(lens) = patch.lens {
            self.lens.apply_patch(lens);
        }
        if let Some(logging) = patch.logging {
            self.logging.apply_patch(logging);
        }
    }

    fn normalize(&mut self) {
        self.scanner.normalize();
        self.resolution.normalize();
        self.extractor.normalize();
        self.cache.normalize();
        self.lens.normalize();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScannerSettings {
    pub(crate) bindings: Vec<String>,
    pub(crate) follow_import_binding: bool,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            bindings: vec![DEFAULT_BINDING.to_string()],
            follow_import_binding: true,
        }
    }
}

impl ScannerSettings {
    fn apply_patch(
        &mut self,
        patch: ScannerSettingsPatch,
    ) {
        if let Some(bindings) = patch.bindings {
            self.bindings = bindings;
        }
        if let Some(follow_import_binding) = patch.follow_import_binding {
            self.follow_import_binding = follow_import_binding;
        }
    }

    fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.bindings = self
            .bindings
            .iter()
            .map(|binding| binding.trim().to_string())
            .filter(|binding| is_identifier(binding))
            .filter(|binding| seen.insert(binding.clone()))
            .collect();
        if self.bindings.is_empty() {
            self.bindings = vec![DEFAULT_BINDING.to_string()];
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolutionSettings {
    pub(crate) debounce_ms: u64,
    pub(crate) timeout_ms: u64,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            timeout_ms: 5000,
        }
    }
}

impl ResolutionSettings {
    fn apply_patch(
        &mut self,
        patch: ResolutionSettingsPatch,
    ) {
        if let Some(debounce_ms) = patch.debounce_ms {
            self.debounce_ms = debounce_ms;
        }
        if let Some(timeout_ms) = patch.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
    }

    fn normalize(&mut self) {
        self.debounce_ms = self.debounce_ms.min(MAX_DEBOUNCE_MS);
        self.timeout_ms = self.timeout_ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS);
    }

    pub(crate) fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractorSettings {
    pub(crate) command: String,
    pub(crate) args: Vec<String>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_EXTRACTOR_COMMAND.to_string(),
            args: Vec::new(),
        }
    }
}

impl ExtractorSettings {
    fn apply_patch(
        &mut self,
        patch: ExtractorSettingsPatch,
    ) {
        if let Some(command) = patch.command {
            self.command = command;
        }
        if let Some(args) = patch.args {
            self.args = args;
        }
    }

    fn normalize(&mut self) {
        self.command = self.command.trim().to_string();
        if self.command.is_empty() {
            self.command = DEFAULT_EXTRACTOR_COMMAND.to_string();
        }

        self.args = self.args.iter().map(|arg| arg.trim().to_string()).filter(|arg| !arg.is_empty()).collect();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CacheSettings {
    pub(crate) max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_ENTRIES,
        }
    }
}

impl CacheSettings {
    fn apply_patch(
        &mut self,
        patch: CacheSettingsPatch,
    ) {
        if let Some(max_entries) = patch.max_entries {
            self.max_entries = max_entries;
        }
    }

    fn normalize(&mut self) {
        self.max_entries = self.max_entries.clamp(MIN_CACHE_ENTRIES, MAX_CACHE_ENTRIES);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LensSettings {
    pub(crate) enabled: bool,
    pub(crate) show_unmatched: bool,
    pub(crate) max_declarations: usize,
}

impl Default for LensSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            show_unmatched: false,
            max_declarations: 3,
        }
    }
}

impl LensSettings {
    fn apply_patch(
        &mut self,
        patch: LensSettingsPatch,
    ) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(show_unmatched) = patch.show_unmatched {
            self.show_unmatched = show_unmatched;
        }
        if let Some(max_declarations) = patch.max_declarations {
            self.max_declarations = max_declarations;
        }
    }

    fn normalize(&mut self) {
        self.max_declarations = self.max_declarations.clamp(MIN_LENS_DECLARATIONS, MAX_LENS_DECLARATIONS);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct LoggingSettings {
    pub(crate) level: LoggingLevel,
}

impl LoggingSettings {
    fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        if let Some(level) = patch.level {
            self.level = level;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub(crate) fn allows_info(self) -> bool {
        self >= LoggingLevel::Info
    }

    pub(crate) fn allows_warn(self) -> bool {
        self >= LoggingLevel::Warn
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    scanner: Option<ScannerSettingsPatch>,
    resolution: Option<ResolutionSettingsPatch>,
    extractor: Option<ExtractorSettingsPatch>,
    cache: Option<CacheSettingsPatch>,
    lens: Option<LensSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ScannerSettingsPatch {
    bindings: Option<Vec<String>>,
    follow_import_binding: Option<bool>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ResolutionSettingsPatch {
    debounce_ms: Option<u64>,
    timeout_ms: Option<u64>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ExtractorSettingsPatch {
    command: Option<String>,
    args: Option<Vec<String>>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct CacheSettingsPatch {
    max_entries: Option<usize>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct LensSettingsPatch {
    enabled: Option<bool>,
    show_unmatched: Option<bool>,
    max_declarations: Option<usize>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct LoggingSettingsPatch {
    level: Option<LoggingLevel>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    candidates.push(payload.clone());

    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }

    candidates
}

/// Walks parent directories from `start` looking for `css-lens.toml`.
pub(crate) fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
#[path = "../../tests/src/server/settings_tests.rs"]
mod tests;
