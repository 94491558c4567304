use std::path::{Component, Path, PathBuf};

use tower_lsp::{async_trait, lsp_types::Url};

use super::orchestrator::Resolution;

/// What the resolver needs from the editor, and where results go.
///
/// The host owns documents, workspace layout and rendering. The resolver
/// only reads through this trait and hands back finished [`Resolution`]s.
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Document shown in the focused editor, if any.
    fn active_document_uri(&self) -> Option<Url>;

    /// Current text of an open document.
    fn document_text(
        &self,
        uri: &Url,
    ) -> Option<String>;

    /// Current version of an open document.
    fn document_version(
        &self,
        uri: &Url,
    ) -> Option<i32>;

    /// Text and version of an open document read together. Hosts whose
    /// documents can change between the two reads should override this.
    fn document_snapshot(
        &self,
        uri: &Url,
    ) -> Option<(String, i32)> {
        Some((self.document_text(uri)?, self.document_version(uri)?))
    }

    /// Map an import specifier, as written in `document_uri`, to a file.
    fn resolve_absolute_path(
        &self,
        document_uri: &Url,
        imported_path: &str,
    ) -> Option<PathBuf>;

    /// Read the stylesheet at `path`. Hosts with unsaved buffers override this.
    fn read_css_source(
        &self,
        path: &Path,
    ) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Receive a finished resolution for display.
    async fn apply_annotations(
        &self,
        uri: &Url,
        resolution: &Resolution,
    );

    fn active_document_text(&self) -> Option<String> {
        self.active_document_uri().and_then(|uri| self.document_text(&uri))
    }

    fn active_document_version(&self) -> Option<i32> {
        self.active_document_uri().and_then(|uri| self.document_version(&uri))
    }
}

/// Editor notifications that can trigger a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ActiveEditorChanged { uri: Url },
    DocumentTextChanged { uri: Url, version: i32 },
}

impl HostEvent {
    pub fn uri(&self) -> &Url {
        match self {
            HostEvent::ActiveEditorChanged {
                uri,
            }
            | HostEvent::DocumentTextChanged {
                uri, ..
            } => uri,
        }
    }
}

/// Resolve an import specifier relative to the importing file.
///
/// Relative specifiers (`./`, `../`) are joined with the document's
/// directory and absolute ones are taken as-is. Bare specifiers
/// (`some-package/styles.css`) are looked up under `node_modules` of each
/// search root, nearest first. The result is normalized lexically and is not
/// checked for existence, except for the `node_modules` lookup.
pub fn resolve_import_path(
    document_path: &Path,
    specifier: &str,
    search_roots: &[PathBuf],
) -> Option<PathBuf> {
    let specifier = specifier.split(['?', '#']).next().unwrap_or(specifier);
    if specifier.is_empty() {
        return None;
    }

    if specifier.starts_with("./") || specifier.starts_with("../") {
        let base = document_path.parent()?;
        return Some(normalize_lexically(&base.join(specifier)));
    }

    let as_path = Path::new(specifier);
    if as_path.is_absolute() {
        return Some(normalize_lexically(as_path));
    }

    let ancestors = document_path.parent().into_iter().flat_map(Path::ancestors);
    ancestors
        .chain(search_roots.iter().map(PathBuf::as_path))
        .map(|dir| dir.join("node_modules").join(specifier))
        .find(|candidate| candidate.is_file())
        .map(|candidate| normalize_lexically(&candidate))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            },
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
#[path = "../../tests/src/resolver/host_tests.rs"]
mod tests;
