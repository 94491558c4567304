use std::path::Path;

use dashmap::DashMap;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};

use super::Document;

/// Thread-safe store of all open documents.
///
/// Uses `DashMap` internally so that all operations are safe to call
/// concurrently from any async task without external synchronisation.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (register) a new document.
    pub fn open(
        &self,
        uri: Url,
        language_id: impl Into<String>,
        text: String,
        version: i32,
    ) {
        self.documents.insert(uri.clone(), Document::new(uri, language_id, text, version));
    }

    /// Apply incremental or full-content changes to an already-open document.
    /// Returns `false` when the document is not open.
    pub fn apply_changes(
        &self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> bool {
        match self.documents.get_mut(uri) {
            Some(mut doc) => {
                doc.apply_changes(changes, version);
                true
            },
            None => false,
        }
    }

    /// Close (unregister) a document.
    pub fn close(
        &self,
        uri: &Url,
    ) -> Option<Document> {
        self.documents.remove(uri).map(|(_, doc)| doc)
    }

    /// Return a clone of the full document text, if the URI is tracked.
    pub fn get_content(
        &self,
        uri: &Url,
    ) -> Option<String> {
        self.documents.get(uri).map(|r| r.value().text.clone())
    }

    pub fn version(
        &self,
        uri: &Url,
    ) -> Option<i32> {
        self.documents.get(uri).map(|r| r.value().version)
    }

    /// Text and version read under one lock.
    pub fn snapshot(
        &self,
        uri: &Url,
    ) -> Option<(String, i32)> {
        self.documents.get(uri).map(|r| (r.value().text.clone(), r.value().version))
    }

    /// Return a clone of the full `Document`, if the URI is tracked.
    pub fn get(
        &self,
        uri: &Url,
    ) -> Option<Document> {
        self.documents.get(uri).map(|r| r.value().clone())
    }

    /// Text of the open document backed by the file at `path`.
    pub fn content_at_path(
        &self,
        path: &Path,
    ) -> Option<String> {
        self.documents
            .iter()
            .find(|r| r.key().to_file_path().is_ok_and(|p| p == path))
            .map(|r| r.value().text.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/document_store_tests.rs"]
mod tests;
