use std::{
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError, RwLock,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::FutureExt;
use tower_lsp::{
    Client, async_trait,
    lsp_types::{MessageType, Url},
};
use tracing::{debug, warn};

use crate::{
    document::DocumentStore,
    resolver::{DiagnosticSink, EditorHost, Resolution, ResolveError, orchestrator::short_name, resolve_import_path},
    server::handler::prefixed_client_message,
};

/// [`EditorHost`] backed by the LSP client and the open-document store.
pub(crate) struct LspHost {
    client: Client,
    documents: Arc<DocumentStore>,
    active: Mutex<Option<Url>>,
    workspace_roots: RwLock<Vec<PathBuf>>,
    refresh_supported: AtomicBool,
}

impl LspHost {
    pub(crate) fn new(
        client: Client,
        documents: Arc<DocumentStore>,
    ) -> Self {
        Self {
            client,
            documents,
            active: Mutex::new(None),
            workspace_roots: RwLock::new(Vec::new()),
            refresh_supported: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_active(
        &self,
        uri: &Url,
    ) -> bool {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref() == Some(uri) {
            return false;
        }
        *active = Some(uri.clone());
        true
    }

    pub(crate) fn clear_active(
        &self,
        uri: &Url,
    ) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref() == Some(uri) {
            *active = None;
        }
    }

    pub(crate) fn set_workspace_roots(
        &self,
        roots: Vec<PathBuf>,
    ) {
        *self.workspace_roots.write().unwrap_or_else(PoisonError::into_inner) = roots;
    }

    pub(crate) fn workspace_roots(&self) -> Vec<PathBuf> {
        self.workspace_roots.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn set_refresh_supported(
        &self,
        supported: bool,
    ) {
        self.refresh_supported.store(supported, Ordering::Relaxed);
    }
}

#[async_trait]
impl EditorHost for LspHost {
    fn active_document_uri(&self) -> Option<Url> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn document_text(
        &self,
        uri: &Url,
    ) -> Option<String> {
        self.documents.get_content(uri)
    }

    fn document_version(
        &self,
        uri: &Url,
    ) -> Option<i32> {
        self.documents.version(uri)
    }

    fn document_snapshot(
        &self,
        uri: &Url,
    ) -> Option<(String, i32)> {
        self.documents.snapshot(uri)
    }

    fn resolve_absolute_path(
        &self,
        document_uri: &Url,
        imported_path: &str,
    ) -> Option<PathBuf> {
        let document_path = document_uri.to_file_path().ok()?;
        resolve_import_path(&document_path, imported_path, &self.workspace_roots())
    }

    fn read_css_source(
        &self,
        path: &Path,
    ) -> std::io::Result<String> {
        match self.documents.content_at_path(path) {
            Some(text) => Ok(text),
            None => std::fs::read_to_string(path),
        }
    }

    async fn apply_annotations(
        &self,
        uri: &Url,
        resolution: &Resolution,
    ) {
        debug!("Applying {} annotation(s) to {uri} (v{})", resolution.annotations.len(), resolution.version);
        if !self.refresh_supported.load(Ordering::Relaxed) {
            return;
        }
        let result = AssertUnwindSafe(self.client.code_lens_refresh()).catch_unwind().await;
        match result {
            Ok(Ok(())) => {},
            Ok(Err(error)) => debug!("codeLens refresh rejected: {error}"),
            Err(_) => warn!("code_lens_refresh panicked (client may have disconnected)"),
        }
    }
}

/// Forwards resolution failures to the client's output log.
pub(crate) struct ClientSink {
    client: Client,
    forward: AtomicBool,
}

impl ClientSink {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            forward: AtomicBool::new(true),
        }
    }

    pub(crate) fn set_forwarding(
        &self,
        forward: bool,
    ) {
        self.forward.store(forward, Ordering::Relaxed);
    }
}

impl DiagnosticSink for ClientSink {
    fn report(
        &self,
        uri: &Url,
        error: &ResolveError,
    ) {
        warn!("No CSS context for {uri}: {error}");
        if !self.forward.load(Ordering::Relaxed) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let client = self.client.clone();
        let message = prefixed_client_message(format!("{}: {error}", short_name(uri)));
        runtime.spawn(async move {
            let _ = AssertUnwindSafe(client.log_message(MessageType::WARNING, message)).catch_unwind().await;
        });
    }
}
