use std::{
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
};

use futures::FutureExt;
use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info};

use crate::{
    resolver::{EditorHost, HostEvent, orchestrator::short_name},
    server::{lens::code_lenses, settings::ServerSettings, state::CssLensServer},
};

const CLIENT_NOTIFICATION_PREFIX: &str = "css-lens:";

#[tower_lsp::async_trait]
impl LanguageServer for CssLensServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing css-lens...");

        let roots = workspace_roots(&params);
        let mut settings = ServerSettings::default();
        if let Some(root) = roots.first() {
            settings = settings.merged_with_config_file(root);
        }
        if let Some(options) = params.initialization_options.as_ref() {
            settings = settings.merged_with_payload(options);
        }
        self.apply_settings(settings).await;
        self.host.set_workspace_roots(roots);

        let refresh_supported = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.code_lens.as_ref())
            .and_then(|code_lens| code_lens.refresh_support)
            .unwrap_or(false);
        self.host.set_refresh_supported(refresh_supported);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "css-lens".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        info!("css-lens initialized");
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }

        self.apply_settings(merged).await;
        info!("Applied updated css-lens settings");

        if let Some(active) = self.host.active_document_uri() {
            self.session.refresh(active);
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down css-lens");
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let document = params.text_document;
        let uri = document.uri;
        let filename = short_name(&uri);
        info!("Opened {filename} (v{}, {} bytes)", document.version, document.text.len());
        if self.settings_snapshot().await.logging.level.allows_info() {
            let _ = AssertUnwindSafe(
                self.client.log_message(MessageType::INFO, prefixed_client_message(format!("Opened {filename}"))),
            )
            .catch_unwind()
            .await;
        }

        self.document_store.open(uri.clone(), document.language_id, document.text, document.version);
        self.on_document_updated(&uri, true).await;
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        if !self.document_store.apply_changes(&uri, params.content_changes, version) {
            debug!("Change for unknown document {}", short_name(&uri));
            return;
        }
        self.on_document_updated(&uri, false).await;
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        debug!("Closed {}", short_name(&uri));

        let closed = self.document_store.close(&uri);
        self.session.forget(&uri);
        self.host.clear_active(&uri);

        // Dependents fall back to the stylesheet on disk.
        if closed.is_some_and(|document| document.is_stylesheet())
            && let Ok(path) = uri.to_file_path()
        {
            self.resolver().cache().invalidate(&path);
            self.refresh_dependents(&uri, &path);
        }
    }

    async fn code_lens(
        &self,
        params: CodeLensParams,
    ) -> Result<Option<Vec<CodeLens>>> {
        let uri = params.text_document.uri;
        let settings = self.settings_snapshot().await;
        if !settings.lens.enabled {
            return Ok(None);
        }
        if !self.document_store.get(&uri).is_some_and(|document| document.is_resolvable()) {
            return Ok(None);
        }

        let annotations = self.resolver().provide_annotations_for_lens(self.host.as_ref(), &uri).await;
        let Some(document) = self.document_store.get(&uri) else {
            return Ok(None);
        };
        let lenses = code_lenses(&document, &annotations, &settings.lens);
        debug!("Returning {} lens(es) for {} (v{})", lenses.len(), short_name(&uri), document.version);
        Ok(Some(lenses))
    }
}

impl CssLensServer {
    /// Route an opened or edited document: JSX/TSX documents become active
    /// and are resolved, stylesheets re-resolve the documents importing them.
    async fn on_document_updated(
        &self,
        uri: &Url,
        opened: bool,
    ) {
        let Some(document) = self.document_store.get(uri) else {
            return;
        };

        if document.is_resolvable() {
            let switched = self.host.set_active(uri);
            let event = if opened || switched {
                HostEvent::ActiveEditorChanged {
                    uri: uri.clone(),
                }
            } else {
                HostEvent::DocumentTextChanged {
                    uri: uri.clone(),
                    version: document.version,
                }
            };
            self.session.handle_event(event);
        } else if document.is_stylesheet()
            && let Ok(path) = uri.to_file_path()
        {
            self.refresh_dependents(uri, &path);
        }
    }

    fn refresh_dependents(
        &self,
        stylesheet: &Url,
        path: &Path,
    ) {
        for dependent in self.resolver().documents_importing(path) {
            debug!("{} changed, re-resolving {}", short_name(stylesheet), short_name(&dependent));
            self.session.refresh(dependent);
        }
    }
}

fn workspace_roots(params: &InitializeParams) -> Vec<PathBuf> {
    match params.workspace_folders.as_ref() {
        Some(folders) => folders.iter().filter_map(|folder| folder.uri.to_file_path().ok()).collect(),
        None => params.root_uri.as_ref().and_then(|uri| uri.to_file_path().ok()).into_iter().collect(),
    }
}

pub(crate) fn prefixed_client_message(message: impl AsRef<str>) -> String {
    format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref())
}
