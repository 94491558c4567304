use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::Client;

use crate::{
    css::{CommandExtractor, RuleExtractor},
    document::DocumentStore,
    resolver::{LensSession, Resolver},
    server::{
        host::{ClientSink, LspHost},
        settings::ServerSettings,
    },
};

/// The css-lens backend that implements the Language Server Protocol.
pub struct CssLensServer {
    /// The LSP client handle, used for log messages and lens refreshes.
    pub(crate) client: Client,

    /// Thread-safe store of all open documents.
    pub(crate) document_store: Arc<DocumentStore>,

    /// Editor-host view over the client and the document store.
    pub(crate) host: Arc<LspHost>,

    /// Debounced resolver runs for host events.
    pub(crate) session: LensSession<LspHost>,

    pub(crate) sink: Arc<ClientSink>,

    /// Runtime server settings updated from LSP configuration.
    pub(crate) settings: Arc<RwLock<ServerSettings>>,

    /// Extractor fixed at startup; `extractor.*` settings are ignored.
    pinned_extractor: bool,
}

impl CssLensServer {
    /// Create a server that runs the configured extractor command.
    pub fn new(client: Client) -> Self {
        Self::build(client, Arc::new(CommandExtractor::default()), false)
    }

    /// Create a server with a fixed rule extractor.
    pub fn with_extractor(
        client: Client,
        extractor: Arc<dyn RuleExtractor>,
    ) -> Self {
        Self::build(client, extractor, true)
    }

    fn build(
        client: Client,
        extractor: Arc<dyn RuleExtractor>,
        pinned_extractor: bool,
    ) -> Self {
        let settings = ServerSettings::default();
        let document_store = Arc::new(DocumentStore::new());
        let host = Arc::new(LspHost::new(client.clone(), Arc::clone(&document_store)));
        let sink = Arc::new(ClientSink::new(client.clone()));
        let resolver = Arc::new(Resolver::new(extractor, sink.clone(), settings.to_resolver_options()));
        let session = LensSession::new(resolver, Arc::clone(&host));
        session.set_debounce(settings.resolution.debounce());

        Self {
            client,
            document_store,
            host,
            session,
            sink,
            settings: Arc::new(RwLock::new(settings)),
            pinned_extractor,
        }
    }

    pub(crate) fn resolver(&self) -> &Arc<Resolver> {
        self.session.resolver()
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        let previous = self.settings_snapshot().await;

        self.resolver().set_options(settings.to_resolver_options()).await;
        self.session.set_debounce(settings.resolution.debounce());
        self.sink.set_forwarding(settings.logging.level.allows_warn());
        if !self.pinned_extractor && previous.extractor != settings.extractor {
            let extractor = CommandExtractor::new(settings.extractor.command.clone(), settings.extractor.args.clone());
            self.resolver().set_extractor(Arc::new(extractor)).await;
        }

        *self.settings.write().await = settings;
    }
}
