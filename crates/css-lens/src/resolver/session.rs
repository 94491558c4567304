use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use tokio::{sync::Mutex, task::JoinHandle};
use tower_lsp::lsp_types::Url;
use tracing::debug;

use super::{
    host::{EditorHost, HostEvent},
    orchestrator::{Resolution, Resolver, short_name},
};

/// Drives a [`Resolver`] from host events.
///
/// Text changes are debounced: each change supersedes the previous version
/// right away, and the run only starts once the document has been quiet for
/// the debounce interval. Results reach the host only while their version
/// is still the latest one, and never after a newer version was applied.
pub struct LensSession<H> {
    resolver: Arc<Resolver>,
    host: Arc<H>,
    debounce_ms: Arc<AtomicU64>,
    /// Last version handed to the host, per document. The lock is held from
    /// the freshness check until `apply_annotations` returns.
    applied: Arc<DashMap<Url, Arc<Mutex<i32>>>>,
}

impl<H> Clone for LensSession<H> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            host: Arc::clone(&self.host),
            debounce_ms: Arc::clone(&self.debounce_ms),
            applied: Arc::clone(&self.applied),
        }
    }
}

impl<H: EditorHost + 'static> LensSession<H> {
    pub fn new(
        resolver: Arc<Resolver>,
        host: Arc<H>,
    ) -> Self {
        Self {
            resolver,
            host,
            debounce_ms: Arc::new(AtomicU64::new(0)),
            applied: Arc::new(DashMap::new()),
        }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.load(Ordering::Relaxed))
    }

    pub fn set_debounce(
        &self,
        debounce: Duration,
    ) {
        let millis = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self.debounce_ms.store(millis, Ordering::Relaxed);
    }

    /// React to a host event. Events for documents other than the active
    /// one are ignored.
    ///
    /// The returned task yields the resolution that was applied to the host,
    /// or `None` when the run was superseded or skipped.
    pub fn handle_event(
        &self,
        event: HostEvent,
    ) -> Option<JoinHandle<Option<Resolution>>> {
        let uri = event.uri().clone();
        if self.host.active_document_uri().as_ref() != Some(&uri) {
            debug!("Ignoring event for inactive document {}", short_name(&uri));
            return None;
        }

        match event {
            HostEvent::ActiveEditorChanged {
                ..
            } => self.refresh(uri),
            HostEvent::DocumentTextChanged {
                version, ..
            } => Some(self.schedule(uri, version, self.debounce())),
        }
    }

    /// Resolve the current version of `uri` immediately, active or not.
    pub fn refresh(
        &self,
        uri: Url,
    ) -> Option<JoinHandle<Option<Resolution>>> {
        let version = self.host.document_version(&uri)?;
        Some(self.schedule(uri, version, Duration::ZERO))
    }

    /// Drop all state for a closed document.
    pub fn forget(
        &self,
        uri: &Url,
    ) {
        self.resolver.forget(uri);
        self.applied.remove(uri);
    }

    fn schedule(
        &self,
        uri: Url,
        version: i32,
        delay: Duration,
    ) -> JoinHandle<Option<Resolution>> {
        self.resolver.record_version(&uri, version);
        let resolver = Arc::clone(&self.resolver);
        let host = Arc::clone(&self.host);
        let applied = Arc::clone(&self.applied);

        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
                if !resolver.is_current(&uri, version) {
                    debug!("Debounced {} v{version}", short_name(&uri));
                    return None;
                }
            }

            let (text, current) = host.document_snapshot(&uri)?;
            if current != version {
                debug!("Host moved {} from v{version} to v{current}", short_name(&uri));
                return None;
            }

            let resolution = resolver.resolve(host.as_ref(), &uri, &text, version).await.into_resolution()?;
            let slot = Arc::clone(&*applied.entry(uri.clone()).or_insert_with(|| Arc::new(Mutex::new(i32::MIN))));
            let mut last_applied = slot.lock().await;
            if !resolver.is_current(&uri, version) || *last_applied > version {
                debug!("Not applying {} v{version}: superseded", short_name(&uri));
                return None;
            }
            host.apply_annotations(&uri, &resolution).await;
            *last_applied = version;
            Some(resolution)
        })
    }
}
