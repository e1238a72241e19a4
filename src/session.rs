//! Wires the resolver, sync controller and save transform to host events.

use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info};

use crate::config::{run_generate_command, ConfigStore, EditorConfigParser};
use crate::error::Result;
use crate::host::{EditorId, Host, TextDocument};
use crate::mapper::EditorOptions;
use crate::properties::is_editorconfig_file;
use crate::resolver::ConfigResolver;
use crate::save::{SaveOutcome, SaveTransformer};
use crate::sync::EditorSyncController;

/// Events a host forwards to the session.
#[derive(Clone)]
pub enum HostEvent {
    DocumentOpened(Arc<dyn TextDocument>),
    DocumentSaved(Arc<dyn TextDocument>),
    ActiveEditorChanged(Option<EditorId>),
    EditorClosed(EditorId),
}

pub struct Session<P, H> {
    resolver: ConfigResolver<P>,
    sync: EditorSyncController,
    save: SaveTransformer,
    host: Arc<H>,
}

impl<P: EditorConfigParser, H: Host> Session<P, H> {
    pub fn new(parser: P, host: Arc<H>) -> Self {
        Self {
            resolver: ConfigResolver::new(parser),
            sync: EditorSyncController::new(),
            save: SaveTransformer::new(),
            host,
        }
    }

    pub fn resolver(&self) -> &ConfigResolver<P> {
        &self.resolver
    }

    pub fn sync(&self) -> &EditorSyncController {
        &self.sync
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Resolve every open document and sync the active editor.
    pub async fn start(&self) -> usize {
        let resolved = self.rebuild().await;
        self.sync_active();
        resolved
    }

    pub async fn dispatch(&self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::DocumentOpened(document) => self.on_document_opened(&*document).await,
            HostEvent::DocumentSaved(document) => {
                let outcome = self.on_document_saved(&*document).await?;
                debug!(path = %document.path().display(), ?outcome, "handled save");
            }
            HostEvent::ActiveEditorChanged(editor) => {
                self.on_active_editor_changed(editor);
            }
            HostEvent::EditorClosed(editor) => self.on_editor_closed(editor),
        }
        Ok(())
    }

    /// Resolve a newly opened document. Parse failures are logged only.
    pub async fn on_document_opened(&self, document: &dyn TextDocument) {
        if document.is_untitled() {
            return;
        }
        if let Err(e) = self.resolver.resolve(document.path()).await {
            debug!(path = %document.path().display(), error = %e, "open left cache unchanged");
        }
        self.sync_active();
    }

    /// Returns `None` when the saved file was an `.editorconfig`, which
    /// rebuilds the whole cache instead of normalizing the file.
    pub async fn on_document_saved(
        &self,
        document: &dyn TextDocument,
    ) -> Result<Option<SaveOutcome>> {
        if is_editorconfig_file(document.path()) {
            self.rebuild().await;
            return Ok(None);
        }

        let outcome = self
            .save
            .on_save(&*self.host, &self.resolver, document)
            .await?;
        Ok(Some(outcome))
    }

    pub fn on_active_editor_changed(&self, editor: Option<EditorId>) -> Option<EditorOptions> {
        let editor = editor?;
        self.sync.apply(editor, &*self.host, &self.resolver)
    }

    pub fn on_editor_closed(&self, editor: EditorId) {
        self.sync.forget(editor);
    }

    /// Clear the cache and re-resolve every open document, syncing the
    /// active editor as each resolution completes.
    ///
    /// Returns how many documents resolved successfully.
    pub async fn rebuild(&self) -> usize {
        let open_paths = self.open_paths();
        let total = open_paths.len();
        let mut completions = pin!(self.resolver.invalidate_all(open_paths));

        let mut resolved = 0;
        while let Some((_, outcome)) = completions.next().await {
            if outcome.is_ok() {
                resolved += 1;
            }
            self.sync_active();
        }

        info!(resolved, total, "rebuilt editorconfig cache");
        resolved
    }

    pub fn generate_config(&self, store: &dyn ConfigStore) -> Result<PathBuf> {
        run_generate_command(&*self.host, &*self.host, store)
    }

    /// Drop cached properties and editor snapshots.
    pub fn dispose(&self) {
        self.resolver.clear();
        self.sync.clear();
    }

    fn sync_active(&self) -> Option<EditorOptions> {
        self.sync.apply_active(&*self.host, &self.resolver)
    }

    fn open_paths(&self) -> Vec<PathBuf> {
        self.host
            .open_documents()
            .iter()
            .filter(|document| !document.is_untitled())
            .map(|document| document.path().to_path_buf())
            .collect()
    }
}
