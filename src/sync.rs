//! Applies resolved properties to the active editor.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::host::{EditorHost, EditorId, Notifier};
use crate::mapper::{from_declarative, EditorOptions};
use crate::resolver::SettingsProvider;

/// How long the applied options stay in the status bar.
pub const STATUS_DURATION: Duration = Duration::from_millis(1500);

/// Keeps each editor's pre-override options so that repeated application
/// always maps against the same defaults.
#[derive(Debug, Default)]
pub struct EditorSyncController {
    snapshots: Mutex<HashMap<EditorId, EditorOptions>>,
}

impl EditorSyncController {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshots(&self) -> MutexGuard<'_, HashMap<EditorId, EditorOptions>> {
        self.snapshots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the cached properties for `editor`'s document.
    ///
    /// Returns the applied options, or `None` when the editor was left as is.
    pub fn apply<H>(
        &self,
        editor: EditorId,
        host: &H,
        settings: &dyn SettingsProvider,
    ) -> Option<EditorOptions>
    where
        H: EditorHost + Notifier + ?Sized,
    {
        let document = host.editor_document(editor)?;
        if document.is_untitled() {
            return None;
        }
        let props = settings.settings_for(document.path())?;

        let defaults = match self.snapshot(editor) {
            Some(snapshot) => snapshot,
            None => {
                let current = host.editor_options(editor)?;
                *self.snapshots().entry(editor).or_insert(current)
            }
        };

        let options = from_declarative(&props, defaults);
        debug!(
            editor = editor.0,
            path = %document.path().display(),
            %options,
            "applying editorconfig"
        );
        host.set_editor_options(editor, options);
        host.status(&format!("EditorConfig: {options}"), STATUS_DURATION);
        Some(options)
    }

    /// Apply to the host's active editor, if any.
    pub fn apply_active<H>(&self, host: &H, settings: &dyn SettingsProvider) -> Option<EditorOptions>
    where
        H: EditorHost + Notifier + ?Sized,
    {
        let editor = host.active_editor()?;
        self.apply(editor, host, settings)
    }

    pub fn forget(&self, editor: EditorId) {
        self.snapshots().remove(&editor);
    }

    pub fn snapshot(&self, editor: EditorId) -> Option<EditorOptions> {
        self.snapshots().get(&editor).copied()
    }

    pub fn clear(&self) {
        self.snapshots().clear();
    }
}
