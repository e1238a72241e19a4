//! Save-time normalization: final newline insertion.

use tracing::{debug, warn};

use crate::error::Result;
use crate::host::{EditorHost, Position, TextDocument, TextEdit};
use crate::properties::ResolvedProperties;
use crate::resolver::SettingsProvider;

/// What happened to a saved document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No resolved properties for the document.
    NoSettings,
    /// Nothing to change.
    Unchanged,
    /// A change was due but no visible editor shows the document.
    NoVisibleEditor,
    /// The host declined the edit.
    Rejected,
    /// The edit was applied and the document saved again.
    Normalized,
}

/// The edit that gives `document` a final newline, if one is required.
pub fn final_newline_edit(
    props: &ResolvedProperties,
    document: &dyn TextDocument,
) -> Option<TextEdit> {
    if props.insert_final_newline != Some(true) {
        return None;
    }

    let last_line = document.line_count().checked_sub(1)?;
    let text = document.line_at(last_line)?;
    if text.is_empty() {
        return None;
    }

    Some(TextEdit::insert(
        Position::new(last_line, text.chars().count()),
        props.newline(),
    ))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SaveTransformer;

impl SaveTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a just-saved document and save it again if it changed.
    ///
    /// Callers skip `.editorconfig` files themselves; those trigger a rebuild.
    pub async fn on_save<H>(
        &self,
        host: &H,
        settings: &dyn SettingsProvider,
        document: &dyn TextDocument,
    ) -> Result<SaveOutcome>
    where
        H: EditorHost + ?Sized,
    {
        let path = document.path();
        let Some(props) = settings.settings_for(path) else {
            return Ok(SaveOutcome::NoSettings);
        };
        let Some(edit) = final_newline_edit(&props, document) else {
            return Ok(SaveOutcome::Unchanged);
        };
        let Some(editor) = host.visible_editor_for(path) else {
            debug!(path = %path.display(), "no visible editor, skipping final newline");
            return Ok(SaveOutcome::NoVisibleEditor);
        };

        if !host.apply_edit(editor, edit).await? {
            warn!(path = %path.display(), "host rejected final newline edit");
            return Ok(SaveOutcome::Rejected);
        }
        host.save(path).await?;
        debug!(path = %path.display(), "inserted final newline");
        Ok(SaveOutcome::Normalized)
    }
}
