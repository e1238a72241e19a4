//! In-process host backed by in-memory buffers.
//!
//! Used by the CLI to run files through the same event flow an editor would,
//! and by tests to observe edits, saves and messages.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{EditorHost, EditorId, Notifier, TextDocument, TextEdit, Workspace};
use crate::error::{Error, Result};
use crate::mapper::{EditorDefaults, EditorOptions};

/// Immutable text snapshot. Edits produce a new snapshot.
#[derive(Debug, Clone)]
pub struct BufferDocument {
    path: PathBuf,
    untitled: bool,
    text: String,
    lines: Vec<Range<usize>>,
}

impl BufferDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            path: path.into(),
            untitled: false,
            lines: line_ranges(&text),
            text,
        }
    }

    pub fn untitled(name: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            untitled: true,
            ..Self::new(name, text)
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `None` if the position is outside the document.
    pub fn with_insert(&self, edit: &TextEdit) -> Option<Self> {
        let range = self.lines.get(edit.position.line)?;
        let line = &self.text[range.clone()];
        let column = if edit.position.character == line.chars().count() {
            line.len()
        } else {
            line.char_indices().nth(edit.position.character)?.0
        };

        let offset = range.start + column;
        let mut text = String::with_capacity(self.text.len() + edit.text.len());
        text.push_str(&self.text[..offset]);
        text.push_str(&edit.text);
        text.push_str(&self.text[offset..]);

        Some(Self {
            lines: line_ranges(&text),
            text,
            path: self.path.clone(),
            untitled: self.untitled,
        })
    }
}

impl TextDocument for BufferDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_untitled(&self) -> bool {
        self.untitled
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_at(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(|range| &self.text[range.clone()])
    }
}

/// Byte ranges of each line, excluding `\n`, `\r\n` or `\r` terminators.
/// Text ending in a terminator has a trailing empty line.
fn line_ranges(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut ranges = vec![];
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                ranges.push(start..i);
                i += 1;
                start = i;
            }
            b'\r' => {
                ranges.push(start..i);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    ranges.push(start..text.len());
    ranges
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    Status { text: String, duration: Duration },
    Info(String),
    Error(String),
}

#[derive(Debug)]
struct EditorEntry {
    path: PathBuf,
    options: EditorOptions,
    visible: bool,
}

#[derive(Debug, Default)]
struct State {
    documents: BTreeMap<PathBuf, Arc<BufferDocument>>,
    editors: BTreeMap<EditorId, EditorEntry>,
    active: Option<EditorId>,
    next_editor: u64,
    messages: Vec<HostMessage>,
    edits: Vec<(EditorId, TextEdit)>,
    saves: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<State>,
    root: Option<PathBuf>,
    defaults: EditorDefaults,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_defaults(mut self, defaults: EditorDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open_document(&self, document: BufferDocument) -> Arc<BufferDocument> {
        let document = Arc::new(document);
        self.state()
            .documents
            .insert(document.path().to_path_buf(), document.clone());
        document
    }

    pub fn close_document(&self, path: &Path) {
        let mut state = self.state();
        state.documents.remove(path);
        state.editors.retain(|_, editor| editor.path != path);
        if state.active.is_some_and(|id| !state.editors.contains_key(&id)) {
            state.active = None;
        }
    }

    /// Open a visible editor on an already opened document.
    pub fn open_editor(&self, path: impl Into<PathBuf>, options: EditorOptions) -> EditorId {
        let mut state = self.state();
        let id = EditorId(state.next_editor);
        state.next_editor += 1;
        state.editors.insert(
            id,
            EditorEntry {
                path: path.into(),
                options,
                visible: true,
            },
        );
        id
    }

    pub fn close_editor(&self, editor: EditorId) {
        let mut state = self.state();
        state.editors.remove(&editor);
        if state.active == Some(editor) {
            state.active = None;
        }
    }

    pub fn set_visible(&self, editor: EditorId, visible: bool) {
        if let Some(entry) = self.state().editors.get_mut(&editor) {
            entry.visible = visible;
        }
    }

    pub fn focus(&self, editor: Option<EditorId>) {
        self.state().active = editor;
    }

    pub fn document(&self, path: &Path) -> Option<Arc<BufferDocument>> {
        self.state().documents.get(path).cloned()
    }

    pub fn messages(&self) -> Vec<HostMessage> {
        self.state().messages.clone()
    }

    pub fn edits(&self) -> Vec<(EditorId, TextEdit)> {
        self.state().edits.clone()
    }

    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.state().saves.clone()
    }
}

#[async_trait]
impl EditorHost for MemoryHost {
    fn active_editor(&self) -> Option<EditorId> {
        self.state().active
    }

    fn editor_document(&self, editor: EditorId) -> Option<Arc<dyn TextDocument>> {
        let state = self.state();
        let entry = state.editors.get(&editor)?;
        let document = state.documents.get(&entry.path)?.clone();
        Some(document as Arc<dyn TextDocument>)
    }

    fn editor_options(&self, editor: EditorId) -> Option<EditorOptions> {
        self.state().editors.get(&editor).map(|entry| entry.options)
    }

    fn set_editor_options(&self, editor: EditorId, options: EditorOptions) {
        if let Some(entry) = self.state().editors.get_mut(&editor) {
            entry.options = options;
        }
    }

    fn visible_editor_for(&self, path: &Path) -> Option<EditorId> {
        self.state()
            .editors
            .iter()
            .find(|(_, entry)| entry.visible && entry.path == path)
            .map(|(id, _)| *id)
    }

    fn open_documents(&self) -> Vec<Arc<dyn TextDocument>> {
        self.state()
            .documents
            .values()
            .map(|document| document.clone() as Arc<dyn TextDocument>)
            .collect()
    }

    async fn apply_edit(&self, editor: EditorId, edit: TextEdit) -> Result<bool> {
        let mut state = self.state();
        let path = state
            .editors
            .get(&editor)
            .map(|entry| entry.path.clone())
            .ok_or_else(|| Error::Host(format!("unknown editor {}", editor.0)))?;
        let document = state
            .documents
            .get(&path)
            .ok_or_else(|| Error::Host(format!("no document for {}", path.display())))?;

        let Some(updated) = document.with_insert(&edit) else {
            return Ok(false);
        };
        state.documents.insert(path, Arc::new(updated));
        state.edits.push((editor, edit));
        Ok(true)
    }

    async fn save(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        if !state.documents.contains_key(path) {
            return Err(Error::Host(format!("{} is not open", path.display())));
        }
        state.saves.push(path.to_path_buf());
        Ok(())
    }
}

impl Notifier for MemoryHost {
    fn status(&self, message: &str, duration: Duration) {
        debug!(text = message, "status");
        self.state().messages.push(HostMessage::Status {
            text: message.to_string(),
            duration,
        });
    }

    fn info(&self, message: &str) {
        self.state()
            .messages
            .push(HostMessage::Info(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.state()
            .messages
            .push(HostMessage::Error(message.to_string()));
    }
}

impl Workspace for MemoryHost {
    fn root_path(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn editor_defaults(&self) -> EditorDefaults {
        self.defaults
    }
}
