//! Host editor surfaces consumed by the sync controller, the save transform
//! and the generator.

mod memory;

pub use memory::{BufferDocument, HostMessage, MemoryHost};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::mapper::{EditorDefaults, EditorOptions};

/// A document as seen by the host.
pub trait TextDocument: Send + Sync {
    fn path(&self) -> &Path;

    /// Untitled documents have no stable path and are never resolved.
    fn is_untitled(&self) -> bool;

    fn line_count(&self) -> usize;

    /// Line text without its terminator.
    fn line_at(&self, line: usize) -> Option<&str>;
}

/// Identity of an editor view. Stable for the lifetime of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

/// Zero-based line and character (not byte) offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// An insertion of `text` at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub position: Position,
    pub text: String,
}

impl TextEdit {
    pub fn insert(position: Position, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

#[async_trait]
pub trait EditorHost: Send + Sync {
    fn active_editor(&self) -> Option<EditorId>;

    fn editor_document(&self, editor: EditorId) -> Option<Arc<dyn TextDocument>>;

    fn editor_options(&self, editor: EditorId) -> Option<EditorOptions>;

    fn set_editor_options(&self, editor: EditorId, options: EditorOptions);

    /// A currently visible editor showing the document at `path`.
    fn visible_editor_for(&self, path: &Path) -> Option<EditorId>;

    fn open_documents(&self) -> Vec<Arc<dyn TextDocument>>;

    /// Returns `false` if the host declined the edit.
    async fn apply_edit(&self, editor: EditorId, edit: TextEdit) -> Result<bool>;

    async fn save(&self, path: &Path) -> Result<()>;
}

/// Transient status and user-facing messages.
pub trait Notifier: Send + Sync {
    fn status(&self, message: &str, duration: Duration);
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

pub trait Workspace: Send + Sync {
    fn root_path(&self) -> Option<PathBuf>;
    fn editor_defaults(&self) -> EditorDefaults;
}

/// Everything a session needs from its host.
pub trait Host: EditorHost + Notifier + Workspace {}

impl<T: EditorHost + Notifier + Workspace + ?Sized> Host for T {}
