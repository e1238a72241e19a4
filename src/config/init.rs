//! `.editorconfig` generation from the editor's current defaults

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::host::{Notifier, Workspace};
use crate::mapper::{to_declarative, DeclarativeIndent, EditorDefaults};
use crate::properties::EDITORCONFIG_FILENAME;

pub const NO_WORKSPACE_MESSAGE: &str = "Please open a folder before generating an .editorconfig file";
pub const ALREADY_EXISTS_MESSAGE: &str = "An .editorconfig file already exists in your workspace.";

/// Where generated files are written.
pub trait ConfigStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Create `path` with `contents`; fails with `AlreadyExists` if it exists.
    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsConfigStore;

impl ConfigStore for FsConfigStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents.as_bytes())
    }
}

/// Serialize indentation as a root `.editorconfig` with a single `[*]` section.
pub fn render_editorconfig(indent: &DeclarativeIndent) -> String {
    let mut out = String::from("root = true\n\n[*]\n");
    out.push_str(&format!("indent_style = {}\n", indent.indent_style));
    if let Some(size) = indent.indent_size {
        out.push_str(&format!("indent_size = {size}\n"));
    }
    if let Some(width) = indent.tab_width {
        out.push_str(&format!("tab_width = {width}\n"));
    }
    out
}

/// Write an `.editorconfig` describing `defaults` at the workspace root.
///
/// Returns the path of the created file.
pub fn generate_editorconfig(
    root: Option<&Path>,
    defaults: EditorDefaults,
    store: &dyn ConfigStore,
) -> Result<PathBuf> {
    let root = root.ok_or(Error::NoWorkspaceOpen)?;
    let path = root.join(EDITORCONFIG_FILENAME);

    if store.exists(&path) {
        return Err(Error::ConfigAlreadyExists(path));
    }

    let contents = render_editorconfig(&to_declarative(defaults));
    match store.create_new(&path, &contents) {
        Ok(()) => {
            info!(path = %path.display(), "generated editorconfig");
            Ok(path)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(Error::ConfigAlreadyExists(path)),
        Err(source) => Err(Error::Write { path, source }),
    }
}

/// Run the generator and report the result through `notifier`.
pub fn run_generate_command(
    workspace: &dyn Workspace,
    notifier: &dyn Notifier,
    store: &dyn ConfigStore,
) -> Result<PathBuf> {
    let root = workspace.root_path();
    let result = generate_editorconfig(root.as_deref(), workspace.editor_defaults(), store);

    match &result {
        Ok(_) => {}
        Err(Error::NoWorkspaceOpen) => notifier.info(NO_WORKSPACE_MESSAGE),
        Err(Error::ConfigAlreadyExists(_)) => notifier.info(ALREADY_EXISTS_MESSAGE),
        Err(e) => notifier.error(&e.to_string()),
    }
    result
}
