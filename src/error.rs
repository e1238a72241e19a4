//! Error types shared by the resolver, the save transform and the generator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while resolving, mapping or writing editor settings.
#[derive(Error, Debug)]
pub enum Error {
    /// The parser rejected the file or returned unusable data.
    #[error("failed to parse editorconfig for {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A width property that is not a positive integer.
    #[error("invalid {key} value \"{value}\": expected a positive integer")]
    InvalidResolvedSize { key: &'static str, value: String },

    /// The generator needs a workspace root.
    #[error("no workspace folder is open")]
    NoWorkspaceOpen,

    /// The generator refuses to overwrite an existing file.
    #[error("{} already exists", .0.display())]
    ConfigAlreadyExists(PathBuf),

    /// Writing a generated file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The host could not apply an edit or save a document.
    #[error("host error: {0}")]
    Host(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for ecsync operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
