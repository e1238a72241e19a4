//! Per-path cache of resolved `.editorconfig` properties.
//!
//! Entries are created on first resolution, replaced wholesale when the whole
//! cache is rebuilt, and never evicted individually. A failed resolution
//! leaves the previous entry (or its absence) untouched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::stream::{FuturesUnordered, Stream};
use tracing::{debug, warn};

use crate::config::EditorConfigParser;
use crate::error::Result;
use crate::properties::ResolvedProperties;

/// Read access to resolved properties by file path.
pub trait SettingsProvider: Send + Sync {
    fn settings_for(&self, path: &Path) -> Option<ResolvedProperties>;
}

impl SettingsProvider for HashMap<PathBuf, ResolvedProperties> {
    fn settings_for(&self, path: &Path) -> Option<ResolvedProperties> {
        self.get(path).cloned()
    }
}

pub struct ConfigResolver<P> {
    parser: P,
    cache: RwLock<HashMap<PathBuf, ResolvedProperties>>,
}

impl<P: EditorConfigParser> ConfigResolver<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, ResolvedProperties>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, ResolvedProperties>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse, validate and cache the properties for `path`.
    ///
    /// Racing resolutions of the same path are last-write-wins.
    pub async fn resolve(&self, path: &Path) -> Result<ResolvedProperties> {
        let outcome = match self.parser.parse(path).await {
            Ok(raw) => ResolvedProperties::from_raw(&raw),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(props) => {
                debug!(path = %path.display(), ?props, "resolved editorconfig");
                self.write().insert(path.to_path_buf(), props.clone());
                Ok(props)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "keeping previous editorconfig entry");
                Err(e)
            }
        }
    }

    pub fn get_cached(&self, path: &Path) -> Option<ResolvedProperties> {
        self.read().get(path).cloned()
    }

    /// Drop every entry, then re-resolve each open path concurrently.
    ///
    /// The cache is cleared before this returns; the resolutions run as the
    /// stream is polled and are yielded in completion order.
    pub fn invalidate_all(
        &self,
        open_paths: Vec<PathBuf>,
    ) -> impl Stream<Item = (PathBuf, Result<ResolvedProperties>)> + '_ {
        self.clear();
        debug!(count = open_paths.len(), "rebuilding editorconfig cache");

        open_paths
            .into_iter()
            .map(|path| async move {
                let outcome = self.resolve(&path).await;
                (path, outcome)
            })
            .collect::<FuturesUnordered<_>>()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn cached_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }
}

impl<P: EditorConfigParser> SettingsProvider for ConfigResolver<P> {
    fn settings_for(&self, path: &Path) -> Option<ResolvedProperties> {
        self.get_cached(path)
    }
}
