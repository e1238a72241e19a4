//! `.editorconfig` discovery, parsing and cascading.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::glob::SectionGlob;
use crate::error::{Error, Result};
use crate::properties::{RawProperties, EDITORCONFIG_FILENAME};

/// Keys whose values are case-insensitive and stored lowercase.
const KNOWN_KEYS: &[&str] = &[
    "indent_style",
    "indent_size",
    "tab_width",
    "end_of_line",
    "charset",
    "trim_trailing_whitespace",
    "insert_final_newline",
];

/// Resolves the raw properties that apply to an absolute file path.
///
/// Implementations own directory walking and cascade semantics.
#[async_trait]
pub trait EditorConfigParser: Send + Sync {
    async fn parse(&self, path: &Path) -> Result<RawProperties>;
}

/// One parsed `.editorconfig` file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditorConfigFile {
    /// `root = true` in the preamble stops the upward search.
    pub root: bool,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub pattern: String,
    pub properties: Vec<(String, String)>,
}

/// Parse `.editorconfig` content. Malformed lines are ignored.
pub fn parse_editorconfig_str(content: &str) -> EditorConfigFile {
    let mut file = EditorConfigFile::default();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            file.sections.push(Section {
                pattern: line[1..line.len() - 1].trim().to_string(),
                properties: vec![],
            });
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let mut value = value.trim().to_string();
        if KNOWN_KEYS.contains(&key.as_str()) {
            value = value.to_lowercase();
        }

        match file.sections.last_mut() {
            Some(section) => section.properties.push((key, value)),
            None if key == "root" => file.root = value.eq_ignore_ascii_case("true"),
            None => {}
        }
    }

    file
}

/// Filesystem-backed parser: walks from the file's directory upward,
/// stopping after a file with `root = true`, and lets closer files and
/// later sections override earlier ones.
#[derive(Debug, Clone)]
pub struct FsEditorConfigParser {
    file_name: String,
}

impl FsEditorConfigParser {
    pub fn new() -> Self {
        Self {
            file_name: EDITORCONFIG_FILENAME.to_string(),
        }
    }

    async fn collect_files(&self, path: &Path) -> Result<Vec<(PathBuf, EditorConfigFile)>> {
        let mut files = vec![];

        for dir in path.ancestors().skip(1) {
            let candidate = dir.join(&self.file_name);
            match tokio::fs::read_to_string(&candidate).await {
                Ok(content) => {
                    let file = parse_editorconfig_str(&content);
                    let root = file.root;
                    debug!(config = %candidate.display(), root, "read editorconfig");
                    files.push((dir.to_path_buf(), file));
                    if root {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::parse(candidate, e.to_string())),
            }
        }

        Ok(files)
    }
}

impl Default for FsEditorConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EditorConfigParser for FsEditorConfigParser {
    async fn parse(&self, path: &Path) -> Result<RawProperties> {
        if !path.is_absolute() {
            return Err(Error::parse(path, "path must be absolute"));
        }

        let files = self.collect_files(path).await?;
        let mut properties = RawProperties::new();

        // Farthest file first so that closer files win.
        for (dir, file) in files.iter().rev() {
            for section in &file.sections {
                let glob = match SectionGlob::new(&section.pattern, dir) {
                    Ok(glob) => glob,
                    Err(e) => {
                        warn!(pattern = %section.pattern, error = %e, "skipping unusable section");
                        continue;
                    }
                };
                if glob.is_match(path) {
                    for (key, value) in &section.properties {
                        properties.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        apply_core_defaults(&mut properties);
        Ok(properties)
    }
}

/// Derived values every editorconfig core fills in after cascading.
fn apply_core_defaults(properties: &mut RawProperties) {
    if properties.get("indent_style").map(String::as_str) == Some("tab")
        && !properties.contains_key("indent_size")
    {
        properties.insert("indent_size".into(), "tab".into());
    }

    let indent_size = properties.get("indent_size").cloned();
    let tab_width = properties.get("tab_width").cloned();
    match (indent_size.as_deref(), tab_width) {
        (Some("tab"), Some(width)) => {
            properties.insert("indent_size".into(), width);
        }
        (Some(size), None) if size != "tab" && size != "unset" => {
            properties.insert("tab_width".into(), size.to_string());
        }
        _ => {}
    }
}
