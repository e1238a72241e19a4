//! Editor defaults merging
//!
//! Priority: CLI args > ecsync.toml > defaults

use std::num::NonZeroU32;

use crate::mapper::{Configured, EditorDefaults};

use super::toml_schema::EditorSection;

/// CLI options that can override config file settings.
///
/// `None` means "not specified on the command line".
#[derive(Debug, Default)]
pub struct CliEditorOptions {
    pub insert_spaces: Option<Configured<bool>>,
    pub tab_size: Option<Configured<NonZeroU32>>,
}

pub fn merge_editor_defaults(
    cli: &CliEditorOptions,
    toml: Option<&EditorSection>,
) -> EditorDefaults {
    let defaults = EditorDefaults::default();

    EditorDefaults {
        insert_spaces: cli
            .insert_spaces
            .or_else(|| toml.and_then(|t| t.insert_spaces))
            .unwrap_or(defaults.insert_spaces),
        tab_size: cli
            .tab_size
            .or_else(|| toml.and_then(|t| t.tab_size))
            .unwrap_or(defaults.tab_size),
    }
}
