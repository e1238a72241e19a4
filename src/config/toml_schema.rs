//! TOML schema definitions for ecsync.toml

use std::num::NonZeroU32;

use serde::Deserialize;

use crate::mapper::Configured;

/// Root structure for ecsync.toml
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EcsyncToml {
    /// Editor defaults used when no `.editorconfig` property applies
    #[serde(default)]
    pub editor: EditorSection,
}

/// `[editor]` section in ecsync.toml
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EditorSection {
    /// `true`, `false` or `"auto"`
    pub insert_spaces: Option<Configured<bool>>,

    /// Positive integer or `"auto"`
    pub tab_size: Option<Configured<NonZeroU32>>,
}
