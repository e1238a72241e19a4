//! Configuration files read and written by ecsync.
//!
//! This module provides:
//! - Resolving `.editorconfig` properties for a file (directory walk, glob matching, cascade)
//! - Loading CLI defaults from `ecsync.toml`
//! - Config file discovery (search upward from current directory)
//! - Merging CLI args, config file, and defaults
//! - `.editorconfig` generation from editor defaults

mod editorconfig;
mod file;
mod glob;
mod init;
mod merge;
mod toml_schema;

pub use editorconfig::{
    parse_editorconfig_str, EditorConfigFile, EditorConfigParser, FsEditorConfigParser, Section,
};
pub use file::{find_config_file, find_file_upward, load_config, ConfigError, CONFIG_FILENAME};
pub use glob::SectionGlob;
pub use init::{
    generate_editorconfig, render_editorconfig, run_generate_command, ConfigStore, FsConfigStore,
    ALREADY_EXISTS_MESSAGE, NO_WORKSPACE_MESSAGE,
};
pub use merge::{merge_editor_defaults, CliEditorOptions};
pub use toml_schema::{EcsyncToml, EditorSection};
