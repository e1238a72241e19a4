pub mod config;
pub mod error;
pub mod host;
pub mod mapper;
mod output;
pub mod progress;
pub mod properties;
pub mod resolver;
pub mod save;
pub mod session;
pub mod sync;
pub mod walker;

pub use config::{
    find_config_file, load_config, merge_editor_defaults, CliEditorOptions, ConfigError,
    EcsyncToml, EditorConfigParser, EditorSection, FsConfigStore, FsEditorConfigParser,
};
pub use error::{Error, Result};
pub use host::{BufferDocument, MemoryHost};
pub use mapper::{from_declarative, to_declarative, Configured, EditorDefaults, EditorOptions};
pub use output::{
    print_diff, should_use_colors, OutputContext, OutputMode, Palette, RunResult, TerminalNotifier,
};
pub use progress::ProgressReporter;
pub use properties::ResolvedProperties;
pub use resolver::ConfigResolver;
pub use session::{HostEvent, Session};
pub use walker::{walk_paths, WalkOptions};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;

use crate::host::Notifier;

const BINARY_CHECK_SIZE: usize = 8192;

/// Check if content is binary by looking for null bytes in first 8192 bytes
pub fn is_binary(content: &[u8]) -> bool {
    let check_len = content.len().min(BINARY_CHECK_SIZE);
    content[..check_len].contains(&0)
}

pub struct Config {
    pub check_only: bool,
    pub defaults: EditorDefaults,
    pub walk: WalkOptions,
}

/// Walk `paths` and return absolute file paths.
fn collect_files(paths: &[String], options: WalkOptions) -> io::Result<Vec<PathBuf>> {
    walk_paths(paths, options)
        .map(|path| fs::canonicalize(path?))
        .collect()
}

/// Print the resolved properties of every file in `paths`.
pub async fn run_resolve(
    paths: &[String],
    config: &Config,
    ctx: &OutputContext,
) -> io::Result<RunResult> {
    let mut result = RunResult::default();
    let files = collect_files(paths, config.walk)?;

    let progress = ProgressReporter::new("Resolving", files.len() as u64, ctx.show_progress);
    let resolver = ConfigResolver::new(FsEditorConfigParser::new());
    let mut outcomes: Vec<_> = resolver
        .invalidate_all(files)
        .inspect(|_| progress.inc())
        .collect()
        .await;
    progress.finish();

    outcomes.sort_by(|a, b| a.0.cmp(&b.0));
    let defaults = config.defaults.to_options();
    for (path, outcome) in &outcomes {
        match outcome {
            Ok(props) => {
                output::print_resolved(path, props, from_declarative(props, defaults), ctx)
            }
            Err(e) => {
                result.files_with_problems += 1;
                output::print_resolve_error(path, e, ctx);
            }
        }
    }

    Ok(result)
}

/// Run every file in `paths` through the save transform.
///
/// Each file is opened in a visible editor of an in-memory host and saved
/// once; files the transform changed are written back unless checking.
pub async fn run_fix(paths: &[String], config: &Config, ctx: &OutputContext) -> io::Result<RunResult> {
    let mut result = RunResult::default();
    let host = Arc::new(MemoryHost::new().with_defaults(config.defaults));
    let options = config.defaults.to_options();

    let mut originals = vec![];
    for path in collect_files(paths, config.walk)? {
        let Some(content) = read_text(&path, &mut result, ctx)? else {
            continue;
        };
        host.open_document(BufferDocument::new(path.clone(), content.clone()));
        host.open_editor(path.clone(), options);
        originals.push((path, content));
    }

    let session = Session::new(FsEditorConfigParser::new(), host.clone());
    session.start().await;

    let progress = ProgressReporter::new("Fixing", originals.len() as u64, ctx.show_progress);
    for (path, original) in &originals {
        if let Some(name) = path.file_name() {
            progress.set_message(&name.to_string_lossy());
        }

        if let Err(e) = save_and_compare(&session, path, original, config, &mut result, ctx).await
        {
            if ctx.mode != OutputMode::Quiet {
                eprintln!("Error processing {}: {e}", path.display());
            }
        }

        progress.inc();
    }
    progress.finish();
    session.dispose();

    output::print_summary(&result, config.check_only, ctx);

    Ok(result)
}

async fn save_and_compare(
    session: &Session<FsEditorConfigParser, MemoryHost>,
    path: &Path,
    original: &str,
    config: &Config,
    result: &mut RunResult,
    ctx: &OutputContext,
) -> Result<()> {
    let host = session.host();
    let document = host
        .document(path)
        .ok_or_else(|| Error::Host(format!("{} is not open", path.display())))?;
    session.on_document_saved(&*document).await?;

    let updated = host
        .document(path)
        .ok_or_else(|| Error::Host(format!("{} was closed", path.display())))?;
    let updated = updated.text();

    if updated == original {
        if ctx.verbose {
            output::print_checked(path, ctx);
        }
        return Ok(());
    }

    if config.check_only {
        result.files_with_problems += 1;
        output::print_check_result(path, ctx);
    } else {
        fs::write(path, updated)?;
        result.files_fixed += 1;
        output::print_fix_result(path, original, updated, ctx);
    }
    Ok(())
}

/// Read a file as UTF-8 text, skipping empty, binary and non-UTF-8 files.
fn read_text(path: &Path, result: &mut RunResult, ctx: &OutputContext) -> io::Result<Option<String>> {
    let bytes = fs::read(path)?;

    let reason = if bytes.is_empty() {
        "empty"
    } else if is_binary(&bytes) {
        "binary"
    } else {
        match String::from_utf8(bytes) {
            Ok(content) => return Ok(Some(content)),
            Err(_) => "non-UTF-8",
        }
    };

    result.files_skipped += 1;
    if ctx.verbose {
        output::print_skipped(path, reason, ctx);
    }
    Ok(None)
}

/// Generate an `.editorconfig` in `root` from `defaults`.
pub fn run_init(
    root: Option<&Path>,
    defaults: EditorDefaults,
    notifier: &dyn Notifier,
) -> Result<PathBuf> {
    let mut workspace = MemoryHost::new().with_defaults(defaults);
    if let Some(root) = root {
        workspace = workspace.with_root(root);
    }
    config::run_generate_command(&workspace, notifier, &FsConfigStore)
}
