use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use similar::{ChangeTag, TextDiff};
use tracing::debug;

use crate::error::Error;
use crate::host::Notifier;
use crate::mapper::EditorOptions;
use crate::properties::ResolvedProperties;

const RESET: &str = "\x1b[0m";

#[derive(Clone, Copy)]
pub struct Palette {
    pub error: &'static str,
    pub success: &'static str,
    pub info: &'static str,
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Self {
                error: "\x1b[31m",
                success: "\x1b[32m",
                info: "\x1b[36m",
                enabled: true,
            }
        } else {
            Self {
                error: "",
                success: "",
                info: "",
                enabled: false,
            }
        }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled {
            RESET
        } else {
            ""
        }
    }
}

pub fn should_use_colors(no_color: bool) -> bool {
    // Priority: --no-color > NO_COLOR env > TTY detection
    if no_color {
        return false;
    }
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    io::stdout().is_terminal()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Normal,
    Quiet,
    Diff,
}

pub struct OutputContext {
    pub mode: OutputMode,
    pub palette: Palette,
    pub verbose: bool,
    pub show_progress: bool,
}

impl OutputContext {
    pub fn new(mode: OutputMode, use_colors: bool, verbose: bool, show_progress: bool) -> Self {
        Self {
            mode,
            palette: Palette::new(use_colors),
            verbose,
            show_progress,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunResult {
    pub files_fixed: usize,
    pub files_with_problems: usize,
    pub files_skipped: usize,
}

impl RunResult {
    pub fn has_problems(&self) -> bool {
        self.files_with_problems > 0
    }
}

pub fn print_resolved(
    path: &Path,
    props: &ResolvedProperties,
    options: EditorOptions,
    ctx: &OutputContext,
) {
    let c = &ctx.palette;
    println!("{}{}{}", c.info, path.display(), c.reset());
    if props.is_empty() {
        println!("  (no properties)");
    }
    for (key, value) in props.entries() {
        println!("  {key} = {value}");
    }
    println!("  {}=> {options}{}", c.success, c.reset());
}

pub fn print_resolve_error(path: &Path, error: &Error, ctx: &OutputContext) {
    eprintln!(
        "{}Error:{} {}: {error}",
        ctx.palette.error,
        ctx.palette.reset(),
        path.display()
    );
}

pub fn print_check_result(path: &Path, ctx: &OutputContext) {
    if ctx.mode == OutputMode::Quiet {
        println!("{}", path.display());
        return;
    }

    println!(
        "{}Error:{} {}",
        ctx.palette.error,
        ctx.palette.reset(),
        path.display()
    );
    println!("  - missing final newline");
}

pub fn print_fix_result(path: &Path, original: &str, updated: &str, ctx: &OutputContext) {
    match ctx.mode {
        OutputMode::Quiet => println!("{}", path.display()),
        OutputMode::Diff => print_diff(&path.display().to_string(), original, updated),
        OutputMode::Normal => println!(
            "{}Fixed:{} {}",
            ctx.palette.success,
            ctx.palette.reset(),
            path.display()
        ),
    }
}

pub fn print_checked(path: &Path, ctx: &OutputContext) {
    if ctx.mode == OutputMode::Quiet {
        return;
    }
    println!(
        "{}Checked:{} {}",
        ctx.palette.info,
        ctx.palette.reset(),
        path.display()
    );
}

pub fn print_skipped(path: &Path, reason: &str, ctx: &OutputContext) {
    if ctx.mode == OutputMode::Quiet {
        return;
    }
    println!(
        "{}Skipping {}: {}{}",
        ctx.palette.info,
        reason,
        ctx.palette.reset(),
        path.display()
    );
}

pub fn print_diff(label: &str, original: &str, content: &str) {
    let diff = TextDiff::from_lines(original, content);

    println!("--- {label}");
    println!("+++ {label}");

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            println!();
        }

        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                print!("{sign}{change}");
                if change.missing_newline() {
                    println!();
                    println!("\\ No newline at end of file");
                }
            }
        }
    }
}

pub fn print_summary(result: &RunResult, check_only: bool, ctx: &OutputContext) {
    if ctx.mode == OutputMode::Quiet {
        return;
    }

    let c = &ctx.palette;
    if check_only {
        if result.files_with_problems > 0 {
            println!();
            println!(
                "{}{} files with problems{}",
                c.error,
                result.files_with_problems,
                c.reset()
            );
        }
    } else if result.files_fixed > 0 {
        println!();
        println!("{}{} files fixed{}", c.success, result.files_fixed, c.reset());
    }
}

/// Reports host messages on the terminal.
pub struct TerminalNotifier {
    palette: Palette,
}

impl TerminalNotifier {
    pub fn new(use_colors: bool) -> Self {
        Self {
            palette: Palette::new(use_colors),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn status(&self, message: &str, duration: Duration) {
        debug!(text = message, ?duration, "status");
    }

    fn info(&self, message: &str) {
        eprintln!("{}Info:{} {message}", self.palette.info, self.palette.reset());
    }

    fn error(&self, message: &str) {
        eprintln!("{}Error:{} {message}", self.palette.error, self.palette.reset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_disabled_is_plain() {
        let palette = Palette::new(false);
        assert_eq!(palette.error, "");
        assert_eq!(palette.success, "");
        assert_eq!(palette.info, "");
        assert_eq!(palette.reset(), "");
    }

    #[test]
    fn test_palette_enabled_resets() {
        let palette = Palette::new(true);
        assert!(palette.error.starts_with("\x1b["));
        assert_eq!(palette.reset(), RESET);
    }

    #[test]
    fn test_no_color_flag_wins() {
        assert!(!should_use_colors(true));
    }

    #[test]
    fn test_run_result_problems() {
        let mut result = RunResult::default();
        assert!(!result.has_problems());
        result.files_with_problems = 1;
        assert!(result.has_problems());
    }
}
