use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ecsync::{
    find_config_file, load_config, merge_editor_defaults, run_fix, run_init, run_resolve,
    should_use_colors, CliEditorOptions, Config, Configured, EcsyncToml, EditorDefaults,
    OutputContext, OutputMode, RunResult, TerminalNotifier, WalkOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecsync")]
#[command(version, about = "Apply .editorconfig indentation and newline rules")]
struct Cli {
    /// Specify config file path (overrides auto-discovery)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Debug logging and per-file output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the properties resolved for each file
    Resolve {
        /// Target files or directories
        #[arg(required = true)]
        paths: Vec<String>,

        /// Include hidden files
        #[arg(long)]
        hidden: bool,

        /// Do not respect .gitignore files
        #[arg(long)]
        no_ignore: bool,
    },

    /// Insert missing final newlines where .editorconfig asks for them
    Fix {
        /// Target files or directories
        #[arg(required = true)]
        paths: Vec<String>,

        /// Check only (no modifications), exit 1 if problems found
        #[arg(short, long)]
        check: bool,

        /// Show changes in diff format
        #[arg(short, long)]
        diff: bool,

        /// Output only modified file names
        #[arg(short, long)]
        quiet: bool,

        /// Do not respect .gitignore files
        #[arg(long)]
        no_ignore: bool,
    },

    /// Generate an .editorconfig from the editor defaults
    Init {
        /// Directory to write into (default: current directory)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// true, false or auto
        #[arg(long, value_name = "BOOL", value_parser = parse_insert_spaces)]
        insert_spaces: Option<Configured<bool>>,

        /// Positive integer or auto
        #[arg(long, value_name = "N", value_parser = parse_tab_size)]
        tab_size: Option<Configured<NonZeroU32>>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let use_colors = should_use_colors(cli.no_color);

    match cli.command {
        Command::Resolve {
            ref paths,
            hidden,
            no_ignore,
        } => {
            let walk = walk_options(hidden, no_ignore);
            let config = build_config(&cli, false, walk, &CliEditorOptions::default());
            let ctx = OutputContext::new(OutputMode::Normal, use_colors, cli.verbose, true);
            exit_code(run_resolve(paths, &config, &ctx).await, true)
        }
        Command::Fix {
            ref paths,
            check,
            diff,
            quiet,
            no_ignore,
        } => {
            let walk = walk_options(false, no_ignore);
            let config = build_config(&cli, check, walk, &CliEditorOptions::default());
            let output_mode = if quiet {
                OutputMode::Quiet
            } else if diff {
                OutputMode::Diff
            } else {
                OutputMode::Normal
            };
            let show_progress = output_mode == OutputMode::Normal;
            let ctx = OutputContext::new(output_mode, use_colors, cli.verbose, show_progress);
            exit_code(run_fix(paths, &config, &ctx).await, check)
        }
        Command::Init {
            ref dir,
            insert_spaces,
            tab_size,
        } => {
            let overrides = CliEditorOptions {
                insert_spaces,
                tab_size,
            };
            let config = build_config(&cli, false, WalkOptions::default(), &overrides);
            handle_init(dir.clone(), config.defaults, use_colors)
        }
    }
}

fn exit_code(result: std::io::Result<RunResult>, fail_on_problems: bool) -> ExitCode {
    match result {
        Ok(result) if fail_on_problems && result.has_problems() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn handle_init(dir: Option<PathBuf>, defaults: EditorDefaults, use_colors: bool) -> ExitCode {
    let root = dir.or_else(|| std::env::current_dir().ok());
    let notifier = TerminalNotifier::new(use_colors);

    match run_init(root.as_deref(), defaults, &notifier) {
        Ok(path) => {
            println!("Created {}", path.display());
            ExitCode::SUCCESS
        }
        // Already reported through the notifier
        Err(_) => ExitCode::from(1),
    }
}

fn walk_options(hidden: bool, no_ignore: bool) -> WalkOptions {
    WalkOptions {
        hidden,
        respect_gitignore: !no_ignore,
    }
}

fn build_config(
    cli: &Cli,
    check_only: bool,
    walk: WalkOptions,
    overrides: &CliEditorOptions,
) -> Config {
    let toml_config = load_configuration(&cli.config, cli.verbose);

    // Merge configurations: CLI > TOML > defaults
    let defaults = merge_editor_defaults(overrides, toml_config.as_ref().map(|c| &c.editor));

    Config {
        check_only,
        defaults,
        walk,
    }
}

fn load_configuration(explicit_path: &Option<PathBuf>, verbose: bool) -> Option<EcsyncToml> {
    let config_path = explicit_path.clone().or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|d| find_config_file(&d))
    });

    config_path.and_then(|p| match load_config(&p) {
        Ok(config) => {
            if verbose {
                eprintln!("Using config: {}", p.display());
            }
            Some(config)
        }
        Err(e) => {
            eprintln!("Warning: Failed to load {}: {}", p.display(), e);
            None
        }
    })
}

fn parse_configured<T: std::str::FromStr>(value: &str) -> Result<Configured<T>, String>
where
    T::Err: std::fmt::Display,
{
    if value.eq_ignore_ascii_case("auto") {
        return Ok(Configured::Auto);
    }
    value
        .parse()
        .map(Configured::Explicit)
        .map_err(|e| format!("{e} (expected a value or \"auto\")"))
}

fn parse_insert_spaces(value: &str) -> Result<Configured<bool>, String> {
    parse_configured(value)
}

fn parse_tab_size(value: &str) -> Result<Configured<NonZeroU32>, String> {
    parse_configured(value)
}
