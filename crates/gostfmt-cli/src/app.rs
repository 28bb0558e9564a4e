//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use gostfmt_core::config::CONFIG_FILE_NAME;
use gostfmt_core::{
    convert_document, convert_markup, outline, InputKind, Materializer, MarkupParser,
    OutlineEntry, ReformatOptions, Settings, StyleRegistry,
};
use gostfmt_ooxml::DocxPackage;

#[derive(Parser, Debug)]
#[command(name = "gostfmt")]
#[command(author, version, about = "Reformat reports to the GOST style guide", long_about = None)]
pub struct Cli {
    /// Input .docx document or .txt markup file
    pub input: Option<PathBuf>,

    /// Output DOCX file
    #[arg(short, long, default_value = "output.docx")]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Style configuration (TOML); defaults to gostfmt.toml next to the input
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number formula paragraphs as (1), (2), ...
    #[arg(long)]
    pub number_formulas: bool,

    /// Print the paragraph classification instead of converting
    #[arg(long)]
    pub outline: bool,

    /// Log pipeline decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn options(&self) -> ReformatOptions {
        ReformatOptions {
            number_formulas: self.number_formulas,
        }
    }
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the conversion or outline command.
pub fn run_cli() -> Result<()> {
    let drop_mode = std::env::args_os().count() == 2;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // A file dropped onto the executable: keep the console open
    let drop_mode = drop_mode
        && cli.input.as_deref().is_some_and(Path::is_absolute)
        && io::stdin().is_terminal();
    if !drop_mode {
        return run(&cli);
    }

    let result = run(&cli);
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }
    wait_for_enter();
    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_writer(io::stderr)
        .init();
}

/// `RUST_LOG` when set, else `warn`; `-v` adds a global `debug` directive
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let from_env = rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok());
    match from_env {
        Some(filter) if verbose => filter.add_directive(Level::DEBUG.into()),
        Some(filter) => filter,
        None if verbose => EnvFilter::default().add_directive(Level::DEBUG.into()),
        None => EnvFilter::default().add_directive(Level::WARN.into()),
    }
}

fn wait_for_enter() {
    print!("Нажмите Enter для выхода...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}

/// Dispatch a parsed command line
pub fn run(cli: &Cli) -> Result<()> {
    let Some(input) = cli.input.as_deref() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if cli.outline {
        outline_command(input, cli.config.as_deref())
    } else {
        convert_command(
            input,
            &cli.output,
            cli.force,
            cli.config.as_deref(),
            cli.options(),
        )
    }
}

/// Settings from `config`, or from `gostfmt.toml` beside `input` when it
/// exists, or the built-in defaults
pub fn load_settings(input: &Path, config: Option<&Path>) -> Result<Settings> {
    if let Some(path) = config {
        return Settings::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()));
    }

    let local = input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(CONFIG_FILE_NAME);
    if local.is_file() {
        tracing::info!(config = %local.display(), "using local configuration");
        Settings::load(&local)
            .with_context(|| format!("Failed to load configuration: {}", local.display()))
    } else {
        Ok(Settings::default())
    }
}

/// Input kind of an existing input file
fn check_input(input: &Path) -> Result<InputKind> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(InputKind::from_path(input)?)
}

fn read_markup(input: &Path) -> Result<String> {
    fs::read_to_string(input)
        .with_context(|| format!("Failed to read markup file: {}", input.display()))
}

fn open_document(input: &Path) -> Result<DocxPackage> {
    DocxPackage::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))
}

/// Execute a conversion
///
/// Nothing is written when any check or step fails.
pub fn convert_command(
    input: &Path,
    output: &Path,
    force: bool,
    config: Option<&Path>,
    options: ReformatOptions,
) -> Result<()> {
    let kind = check_input(input)?;
    if output.exists() && !force {
        anyhow::bail!(
            "Output file already exists: {} (use --force to overwrite)",
            output.display()
        );
    }

    let registry = StyleRegistry::from_settings(&load_settings(input, config)?);
    tracing::info!(input = %input.display(), kind = ?kind, "converting");

    match kind {
        InputKind::Markup => {
            let text = read_markup(input)?;
            let mut doc = DocxPackage::blank().context("Failed to create a blank document")?;
            convert_markup(&text, &mut doc, &registry, options, output)
        }
        InputKind::Document => {
            let mut doc = open_document(input)?;
            convert_document(&mut doc, &registry, options, output)
        }
    }
    .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!("Готово: {}", output.display());
    Ok(())
}

/// Classification report for `input`; writes nothing
pub fn outline_entries(input: &Path, config: Option<&Path>) -> Result<Vec<OutlineEntry>> {
    let entries = match check_input(input)? {
        InputKind::Markup => {
            let registry = StyleRegistry::from_settings(&load_settings(input, config)?);
            let blocks = MarkupParser::new(&read_markup(input)?).parse();
            let mut doc = DocxPackage::blank().context("Failed to create a blank document")?;
            Materializer::new(&registry).materialize(&blocks, &mut doc);
            outline(&doc)
        }
        InputKind::Document => outline(&open_document(input)?),
    };
    Ok(entries)
}

/// Execute the outline command
pub fn outline_command(input: &Path, config: Option<&Path>) -> Result<()> {
    for entry in outline_entries(input, config)? {
        println!("{}", entry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["gostfmt", "report.docx"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("report.docx")));
        assert_eq!(cli.output, PathBuf::from("output.docx"));
        assert!(!cli.force);
        assert!(!cli.outline);
        assert!(!cli.options().number_formulas);
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "gostfmt",
            "notes.txt",
            "-o",
            "out.docx",
            "-f",
            "-c",
            "style.toml",
            "--number-formulas",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.output, PathBuf::from("out.docx"));
        assert!(cli.force);
        assert_eq!(cli.config, Some(PathBuf::from("style.toml")));
        assert!(cli.options().number_formulas);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_without_input() {
        let cli = Cli::try_parse_from(["gostfmt"]).unwrap();
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_cli_help_and_version() {
        let err = Cli::try_parse_from(["gostfmt", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        let err = Cli::try_parse_from(["gostfmt", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_log_filter_levels() {
        use tracing_subscriber::filter::LevelFilter;

        let hint = |verbose, rust_log| log_filter(verbose, rust_log).max_level_hint();
        assert_eq!(hint(false, None), Some(LevelFilter::WARN));
        assert_eq!(hint(false, Some("  ")), Some(LevelFilter::WARN));
        assert_eq!(hint(true, None), Some(LevelFilter::DEBUG));
        assert_eq!(hint(false, Some("info")), Some(LevelFilter::INFO));
        assert_eq!(hint(false, Some("trace")), Some(LevelFilter::TRACE));
        assert_eq!(hint(true, Some("error")), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let result = convert_command(
            &dir.path().join("absent.txt"),
            &dir.path().join("out.docx"),
            false,
            None,
            ReformatOptions::default(),
        );
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Input file not found"), "{message}");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("report.pdf");
        fs::write(&input, "%PDF").unwrap();
        let output = dir.path().join("out.docx");

        let result = convert_command(&input, &output, false, None, ReformatOptions::default());
        assert!(format!("{:#}", result.unwrap_err()).contains("Unsupported input"));
        assert!(!output.exists());
    }

    #[test]
    fn test_existing_output_needs_force() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(&input, "# Введение\nТекст").unwrap();
        let output = dir.path().join("out.docx");
        fs::write(&output, "keep me").unwrap();

        let result = convert_command(&input, &output, false, None, ReformatOptions::default());
        assert!(format!("{:#}", result.unwrap_err()).contains("--force"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");

        convert_command(&input, &output, true, None, ReformatOptions::default()).unwrap();
        assert!(DocxPackage::open(&output).is_ok());
    }

    #[test]
    fn test_load_settings_prefers_explicit_config() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[table]\nborder_size = 8\n",
        )
        .unwrap();
        let explicit = dir.path().join("other.toml");
        fs::write(&explicit, "[table]\nborder_size = 12\n").unwrap();

        let local = load_settings(&input, None).unwrap();
        assert_eq!(local.table.border_size, Some(8));
        let chosen = load_settings(&input, Some(&explicit)).unwrap();
        assert_eq!(chosen.table.border_size, Some(12));
    }

    #[test]
    fn test_load_settings_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(&dir.path().join("notes.txt"), None).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_bad_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("broken.toml");
        fs::write(&config, "[table\nborder_size = ").unwrap();
        let result = load_settings(&dir.path().join("notes.txt"), Some(&config));
        assert!(format!("{:#}", result.unwrap_err()).contains("Failed to load configuration"));
    }
}
