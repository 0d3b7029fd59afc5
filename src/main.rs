//! stylesniff CLI
//!
//! Checks PHP class declarations and member variable doc comments.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use glob::glob;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use stylesniff::config::{ColorMode, Config, FilesConfig, OutputFormat};
use stylesniff::engine::Engine;
use stylesniff::output::formatter_for;
use stylesniff::Rule;

#[derive(Parser)]
#[command(
    name = "stylesniff",
    version,
    about = "PHP declaration and doc comment style checker",
    long_about = "Checks class/interface brace layout and member variable doc comments in PHP sources."
)]
struct Cli {
    /// Files, directories or glob patterns to check
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Print per-rule timings
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Disable rules or codes (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Only enable these rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Exit with 0 even if errors are found
    #[arg(long)]
    exit_zero: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Github,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Github => OutputFormat::Github,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load_default().context("failed to load default config")?,
    };

    config.merge_cli(
        cli.format.map(OutputFormat::from),
        cli.verbose.then_some(true),
        cli.jobs,
        cli.disable.clone(),
        cli.select.clone(),
    );

    let colored = use_color(cli.no_color, config.output.color);
    colored::control::set_override(colored);

    let engine = Engine::with_builtin_rules(config.clone());

    if cli.list_rules {
        print_rules(engine.rules());
        return Ok(0);
    }

    if cli.files.is_empty() {
        bail!("no files specified\n\nUsage: stylesniff [OPTIONS] <FILES>...");
    }

    let files = collect_files(&cli.files, &config.files)?;
    if files.is_empty() {
        bail!("no files found to check");
    }
    log::info!("checking {} files", files.len());

    let result = engine.lint(&files);

    let formatter = formatter_for(config.output.format, colored);
    print!("{}", formatter.format(&result));

    if config.output.verbose {
        eprintln!();
        eprint!("{}", result.format_timings());
    }

    if result.rule_failures > 0 {
        eprintln!(
            "{}: {} rule invocation(s) failed; run with RUST_LOG=warn for details",
            "warning".yellow().bold(),
            result.rule_failures
        );
    }

    Ok(if cli.exit_zero { 0 } else { result.exit_code() })
}

fn use_color(no_color: bool, mode: ColorMode) -> bool {
    if no_color {
        return false;
    }
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid pattern '{}'", pattern))?);
    }
    Ok(builder.build()?)
}

/// Expand arguments into the files to check.
///
/// Files named directly are always kept. Directories and glob matches are
/// filtered through the configured include/exclude patterns.
fn collect_files(args: &[String], files: &FilesConfig) -> Result<Vec<PathBuf>> {
    let include = build_globset(&files.include)?;
    let exclude = build_globset(&files.exclude)?;
    let wanted = |path: &Path| include.is_match(path) && !exclude.is_match(path);

    let mut found = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        if path.is_file() {
            found.push(path.to_path_buf());
            continue;
        }

        let pattern = if path.is_dir() {
            format!("{}/**/*", arg.trim_end_matches('/'))
        } else {
            arg.clone()
        };

        let entries = glob(&pattern).with_context(|| format!("invalid pattern '{}'", arg))?;
        found.extend(
            entries
                .flatten()
                .filter(|entry| entry.is_file() && wanted(entry)),
        );
    }

    found.sort();
    found.dedup();
    Ok(found)
}

fn print_rules(rules: &[std::sync::Arc<dyn Rule>]) {
    println!("{}", "Available rules:".bold());
    for rule in rules {
        println!();
        println!(
            "  {} [{}] {}",
            rule.id().cyan(),
            rule.category(),
            rule.description()
        );
        for code in rule.codes() {
            println!("    {}.{}", rule.id(), code);
        }
    }
}
