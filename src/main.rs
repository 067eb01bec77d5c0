use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use spellgate::cli::output::{self, OutputFormat};
use spellgate::{corpus, Config, Scanner};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spellgate")]
#[command(version, about = "Spellcheck gate for generated content", long_about = None)]
struct Cli {
    /// Corpus root directory to check
    #[arg(value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// Dictionary affix file (relative paths resolve against SOURCE)
    #[arg(long, value_name = "FILE")]
    aff_file: Option<PathBuf>,

    /// Dictionary word list
    #[arg(long, value_name = "FILE")]
    dic_file: Option<PathBuf>,

    /// Exception store (JSON)
    #[arg(long, value_name = "FILE")]
    exception_file: Option<PathBuf>,

    /// Failure report location
    #[arg(long, value_name = "FILE")]
    fail_file: Option<PathBuf>,

    /// Cache report location
    #[arg(long, value_name = "FILE")]
    check_file: Option<PathBuf>,

    /// Exit with code 0 even if unknown words are found
    #[arg(long)]
    no_fail: bool,

    /// Skip re-checking files unchanged since the last run
    #[arg(long)]
    cache: bool,

    /// Inline exception rule: a literal word, /pattern/flags, or a phrase
    #[arg(short = 'e', long = "exception", value_name = "RULE")]
    exceptions: Vec<String>,

    /// Pipeline metadata file (JSON object with a "spelling_exceptions" array)
    #[arg(long, value_name = "FILE")]
    metadata: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log cache decisions and per-file results
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellgate", &mut io::stdout());
        return Ok(());
    }

    let Some(source) = cli.source else {
        anyhow::bail!("No corpus directory specified. Use --help for usage information.");
    };

    // Load configuration and apply CLI overrides
    let mut config = Config::load()?;
    if cli.no_fail {
        config.fail_errors = false;
    }
    if cli.cache {
        config.cache_checks = true;
    }
    if cli.verbose {
        config.verbose = true;
    }
    if let Some(path) = cli.aff_file {
        config.aff_file = path;
    }
    if let Some(path) = cli.dic_file {
        config.dic_file = path;
    }
    if let Some(path) = cli.exception_file {
        config.exception_file = path;
    }
    if let Some(path) = cli.fail_file {
        config.fail_file = path;
    }
    if let Some(path) = cli.check_file {
        config.check_file = path;
    }
    if !cli.exceptions.is_empty() {
        config.exceptions.extend(cli.exceptions);
    }
    let config = config.resolved(&source);

    let metadata_exceptions = match &cli.metadata {
        Some(path) => corpus::load_metadata(path)?,
        None => Vec::new(),
    };

    let corpus = corpus::load_dir(&source, &config.artifact_names())?;
    let scanner = Scanner::new(config, &metadata_exceptions)?;
    let outcome = scanner.run(&corpus)?;

    output::print_failures(&outcome, !cli.no_color, &cli.format);
    output::print_summary(&outcome, !cli.no_color);

    // Exit with appropriate code
    if !outcome.passed {
        std::process::exit(1);
    }

    Ok(())
}
