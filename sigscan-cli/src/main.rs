use clap::Parser;
use colored::Colorize;
use sigscan::{
    scan, FileOutcome, MatcherKind, PatternTable, ScanConfig, ScanError, Verdict,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ScanError>;

/// Label printed when no pattern matched a readable file
const UNKNOWN_LABEL: &str = "Unknown file type";

#[derive(Parser)]
#[command(author, version, about = "Classify files by signature substrings", long_about = None)]
struct Cli {
    /// Directory whose files are classified (non-recursive)
    dir: PathBuf,

    /// Pattern database file, one `priority;"pattern";"label"` per line
    patterns_file: PathBuf,

    /// Substring algorithm to use (kmp|rabin-karp)
    #[arg(short = 'a', long, default_value = "kmp")]
    algorithm: MatcherKind,

    /// Number of worker threads (default: CPU cores)
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Path to a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print wall-clock scan time after the results
    #[arg(short, long)]
    timing: bool,
}

fn main() -> anyhow::Result<()> {
    run().map_err(Into::into)
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let file_config = ScanConfig::load_from(cli.config.as_deref())
        .map_err(|e| ScanError::config_error(e.to_string()))?;
    let config = file_config.merge_with_cli(ScanConfig {
        root_path: cli.dir,
        patterns_path: cli.patterns_file,
        algorithm: cli.algorithm,
        thread_count: cli
            .threads
            .unwrap_or_else(|| NonZeroUsize::new(num_cpus::get()).unwrap()),
        log_level: cli.log_level,
    });

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_writer(std::io::stderr)
        .init();

    let raw = std::fs::read_to_string(&config.patterns_path)
        .map_err(|e| ScanError::from_read_error(&config.patterns_path, e))?;
    let table = PatternTable::parse(&raw)?;

    let started = Instant::now();
    let summary = scan(&config, &table)?;
    let elapsed = started.elapsed();

    for report in &summary.reports {
        match &report.outcome {
            FileOutcome::Classified(Verdict::Known(label)) => {
                println!("{}: {}", report.file_name, label.green());
            }
            FileOutcome::Classified(Verdict::Unknown) => {
                println!("{}: {}", report.file_name, UNKNOWN_LABEL.yellow());
            }
            FileOutcome::ReadFailed(e) => {
                // A file we could not read is reported as such, never
                // as an unknown type
                eprintln!("{}: {}", report.file_name, e.to_string().red());
            }
        }
    }

    if cli.timing {
        println!("It took {:.6} seconds", elapsed.as_secs_f64());
    }

    Ok(())
}
