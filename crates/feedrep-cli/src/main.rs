//! feedrep - replicate feed directories and mark them complete
//!
//! Copies the sources of a feed into a target directory and, for filesystem
//! feeds, writes `_SUCCESS` markers into the replicated directories covered by
//! the feed's include path.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use feedrep_config::{Config, ConfigBuilder, ConfigLoader, LoggingConfig};
use feedrep_engine::{FeedReplicator, LocalCopyEngine, ReplicationRequest};
use feedrep_pattern::GlobPatternCompiler;
use feedrep_types::{BandwidthKb, StorageType, WorkerCount};
use std::path::PathBuf;
use tracing::info;

mod display;

/// feedrep - replicate feed directories and mark them complete
#[derive(Parser, Debug)]
#[command(
    name = "feedrep",
    version = env!("CARGO_PKG_VERSION"),
    about = "Replicate feed directories and mark them complete",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Comma separated source paths
    #[arg(long, value_delimiter = ',', required = true)]
    source_paths: Vec<PathBuf>,

    /// Destination directory
    #[arg(long, required = true)]
    target_path: Option<PathBuf>,

    /// Storage type of the feed (FILESYSTEM or TABLE)
    #[arg(long, required = true)]
    storage_type: Option<StorageType>,

    /// Maximum number of concurrent copy workers
    #[arg(long)]
    max_maps: Option<usize>,

    /// Bandwidth cap per worker in KB/s
    #[arg(long)]
    map_bandwidth_kb: Option<u64>,

    /// Include path whose readiness is signalled
    #[arg(long)]
    include_path: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(cli.debug, cli.quiet, cli.verbose, &config.logging)?;

    info!("feedrep v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Config { default }) => config_command(&config, default),
        None => run_command(cli.run, config, cli.quiet).await,
    }
}

/// Load the configuration file, then apply command line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default().context("Failed to load configuration")?,
    };

    if let Some(max_maps) = cli.run.max_maps {
        config.replication.max_maps = WorkerCount::new(max_maps).map_err(anyhow::Error::msg)?;
    }
    if let Some(bandwidth) = cli.run.map_bandwidth_kb {
        config.replication.map_bandwidth_kb =
            BandwidthKb::new(bandwidth).map_err(anyhow::Error::msg)?;
    }
    if let Some(include_path) = &cli.run.include_path {
        config.replication.include_path = Some(include_path.clone());
    }

    ConfigBuilder::validate(&config)?;
    Ok(config)
}

fn init_logging(debug: bool, quiet: bool, verbose: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(logging.colored_output);

    let installed = if logging.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    Ok(())
}

async fn run_command(args: RunArgs, config: Config, quiet: bool) -> Result<()> {
    let target = args.target_path.context("--target-path is required")?;
    let storage_type = args.storage_type.context("--storage-type is required")?;
    if args.source_paths.is_empty() {
        bail!("--source-paths is required");
    }

    if !quiet {
        println!(
            "{} Replicating {} to {} ({})",
            style("→").green().bold(),
            style(join_paths(&args.source_paths)).cyan(),
            style(target.display()).cyan(),
            storage_type
        );
    }

    let replicator = FeedReplicator::from_config(LocalCopyEngine::new(), GlobPatternCompiler::new(), &config)?;
    let request = ReplicationRequest::from_config(args.source_paths, target, storage_type, &config);

    let spinner = display::create_spinner(quiet, "Copying files...");
    let outcome = replicator.run(&request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = outcome?;

    if !quiet {
        display::print_report(&report);
    }

    info!("Replication {} completed", report.run_id);
    Ok(())
}

fn config_command(config: &Config, default: bool) -> Result<()> {
    if default {
        println!("{} Default configuration:", style("⚙").blue().bold());
        print!("{}", ConfigLoader::to_yaml(&Config::default())?);
    } else {
        println!("{} Current configuration:", style("⚙").blue().bold());
        match ConfigLoader::config_exists() {
            Some(path) => println!("# loaded from {}", path.display()),
            None => println!("# no configuration file found, using defaults"),
        }
        print!("{}", ConfigLoader::to_yaml(config)?);
    }
    Ok(())
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_run_arguments() {
        let cli = Cli::try_parse_from([
            "feedrep",
            "--source-paths",
            "/data/in",
            "--target-path",
            "/replica",
            "--storage-type",
            "filesystem",
            "--max-maps",
            "8",
            "--include-path",
            "/data/in/clicks/*",
        ])
        .unwrap();

        assert_eq!(cli.run.source_paths, vec![PathBuf::from("/data/in")]);
        assert_eq!(cli.run.storage_type, Some(StorageType::Filesystem));
        assert_eq!(cli.run.max_maps, Some(8));
        assert_eq!(cli.run.include_path.as_deref(), Some("/data/in/clicks/*"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_source_paths_split_on_commas() {
        let cli = Cli::try_parse_from([
            "feedrep",
            "--source-paths",
            "/a,/b",
            "--target-path",
            "/t",
            "--storage-type",
            "TABLE",
        ])
        .unwrap();

        assert_eq!(
            cli.run.source_paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_run_arguments_are_required() {
        assert!(Cli::try_parse_from(["feedrep", "--target-path", "/t"]).is_err());
    }

    #[test]
    fn test_unknown_storage_type_is_rejected() {
        let result = Cli::try_parse_from([
            "feedrep",
            "--source-paths",
            "/a",
            "--target-path",
            "/t",
            "--storage-type",
            "catalog",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_subcommand_needs_no_run_arguments() {
        let cli = Cli::try_parse_from(["feedrep", "config", "--default"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { default: true })));
    }
}
