use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, LevelFilter};

use dfr::docker::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use dfr::report::DEFAULT_TIER_LABEL;
use dfr::{generate, ClientConfig, DockerClient, OutputFormat, ReportMode, ReportOptions};

#[derive(Parser)]
#[command(name = "dfr")]
#[command(author = "Bentlybro <github@bentlybro.com>")]
#[command(version = "0.1.0")]
#[command(about = "Docker Fleet Reporter - Report container ages and image usage")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Docker endpoint (unix:///var/run/docker.sock, tcp://host:2375)
    #[arg(long, global = true, env = "DOCKER_HOST")]
    host: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Maximum concurrent container inspections
    #[arg(long, global = true, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "plain")]
    format: OutputFormat,

    /// Verbose mode (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how long each running container has been up (default)
    Age {
        /// Container label shown in the last column
        #[arg(long, default_value = DEFAULT_TIER_LABEL)]
        tier_label: String,
    },

    /// Show which stored images back a running container
    Usage {
        /// Only list images no running container uses
        #[arg(long)]
        unused_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(Env::default())
        .filter_level(log_level)
        .init();

    let mut options = ReportOptions {
        format: cli.format,
        concurrency: cli.concurrency,
        ..Default::default()
    };
    match cli.command.unwrap_or(Commands::Age {
        tier_label: DEFAULT_TIER_LABEL.to_string(),
    }) {
        Commands::Age { tier_label } => {
            options.mode = ReportMode::Age;
            options.tier_label = tier_label;
        }
        Commands::Usage { unused_only } => {
            options.mode = ReportMode::Usage;
            options.unused_only = unused_only;
        }
    }

    let config = ClientConfig {
        host: cli.host,
        timeout: Duration::from_secs(cli.timeout),
    };
    debug!("Client config: {:?}", config);
    debug!("Report options: {:?}", options);

    let docker = DockerClient::connect(&config)
        .await
        .context("Failed to reach the container runtime. Is Docker running?")?;

    let lines = generate(&docker, &options, Utc::now())
        .await
        .context("Failed to produce report")?;

    for line in lines {
        println!("{}", line);
    }

    Ok(())
}
