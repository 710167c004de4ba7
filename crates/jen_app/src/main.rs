mod platform;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use jen_core::{BuildReference, WatchOutcome};
use jen_engine::{ClientSettings, JenkinsApi, ReqwestClient};
use jen_logging::jen_error;

use platform::commands::{self, WatchMode};
use platform::config::{load_config, DEFAULT_CONFIG_FILENAME};
use platform::logging::{self as app_logging, LogDestination};

#[derive(Parser)]
#[command(name = "jen", about = "Trigger and watch CI builds from the terminal")]
struct Cli {
    /// Connection record for this repository.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Branch of a multibranch job.
    #[arg(long, global = true)]
    branch: Option<String>,

    /// Also write logs to ./jen.log.
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trigger a new build.
    Build {
        /// Follow the console output of the new build.
        #[arg(long, conflicts_with = "stages")]
        watch: bool,
        /// Follow the stages of the new build.
        #[arg(long)]
        stages: bool,
    },
    /// Follow the console output of a build.
    Console {
        #[arg(long)]
        build: String,
    },
    /// Follow the stages of a build.
    Stages {
        #[arg(long)]
        build: String,
    },
    /// Wait for a queued build to start, then follow it.
    Watch {
        #[arg(long)]
        queue_item: String,
        #[arg(long)]
        stages: bool,
    },
    /// Show the build history of the job.
    Status,
    /// List the jobs on the server.
    Jobs,
    /// Print the browser link to the job or one of its builds.
    Open {
        #[arg(long)]
        build: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    app_logging::initialize(if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    });

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            jen_error!("{:?}", err);
            eprintln!("{}", format!("{err:#}").as_str().red());
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command ended well.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(&cli.config)?;
    let branch = cli.branch.as_deref();
    if let Command::Open { build } = &cli.command {
        let build = build.as_deref().map(BuildReference::new);
        println!("{}", commands::job_link(&config, branch, build.as_ref())?);
        return Ok(true);
    }
    let client = Arc::new(
        ReqwestClient::new(ClientSettings::default()).context("failed to create http client")?,
    );
    let api = JenkinsApi::from_config(client, &config, branch)?;
    let title = config.job_title(branch)?;

    let outcome = match cli.command {
        Command::Build { watch, stages } => {
            let mode = match (watch, stages) {
                (_, true) => Some(WatchMode::Stages),
                (true, false) => Some(WatchMode::Console),
                (false, false) => None,
            };
            commands::build(&api, &title, mode).await?
        }
        Command::Console { build } => {
            Some(commands::console(&api, &BuildReference::new(build)).await?)
        }
        Command::Stages { build } => {
            Some(commands::stages(&api, &BuildReference::new(build)).await?)
        }
        Command::Watch { queue_item, stages } => {
            let mode = if stages {
                WatchMode::Stages
            } else {
                WatchMode::Console
            };
            Some(commands::watch_queue_item(&api, &queue_item, mode).await?)
        }
        Command::Status => {
            commands::status(&api, &title).await?;
            None
        }
        Command::Jobs => {
            commands::jobs(&api).await?;
            None
        }
        Command::Open { .. } => None,
    };

    Ok(outcome.as_ref().is_none_or(WatchOutcome::is_success))
}
