//! xsub Command-Line Interface
//!
//! Submit, poll and cancel batch jobs through a uniform interface. Results
//! are printed to stdout as JSON; diagnostics go to stderr.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, delete, status, submit, template};

/// xsub - one interface over local and HPC batch schedulers
#[derive(Parser)]
#[command(name = "xsub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Scheduler backend (none, k); overrides XSUB_TYPE
    #[arg(short, long, global = true)]
    scheduler: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a job script for the backend and submit it
    Submit {
        /// The job script to run
        job_file: PathBuf,

        /// Parameters: inline JSON object, or a .json/.yaml file
        #[arg(short, long)]
        parameters: Option<String>,

        /// Working directory the job runs in
        #[arg(short = 'd', long)]
        work_dir: Option<PathBuf>,

        /// Directory for scheduler log files
        #[arg(short, long)]
        log_dir: Option<PathBuf>,
    },

    /// Query job status
    Status {
        /// Job ID as printed by `submit`
        job_id: Option<String>,

        /// List all jobs
        #[arg(short, long)]
        all: bool,
    },

    /// Cancel a job
    Delete {
        /// Job ID as printed by `submit`
        job_id: String,
    },

    /// Show the backend's script template and parameters
    Template,

    /// List available backends
    Backends,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let scheduler = cli.scheduler.as_deref();

    // Execute command
    let result = match cli.command {
        Commands::Submit {
            job_file,
            parameters,
            work_dir,
            log_dir,
        } => {
            submit::execute(
                scheduler,
                &job_file,
                parameters.as_deref(),
                work_dir,
                log_dir,
            )
            .await
        }

        Commands::Status { job_id, all } => {
            status::execute(scheduler, job_id.as_deref(), all).await
        }

        Commands::Delete { job_id } => delete::execute(scheduler, &job_id).await,

        Commands::Template => template::execute(scheduler),

        Commands::Backends => {
            backends::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
