use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "cascade")]
#[command(about = "Cascading-scan decision engine - turns scan findings into follow-up scans")]
#[command(version)]
struct Cli {
    /// Enable verbose logging (shows skip decisions)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a decision pass over manifest files and show the scans it would start
    Decide {
        /// Scan manifest of the completed parent scan (YAML)
        #[arg(long)]
        scan: PathBuf,

        /// Findings of the parent scan (JSON array)
        #[arg(long)]
        findings: PathBuf,

        /// Cascading rules (YAML list or multi-document file)
        #[arg(long)]
        rules: PathBuf,

        /// Selector attribute mappings (YAML)
        #[arg(long)]
        parse_definition: Option<PathBuf>,

        /// Write one manifest per synthesized scan into this directory
        /// instead of printing a summary
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show the rule chain that produced a scan
    Chain {
        /// Scan manifest (YAML)
        #[arg(long)]
        scan: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Decide {
            scan,
            findings,
            rules,
            parse_definition,
            out,
        } => {
            cli::decide::decide_command(
                &scan,
                &findings,
                &rules,
                parse_definition.as_deref(),
                out.as_deref(),
            )
            .await?;
        }
        Commands::Chain { scan } => {
            cli::chain::chain_command(&scan)?;
        }
    }

    Ok(())
}
