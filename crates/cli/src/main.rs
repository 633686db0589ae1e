//! `archmap` — recover and maintain the architectural model of a
//! multi-service repository.

mod commands;
mod git;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "archmap", version, about = "Static architecture recovery for multi-service codebases")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the full system model from a checked-out repository
    Build {
        /// Repository root
        root: PathBuf,
        /// System name recorded in the model
        #[arg(long, default_value = "system")]
        name: String,
        /// Revision identifier recorded in the model
        #[arg(long, default_value = "HEAD")]
        commit: String,
        /// Output file for the system model
        #[arg(long, default_value = "system.json")]
        output: PathBuf,
    },
    /// Compute the semantic change batch between two revisions
    Diff {
        /// Repository root
        repo: PathBuf,
        /// Old revision
        old: String,
        /// New revision
        new: String,
        /// Output file for the change batch
        #[arg(long, default_value = "delta.json")]
        output: PathBuf,
    },
    /// Apply a change batch to a persisted system model
    Merge {
        /// Persisted system model
        system: PathBuf,
        /// Persisted change batch
        delta: PathBuf,
        /// Output file for the merged model
        #[arg(long, default_value = "system.json")]
        output: PathBuf,
    },
    /// Trace request flows over a persisted system model
    Flows {
        /// Persisted system model
        system: PathBuf,
        /// Output file; prints to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve cross-service dependency edges
    Edges {
        /// Persisted system model
        system: PathBuf,
        /// Output file; prints to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            root,
            name,
            commit,
            output,
        } => commands::build(&root, &name, &commit, &output),
        Command::Diff {
            repo,
            old,
            new,
            output,
        } => commands::diff(&repo, &old, &new, &output),
        Command::Merge {
            system,
            delta,
            output,
        } => commands::merge(&system, &delta, &output),
        Command::Flows { system, output } => commands::flows(&system, output),
        Command::Edges { system, output } => commands::edges(&system, output),
    }
}
