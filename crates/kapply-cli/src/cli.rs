use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "kapply",
    about = "Three-way merge of declared configuration into live objects",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge a desired document into an observed one
    Merge(MergeArgs),
    /// Compute the replacement object for an apply
    Apply(ApplyArgs),
    /// Show field-level changes between two documents
    Diff(DiffArgs),
    /// Print the baseline stored on an object
    LastApplied(LastAppliedArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Live object (JSON)
    #[arg(long)]
    pub observed: PathBuf,
    /// Desired declaration (JSON)
    #[arg(long)]
    pub desired: PathBuf,
    /// Baseline to merge against; read from the observed object if omitted
    #[arg(long)]
    pub last_applied: Option<PathBuf>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Live object (JSON); omit to create
    #[arg(long)]
    pub observed: Option<PathBuf>,
    /// Desired declaration (JSON)
    #[arg(long)]
    pub desired: PathBuf,
    /// Write the resulting object here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Only compare these dotted string fields
    #[arg(long = "field")]
    pub fields: Vec<String>,
}

#[derive(Args)]
pub struct LastAppliedArgs {
    pub object: PathBuf,
}
