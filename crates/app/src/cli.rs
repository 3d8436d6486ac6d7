use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "organizer")]
#[command(about = "Scan folders and validate AI file organization plans", long_about = None)]
pub struct Cli {
    /// Settings file to use instead of the platform config location
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the files a scan of the given roots would pick up
    Scan(ScanArgs),
    /// Print the planner prompts built for the given roots
    Prompt {
        #[command(flatten)]
        scan: ScanArgs,
        /// Plain-language organizing instructions, e.g. "by date, keep dates"
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Validate a plan JSON file against the given roots and print the safe plan
    Validate {
        /// File holding the raw model response or plan JSON
        #[arg(long)]
        plan: PathBuf,
        /// Roots the plan may touch
        #[arg(required = true)]
        roots: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,
    #[arg(long)]
    pub max_depth: Option<usize>,
    /// Include globs, separated by ';'
    #[arg(long)]
    pub include: Option<String>,
    /// Exclude globs, separated by ';'
    #[arg(long)]
    pub exclude: Option<String>,
    /// Also pick up hidden and system files
    #[arg(long)]
    pub hidden: bool,
    #[arg(long)]
    pub min_size: Option<u64>,
    #[arg(long)]
    pub max_size: Option<u64>,
}
