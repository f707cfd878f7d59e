//! CLI argument parsing and command dispatch.
//!
//! Commands split into two groups: `extract`/`cleanup` manage the local
//! issue cache, everything else populates the engine (from cache or by
//! fetching) and reports one view of the analysis.

mod execute;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Tangle - dependency-graph analysis for Jira issues
///
/// Fetches the transitive closure of linked issues from a seed JQL query,
/// partitions it into connected graphs, detects cycles, and scores issues by
/// how much work they gate.
#[derive(Parser, Debug)]
#[command(name = "tangle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "tangle.yaml")]
    pub config: PathBuf,

    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the resolved configuration
    ///
    /// Useful for checking what a run would actually use after file, env,
    /// and default merging. The API token is masked.
    Config,

    /// Extract issues from Jira into the local cache
    ///
    /// Runs the seed query and spiders all linked issues. Optional trailing
    /// prefixes limit which projects the spidering keeps.
    Extract {
        /// Additional allowed issue key prefixes, e.g. `ABC`
        prefixes: Vec<String>,
    },

    /// Delete the local cache
    Cleanup,

    /// Analyse the issue set and print summary counts
    Analyse,

    /// List all issues with their scores
    List,

    /// List root issues (issues nothing blocks)
    Roots,

    /// List orphaned issues (no links at all)
    Orphans,

    /// List tracked issues (carrying a tracking label)
    Trackers,

    /// List issues with warnings
    Warnings,

    /// List graphs that contain dependency cycles
    Cycles,

    /// Print the highest-scoring issues
    Highest {
        /// Top percentage of scored issues to show
        #[arg(long, default_value_t = 10)]
        percent: usize,
    },

    /// Write Graphviz dot source for every graph
    Dot,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        execute::run(self).await
    }
}
