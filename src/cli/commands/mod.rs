use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// `ansiblegitops` - keeps hosts converged on a Git branch by re-running
/// Ansible whenever the branch moves.
#[derive(Parser, Debug)]
#[command(name = "ansiblegitops")]
#[command(version)]
#[command(about = "Pull-based GitOps reconciler for Ansible playbooks.", long_about = None)]
pub struct Cli {
    /// Config file (default: $ANSIBLEGITOPS_CONFIG, ./config.toml, ~/.ansiblegitops/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error (default: $ANSIBLEGITOPS_LOG or info)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<Level>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the reconciliation loop until Ctrl-C / SIGTERM
    Run,

    /// Run a single sync + apply cycle and exit (non-zero on failure)
    Once,

    /// Validate the configuration and check git / ansible tooling
    Check,

    /// Show the last status snapshot written by a running daemon
    Status,
}
