use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "tasklist")]
#[command(version)]
#[command(about = "Keep a task list in a hosted todos table")]
pub struct Cli {
    /// Project URL of the hosted database (the REST prefix is added)
    #[arg(long, env = "TASKLIST_URL")]
    pub url: Option<String>,

    /// API key sent as `apikey` and bearer token
    #[arg(long, env = "TASKLIST_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Table holding the tasks
    #[arg(long)]
    pub table: Option<String>,

    /// Config file (defaults to <config dir>/tasklist/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log file; the terminal belongs to the UI
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}
