use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::evaluation::DEFAULT_HEADINGS;

#[derive(Parser, Debug)]
#[command(
    name = "taleval",
    version,
    about = "Evaluation triage and inspection tooling for the story generator database"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    CheckEvals(CheckEvalsArgs),
    PrintEvals(PrintEvalsArgs),
    ModelMismatch(ModelMismatchArgs),
    Schema(SchemaArgs),
    Logs(LogsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckEvalsArgs {
    #[arg(long, default_value = "data/storage.db")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "data/evals_parse_report.json")]
    pub report_path: PathBuf,

    #[arg(long, default_value_t = 1000)]
    pub limit: usize,

    #[arg(long = "heading", default_values_t = DEFAULT_HEADINGS.map(String::from))]
    pub headings: Vec<String>,

    #[arg(long, default_value_t = 800)]
    pub snippet_chars: usize,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PrintEvalsArgs {
    #[arg(long, default_value = "data/storage.db")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub story_id: i64,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ModelMismatchArgs {
    #[arg(long, default_value = "data/storage.db")]
    pub db_path: PathBuf,

    #[arg(long, default_value_t = 50)]
    pub sample: usize,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(long, default_value = "data/storage.db")]
    pub db_path: PathBuf,

    #[arg(long = "require")]
    pub required_columns: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LogsArgs {
    #[arg(long, default_value = "data/storage.db")]
    pub db_path: PathBuf,

    #[arg(long, default_value_t = 60)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub only_model: bool,

    #[arg(long = "category")]
    pub categories: Vec<String>,

    #[arg(long = "agent")]
    pub agents: Vec<String>,

    #[arg(long)]
    pub contains: Option<String>,

    #[arg(long)]
    pub level: Option<String>,

    #[arg(long)]
    pub thread_id: Option<i64>,
}
