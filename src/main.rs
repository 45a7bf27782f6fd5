use anyhow::Result;
use clap::Parser;
use taleval::cli::{Cli, Commands};
use taleval::commands;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckEvals(args) => commands::check_evals::run(args),
        Commands::PrintEvals(args) => commands::print_evals::run(args),
        Commands::ModelMismatch(args) => commands::model_mismatch::run(args),
        Commands::Schema(args) => commands::schema::run(args),
        Commands::Logs(args) => commands::logs::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
