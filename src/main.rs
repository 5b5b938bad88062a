use anyhow::Context;
use clap::Parser;

use frameterm::cli::Cli;
use frameterm::config::Config;
use frameterm::{logging, session};

fn main() {
    let cli = Cli::parse();
    let code = match start(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    std::process::exit(code);
}

fn start(cli: &Cli) -> anyhow::Result<i32> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);
    config.validate()?;

    let log_path = logging::init(&config.logging).context("failed to initialize logging")?;
    tracing::info!(log = %log_path.display(), "frameterm {}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the async runtime")?;
    runtime.block_on(session::run(config))
}
