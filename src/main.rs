use std::{io, process::ExitCode};

use clap::Parser;
use setup_setops::{actions, config::Inputs, get_error_chain, setup};
use tokio::runtime;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let default_level = if actions::runner_debug() { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

async fn inner_main(inputs: Inputs) -> anyhow::Result<()> {
    let installed = setup(inputs).await?;
    info!(
        "SetOps CLI {} installed to {}",
        installed.version,
        installed.cli_dir.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let inputs = Inputs::parse();

    let result = runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|rt| rt.block_on(inner_main(inputs)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", get_error_chain(&err));
            actions::set_failed(&err.to_string());
            ExitCode::FAILURE
        }
    }
}
