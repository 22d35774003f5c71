//! ghost-rec CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghost_rec::cli::{
    app::{load_merged_config, resolve_options, run_recorder, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    locate_cmd::handle_locate_command,
    presenter::Presenter,
    trigger_cmd::handle_trigger_command,
};
use ghost_rec::domain::config::{AppConfig, OscConfig};
use ghost_rec::domain::control::ControlEvent;
use ghost_rec::infrastructure::{OscControlClient, XdgConfigStore};

/// Environment variable holding the diagnostic log filter
const LOG_ENV: &str = "GHOST_REC_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Locate { path }) => {
            if let Err(e) = handle_locate_command(&path, &presenter) {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Trigger { event, port }) => {
            let config = load_merged_config(AppConfig {
                osc: port.map(|p| OscConfig {
                    port: Some(p),
                    address: None,
                }),
                ..Default::default()
            })
            .await;
            let port = config.osc_port_or_default();
            let address = config.osc_address_or_default().to_string();
            let target = format!("127.0.0.1:{}{}", port, address);
            let client = OscControlClient::localhost(port, address);

            if let Err(e) =
                handle_trigger_command(ControlEvent::from(event), &client, &target, &presenter).await
            {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        retention: cli.retention.clone(),
        output_path: cli.output.as_ref().map(|p| p.to_string_lossy().to_string()),
        osc: cli.port.map(|p| OscConfig {
            port: Some(p),
            address: None,
        }),
        ..Default::default()
    };

    let config = load_merged_config(cli_config).await;

    let options = match resolve_options(&config) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    run_recorder(options).await
}
