#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use postgrab::{
    AppState, HttpFetcher, Resolver, build_app,
    config::{Cli, Commands, Config},
    logging::init_logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.config;

    // Keep guard alive so file logger flushes correctly
    let _log_guards = init_logging(&config);

    let resolver = Resolver::new(HttpFetcher::new()?, config.resolver_settings());

    match cli.command {
        Some(Commands::Resolve { reference }) => {
            let result = resolver.resolve(&reference).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        None => {
            log_config(&config);
            let app = build_app(AppState::new(resolver));
            let listener = TcpListener::bind(config.bind).await?;
            tracing::info!("listening on {}", listener.local_addr()?);
            axum::serve(listener, app).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn log_config(config: &Config) {
    tracing::info!("=== Configuration ===");
    tracing::info!("Bind address: {}", config.bind);
    tracing::info!(
        "Log file: {}",
        config
            .log_file
            .as_deref()
            .map_or_else(|| "<stderr only>".into(), |p| p.display().to_string())
    );
    tracing::info!("Origin: {}", config.origin);
    tracing::info!("Timeout: {} ms", config.timeout_ms);
    tracing::info!("User-Agent: {}", config.user_agent);
    tracing::info!(
        "Mirrors: {}",
        if config.mirrors.is_empty() {
            "<none>".to_string()
        } else {
            config.mirrors.join(", ")
        }
    );
    tracing::info!("Embed variant: {}", !config.skip_embed);
    tracing::info!("API variant: {}", !config.skip_api);
    tracing::info!("====================");
}
