//! Image Relay - image generation relay and image proxy.
//!
//! This binary loads configuration, discovers credentials and starts the
//! HTTP server.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_relay::{
    config::Config,
    credentials::CredentialPool,
    generate::Dispatcher,
    proxy::HttpImageFetcher,
    server::{create_router, AppState, RouterConfig},
    upstream::OpenAiImageClient,
};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal; variables may come from the environment.
    let dotenv = dotenvy::dotenv();

    let config = Config::parse();
    init_logging(config.verbose);

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to read .env file: {}", e),
    }

    run_serve(config).await
}

async fn run_serve(config: Config) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let pool = match CredentialPool::from_env(&config.credential_prefix) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration:");
    info!("  Upstream: {}", config.openai_base_url);
    info!("  Model: {}", config.model);
    info!(
        "  Credentials: {} distinct key(s) under {}",
        pool.len(),
        pool.prefix()
    );
    info!(
        "  Timeouts: {}s generation, {}s proxy",
        config.upstream_timeout, config.proxy_timeout
    );
    match config.cors_origins {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    let provider = match OpenAiImageClient::new(
        config.openai_base_url.as_str(),
        Duration::from_secs(config.upstream_timeout),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let fetcher = match HttpImageFetcher::new(Duration::from_secs(config.proxy_timeout)) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = Dispatcher::new(pool, provider).with_model(config.model.as_str());
    let state = AppState::new(dispatcher, fetcher);
    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!("  curl http://{}/health", addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_relay=debug,tower_http=debug"
    } else {
        "image_relay=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::default().with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
