mod backend;
mod config;
mod protocol;
mod queue;
mod server;

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use backend::{Backend, Falcon, Mosaic, Speech};
use config::{normalize_addr, Config};
use queue::{QueueClient, QueueClientConfig, QueueCredentials};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Configure logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt().with_env_filter(filter).json().init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    if config.hf_auth.is_some() && std::env::var("HF_AUTH").is_err() {
        warn!("queue token provided via command-line flag - use HF_AUTH env var in production");
    }

    queue::session::install_crypto_provider();

    let credentials = match QueueCredentials::new(&config.client_version, config.hf_auth.as_deref())
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid client version or HF_AUTH value");
            std::process::exit(1);
        }
    };

    if !credentials.has_token() {
        warn!("HF_AUTH not set - queue connections will be anonymous");
    }

    let queue = QueueClient::new(QueueClientConfig {
        scheme: config.queue_scheme,
        credentials,
        timeout: config.job_timeout(),
        max_message_size: config.max_message_size(),
    });

    info!(
        scheme = %config.queue_scheme,
        timeout_secs = queue.timeout().as_secs(),
        max_message_mb = config.max_message_mb,
        "queue client ready"
    );

    let mut backends: Vec<Arc<dyn Backend>> = vec![
        Arc::new(Falcon::new(config.falcon_host.clone())),
        Arc::new(Mosaic::new(config.mosaic_host.clone())),
    ];
    if let Some(host) = &config.speech_host {
        backends.push(Arc::new(Speech::new(host.clone(), config.speech_fn_index)));
    }

    let app = server::build_router(queue, backends, config.body_limit());

    let addr = normalize_addr(&config.addr);
    let listener = TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        error!(addr = addr, error = %e, "failed to bind");
        std::process::exit(1);
    });

    info!(addr = addr, "server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "server error");
            std::process::exit(1);
        });

    info!("server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
