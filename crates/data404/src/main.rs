mod cli;
mod server;

use std::sync::Arc;

use clap::Parser;
use eyre::{ensure, WrapErr};

use data404_core::{Accounts, JsonFileBackend};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    ensure!(
        args.root.is_dir(),
        "serving root `{}` is not a directory",
        args.root.display()
    );

    let backend = JsonFileBackend::open(&args.users_file).context("open user store")?;
    tracing::info!(path = %backend.path().display(), "user store ready");

    let accounts = Arc::new(Accounts::new(Arc::new(backend), args.download_link));
    tracing::info!(download_link = accounts.download_link(), "login gate configured");

    let state = server::AppState {
        accounts,
        static_root: args.root.clone(),
    };
    let router = server::build_router(state);

    if args.bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0; it is accessible from the network");
    }

    let bind_addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    println!();
    println!("  DATA 404 is running:");
    println!("    URL:       http://{bind_addr}");
    println!("    Root:      {}", args.root.display());
    println!();
    println!("  Press Ctrl+C to stop the server.");
    println!();

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("run HTTP server")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown requested");
}
