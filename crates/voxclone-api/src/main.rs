//! voxclone CLI and REST API entry point.
//!
//! Binary name: `voxclone`
//!
//! Parses CLI arguments, initializes the credential database and platform
//! connector, then dispatches to a command handler or starts the REST server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,voxclone=debug",
        _ => "trace",
    };
    voxclone_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "voxclone", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = run(&state, cli).await;

    state.shutdown().await;
    voxclone_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(state: &AppState, cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Link {
            user,
            api_key,
            web_token,
        } => {
            cli::credential::link(
                state,
                &user,
                api_key.as_deref(),
                web_token.as_deref(),
                cli.json,
            )
            .await?;
        }

        Commands::Unlink { user } => {
            cli::credential::unlink(state, &user, cli.json).await?;
        }

        Commands::Sync { user } => {
            cli::sync::sync(state, &user, cli.json, cli.quiet).await?;
        }

        Commands::Status { user } => {
            cli::status::status(state, &user, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} voxclone API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}/api/v1")).cyan()
            );
            println!(
                "  {} {}",
                console::style("Templates:").dim(),
                state.templates_dir.display()
            );
            println!(
                "  {} {}",
                console::style("Platform: ").dim(),
                state.config.platform.base_url
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
