// src/main.rs

use design_catalog_mcp::{
    api::create_router,
    catalog::Catalog,
    config::Config,
    mcp::{
        handler::{handle_incoming, Outgoing},
        protocol::{error_codes, Response},
        validation::parse_message,
    },
    AppState,
};
use std::env;
use std::net::SocketAddr;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::new(state.config.bind_address, state.config.port);
    let shutdown = state.shutdown.clone();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 HTTP Server listening on {}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Waits for Ctrl+C, then cancels the token so open SSE streams end.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received, closing SSE sessions");
    shutdown.cancel();
}

// --- MCP Server Logic ---
fn stdio_reply(line: &str, state: &AppState) -> Option<String> {
    let outgoing = match parse_message(line.as_bytes()) {
        Ok(incoming) => handle_incoming(incoming, state),
        Err(failure) => {
            warn!("Rejected message: {}", failure.message);
            return serde_json::to_string(&failure.into_response()).ok();
        }
    };

    let encoded = match outgoing {
        Ok(Outgoing::Single(response)) => serde_json::to_string(&response),
        Ok(Outgoing::Batch(responses)) => serde_json::to_string(&responses),
        Ok(Outgoing::Nothing) => return None,
        Err(e) => {
            error!("Internal error while handling request: {:?}", e);
            serde_json::to_string(&Response::error(
                serde_json::Value::Null,
                error_codes::INTERNAL_ERROR,
                "Internal server error".into(),
            ))
        }
    };

    match encoded {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            None
        }
    }
}

async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting MCP server on stdin/stdout...");

    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    loop {
        let mut line = String::new();

        match stdin.read_line(&mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                debug!("Received: {}", line);

                if let Some(response_json) = stdio_reply(line, &state) {
                    debug!("Sending: {}", response_json);
                    if let Err(e) = stdout
                        .write_all(format!("{}\n", response_json).as_bytes())
                        .await
                    {
                        error!("Failed to write response: {}", e);
                        break;
                    }
                    if let Err(e) = stdout.flush().await {
                        error!("Failed to flush stdout: {}", e);
                        break;
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!("MCP server shutting down");
}

fn load_catalog(config: &Config) -> Result<Catalog, design_catalog_mcp::catalog::CatalogError> {
    match &config.catalog_path {
        Some(path) => {
            info!("Loading catalog from {}", path.display());
            Catalog::from_path(path)
        }
        None => Catalog::embedded(),
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays free for the stdio transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "design_catalog_mcp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    let catalog = match load_catalog(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("❌ Failed to load design catalog: {}", e);
            return;
        }
    };
    info!(
        "Catalog loaded: {} v{} ({} patterns, {} components)",
        catalog.info.name,
        catalog.info.version,
        catalog.patterns.len(),
        catalog.components.len()
    );

    let mcp_mode = config.mcp_mode || env::args().any(|arg| arg == "--mcp");
    let app_state = AppState::new(config, catalog);

    if mcp_mode {
        run_mcp_server(app_state).await;
    } else if let Err(e) = run_http_server(app_state).await {
        error!("❌ HTTP server failed: {:#}", e);
    }
}
