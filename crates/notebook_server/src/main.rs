//! Notebook HTTP server entry point.
//!
//! Default: http://127.0.0.1:8080/

use log::{error, info};
use notebook_core::{init_logging, DocumentStore, SearchLookup, WikipediaLookup};
use notebook_server::config::ServerConfig;
use notebook_server::routes::AppState;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("notebook-server: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(&config.log_settings) {
        eprintln!("notebook-server: {err}");
        return ExitCode::FAILURE;
    }

    // The blocking lookup client owns its own runtime; build and drop it
    // outside the async executor.
    let lookup: Arc<dyn SearchLookup> =
        match WikipediaLookup::new(&config.lookup_endpoint, config.lookup_timeout) {
            Ok(lookup) => Arc::new(lookup),
            Err(err) => {
                error!("event=server_start module=http status=error error={err}");
                return ExitCode::FAILURE;
            }
        };
    let store = Arc::new(DocumentStore::open(&config.snapshot_path));
    info!(
        "event=store_open module=store status=ok snapshot={}",
        store.snapshot_path().display()
    );
    let state = Arc::new(AppState::new(store, lookup.clone()));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("event=server_start module=http status=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(serve(config.bind_addr, state));
    drop(runtime);
    drop(lookup);

    match outcome {
        Ok(()) => {
            info!("event=server_stop module=http status=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=server_stop module=http status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("event=server_start module=http status=ok listen=http://{addr}");

    let app = notebook_server::build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("event=server_shutdown module=http status=start");
        })
        .await
}
