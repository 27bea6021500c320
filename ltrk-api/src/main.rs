//! ltrk-api - LeadTrk lead-submission tracking service
//!
//! Single HTTP module: marketer submission surface plus the admin
//! override/audit surface, backed by SQLite.

use anyhow::Result;
use clap::Parser;
use ltrk_common::config;
use ltrk_common::db::init_database;
use ltrk_api::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ltrk-api", about = "LeadTrk lead-submission tracking service")]
struct Args {
    /// Root folder holding the database (overrides env and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP port (overrides the settings table)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting LeadTrk API (ltrk-api) v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let port = config::resolve_http_port(&pool, args.port).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("ltrk-api listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
