mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use helpdesk_api::auth::{AppState, AppStateInner};
use helpdesk_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "helpdesk=debug,helpdesk_api=debug,helpdesk_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;

    // One-shot import; a bad file aborts startup.
    if let Some(csv_path) = &config.csv_path {
        db.import_messages_csv(csv_path)?;
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        session_secret: config.session_secret,
        session_ttl: config.session_ttl,
    });

    let app = helpdesk_api::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Helpdesk listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
