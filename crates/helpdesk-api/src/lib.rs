pub mod auth;
pub mod customer;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod portal;
pub mod views;

use axum::{
    Router,
    middleware::from_fn_with_state,
    response::Redirect,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::error;

use helpdesk_db::Database;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::require_session;

/// All routes, with the agent pages behind the session gate.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(|| async { Redirect::to("/agent/portal") }))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/send_message", get(messages::send_message_page).post(messages::send_message))
        .route("/receive_message", get(messages::receive_message_page).post(messages::receive_message));

    // Customers post from their own origins.
    let customer_api = Router::new()
        .route("/api/message", post(customer::post_message))
        .route("/api/send_message", post(customer::send_message))
        .layer(CorsLayer::permissive());

    let agent_routes = Router::new()
        .route("/agent/portal", get(portal::portal))
        .route("/respond/{message_id}", get(portal::respond_page).post(portal::respond))
        .route("/search", get(portal::search_page).post(portal::search))
        .layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(customer_api)
        .merge(agent_routes)
        .with_state(state)
}

/// Run blocking DB work off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })?;
    Ok(result?)
}
