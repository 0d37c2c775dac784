use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::info;

use helpdesk_db::MessageRepository;
use helpdesk_types::api::Claims;
use helpdesk_types::forms::{RespondForm, SearchForm, Validate};
use helpdesk_types::models::Message;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{views, with_db};

/// All messages, unfiltered and unpaginated.
pub async fn portal(
    State(state): State<AppState>,
    Extension(agent): Extension<Claims>,
) -> Result<Html<String>, ApiError> {
    let rows = with_db(&state, |db| db.list_messages()).await?;
    let messages: Vec<Message> = rows.into_iter().map(Message::from).collect();
    Ok(Html(views::portal_page(&agent.username, &messages)))
}

pub async fn respond_page(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Html<String>, ApiError> {
    let message = load_message(&state, message_id).await?;
    Ok(Html(views::respond_page(&message, &[])))
}

/// Concurrent responses to one message are last-write-wins.
pub async fn respond(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(agent): Extension<Claims>,
    Form(form): Form<RespondForm>,
) -> Result<Response, ApiError> {
    let message = load_message(&state, message_id).await?;

    let response = match form.validate() {
        Ok(response) => response,
        Err(errors) => {
            return Ok((StatusCode::BAD_REQUEST, Html(views::respond_page(&message, &errors))).into_response());
        }
    };

    let updated = with_db(&state, move |db| db.set_response(message_id, &response)).await?;
    if !updated {
        return Err(ApiError::MessageNotFound(message_id));
    }

    info!("Agent {} responded to message {}", agent.username, message_id);
    Ok((StatusCode::OK, "Response sent successfully").into_response())
}

pub async fn search_page() -> Html<String> {
    Html(views::search_page("", &[]))
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Response, ApiError> {
    let keyword = match form.validate() {
        Ok(keyword) => keyword,
        Err(errors) => {
            return Ok((StatusCode::BAD_REQUEST, Html(views::search_page(&form.keyword, &errors))).into_response());
        }
    };

    let needle = keyword.clone();
    let rows = with_db(&state, move |db| db.search_messages(&needle)).await?;
    let messages: Vec<Message> = rows.into_iter().map(Message::from).collect();
    Ok(Html(views::search_results_page(&keyword, &messages)).into_response())
}

async fn load_message(state: &AppState, message_id: i64) -> Result<Message, ApiError> {
    with_db(state, move |db| db.get_message(message_id))
        .await?
        .map(Message::from)
        .ok_or(ApiError::MessageNotFound(message_id))
}
