use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use helpdesk_db::MessageRepository;
use helpdesk_db::models::NewMessage;
use helpdesk_types::forms::{ReceiveMessageForm, SendMessageForm, Validate};
use helpdesk_types::models::{Message, utc_timestamp};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{views, with_db};

pub async fn send_message_page() -> Html<String> {
    Html(views::send_message_page("", "", &[]))
}

/// Web form submission. The timestamp is always generated here.
pub async fn send_message(
    State(state): State<AppState>,
    Form(form): Form<SendMessageForm>,
) -> Result<Response, ApiError> {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            let page = views::send_message_page(&form.user_id, &form.message_body, &errors);
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    let message = NewMessage {
        userid: valid.user_id,
        timestamp: utc_timestamp(),
        message_body: valid.message_body,
    };
    let id = with_db(&state, move |db| db.insert_message(&message)).await?;

    info!("Stored web message {} from customer {}", id, valid.user_id);
    Ok(Redirect::to("/agent/portal").into_response())
}

pub async fn receive_message_page() -> Html<String> {
    Html(views::receive_message_page("", &[]))
}

/// Return every message for a customer, re-stamping each with the current
/// time. The previous timestamps are overwritten.
pub async fn receive_message(
    State(state): State<AppState>,
    Form(form): Form<ReceiveMessageForm>,
) -> Result<Response, ApiError> {
    let user_id = match form.validate() {
        Ok(user_id) => user_id,
        Err(errors) => {
            let page = views::receive_message_page(&form.user_id, &errors);
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    let now = utc_timestamp();
    let rows = with_db(&state, move |db| db.stamp_messages_for_user(user_id, &now)).await?;

    debug!("Delivered {} messages to customer {}", rows.len(), user_id);
    let messages: Vec<Message> = rows.into_iter().map(Message::from).collect();
    Ok(Html(views::received_messages_page(user_id, &messages)).into_response())
}
