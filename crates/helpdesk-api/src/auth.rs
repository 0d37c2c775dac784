use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use helpdesk_db::{Database, UserRepository};
use helpdesk_types::api::Claims;
use helpdesk_types::forms::{CredentialsForm, Validate};

use crate::error::ApiError;
use crate::middleware::SESSION_COOKIE;
use crate::{views, with_db};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
}

/// Shown for unknown usernames and wrong passwords alike.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const USERNAME_TAKEN: &str = "Username already exists";

pub async fn register_page() -> Html<String> {
    Html(views::register_page(None, &[]))
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    let creds = match form.validate() {
        Ok(creds) => creds,
        Err(errors) => {
            return Ok((StatusCode::BAD_REQUEST, Html(views::register_page(None, &errors))).into_response());
        }
    };

    let password_hash = hash_password(&creds.password)?;

    let username = creds.username.clone();
    let created = with_db(&state, move |db| db.create_user(&username, &password_hash)).await?;

    match created {
        Some(user_id) => {
            info!("Registered agent {} ({})", creds.username, user_id);
            Ok(Redirect::to("/login").into_response())
        }
        None => {
            warn!("Registration rejected, username {} is taken", creds.username);
            Ok((
                StatusCode::CONFLICT,
                Html(views::register_page(Some(USERNAME_TAKEN), &[])),
            )
                .into_response())
        }
    }
}

pub async fn login_page() -> Html<String> {
    Html(views::login_page(None, &[]))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    let creds = match form.validate() {
        Ok(creds) => creds,
        Err(errors) => {
            return Ok((StatusCode::BAD_REQUEST, Html(views::login_page(None, &errors))).into_response());
        }
    };

    let username = creds.username.clone();
    let user = with_db(&state, move |db| db.get_user_by_username(&username)).await?;

    let verified = match &user {
        Some(user) => verify_password(&creds.password, &user.password)?,
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        warn!("Failed login for {}", creds.username);
        return Ok((
            StatusCode::UNAUTHORIZED,
            Html(views::login_page(Some(INVALID_CREDENTIALS), &[])),
        )
            .into_response());
    };

    let token = create_token(&state.session_secret, user.id, &user.username, state.session_ttl)?;

    info!("Agent {} logged in", user.username);
    let jar = jar.add(session_cookie(token));
    Ok((jar, Redirect::to("/agent/portal")).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login"))
}

/// Argon2id with a fresh random salt, in PHC string form.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch. A stored hash that does not parse is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(stored_hash).map_err(|e| anyhow::anyhow!("Corrupt password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn create_token(
    secret: &str,
    user_id: i64,
    username: &str,
    ttl: chrono::Duration,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
