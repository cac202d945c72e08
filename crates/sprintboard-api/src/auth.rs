//! Basic and token authentication for the `/api` routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sprintboard_domain::User;
use sprintboard_persistence::EntityStore;

use crate::error::{ApiError, ApiResult, NOT_AUTHENTICATED};
use crate::AppState;

const INACTIVE: &str = "User inactive or deleted.";

/// The authenticated caller, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Credentials {
    Basic { username: String, password: String },
    Token(String),
}

/// Read credentials from an `Authorization` header.
///
/// `Ok(None)` means no credentials this API understands were offered.
pub(crate) fn parse_authorization(headers: &HeaderMap) -> ApiResult<Option<Credentials>> {
    let Some(raw) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let Ok(value) = raw.to_str() else {
        return Ok(None);
    };

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or_default().to_ascii_lowercase();
    let rest: Vec<&str> = parts.collect();

    match scheme.as_str() {
        "basic" => {
            let encoded = match rest.as_slice() {
                [] => {
                    return Err(ApiError::unauthorized(
                        "Invalid basic header. No credentials provided.",
                    ))
                }
                [encoded] => *encoded,
                _ => {
                    return Err(ApiError::unauthorized(
                        "Invalid basic header. Credentials string should not contain spaces.",
                    ))
                }
            };
            let decoded = STANDARD
                .decode(encoded)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .ok_or_else(|| {
                    ApiError::unauthorized(
                        "Invalid basic header. Credentials not correctly base64 encoded.",
                    )
                })?;
            let (username, password) = decoded.split_once(':').ok_or_else(|| {
                ApiError::unauthorized(
                    "Invalid basic header. Credentials not correctly base64 encoded.",
                )
            })?;
            Ok(Some(Credentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }))
        }
        "token" => match rest.as_slice() {
            [] => Err(ApiError::unauthorized(
                "Invalid token header. No credentials provided.",
            )),
            [token] => Ok(Some(Credentials::Token(token.to_string()))),
            _ => Err(ApiError::unauthorized(
                "Invalid token header. Token string should not contain spaces.",
            )),
        },
        _ => Ok(None),
    }
}

/// Resolve credentials to an active user.
pub(crate) async fn authenticate(
    store: &dyn EntityStore,
    credentials: Credentials,
) -> ApiResult<User> {
    let user = match credentials {
        Credentials::Basic { username, password } => store
            .find_user_by_username(&username)
            .await?
            .filter(|user| user.check_password(&password))
            .ok_or_else(|| ApiError::unauthorized("Invalid username/password."))?,
        Credentials::Token(token) => store
            .find_user_by_token(&token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid token."))?,
    };

    if !user.is_active {
        return Err(ApiError::unauthorized(INACTIVE));
    }
    Ok(user)
}

pub(crate) async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> ApiResult<Response> {
    let credentials =
        parse_authorization(request.headers())?.ok_or_else(|| ApiError::unauthorized(NOT_AUTHENTICATED))?;
    let user = authenticate(state.store.as_ref(), credentials).await?;

    tracing::debug!(user = %user.username, "Authenticated");
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
