use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware that validates the bearer token and adds the caller's identity
/// to request extensions.
///
/// Any failure ends the request with 401 before the handler runs.
pub async fn authenticate<US, AS>(
    State(state): State<AppState<US, AS>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    US: UserServicePort,
    AS: AuthServicePort,
{
    let Some(token) = bearer_token(req.headers()) else {
        tracing::debug!("Missing or malformed Authorization header");
        return Err(ApiError::Unauthorized("invalid token".to_string()));
    };

    let user = state.auth_service.verify_token(token)?;

    tracing::debug!(user_id = %user.user_id, "Request authenticated");

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// The prefix match is case-sensitive and the token is trimmed.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();

    (!token.is_empty()).then_some(token)
}
