use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

pub async fn delete_user<US, AS>(
    State(state): State<AppState<US, AS>>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    US: UserServicePort,
    AS: AuthServicePort,
{
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;

    tracing::info!(actor = %actor.user_id, user_id = %user_id, "Deleting user");

    state
        .user_service
        .delete_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}
