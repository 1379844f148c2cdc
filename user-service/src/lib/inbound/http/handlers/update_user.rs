use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use super::UserResponseData;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for updating a user (raw JSON)
#[derive(Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, ApiError> {
        // Every provided field is checked before any failure is returned
        let mut errors = FieldErrors::default();
        let name = self
            .name
            .map(DisplayName::new)
            .and_then(|result| errors.check("name", result));
        let email = self
            .email
            .map(EmailAddress::new)
            .and_then(|result| errors.check("email", result));
        let password = self
            .password
            .map(Password::new)
            .and_then(|result| errors.check("password", result));
        errors.into_result()?;

        Ok(UpdateUserCommand {
            name,
            email,
            password,
        })
    }
}

pub async fn update_user<US, AS>(
    State(state): State<AppState<US, AS>>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserResponseData>, ApiError>
where
    US: UserServicePort,
    AS: AuthServicePort,
{
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let Json(body) = body?;
    let command = body.try_into_command()?;

    tracing::info!(actor = %actor.user_id, user_id = %user_id, "Updating user");

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
