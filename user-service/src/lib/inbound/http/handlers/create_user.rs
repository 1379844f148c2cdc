use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use super::UserResponseData;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub async fn create_user<US, AS>(
    State(state): State<AppState<US, AS>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserResponseData>, ApiError>
where
    US: UserServicePort,
    AS: AuthServicePort,
{
    let Json(body) = body?;

    state
        .user_service
        .create_user(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for creating a user (raw JSON)
#[derive(Clone, Deserialize)]
pub struct CreateUserRequest {
    name: String,
    email: String,
    password: String,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, ApiError> {
        match (
            DisplayName::new(self.name),
            EmailAddress::new(self.email),
            Password::new(self.password),
        ) {
            (Ok(name), Ok(email), Ok(password)) => {
                Ok(CreateUserCommand::new(name, email, password))
            }
            (name, email, password) => {
                let mut errors = FieldErrors::default();
                errors.check("name", name);
                errors.check("email", email);
                errors.check("password", password);
                Err(errors.into_error())
            }
        }
    }
}
