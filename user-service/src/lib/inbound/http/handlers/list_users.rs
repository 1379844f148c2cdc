use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserResponseData;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::UserPage;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn list_users<US, AS>(
    State(state): State<AppState<US, AS>>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<ApiSuccess<ListUsersResponseData>, ApiError>
where
    US: UserServicePort,
    AS: AuthServicePort,
{
    let Query(query) = query?;
    let page =
        PageRequest::new(query.items_per_page, query.current_page).map_err(UserError::from)?;

    state
        .user_service
        .list_users(page)
        .await
        .map_err(ApiError::from)
        .map(|ref page| ApiSuccess::new(StatusCode::OK, page.into()))
}

/// Pagination query string; both parameters are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    items_per_page: Option<u32>,
    current_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListUsersResponseData {
    pub users: Vec<UserResponseData>,
    pub current_page: u32,
    pub items_per_page: u32,
}

impl From<&UserPage> for ListUsersResponseData {
    fn from(page: &UserPage) -> Self {
        Self {
            users: page.users.iter().map(UserResponseData::from).collect(),
            current_page: page.current_page,
            items_per_page: page.items_per_page,
        }
    }
}
