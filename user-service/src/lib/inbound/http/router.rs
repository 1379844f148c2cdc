use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_user::get_user;
use super::handlers::health::ping;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::update_user::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::ports::UserServicePort;

pub struct AppState<US, AS>
where
    US: UserServicePort,
    AS: AuthServicePort,
{
    pub user_service: Arc<US>,
    pub auth_service: Arc<AS>,
}

impl<US, AS> Clone for AppState<US, AS>
where
    US: UserServicePort,
    AS: AuthServicePort,
{
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            auth_service: Arc::clone(&self.auth_service),
        }
    }
}

pub fn create_router<US, AS>(user_service: Arc<US>, auth_service: Arc<AS>) -> Router
where
    US: UserServicePort,
    AS: AuthServicePort,
{
    let state = AppState {
        user_service,
        auth_service,
    };

    let public_routes = Router::new()
        .route("/ping", get(ping))
        .route("/login", post(login::<US, AS>))
        .route("/users", post(create_user::<US, AS>));

    let protected_routes = Router::new()
        .route("/users", get(list_users::<US, AS>))
        .route(
            "/users/:user_id",
            get(get_user::<US, AS>)
                .put(update_user::<US, AS>)
                .delete(delete_user::<US, AS>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<US, AS>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
