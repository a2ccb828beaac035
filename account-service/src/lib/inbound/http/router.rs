use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::admin::admin_only;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::new_email::new_email;
use super::handlers::new_password::new_password;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::handlers::settings::update_settings;
use super::handlers::verify_email::verify_email;
use super::middleware::require_session;
use crate::domain::account::service::AccountService;
use crate::domain::account::session::SessionManager;
use crate::outbound::mailer::SmtpMailer;
use crate::outbound::repositories::PostgresTokenRepository;
use crate::outbound::repositories::PostgresTwoFactorRepository;
use crate::outbound::repositories::PostgresUserRepository;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<
        AccountService<
            PostgresUserRepository,
            PostgresTokenRepository,
            PostgresTwoFactorRepository,
            SmtpMailer,
        >,
    >,
    pub sessions: Arc<SessionManager>,
}

pub fn create_router(
    account_service: Arc<
        AccountService<
            PostgresUserRepository,
            PostgresTokenRepository,
            PostgresTwoFactorRepository,
            SmtpMailer,
        >,
    >,
    sessions: Arc<SessionManager>,
) -> Router {
    let state = AppState {
        account_service,
        sessions,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/verify-email", patch(verify_email))
        .route("/api/auth/login", post(login))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/new-password", patch(new_password))
        .route("/api/auth/logout", get(logout));

    let protected_routes = Router::new()
        .route("/api/user", get(me))
        .route("/api/user/new-email", patch(new_email))
        .route("/api/user/update-settings", patch(update_settings))
        .route("/api/user/admin-only", get(admin_only))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
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
