//! HTTP gateway: router assembly and server startup.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::middleware::jwt_auth_middleware;
use state::AppState;

/// Assemble the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/health", get(handlers::health::health_check));

    let protected_routes = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route("/account", get(handlers::account::get_account))
        .route("/account/{id}/balance", get(handlers::account::get_balance))
        .route(
            "/account/{id}/statement",
            get(handlers::account::get_statement),
        )
        .route("/transfer/password", put(handlers::transfer::set_password))
        .route(
            "/transfer/password/change",
            post(handlers::transfer::change_password),
        )
        .route(
            "/transfer/password/status",
            get(handlers::transfer::password_status),
        )
        .route("/transfer", post(handlers::transfer::transfer))
        .route("/transfer/recharge", post(handlers::transfer::recharge))
        .route(
            "/pix/keys",
            post(handlers::pix::create_key)
                .get(handlers::pix::list_keys)
                .delete(handlers::pix::delete_key),
        )
        .route("/pix/keys/{value}", get(handlers::pix::get_key))
        .route("/pix/transfer", post(handlers::pix::pix_transfer))
        .route("/pix/qr", post(handlers::pix::create_qr))
        .route("/pix/qr/pay", post(handlers::pix::pay_qr))
        .route(
            "/pix/qr/{payload}",
            get(handlers::pix::get_qr).delete(handlers::pix::delete_qr),
        )
        .route(
            "/cards",
            post(handlers::credit_card::create_card).get(handlers::credit_card::list_cards),
        )
        .route(
            "/cards/{id}/block",
            patch(handlers::credit_card::block_card),
        )
        .route(
            "/cards/{id}/limit",
            patch(handlers::credit_card::adjust_limit),
        )
        .route("/cards/{id}", delete(handlers::credit_card::delete_card))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until shutdown.
pub async fn run_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API docs at http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
