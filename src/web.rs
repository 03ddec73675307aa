// src/web.rs

mod admins;
mod login;
mod organizations;
mod records;
mod transfer;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::error::VaultError;
use crate::middleware::AppState;

/// Ошибка → `{success: false, error}` с кодом по виду ошибки
impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

pub fn create_router(state: AppState, max_request_size: usize) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/api/login", post(login::login_handler))
        // организации
        .route(
            "/api/entreprises",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route("/api/entreprises/export", get(transfer::export_organizations))
        .route("/api/entreprises/import", post(transfer::import_organizations))
        .route(
            "/api/entreprises/:id",
            get(organizations::get_organization)
                .put(organizations::update_organization)
                .delete(organizations::delete_organization),
        )
        // записи
        .route(
            "/api/entreprises/:id/data",
            get(records::list_records).post(records::create_record),
        )
        .route("/api/entreprises/:id/data/export", post(transfer::export_records))
        .route("/api/entreprises/:id/data/import", post(transfer::import_records))
        .route("/api/data/:id", put(records::update_record).delete(records::delete_record))
        // администраторы
        .route("/api/admin", get(admins::list_admins).post(admins::create_admin))
        .route(
            "/api/admin/:id",
            get(admins::get_admin).put(admins::update_admin).delete(admins::delete_admin),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run_web_server(
    state: AppState,
    addr: &str,
    max_request_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state, max_request_size);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("web API listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
