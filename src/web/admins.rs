// src/web/admins.rs

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use super::organizations::CodeBody;
use crate::auth::Session;
use crate::error::VaultError;
use crate::middleware::AppState;
use crate::models::{AdminUpdate, AdminView, NewAdmin};

pub async fn list_admins(
    State(service): State<AppState>,
    session: Option<Session>,
) -> Result<impl IntoResponse, VaultError> {
    let admins = service.list_admins(session.as_ref()).await?;
    Ok(Json(json!({ "success": true, "data": admins })))
}

pub async fn get_admin(
    State(service): State<AppState>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
) -> Result<impl IntoResponse, VaultError> {
    let admin = service.get_admin(session.as_ref(), id).await?;
    Ok(Json(json!({ "success": true, "data": admin })))
}

pub async fn create_admin(
    State(service): State<AppState>,
    session: Option<Session>,
    Json(payload): Json<NewAdmin>,
) -> Result<impl IntoResponse, VaultError> {
    let admin = service.pipeline().create_admin(session.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Administrator created",
            "data": AdminView::from(admin),
        })),
    ))
}

pub async fn update_admin(
    State(service): State<AppState>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
    Json(payload): Json<AdminUpdate>,
) -> Result<impl IntoResponse, VaultError> {
    let admin = service.pipeline().update_admin(session.as_ref(), id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Administrator updated",
        "data": AdminView::from(admin),
    })))
}

pub async fn delete_admin(
    State(service): State<AppState>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
    body: Option<Json<CodeBody>>,
) -> Result<impl IntoResponse, VaultError> {
    let code = CodeBody::from_optional(body);
    service.pipeline().delete_admin(session.as_ref(), id, &code).await?;
    Ok(Json(json!({ "success": true, "message": "Administrator deleted" })))
}
