// src/web/records.rs

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
use crate::models::{NewRecord, RecordUpdate};

/// Записи организации в открытом виде
pub async fn list_records(
    State(service): State<AppState>,
    Path(organization_id): Path<Uuid>,
    session: Option<Session>,
) -> Result<impl IntoResponse, VaultError> {
    let records = service.list_records(session.as_ref(), organization_id).await?;
    Ok(Json(json!({ "success": true, "data": records })))
}

pub async fn create_record(
    State(service): State<AppState>,
    Path(organization_id): Path<Uuid>,
    session: Option<Session>,
    Json(payload): Json<NewRecord>,
) -> Result<impl IntoResponse, VaultError> {
    let record = service
        .pipeline()
        .create_record(session.as_ref(), organization_id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Record created", "id": record.id })),
    ))
}

pub async fn update_record(
    State(service): State<AppState>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
    Json(payload): Json<RecordUpdate>,
) -> Result<impl IntoResponse, VaultError> {
    let record = service.pipeline().update_record(session.as_ref(), id, payload).await?;
    Ok(Json(json!({ "success": true, "message": "Record updated", "id": record.id })))
}

pub async fn delete_record(
    State(service): State<AppState>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
    body: Option<Json<CodeBody>>,
) -> Result<impl IntoResponse, VaultError> {
    let code = CodeBody::from_optional(body);
    service.pipeline().delete_record(session.as_ref(), id, &code).await?;
    Ok(Json(json!({ "success": true, "message": "Record deleted" })))
}
