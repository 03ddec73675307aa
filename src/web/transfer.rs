// src/web/transfer.rs

use axum::{
    extract::{Json, Multipart, Path, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::VaultError;
use crate::middleware::AppState;
use crate::mutation::ImportRequest;
use crate::transfer::{ExportMode, ImportReport};

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportRequest {
    pub export_type: ExportMode,
    pub superadmin_password: Option<String>,
}

fn csv_response(filename: String, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
}

fn report_response(report: ImportReport) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": report.message(),
        "added": report.added,
        "skipped": report.skipped,
        "errors": report.errors,
    }))
}

/// Поля формы импорта: `file`, `a2fCode`, `isEncrypted`
async fn read_import_form(mut multipart: Multipart) -> Result<ImportRequest, VaultError> {
    let mut req = ImportRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VaultError::validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|e| VaultError::validation(format!("Invalid field {}: {}", name, e)))?;

        match name.as_str() {
            "file" => req.csv = Some(value),
            "a2fCode" => req.code = value,
            "isEncrypted" => req.already_encrypted = matches!(value.trim(), "true" | "1" | "on"),
            _ => {}
        }
    }

    Ok(req)
}

pub async fn export_records(
    State(service): State<AppState>,
    Path(organization_id): Path<Uuid>,
    session: Option<Session>,
    Json(payload): Json<ExportRequest>,
) -> Result<impl IntoResponse, VaultError> {
    let csv = service
        .export_records(
            session.as_ref(),
            organization_id,
            payload.export_type,
            payload.superadmin_password.as_deref(),
        )
        .await?;

    let filename = format!(
        "data_entreprise_{}_{}_{}.csv",
        organization_id,
        payload.export_type.as_str(),
        Utc::now().timestamp_millis()
    );
    Ok(csv_response(filename, csv))
}

pub async fn export_organizations(
    State(service): State<AppState>,
    session: Option<Session>,
) -> Result<impl IntoResponse, VaultError> {
    let csv = service.export_organizations(session.as_ref()).await?;
    let filename = format!("entreprises_{}.csv", Utc::now().timestamp_millis());
    Ok(csv_response(filename, csv))
}

pub async fn import_records(
    State(service): State<AppState>,
    Path(organization_id): Path<Uuid>,
    session: Option<Session>,
    multipart: Multipart,
) -> Result<impl IntoResponse, VaultError> {
    let req = read_import_form(multipart).await?;
    let report = service
        .pipeline()
        .import_records(session.as_ref(), organization_id, req)
        .await?;
    Ok(report_response(report))
}

pub async fn import_organizations(
    State(service): State<AppState>,
    session: Option<Session>,
    multipart: Multipart,
) -> Result<impl IntoResponse, VaultError> {
    let req = read_import_form(multipart).await?;
    let report = service.pipeline().import_organizations(session.as_ref(), req).await?;
    Ok(report_response(report))
}
