// src/web/organizations.rs

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::VaultError;
use crate::middleware::AppState;
use crate::models::{NewOrganization, OrganizationUpdate};

/// Тело запросов на удаление
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CodeBody {
    #[serde(rename = "a2fCode")]
    pub code: String,
}

impl CodeBody {
    pub fn from_optional(body: Option<Json<CodeBody>>) -> String {
        body.map(|Json(b)| b.code).unwrap_or_default()
    }
}

pub async fn list_organizations(
    State(service): State<AppState>,
    session: Option<Session>,
) -> Result<impl IntoResponse, VaultError> {
    let orgs = service.list_organizations(session.as_ref()).await?;
    Ok(Json(json!({ "success": true, "data": orgs })))
}

pub async fn get_organization(
    State(service): State<AppState>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
) -> Result<impl IntoResponse, VaultError> {
    let org = service.get_organization(session.as_ref(), id).await?;
    Ok(Json(json!({ "success": true, "data": org })))
}

pub async fn create_organization(
    State(service): State<AppState>,
    session: Option<Session>,
    Json(payload): Json<NewOrganization>,
) -> Result<impl IntoResponse, VaultError> {
    let org = service.pipeline().create_organization(session.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Organization created", "data": org })),
    ))
}

pub async fn update_organization(
    State(service): State<AppState>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
    Json(payload): Json<OrganizationUpdate>,
) -> Result<impl IntoResponse, VaultError> {
    let org = service.pipeline().update_organization(session.as_ref(), id, payload).await?;
    Ok(Json(json!({ "success": true, "message": "Organization updated", "data": org })))
}

pub async fn delete_organization(
    State(service): State<AppState>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
    body: Option<Json<CodeBody>>,
) -> Result<impl IntoResponse, VaultError> {
    let code = CodeBody::from_optional(body);
    service.pipeline().delete_organization(session.as_ref(), id, &code).await?;
    Ok(Json(json!({ "success": true, "message": "Organization deleted" })))
}
