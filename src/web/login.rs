// src/web/login.rs

use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::error::{require, VaultError};
use crate::middleware::AppState;
use crate::models::AdminView;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub identifiant: String,
    #[serde(rename = "motDePasse")]
    pub mot_de_passe: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_in: i64,
    pub admin: AdminView,
}

pub async fn login_handler(
    State(service): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, VaultError> {
    require(&[
        ("identifiant", payload.identifiant.as_str()),
        ("motDePasse", payload.mot_de_passe.as_str()),
    ])?;

    let (token, admin) = service.login(&payload.identifiant, &payload.mot_de_passe).await?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        expires_in: service.sessions().ttl_secs(),
        admin: AdminView::from(admin),
    }))
}
