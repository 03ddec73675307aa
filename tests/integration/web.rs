// tests/integration/web.rs

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use accstorage::web::create_router;

use crate::common::{fixture, Fixture, CODE, ROOT_LOGIN, ROOT_PASSWORD};

const BOUNDARY: &str = "accstorage-test-boundary";

fn router(fx: &Fixture) -> Router {
    create_router(fx.service.clone(), 1024 * 1024)
}

async fn token(fx: &Fixture) -> String {
    let response = router(fx)
        .oneshot(json_request(
            Method::POST,
            "/api/login",
            None,
            json!({ "identifiant": ROOT_LOGIN, "motDePasse": ROOT_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_request(uri: &str, token: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        if *name == "file" {
            body.push_str("Content-Disposition: form-data; name=\"file\"; filename=\"import.csv\"\r\n");
            body.push_str("Content-Type: text/csv\r\n\r\n");
        } else {
            body.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name));
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let fx = fixture().await;

    let response = router(&fx)
        .oneshot(json_request(
            Method::POST,
            "/api/login",
            None,
            json!({ "identifiant": ROOT_LOGIN, "motDePasse": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn reads_require_a_token() {
    let fx = fixture().await;

    let response = router(&fx).oneshot(get_request("/api/entreprises", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router(&fx)
        .oneshot(get_request("/api/entreprises", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = token(&fx).await;
    let response = router(&fx)
        .oneshot(get_request("/api/entreprises", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn error_kinds_map_to_status_codes() {
    let fx = fixture().await;
    let token = token(&fx).await;
    let org = fx.organization("Acme").await;
    fx.record(&org, "Durand", "pw").await;

    // 400: нет обязательных полей
    let response = router(&fx)
        .oneshot(json_request(Method::POST, "/api/entreprises", Some(&token), json!({ "nom": "X" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 401: неверный код
    let response = router(&fx)
        .oneshot(json_request(
            Method::POST,
            "/api/entreprises",
            Some(&token),
            json!({ "nom": "Globex", "adresse": "2 rue", "telephone": "0304", "a2fCode": "000000" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 404
    let response = router(&fx)
        .oneshot(get_request(&format!("/api/entreprises/{}", uuid::Uuid::new_v4()), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // 409: у организации есть записи
    let response = router(&fx)
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/entreprises/{}", org.id),
            Some(&token),
            json!({ "a2fCode": CODE }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Cannot delete the organization because records are linked to it");
}

#[tokio::test]
async fn organization_and_record_lifecycle() {
    let fx = fixture().await;
    let token = token(&fx).await;

    let response = router(&fx)
        .oneshot(json_request(
            Method::POST,
            "/api/entreprises",
            Some(&token),
            json!({ "nom": "Acme", "adresse": "1 rue", "telephone": "0102", "a2fCode": CODE }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["couleur"], "#22c55e");
    let org_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = router(&fx)
        .oneshot(json_request(
            Method::POST,
            &format!("/api/entreprises/{}/data", org_id),
            Some(&token),
            json!({
                "nom": "Durand",
                "prenom": "Anne",
                "typeInfo": "wifi",
                "identifiant": "anne",
                "motDePasse": "s3cret",
                "a2fCode": CODE
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let record_id = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = router(&fx)
        .oneshot(get_request(&format!("/api/entreprises/{}/data", org_id), Some(&token)))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["data"][0]["motDePasse"], "s3cret");

    let response = router(&fx)
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/data/{}", record_id),
            Some(&token),
            json!({ "a2fCode": CODE }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router(&fx)
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/entreprises/{}", org_id),
            Some(&token),
            json!({ "a2fCode": CODE }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let fx = fixture().await;
    let token = token(&fx).await;
    let org = fx.organization("Acme").await;
    fx.record(&org, "Durand", "pw").await;

    let response = router(&fx)
        .oneshot(json_request(
            Method::POST,
            &format!("/api/entreprises/{}/data/export", org.id),
            Some(&token),
            json!({ "exportType": "clear", "superadminPassword": ROOT_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with(&format!("attachment; filename=\"data_entreprise_{}_clear_", org.id)));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.contains(",Durand,Jean,"));

    let response = router(&fx)
        .oneshot(get_request("/api/entreprises/export", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"entreprises_"));
}

#[tokio::test]
async fn sub_admin_export_is_forbidden() {
    let fx = fixture().await;
    let org = fx.organization("Acme").await;
    let (sub, _) = fx.sub_admin("helper").await;
    let sub_token = fx.service.sessions().issue(&sub).unwrap();

    let response = router(&fx)
        .oneshot(json_request(
            Method::POST,
            &format!("/api/entreprises/{}/data/export", org.id),
            Some(&sub_token),
            json!({ "exportType": "encrypted" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn multipart_import_reports_counts() {
    let fx = fixture().await;
    let token = token(&fx).await;

    let response = router(&fx)
        .oneshot(multipart_request(
            "/api/entreprises/import",
            &token,
            &[
                ("file", "nom,adresse,telephone\nAcme,1 rue,0102\nGlobex,2 rue,0304\nAcme,3 rue,0506\n"),
                ("a2fCode", CODE),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Import finished: 2 added, 1 skipped, 0 errors");

    let org = fx.store.find_organization_by_name("Acme").await.unwrap().unwrap();
    let response = router(&fx)
        .oneshot(multipart_request(
            &format!("/api/entreprises/{}/data/import", org.id),
            &token,
            &[
                ("file", "nom,prenom,typeInfo,identifiant,motDePasse\nDurand,Anne,wifi,anne,pw\nMartin,,wifi,paul,pw\n"),
                ("a2fCode", CODE),
                ("isEncrypted", "false"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["added"], 1);
    assert_eq!(body["errors"], 1);
}

#[tokio::test]
async fn admin_views_never_expose_digests() {
    let fx = fixture().await;
    let token = token(&fx).await;

    let response = router(&fx)
        .oneshot(get_request("/api/admin", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let admin = &body["data"][0];
    assert_eq!(admin["role"], "superadmin");
    assert!(admin.get("identifiant").is_none());
    assert!(admin.get("motDePasse").is_none());
    assert!(admin.get("login").is_none());
}
