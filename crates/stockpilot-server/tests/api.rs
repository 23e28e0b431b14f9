//! End-to-end tests for the HTTP API against a real listener.

use reqwest::StatusCode;
use serde_json::{json, Value};
use stockpilot_core::{Inventory, SqliteProductStore};
use stockpilot_media::{MediaClient, MediaConfig};
use stockpilot_server::{build_router, AppState, ServerConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_app_with(config: ServerConfig, media: MediaConfig) -> String {
    let state = AppState::new(
        Inventory::new(SqliteProductStore::memory().expect("memory store")),
        MediaClient::new(media).expect("media client"),
        config,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    format!("http://{addr}")
}

async fn spawn_app() -> String {
    spawn_app_with(ServerConfig::default(), MediaConfig::default()).await
}

async fn create(client: &reqwest::Client, base: &str, body: Value) -> Value {
    let resp = client
        .post(format!("{base}/v1/products"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

async fn error_code(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.unwrap();
    body["error"]["code"].as_str().unwrap_or_default().to_string()
}

async fn mount_storage(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/b2api/v2/b2_authorize_account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "acc-1",
            "authorizationToken": "acct-token",
            "apiUrl": mock_server.uri(),
            "downloadUrl": format!("{}/dl", mock_server.uri())
        })))
        .mount(mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b2api/v2/b2_get_upload_url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadUrl": format!("{}/pod/upload", mock_server.uri()),
            "authorizationToken": "upload-token"
        })))
        .mount(mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pod/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fileId": "file-1",
            "fileName": "products/x.png"
        })))
        .mount(mock_server)
        .await;
}

fn storage_config(mock_server: &MockServer) -> MediaConfig {
    MediaConfig::default()
        .with_credentials("kid", "key")
        .with_bucket("bucket-1", "shop-media")
        .with_api_url(mock_server.uri())
        .with_max_retries(0)
}

#[tokio::test]
async fn test_health_version_categories() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let version: Value = client
        .get(format!("{base}/v1/version"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(version["name"], "stockpilot");
    assert!(version["version"].is_string());

    let categories: Vec<String> = client
        .get(format!("{base}/v1/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(categories.len(), 11);
    assert_eq!(categories.last().map(String::as_str), Some("Other"));
}

#[tokio::test]
async fn test_product_lifecycle() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let created = create(
        &client,
        &base,
        json!({
            "name": "Kettle",
            "price": 40.0,
            "discountPercentage": 25,
            "stockLevel": 2,
            "reorderPoint": 5,
            "category": "Home Goods"
        }),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);
    assert_eq!(created["effectivePrice"], 30.0);
    assert_eq!(created["lowStock"], true);
    assert_eq!(
        created["imageUrl"],
        "https://placehold.co/100x100.png?text=K"
    );

    let fetched: Value = client
        .get(format!("{base}/v1/products/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let patched: Value = client
        .patch(format!("{base}/v1/products/{id}"))
        .json(&json!({"price": 50.0, "description": "1.7L steel"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(patched["price"], 50.0);
    assert_eq!(patched["description"], "1.7L steel");
    assert_eq!(patched["name"], "Kettle");

    let stocked: Value = client
        .put(format!("{base}/v1/products/{id}/stock"))
        .json(&json!({"stockLevel": 4}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stocked["stockLevel"], 4);

    let receipt: Value = client
        .post(format!("{base}/v1/products/{id}/restock"))
        .json(&json!({"quantity": 10}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(receipt["previousLevel"], 4);
    assert_eq!(receipt["newLevel"], 14);
    assert_eq!(receipt["stillLow"], false);

    let resp = client
        .delete(format!("{base}/v1/products/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base}/v1/products/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(resp).await, "not_found");

    let resp = client
        .delete(format!("{base}/v1/products/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_search_and_sort() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    for (name, cat, stock) in [
        ("Desk Lamp", "Home Goods", 8),
        ("Yoga Mat", "Sports", 30),
        ("Lamp Oil", "Home Goods", 1),
    ] {
        create(
            &client,
            &base,
            json!({"name": name, "price": 10.0, "category": cat, "stockLevel": stock}),
        )
        .await;
    }

    let all: Vec<Value> = client
        .get(format!("{base}/v1/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = all.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Desk Lamp", "Lamp Oil", "Yoga Mat"]);

    let lamps: Vec<Value> = client
        .get(format!("{base}/v1/products?q=lamp&sort=stock&order=desc"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = lamps.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Desk Lamp", "Lamp Oil"]);

    let resp = client
        .get(format!("{base}/v1/products?sort=weight"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "invalid_input");
}

#[tokio::test]
async fn test_input_errors() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/v1/products/not-an-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{base}/v1/products/0123456789abcdef01234567"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(format!("{base}/v1/products"))
        .json(&json!({"name": "  ", "price": 1.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{base}/v1/products"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "invalid_input");

    for body in [
        json!({"name": "Cup"}),
        json!({"name": "Cup", "price": "cheap"}),
        json!({"name": "Cup", "price": 1.0, "stockLevel": -1}),
    ] {
        let resp = client
            .post(format!("{base}/v1/products"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(error_code(resp).await, "invalid_input");
    }

    let resp = client
        .post(format!("{base}/v1/products"))
        .body(r#"{"name":"Cup","price":1.0}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{base}/v1/products?q=a&q=b"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let product = create(&client, &base, json!({"name": "Cup", "price": 3.0})).await;
    let id = product["id"].as_str().unwrap();
    let resp = client
        .put(format!("{base}/v1/products/{id}/stock"))
        .json(&json!({ "stockLevel": -3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "invalid_input");

    for quantity in [0, -5] {
        let resp = client
            .post(format!("{base}/v1/products/{id}/restock"))
            .json(&json!({ "quantity": quantity }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_dashboard_low_stock_and_report() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    for (name, cat, stock, reorder) in [
        ("Bolt", "Automotive", 3, 5),
        ("Wiper", "Automotive", 20, 5),
        ("Rake", "Garden", 5, 5),
    ] {
        create(
            &client,
            &base,
            json!({
                "name": name, "price": 2.0, "category": cat,
                "stockLevel": stock, "reorderPoint": reorder
            }),
        )
        .await;
    }

    let dash: Value = client
        .get(format!("{base}/v1/dashboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dash["totalProducts"], 3);
    assert_eq!(dash["totalStockUnits"], 28);
    assert_eq!(dash["lowStockCount"], 2);
    assert_eq!(dash["moreLowStock"], false);

    let low: Vec<Value> = client
        .get(format!("{base}/v1/low-stock"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = low.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Bolt", "Rake"]);

    let report: Value = client
        .get(format!("{base}/v1/reports/inventory"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["categoryCount"], 2);
    assert_eq!(report["categories"][0]["name"], "Automotive");
    assert_eq!(report["categories"][0]["stockUnits"], 23);
    assert_eq!(report["categories"][0]["sharePercent"], 67);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/healthz"))
        .header("x-request-id", "trace-42")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "trace-42");

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    let generated = resp.headers()["x-request-id"].to_str().unwrap();
    assert!(generated.starts_with("req-"));
}

#[tokio::test]
async fn test_body_limit() {
    let base = spawn_app_with(
        ServerConfig::default().with_max_body_bytes(256),
        MediaConfig::default(),
    )
    .await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/v1/products"))
        .json(&json!({"name": "x".repeat(1024), "price": 1.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_upload_credentials_unconfigured_is_503() {
    let base = spawn_app().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/v1/media/upload-credentials"))
        .json(&json!({"fileName": "shoe.png"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(resp).await, "media_unconfigured");
}

#[tokio::test]
async fn test_upload_credentials_issued() {
    let mock_server = MockServer::start().await;
    mount_storage(&mock_server).await;
    let base = spawn_app_with(ServerConfig::default(), storage_config(&mock_server)).await;

    let creds: Value = reqwest::Client::new()
        .post(format!("{base}/v1/media/upload-credentials"))
        .json(&json!({"fileName": "red shoe.png"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(creds["uploadUrl"], format!("{}/pod/upload", mock_server.uri()));
    assert_eq!(creds["authToken"], "upload-token");
    assert!(creds["finalFileName"]
        .as_str()
        .unwrap()
        .ends_with("-red_shoe.png"));
    assert_eq!(
        creds["publicFileUrlBase"],
        format!("{}/dl/file/shop-media", mock_server.uri())
    );
}

#[tokio::test]
async fn test_storage_failure_is_502() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/b2api/v2/b2_authorize_account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401, "code": "bad_auth_token", "message": "bad key"
        })))
        .mount(&mock_server)
        .await;
    let base = spawn_app_with(ServerConfig::default(), storage_config(&mock_server)).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/v1/media/upload-credentials"))
        .json(&json!({"fileName": "a.png"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(resp).await, "storage_error");
}

#[tokio::test]
async fn test_inline_media_offloaded_on_create() {
    let mock_server = MockServer::start().await;
    mount_storage(&mock_server).await;
    let base = spawn_app_with(
        ServerConfig::default().with_offload_inline_media(true),
        storage_config(&mock_server),
    )
    .await;

    let product = create(
        &reqwest::Client::new(),
        &base,
        json!({
            "name": "Poster",
            "price": 12.0,
            "mediaUrls": ["data:image/png;base64,aGVsbG8=", "https://cdn.example.com/b.jpg"]
        }),
    )
    .await;

    let media = product["mediaUrls"].as_array().unwrap();
    assert_eq!(media.len(), 2);
    let first = media[0].as_str().unwrap();
    assert!(first.starts_with(&format!("{}/dl/file/shop-media/products/", mock_server.uri())));
    assert!(first.ends_with("-inline.png"));
    assert_eq!(media[1], "https://cdn.example.com/b.jpg");
}

#[tokio::test]
async fn test_inline_media_kept_when_offload_disabled() {
    let base = spawn_app().await;
    let product = create(
        &reqwest::Client::new(),
        &base,
        json!({"name": "Poster", "price": 12.0, "mediaUrls": ["data:image/png;base64,aGVsbG8="]}),
    )
    .await;
    assert_eq!(product["mediaUrls"][0], "data:image/png;base64,aGVsbG8=");
}

#[tokio::test]
async fn test_inline_media_offloaded_on_update() {
    let mock_server = MockServer::start().await;
    mount_storage(&mock_server).await;
    let base = spawn_app_with(
        ServerConfig::default().with_offload_inline_media(true),
        storage_config(&mock_server),
    )
    .await;
    let client = reqwest::Client::new();
    let product = create(&client, &base, json!({"name": "Poster", "price": 12.0})).await;
    let id = product["id"].as_str().unwrap();

    let resp = client
        .patch(format!("{base}/v1/products/{id}"))
        .json(&json!({
            "mediaUrls": ["https://cdn.example.com/a.jpg", "data:image/png;base64,aGVsbG8="]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    let media = updated["mediaUrls"].as_array().unwrap();
    assert_eq!(media[0], "https://cdn.example.com/a.jpg");
    assert!(media[1]
        .as_str()
        .unwrap()
        .starts_with(&format!("{}/dl/file/shop-media/products/", mock_server.uri())));

    let uploads = mock_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/pod/upload")
        .count();
    assert_eq!(uploads, 1);

    // Updates that leave media alone never reach storage.
    let resp = client
        .patch(format!("{base}/v1/products/{id}"))
        .json(&json!({"price": 14.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let uploads_after = mock_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/pod/upload")
        .count();
    assert_eq!(uploads_after, 1);
}
