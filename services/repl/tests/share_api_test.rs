mod common;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use repl_server::honeypot::now_unix;
use serde_json::{json, Value};
use shared::ShareStore;

fn share_payload() -> Value {
    json!({
        "code": "<?php echo 'hello';",
        "multisite": false,
        "wordpress_version": "latest",
        "php_version": "8.4",
    })
}

fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_create_share_redirects_to_share_page() {
    let fixture = common::setup_test_fixture(false);
    let server = TestServer::new(fixture.app()).unwrap();

    let response = server.post("/share").json(&share_payload()).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    let location = location(&response);
    let hash = location.strip_prefix("/share/").unwrap();
    assert_eq!(hash.len(), 10);
    assert!(hash.chars().all(|c| c.is_ascii_alphanumeric()));

    let share = fixture.store.find_by_hash(hash).await.unwrap().unwrap();
    assert_eq!(share.code, "<?php echo 'hello';");
    assert!(!share.multisite);
    assert_eq!(share.wordpress_version, "latest");
    assert_eq!(share.php_version, "8.4");
    assert!(share.plugins.is_empty());
    assert!(share.themes.is_empty());
}

#[tokio::test]
async fn test_create_multisite_share_with_extensions() {
    let fixture = common::setup_test_fixture(false);
    let server = TestServer::new(fixture.app()).unwrap();

    let mut payload = share_payload();
    payload["multisite"] = json!(true);
    payload["plugins"] = json!(["akismet", "hello-dolly"]);
    payload["themes"] = json!(["twentytwentyfour"]);

    let response = server.post("/share").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::FOUND);

    let location = location(&response);
    let share = fixture
        .store
        .find_by_hash(location.trim_start_matches("/share/"))
        .await
        .unwrap()
        .unwrap();
    assert!(share.multisite);
    assert_eq!(share.plugins, vec!["akismet", "hello-dolly"]);
    assert_eq!(share.themes, vec!["twentytwentyfour"]);
}

#[tokio::test]
async fn test_invalid_payloads_redirect_home_without_storing() {
    let fixture = common::setup_test_fixture(false);
    let server = TestServer::new(fixture.app()).unwrap();

    let mut missing_code = share_payload();
    missing_code.as_object_mut().unwrap().remove("code");

    let mut long_version = share_payload();
    long_version["wordpress_version"] = json!("x".repeat(21));

    let mut latest_php = share_payload();
    latest_php["php_version"] = json!("latest");

    for payload in [json!({}), missing_code, long_version, latest_php] {
        let response = server.post("/share").json(&payload).await;
        assert_eq!(response.status_code(), StatusCode::FOUND, "{payload}");
        assert_eq!(location(&response), "/");
    }

    assert_eq!(fixture.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_show_share_renders_page_object() {
    let fixture = common::setup_test_fixture(false);
    let server = TestServer::new(fixture.app()).unwrap();

    let response = server.post("/share").json(&share_payload()).await;
    let location = location(&response);
    let hash = location.trim_start_matches("/share/").to_string();

    let response = server
        .get(&location)
        .add_header(
            HeaderName::from_static("x-inertia"),
            HeaderValue::from_static("true"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.headers().get("x-inertia").unwrap(), "true");

    let page: Value = response.json();
    assert_eq!(page["component"], "index");
    assert_eq!(page["url"], location);

    let share = &page["props"]["share"];
    assert_eq!(share["hash"], hash);
    assert_eq!(share["code"], "<?php echo 'hello';");
    assert_eq!(share["php_version"], "8.4");
    assert_eq!(share["wordpress_version"], "latest");
    assert_eq!(share["multisite"], false);
    assert_eq!(share["plugins"], json!([]));
    assert_eq!(share["themes"], json!([]));
    assert!(share.get("id").is_none());
    assert_eq!(
        page["props"]["url"],
        format!("{}/share/{}", common::APP_URL, hash)
    );
}

#[tokio::test]
async fn test_show_share_html_shell() {
    let fixture = common::setup_test_fixture(false);
    let server = TestServer::new(fixture.app()).unwrap();

    let response = server.post("/share").json(&share_payload()).await;
    let location = location(&response);

    let response = server.get(&location).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let html = response.text();
    assert!(html.contains(r#"<div id="app" data-page=""#));
    assert!(html.contains("&lt;?php echo &#039;hello&#039;;"));
}

#[tokio::test]
async fn test_unknown_share_returns_not_found() {
    let fixture = common::setup_test_fixture(false);
    let server = TestServer::new(fixture.app()).unwrap();

    let response = server.get("/share/doesnotexist").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_index_page_props() {
    let fixture = common::setup_test_fixture(true);
    let server = TestServer::new(fixture.app()).unwrap();

    let response = server
        .get("/")
        .add_header(
            HeaderName::from_static("x-inertia"),
            HeaderValue::from_static("true"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let page: Value = response.json();
    assert_eq!(page["url"], "/");
    assert!(page["props"].get("share").is_none());

    let honeypot = &page["props"]["honeypot"];
    assert_eq!(honeypot["enabled"], true);
    assert_eq!(honeypot["nameFieldName"], "my_name");
    assert_eq!(honeypot["validFromFieldName"], "valid_from");
    assert!(honeypot["encryptedValidFrom"].is_string());
}

#[tokio::test]
async fn test_web_responses_are_publicly_cacheable() {
    let fixture = common::setup_test_fixture(false);
    let server = TestServer::new(fixture.app()).unwrap();

    for path in ["/", "/share/doesnotexist"] {
        let response = server.get(path).await;
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=604800"
        );
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    let response = server.post("/share").json(&share_payload()).await;
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=604800"
    );
}

#[tokio::test]
async fn test_honeypot_rejects_bot_submissions() {
    let fixture = common::setup_test_fixture(true);
    let server = TestServer::new(fixture.app()).unwrap();

    // Missing honeypot fields entirely.
    let response = server.post("/share").json(&share_payload()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().is_empty());

    // Name field filled in.
    let mut payload = share_payload();
    payload["my_name"] = json!("spam bot");
    payload["valid_from"] = json!(fixture.state.honeypot.issue_valid_from(now_unix() - 5));
    let response = server.post("/share").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    assert_eq!(fixture.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_honeypot_accepts_human_submissions() {
    let fixture = common::setup_test_fixture(true);
    let server = TestServer::new(fixture.app()).unwrap();

    let mut payload = share_payload();
    payload["my_name"] = json!("");
    payload["valid_from"] = json!(fixture.state.honeypot.issue_valid_from(now_unix() - 5));

    let response = server.post("/share").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/share/"));
    assert_eq!(fixture.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_health_check() {
    let fixture = common::setup_test_fixture(false);
    let server = TestServer::new(fixture.app()).unwrap();

    let response = server.get("/up").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
}
