use reqwest::Method;

use crate::common::{Credentials, TestApp, routes};

#[tokio::test]
async fn healthy_database_returns_200_with_empty_body() {
    let app = TestApp::spawn().await;

    let res = app.request(Method::GET, routes::HEALTHZ, None, None).await;

    assert_eq!(res.status, 200);
    assert!(res.text.is_empty());
}

#[tokio::test]
async fn every_response_disables_caching() {
    let app = TestApp::spawn().await;

    let res = app.request(Method::GET, routes::HEALTHZ, None, None).await;

    assert_eq!(
        res.header("cache-control"),
        Some("no-cache, no-store, must-revalidate")
    );
    assert_eq!(res.header("pragma"), Some("no-cache"));
    assert_eq!(res.header("x-content-type-options"), Some("nosniff"));
}

#[tokio::test]
async fn non_get_methods_return_405() {
    let app = TestApp::spawn().await;

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let res = app.request(method.clone(), routes::HEALTHZ, None, None).await;
        assert_eq!(res.status, 405, "{method} should be rejected");
    }
}

#[tokio::test]
async fn request_with_body_returns_400() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .get(format!("http://{}{}", app.addr, routes::HEALTHZ))
        .body("ping")
        .send()
        .await
        .expect("Failed to send GET request");

    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn unreachable_database_returns_503_on_every_call() {
    let app = TestApp::spawn_without_database().await;

    for _ in 0..3 {
        let res = app.request(Method::GET, routes::HEALTHZ, None, None).await;
        assert_eq!(res.status, 503);
    }
}

#[tokio::test]
async fn unreachable_database_returns_503_on_api_endpoints() {
    let app = TestApp::spawn_without_database().await;
    let creds = Credentials {
        email: "jane@example.com".into(),
        password: "secret".into(),
    };

    let res = app.get(routes::ASSIGNMENTS, &creds).await;

    assert_eq!(res.status, 503);
    assert_eq!(res.body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn requests_are_counted_per_endpoint() {
    let app = TestApp::spawn().await;

    for _ in 0..2 {
        app.request(Method::GET, routes::HEALTHZ, None, None).await;
    }
    // Rejected requests count too.
    app.request(Method::GET, routes::ASSIGNMENTS, None, None)
        .await;

    let res = app.request(Method::GET, routes::METRICS, None, None).await;

    assert_eq!(res.status, 200);
    assert!(
        res.text
            .contains("assignment_requests_total{endpoint=\"healthz\"} 2"),
        "{}",
        res.text
    );
    assert!(
        res.text
            .contains("assignment_requests_total{endpoint=\"get_all_assignments\"} 1"),
        "{}",
        res.text
    );
}
