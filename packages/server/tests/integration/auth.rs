use reqwest::Method;

use crate::common::{Credentials, TestApp, basic_header, routes};

#[tokio::test]
async fn missing_credentials_return_401() {
    let app = TestApp::spawn().await;

    let res = app
        .request(Method::GET, routes::ASSIGNMENTS, None, None)
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn wrong_password_returns_401() {
    let app = TestApp::spawn().await;
    app.create_account("jane@example.com", "correct-horse").await;

    let wrong = Credentials {
        email: "jane@example.com".into(),
        password: "battery-staple".into(),
    };
    let res = app.get(routes::ASSIGNMENTS, &wrong).await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn unknown_email_returns_401() {
    let app = TestApp::spawn().await;

    let ghost = Credentials {
        email: "ghost@example.com".into(),
        password: "whatever".into(),
    };
    let res = app.get(routes::ASSIGNMENTS, &ghost).await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn malformed_authorization_header_returns_401() {
    let app = TestApp::spawn().await;
    app.create_account("jane@example.com", "correct-horse").await;

    for header in [
        "Bearer abc.def.ghi".to_string(),
        "Basic not-base64!!".to_string(),
        basic_header("", "correct-horse"),
    ] {
        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::ASSIGNMENTS))
            .header("Authorization", header.clone())
            .send()
            .await
            .expect("Failed to send GET request");
        assert_eq!(res.status().as_u16(), 401, "header {header:?} should be rejected");
    }
}

#[tokio::test]
async fn valid_credentials_are_accepted() {
    let app = TestApp::spawn().await;
    let creds = app.create_account("jane@example.com", "correct-horse").await;

    let res = app.get(routes::ASSIGNMENTS, &creds).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body, serde_json::json!([]));
}
