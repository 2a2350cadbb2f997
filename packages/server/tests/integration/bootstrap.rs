use std::io::Write;

use sea_orm::{EntityTrait, PaginatorTrait};

use assignment_server::entity::account;
use assignment_server::seed;

use crate::common::{Credentials, TestApp, routes};

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn imported_accounts_can_authenticate() {
    let app = TestApp::spawn().await;
    let csv = write_csv(
        "first_name,last_name,email,password\n\
         Jane,Doe,jane@example.com,secret-jane\n\
         John,Smith,john@example.com,secret-john\n",
    );

    let inserted = seed::bootstrap_accounts(&app.db, csv.path()).await.unwrap();
    assert_eq!(inserted, 2);

    let jane = Credentials {
        email: "jane@example.com".into(),
        password: "secret-jane".into(),
    };
    assert_eq!(app.get(routes::ASSIGNMENTS, &jane).await.status, 200);

    let stored = account::Entity::find().all(&app.db).await.unwrap();
    assert!(stored.iter().all(|a| a.password.starts_with("$argon2")));
}

#[tokio::test]
async fn existing_emails_are_skipped() {
    let app = TestApp::spawn().await;
    app.create_account("jane@example.com", "original").await;
    let csv = write_csv(
        "first_name,last_name,email,password\n\
         Jane,Doe,jane@example.com,replaced\n\
         Ann,Lee,ann@example.com,secret-ann\n",
    );

    let inserted = seed::bootstrap_accounts(&app.db, csv.path()).await.unwrap();
    assert_eq!(inserted, 1);

    let again = seed::bootstrap_accounts(&app.db, csv.path()).await.unwrap();
    assert_eq!(again, 0);
    assert_eq!(account::Entity::find().count(&app.db).await.unwrap(), 2);

    let original = Credentials {
        email: "jane@example.com".into(),
        password: "original".into(),
    };
    assert_eq!(app.get(routes::ASSIGNMENTS, &original).await.status, 200);
}

#[tokio::test]
async fn missing_file_imports_nothing() {
    let app = TestApp::spawn().await;

    let inserted = seed::bootstrap_accounts(&app.db, std::path::Path::new("/nonexistent/users.csv"))
        .await
        .unwrap();

    assert_eq!(inserted, 0);
}
