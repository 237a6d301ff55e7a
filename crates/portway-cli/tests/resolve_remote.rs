//! Resolving remote compose references

use portway::config::ConfigError;
use portway::resolve::{ComposeRef, ComposeResolver};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPOSE: &str = "services:\n  web:\n    image: nginx:1.25\n";

#[tokio::test]
async fn test_github_reference_uses_raw_layout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/infra/v2/shop/compose.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPOSE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let resolver = ComposeResolver::new(dir.path())
        .unwrap()
        .with_github_base(server.uri());
    let reference: ComposeRef = "github:acme/infra/shop/compose.yaml@v2".parse().unwrap();

    let source = resolver.resolve(&reference).await.unwrap();

    assert_eq!(source.content, COMPOSE);
    assert_eq!(source.origin, "github:acme/infra/shop/compose.yaml@v2");
    assert_eq!(source.working_dir.as_deref(), Some(dir.path()));
}

#[tokio::test]
async fn test_url_reference_failure_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.yaml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let resolver = ComposeResolver::new(dir.path()).unwrap();
    let reference: ComposeRef = format!("url:{}/missing.yaml", server.uri()).parse().unwrap();

    match resolver.resolve(&reference).await.unwrap_err() {
        ConfigError::FetchStatus { status, .. } => assert_eq!(status, 404),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_local_file() {
    let dir = TempDir::new().unwrap();
    let resolver = ComposeResolver::new(dir.path()).unwrap();

    let err = resolver
        .resolve(&ComposeRef::File("compose.yaml".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigError::MissingComposeFile(path) if path == dir.path().join("compose.yaml")));
}
