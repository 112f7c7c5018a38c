//! Error decoding against a wiremock Shopify API.

use serde_json::json;
use shopapi::{
    ApiErrors, Create, Get, List, ListOptions, RetryPolicy, ShopifyClient, ShopifyError, Theme,
    ThemeCreate, Update,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const THEME: &str = "/admin/api/2024-01/themes/828155753.json";

fn client(server: &MockServer) -> ShopifyClient {
    ShopifyClient::new(&server.uri(), "shpat_test")
        .unwrap()
        .with_retry_policy(RetryPolicy::none())
}

#[tokio::test]
async fn test_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(THEME))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": "Not Found" })))
        .mount(&server)
        .await;

    let err = Theme::get(&client(&server), 828155753, None).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        err.failure().unwrap().errors,
        ApiErrors::Message("Not Found".to_string())
    );
    assert_eq!(err.to_string(), "Shopify API error (404): Not Found");
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(THEME))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": "[API] Invalid API key or access token (unrecognized login or wrong password)"
        })))
        .mount(&server)
        .await;

    let err = Theme::get(&client(&server), 828155753, None).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Invalid API key"));
}

#[tokio::test]
async fn test_validation_errors_keep_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/themes.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": { "name": ["can't be blank"], "src": "is not a valid URL" }
        })))
        .mount(&server)
        .await;

    let err = Theme::create(&client(&server), ThemeCreate::default())
        .await
        .unwrap_err();

    let failure = err.failure().unwrap();
    assert_eq!(failure.status, 422);
    assert_eq!(failure.field_errors("name"), ["can't be blank"]);
    assert_eq!(failure.field_errors("src"), ["is not a valid URL"]);
    assert!(failure.field_errors("role").is_empty());
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_raw() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(THEME))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = Theme::get(&client(&server), 828155753, None).await.unwrap_err();

    assert_eq!(
        err.failure().unwrap().errors,
        ApiErrors::Raw("<html>Bad Gateway</html>".to_string())
    );
}

#[tokio::test]
async fn test_missing_envelope_key_is_protocol_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(THEME))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "asset": { "key": "x" } })))
        .mount(&server)
        .await;

    let err = Theme::get(&client(&server), 828155753, None).await.unwrap_err();

    match err {
        ShopifyError::ProtocolMismatch(message) => assert!(message.contains("theme")),
        other => panic!("expected ProtocolMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_success_body_is_protocol_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(THEME))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = Theme::get(&client(&server), 828155753, None).await.unwrap_err();

    assert!(matches!(err, ShopifyError::ProtocolMismatch(_)));
}

#[tokio::test]
async fn test_list_key_holding_object_is_protocol_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/themes.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "themes": { "id": 1 } })))
        .mount(&server)
        .await;

    let err = Theme::list_all(&client(&server), &ListOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ShopifyError::ProtocolMismatch(_)));
}

#[tokio::test]
async fn test_invalid_input_never_reaches_the_network() {
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);

    let err = Theme::update(&client, &Theme::default()).await.unwrap_err();
    assert!(matches!(err, ShopifyError::InvalidArgument(_)));

    let err = Theme::list_page(&client, &ListOptions::with_limit(251))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopifyError::InvalidArgument(_)));

    let err = Theme::list(&client, &ListOptions::with_limit(0)).err().unwrap();
    assert!(matches!(err, ShopifyError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on the discard port.
    let client = ShopifyClient::new("http://127.0.0.1:9", "shpat_test")
        .unwrap()
        .with_retry_policy(RetryPolicy::none());

    let err = Theme::get(&client, 1, None).await.unwrap_err();

    assert!(matches!(err, ShopifyError::TransportError(_)));
}
