use std::time::Duration;

use serde_json::json;
use weather_core::geolocation::{GeolocationErrorKind, PositionOptions};
use weather_core::{
    Coordinates, GeolocationSession, IpPositionProvider, LocationStore, PositionError,
    PositionProvider,
};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn lookup_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .and(header_exists("user-agent"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn provider(server: &MockServer) -> IpPositionProvider {
    IpPositionProvider::new(format!("{}/json/", server.uri()))
}

#[tokio::test]
async fn reads_coordinates_from_lookup() {
    let server = lookup_server(ResponseTemplate::new(200).set_body_json(json!({
        "ip": "203.0.113.7",
        "city": "Beijing",
        "latitude": 39.9042,
        "longitude": 116.4074
    })))
    .await;

    let coords = provider(&server)
        .current_position(&PositionOptions::default())
        .await
        .unwrap();
    assert_eq!(coords, Coordinates::new(39.9042, 116.4074));
}

#[tokio::test]
async fn rejected_lookup_is_permission_denied() {
    for status in [401, 403] {
        let server = lookup_server(ResponseTemplate::new(status)).await;
        let err = provider(&server)
            .current_position(&PositionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, PositionError::PermissionDenied, "status {status}");
    }
}

#[tokio::test]
async fn server_error_is_other() {
    let server = lookup_server(ResponseTemplate::new(503)).await;
    let err = provider(&server)
        .current_position(&PositionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PositionError::Other(_)));
}

#[tokio::test]
async fn response_without_coordinates_is_unavailable() {
    let server = lookup_server(ResponseTemplate::new(200).set_body_json(json!({
        "error": true,
        "reason": "RateLimited"
    })))
    .await;

    let err = provider(&server)
        .current_position(&PositionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PositionError::PositionUnavailable(_)));
}

#[tokio::test]
async fn slow_lookup_times_out() {
    let server = lookup_server(
        ResponseTemplate::new(200)
            .set_body_json(json!({ "latitude": 1.0, "longitude": 2.0 }))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let options = PositionOptions {
        timeout: Duration::from_millis(100),
        ..PositionOptions::default()
    };
    let err = provider(&server).current_position(&options).await.unwrap_err();
    assert_eq!(err, PositionError::Timeout);
}

#[tokio::test]
async fn session_falls_back_when_lookup_is_denied() {
    let server = lookup_server(ResponseTemplate::new(403)).await;
    let store = LocationStore::in_memory();
    store.save_auto_location(Coordinates::new(31.2304, 121.4737));

    let session = GeolocationSession::new(provider(&server), store);
    let state = session.request_location().await;

    assert_eq!(state.coordinates(), Some(Coordinates::new(31.2304, 121.4737)));
    assert_eq!(state.error_kind, Some(GeolocationErrorKind::PermissionDenied));
    assert_eq!(state.error.as_deref(), Some("位置权限被拒绝，使用上次已知位置"));
}
