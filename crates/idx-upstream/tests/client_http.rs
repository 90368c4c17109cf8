//! InvestingClient HTTP 동작 테스트.
//!
//! mockito로 업스트림을 흉내내어 URL 구성, 쿼리 파라미터,
//! 상태/형식 에러 매핑을 검증합니다.

use mockito::Matcher;
use serde_json::json;

use idx_core::config::UpstreamConfig;
use idx_core::domain::request::HistoricalQuery;
use idx_upstream::client::{InvestingClient, MarketDataProvider};
use idx_upstream::error::UpstreamError;

fn client_for(server: &mockito::Server) -> InvestingClient {
    let config = UpstreamConfig {
        base_url: server.url(),
        ..UpstreamConfig::default()
    };
    InvestingClient::new(&config).expect("client construction")
}

fn sample_query(code: &str) -> HistoricalQuery {
    HistoricalQuery::parse(code, "2024-01-01", "2024-06-01", "Daily", 365).unwrap()
}

#[tokio::test]
async fn search_sends_query_and_browser_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/v2/search")
        .match_query(Matcher::UrlEncoded("q".into(), "BBRI".into()))
        .match_header("domain-id", "id")
        .match_header("origin", "https://investing.com")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"quotes": [{"id": 1, "flag": "Indonesia"}]}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client.search("BBRI").await.unwrap();

    mock.assert_async().await;
    assert_eq!(response["quotes"][0]["id"], 1);
}

#[tokio::test]
async fn search_maps_http_error_to_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search/v2/search")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.search("BBRI").await.unwrap_err();

    match err {
        UpstreamError::Status { code, message } => {
            assert_eq!(code, 500);
            assert_eq!(message, "internal error");
        }
        other => panic!("expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn historical_sends_expected_parameters() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/financialdata/historical/29049")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start-date".into(), "2024-01-01".into()),
            Matcher::UrlEncoded("end-date".into(), "2024-06-01".into()),
            Matcher::UrlEncoded("time-frame".into(), "Daily".into()),
            Matcher::UrlEncoded("add-missing-rows".into(), "false".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": [{"rowDate": "2024-01-02"}]}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let payload = client.historical(&sample_query("29049")).await.unwrap();

    mock.assert_async().await;
    assert!(payload["data"].is_array());
}

#[tokio::test]
async fn historical_rejects_payload_without_data_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/financialdata/historical/29049")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"result": []}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.historical(&sample_query("29049")).await.unwrap_err();

    assert!(matches!(err, UpstreamError::Format(_)));
}

#[tokio::test]
async fn historical_rejects_non_object_payload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/financialdata/historical/29049")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[1, 2, 3]")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.historical(&sample_query("29049")).await.unwrap_err();

    assert!(matches!(err, UpstreamError::Format(_)));
}

#[tokio::test]
async fn historical_maps_http_error_to_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/financialdata/historical/29049")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.historical(&sample_query("29049")).await.unwrap_err();

    match err {
        UpstreamError::Status { code, .. } => assert_eq!(code, 404),
        other => panic!("expected Status error, got {:?}", other),
    }
}
