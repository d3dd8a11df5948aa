//! End-to-end proxy tests against mocked x402 resources.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bazaar_catalog::{to_tool, Catalog};
use bazaar_mcp::{
    BazaarMcpServer, McpError, McpServerConfig, ProxyInvoker, ProxyToolCallInput,
    MAX_RESPONSE_BYTES,
};
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_for(url: &str, accepts: Value) -> Arc<Catalog> {
    let resource = serde_json::from_value(json!({
        "resource": url,
        "type": "http",
        "x402Version": 1,
        "accepts": accepts,
    }))
    .unwrap();
    Arc::new(Catalog::new(vec![resource]))
}

fn weather_catalog(server: &MockServer) -> Arc<Catalog> {
    catalog_for(
        &format!("{}/weather", server.uri()),
        json!([{
            "scheme": "exact",
            "network": "base-sepolia",
            "maxAmountRequired": "10000",
            "description": "Get weather",
            "outputSchema": {"input": {"method": "GET", "queryParams": {"city": "City"}}}
        }]),
    )
}

fn first_tool_name(catalog: &Catalog) -> String {
    to_tool(&catalog.resources()[0]).unwrap().name
}

fn params(value: Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

fn b64(value: &Value) -> String {
    STANDARD.encode(value.to_string())
}

#[tokio::test]
async fn proxies_successful_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "SF"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"temperature":71}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let result = invoker
        .invoke(&name, params(json!({"query": {"city": "SF"}})), None, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!result.is_error);
    assert!(result.meta.is_empty());
    let payload: Value = serde_json::from_str(&result.text).unwrap();
    assert_eq!(payload["status"], 200);
    assert_eq!(payload["body"], r#"{"temperature":71}"#);
    assert_eq!(payload["headers"]["content-type"][0], "application/json");
}

#[tokio::test]
async fn payment_required_header_becomes_structured_error() {
    let envelope = json!({
        "x402Version": 2,
        "error": "payment required",
        "resource": {"url": "https://api.example.com/weather"},
        "accepts": [{"scheme": "exact", "network": "eip155:84532", "amount": "10000"}]
    });

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(402)
                .insert_header("PAYMENT-REQUIRED", b64(&envelope).as_str())
                .set_body_string("not json at all"),
        )
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let result = invoker
        .invoke(&name, None, None, &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.is_error);
    assert_eq!(result.structured_content, Some(envelope.clone()));
    assert_eq!(result.payment_required(), Some(&envelope));
}

#[tokio::test]
async fn v1_payment_required_body_is_decoded() {
    let body = json!({
        "x402Version": 1,
        "error": "X-PAYMENT header is required",
        "accepts": [{"scheme": "exact", "network": "base-sepolia", "maxAmountRequired": "10000"}]
    });

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(402).set_body_json(&body))
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let result = invoker
        .invoke(&name, None, None, &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_error);
    assert_eq!(result.structured_content, Some(body));
}

#[tokio::test]
async fn v2_body_without_header_is_plain_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "x402Version": 2,
            "resource": {"url": "https://x"},
            "accepts": []
        })))
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let result = invoker
        .invoke(&name, None, None, &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_error);
    assert!(result.structured_content.is_none());
    let payload: Value = serde_json::from_str(&result.text).unwrap();
    assert_eq!(payload["status"], 402);
}

#[tokio::test]
async fn paid_call_sends_signature_and_reports_settlement() {
    let payment = json!({
        "x402Version": 2,
        "resource": {"url": "tool://weather"},
        "accepted": {"scheme": "exact", "network": "eip155:84532"},
        "payload": {"signature": "0xdeadbeef"}
    });
    let settlement = json!({"success": true, "transaction": "0xabc", "network": "eip155:84532"});
    let signature = STANDARD.encode(concat!(
        r#"{"accepted":{"network":"eip155:84532","scheme":"exact"},"#,
        r#""payload":{"signature":"0xdeadbeef"},"#,
        r#""resource":{"url":"tool://weather"},"x402Version":2}"#
    ));

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(header("PAYMENT-SIGNATURE", signature.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("PAYMENT-RESPONSE", b64(&settlement).as_str())
                .set_body_string(r#"{"temperature":71}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let result = invoker
        .invoke(&name, None, Some(&payment), &CancellationToken::new())
        .await
        .unwrap();

    assert!(!result.is_error);
    assert_eq!(result.payment_response(), Some(&settlement));
}

#[tokio::test]
async fn caller_payment_header_takes_precedence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(header("X-PAYMENT", "caller-supplied"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let payment = json!({"x402Version": 1, "scheme": "exact", "payload": {"signature": "0x1"}});
    let result = invoker
        .invoke(
            &name,
            params(json!({"headers": {"X-PAYMENT": "caller-supplied"}})),
            Some(&payment),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(!result.is_error);
}

#[tokio::test]
async fn body_upgrades_to_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/weather"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&format!("{}/weather", server.uri()), json!([]));
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let result = invoker
        .invoke(
            &name,
            params(json!({"body": {"lat": 37.7, "lon": -122.4}})),
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(!result.is_error);
    assert!(result.text.contains("201"));
}

#[tokio::test]
async fn large_bodies_are_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(MAX_RESPONSE_BYTES + 4096)))
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let result = invoker
        .invoke(&name, None, None, &CancellationToken::new())
        .await
        .unwrap();
    let payload: Value = serde_json::from_str(&result.text).unwrap();
    assert_eq!(payload["body"].as_str().unwrap().len(), MAX_RESPONSE_BYTES);
}

#[tokio::test]
async fn unknown_tool_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let mcp = BazaarMcpServer::from_catalog(catalog, McpServerConfig::default()).unwrap();

    let input = ProxyToolCallInput {
        tool_name: "x402_does_not_exist_00000000".into(),
        parameters: None,
    };
    let result = mcp
        .proxy(input, None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
}

#[tokio::test]
async fn cancellation_aborts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = invoker.invoke(&name, None, None, &cancel).await.unwrap_err();
    assert!(matches!(err, McpError::Cancelled));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn unreachable_upstream_is_fatal() {
    // nothing listens on the discard port
    let catalog = catalog_for("http://127.0.0.1:9/weather", json!([]));
    let name = first_tool_name(&catalog);
    let mcp = BazaarMcpServer::from_catalog(catalog, McpServerConfig::default()).unwrap();

    let input = ProxyToolCallInput {
        tool_name: name,
        parameters: None,
    };
    let result = mcp.proxy(input, None, &CancellationToken::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn paid_call_requires_signature_header_presence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(header_exists("X-PAYMENT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = weather_catalog(&server);
    let name = first_tool_name(&catalog);
    let invoker = ProxyInvoker::new(catalog).unwrap();

    let payment = json!({"x402Version": 1, "scheme": "exact", "network": "base-sepolia", "payload": {"signature": "0x1"}});
    let result = invoker
        .invoke(&name, None, Some(&payment), &CancellationToken::new())
        .await
        .unwrap();
    assert!(!result.is_error);
}
