use std::collections::HashMap;

use serde_json::json;
use toolbox_client::{HttpTransport, ToolboxClient, ToolboxError, Transport};
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_returns_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tool/t"))
        .respond_with(ResponseTemplate::new(200).set_body_string("serverVersion: \"1.0\""))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let url = Url::parse(&format!("{}/api/tool/t", server.uri())).unwrap();
    let body = transport.get(&url).await.unwrap();
    assert_eq!(body, "serverVersion: \"1.0\"");
}

#[tokio::test]
async fn test_get_non_2xx_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such tool"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let url = Url::parse(&format!("{}/api/tool/missing", server.uri())).unwrap();
    let result = transport.get(&url).await;
    let Err(ToolboxError::Transport { status, message }) = result else {
        panic!("expected Transport error, got {:?}", result);
    };
    assert_eq!(status, 404);
    assert_eq!(message, "no such tool");
}

#[tokio::test]
async fn test_post_sends_json_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tool/t/invoke"))
        .and(body_json(json!({"p2": 5})))
        .and(header("src1_token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let url = Url::parse(&format!("{}/api/tool/t/invoke", server.uri())).unwrap();
    let mut headers = HashMap::new();
    headers.insert("src1_token".to_string(), "tok".to_string());

    let result = transport
        .post(&url, &json!({"p2": 5}), &headers)
        .await
        .unwrap();
    assert_eq!(result, json!({"result": "ok"}));
}

#[tokio::test]
async fn test_post_non_2xx_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let url = Url::parse(&format!("{}/api/tool/t/invoke", server.uri())).unwrap();
    let result = transport.post(&url, &json!({}), &HashMap::new()).await;
    assert!(matches!(
        result,
        Err(ToolboxError::Transport { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_client_over_real_http() {
    let server = MockServer::start().await;
    let manifest = json!({
        "serverVersion": "1.0",
        "tools": {
            "echo": {
                "description": "Echoes its input",
                "parameters": [
                    {"name": "message", "type": "string", "description": "What to echo"}
                ]
            }
        }
    });
    Mock::given(method("GET"))
        .and(path("/api/tool/echo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&manifest))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tool/echo/invoke"))
        .and(body_json(json!({"message": "hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"echo": "hi"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ToolboxClient::new(&server.uri()).unwrap();
    let tool = client.load_tool("echo").await.unwrap();

    let mut args = serde_json::Map::new();
    args.insert("message".to_string(), json!("hi"));
    let result = tool.invoke(args).await.unwrap();
    assert_eq!(result, json!({"echo": "hi"}));

    client.close().await;
}
