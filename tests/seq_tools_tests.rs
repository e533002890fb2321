//! Seq tool server tests
//!
//! End-to-end checks through the public API against mock Seq servers:
//! credential stores, connection probing, the three tools, shared error
//! classification and the version gate.
//!
//! Run: cargo nextest run --test seq_tools_tests

use std::sync::Arc;
use std::time::Duration;

use seq_mcp::auth::StaticCredentialStore;
use seq_mcp::client::{API_KEY_HEADER, parse_base_url};
use seq_mcp::tools::{AUTHENTICATION_FAILED, ToolContext, ToolError, ToolOutput};
use seq_mcp::{CredentialStore, SeqToolServer, ServerSettings};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GOOD_KEY: &str = "good-key";

async fn mount_root(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(header(API_KEY_HEADER, GOOD_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Product": "Seq",
            "Version": version,
            "Links": { "Events": "api/events/", "Signals": "api/signals/" }
        })))
        .mount(server)
        .await;
}

fn settings_for(uri: &str) -> ServerSettings {
    ServerSettings {
        server_url: parse_base_url(uri).unwrap(),
        capture_deadline: Duration::from_millis(300),
        ..ServerSettings::default()
    }
}

fn tool_server(server: &MockServer, store: impl CredentialStore + 'static) -> SeqToolServer {
    SeqToolServer::with_store(settings_for(&server.uri()), Arc::new(store)).unwrap()
}

async fn call(server: &SeqToolServer, tool: &str, input: Value) -> ToolOutput {
    server
        .registry()
        .execute(tool, input, &ToolContext::new())
        .await
}

fn event(id: &str, application: &str, message: &str) -> Value {
    json!({
        "Id": id,
        "Level": "Information",
        "RenderedMessage": message,
        "Properties": [{ "Name": "Application", "Value": application }]
    })
}

// =============================================================================
// Credentials
// =============================================================================

mod credential_tests {
    use super::*;
    use seq_mcp::{EnvironmentCredentialStore, FileCredentialStore};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_reload_then_get() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.json");
        tokio::fs::write(&path, r#"{ "default":"OLD" }"#).await.unwrap();

        let store = FileCredentialStore::open(&path).await.unwrap();
        tokio::fs::write(&path, r#"{ "default":"NEW" }"#).await.unwrap();
        store.reload().await.unwrap();

        assert_eq!(store.get_api_key(Some("default")).await.unwrap().expose(), "NEW");
    }

    #[tokio::test]
    async fn test_file_store_watch_picks_up_rotation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.json");
        tokio::fs::write(&path, r#"{ "default":"OLD" }"#).await.unwrap();

        let store = Arc::new(FileCredentialStore::open(&path).await.unwrap());
        let _watcher = store.watch(Duration::from_millis(25)).unwrap();
        tokio::fs::write(&path, r#"{ "default":"ROTATED" }"#).await.unwrap();

        let mut rotated = false;
        for _ in 0..100 {
            if store.get_api_key(None).await.unwrap().expose() == "ROTATED" {
                rotated = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(rotated);
    }

    #[tokio::test]
    async fn test_file_store_watch_sees_rotation_right_after_start() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, r#"{ "default":"OLD" }"#).unwrap();

        let store = Arc::new(FileCredentialStore::open(&path).await.unwrap());
        let _watcher = store.watch(Duration::from_millis(20)).unwrap();
        std::fs::write(&path, r#"{ "default":"ROTATED" }"#).unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.get_api_key(None).await.unwrap().expose(), "ROTATED");
    }

    #[tokio::test]
    async fn test_environment_store_fallback_and_override() {
        let store = EnvironmentCredentialStore::from_vars([
            ("SEQ_API_KEY", "D"),
            ("SEQ_API_KEY_PRODUCTION", "P"),
        ])
        .unwrap();

        assert_eq!(store.get_api_key(None).await.unwrap().expose(), "D");
        assert_eq!(store.get_api_key(Some("production")).await.unwrap().expose(), "P");
        assert_eq!(store.get_api_key(Some("staging")).await.unwrap().expose(), "D");
    }

    #[tokio::test]
    async fn test_file_store_never_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.json");
        tokio::fs::write(&path, r#"{ "default":"D" }"#).await.unwrap();

        let store = FileCredentialStore::open(&path).await.unwrap();
        assert!(
            store
                .get_api_key(Some("staging"))
                .await
                .unwrap_err()
                .is_configuration_error()
        );
    }
}

// =============================================================================
// SeqSearch
// =============================================================================

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_search_returns_events() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .and(query_param("filter", "@Level = 'Error'"))
            .and(query_param("count", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                event("event-1", "checkout", "Payment declined"),
                event("event-2", "checkout", "Timeout calling bank")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let output = call(
            &tools,
            "SeqSearch",
            json!({ "filter": "@Level = 'Error'", "count": 20 }),
        )
        .await;

        assert!(!output.is_error(), "{}", output.text());
        assert_eq!(output.items().len(), 2);
        assert_eq!(output.items()[0]["Id"], "event-1");
        assert_eq!(output.items()[1]["RenderedMessage"], "Timeout calling bank");
    }

    #[tokio::test]
    async fn test_search_rejects_bad_input_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        for input in [
            json!({ "filter": "   " }),
            json!({ "filter": "x", "count": 0 }),
            json!({ "filter": "x", "count": 1001 }),
            json!({ "count": 5 }),
        ] {
            let output = call(&tools, "SeqSearch", input).await;
            assert!(matches!(
                output.as_error(),
                Some(ToolError::InvalidInput { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_request_timeout_returns_empty() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        for endpoint in ["/api/events", "/api/signals"] {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([]))
                        .set_delay(Duration::from_secs(3)),
                )
                .mount(&server)
                .await;
        }

        let settings = ServerSettings {
            request_timeout: Duration::from_millis(200),
            ..settings_for(&server.uri())
        };
        let tools = SeqToolServer::with_store(
            settings,
            Arc::new(StaticCredentialStore::api_key(GOOD_KEY)),
        )
        .unwrap();

        for (tool, input) in [
            ("SeqSearch", json!({ "filter": "x" })),
            ("SignalList", json!({})),
        ] {
            let output = call(&tools, tool, input).await;
            assert!(!output.is_error(), "{} returned {}", tool, output.text());
            assert!(output.is_empty());
        }
    }

    #[tokio::test]
    async fn test_search_collapses_own_auth_flood() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        let flood: Vec<Value> = (0..25)
            .map(|i| {
                event(
                    &format!("event-{}", i),
                    "SeqMcpServer",
                    "Authentication failed: invalid or under-permissioned API key",
                )
            })
            .collect();
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(flood)))
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let output = call(&tools, "SeqSearch", json!({ "filter": "@Level = 'Error'" })).await;

        assert_eq!(output.items().len(), 1);
        let collapsed = output.items()[0]["Properties"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["Name"] == "CollapsedCount")
            .unwrap()
            .clone();
        assert_eq!(collapsed["Value"], 25);
    }
}

// =============================================================================
// SeqWaitForEvents
// =============================================================================

mod wait_tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_util::sync::CancellationToken;

    /// Minimal Seq endpoint whose live stream sends `events` and then stays
    /// open without sending anything more.
    async fn stalling_stream_server(events: Vec<Value>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, events.clone()));
            }
        });
        format!("http://{}", addr)
    }

    async fn read_head(socket: &mut TcpStream, buf: &mut Vec<u8>) -> Option<String> {
        loop {
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).into_owned();
                buf.drain(..end + 4);
                return Some(head);
            }
            let mut chunk = [0u8; 1024];
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return None,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
    }

    async fn serve(mut socket: TcpStream, events: Vec<Value>) {
        let mut buf = Vec::new();
        while let Some(head) = read_head(&mut socket, &mut buf).await {
            if head.starts_with("GET /api/events/stream") {
                let mut response = String::from(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n",
                );
                for event in &events {
                    let data = format!("data: {}\n\n", event);
                    response.push_str(&format!("{:x}\r\n{}\r\n", data.len(), data));
                }
                if socket.write_all(response.as_bytes()).await.is_ok() {
                    std::future::pending::<()>().await;
                }
                return;
            }

            let body = json!({
                "Version": "2024.3.13000",
                "Links": { "Events": "api/events/" }
            })
            .to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            if socket.write_all(response.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    fn sse(events: &[Value]) -> String {
        events
            .iter()
            .map(|e| format!("data: {}\n\n", e))
            .collect()
    }

    #[tokio::test]
    async fn test_capture_stops_at_count() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        Mock::given(method("GET"))
            .and(path("/api/events/stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse(&[
                        event("a", "api", "one"),
                        event("b", "api", "two"),
                        event("c", "api", "three"),
                    ])),
            )
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let output = call(&tools, "SeqWaitForEvents", json!({ "count": 1 })).await;

        assert!(!output.is_error(), "{}", output.text());
        assert_eq!(output.items().len(), 1);
        assert_eq!(output.items()[0]["Id"], "a");
    }

    #[tokio::test]
    async fn test_capture_returns_empty_on_silence() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        Mock::given(method("GET"))
            .and(path("/api/events/stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(sse(&[event("late", "api", "too late")]))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let started = Instant::now();
        let output = call(&tools, "SeqWaitForEvents", json!({ "filter": "@Level = 'Error'" })).await;

        assert!(output.is_empty());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_deadline_discards_partial_capture() {
        let uri = stalling_stream_server(vec![event("early", "api", "first and only")]).await;
        let tools = SeqToolServer::with_store(
            settings_for(&uri),
            Arc::new(StaticCredentialStore::api_key(GOOD_KEY)),
        )
        .unwrap();

        let started = Instant::now();
        let output = call(&tools, "SeqWaitForEvents", json!({ "count": 5 })).await;

        assert!(!output.is_error(), "{}", output.text());
        assert!(output.is_empty(), "{}", output.text());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_count_reached_before_deadline_is_returned() {
        let uri = stalling_stream_server(vec![
            event("a", "api", "one"),
            event("b", "api", "two"),
        ])
        .await;
        let tools = SeqToolServer::with_store(
            settings_for(&uri),
            Arc::new(StaticCredentialStore::api_key(GOOD_KEY)),
        )
        .unwrap();

        let output = call(&tools, "SeqWaitForEvents", json!({ "count": 2 })).await;
        assert_eq!(output.items().len(), 2);
        assert_eq!(output.items()[1]["Id"], "b");
    }

    #[tokio::test]
    async fn test_caller_cancellation_returns_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let token = CancellationToken::new();
        token.cancel();
        let context = ToolContext::with_cancellation(token);

        for (tool, input) in [
            ("SeqWaitForEvents", json!({})),
            ("SeqSearch", json!({ "filter": "x" })),
            ("SignalList", json!({})),
        ] {
            let output = tools.registry().execute(tool, input, &context).await;
            assert!(output.is_empty(), "{} returned {}", tool, output.text());
        }
    }

    #[tokio::test]
    async fn test_capture_rejects_count_out_of_range() {
        let server = MockServer::start().await;
        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let output = call(&tools, "SeqWaitForEvents", json!({ "count": 101 })).await;
        assert!(matches!(
            output.as_error(),
            Some(ToolError::InvalidInput { .. })
        ));
    }
}

// =============================================================================
// SignalList
// =============================================================================

mod signal_tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_shared_signals() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        Mock::given(method("GET"))
            .and(path("/api/signals"))
            .and(query_param("shared", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "Id": "signal-m33301", "Title": "Errors", "OwnerId": null, "Filters": [] },
                { "Id": "signal-m33302", "Title": "Personal", "OwnerId": "user-admin" }
            ])))
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let output = call(&tools, "SignalList", json!({})).await;

        assert_eq!(output.items().len(), 1);
        assert_eq!(output.items()[0]["Title"], "Errors");
        assert!(output.items()[0]["Filters"].is_array());
    }
}

// =============================================================================
// Classification
// =============================================================================

mod classification_tests {
    use super::*;

    async fn rejecting_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "Error": "The API key bad-key-12345 is not valid"
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_rejected_key_is_authentication_for_every_tool() {
        let server = rejecting_server().await;
        let tools = tool_server(&server, StaticCredentialStore::api_key("bad-key-12345"));

        for (tool, input) in [
            ("SeqSearch", json!({ "filter": "x" })),
            ("SeqWaitForEvents", json!({})),
            ("SignalList", json!({})),
        ] {
            let output = call(&tools, tool, input).await;
            assert_eq!(output.as_error(), Some(&ToolError::Authentication));
            assert_eq!(output.text(), AUTHENTICATION_FAILED);
            assert!(!output.text().contains("bad-key"));
        }
    }

    #[tokio::test]
    async fn test_missing_events_permission_is_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Version": "2024.3.13000",
                "Links": { "Users": "api/users/" }
            })))
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let output = call(&tools, "SeqSearch", json!({ "filter": "x" })).await;
        assert_eq!(output.as_error(), Some(&ToolError::Authentication));
    }

    #[tokio::test]
    async fn test_forbidden_call_after_probe_is_authentication() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        for endpoint in ["/api/events", "/api/signals"] {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                    "Error": "Key good-key lacks the Read permission"
                })))
                .mount(&server)
                .await;
        }

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        for (tool, input) in [
            ("SeqSearch", json!({ "filter": "x" })),
            ("SignalList", json!({})),
        ] {
            let output = call(&tools, tool, input).await;
            assert_eq!(output.as_error(), Some(&ToolError::Authentication));
            assert_eq!(output.text(), AUTHENTICATION_FAILED);
        }
    }

    #[tokio::test]
    async fn test_unknown_workspace_is_configuration() {
        let server = MockServer::start().await;
        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let output = call(
            &tools,
            "SignalList",
            json!({ "workspace": "nowhere" }),
        )
        .await;
        assert!(matches!(
            output.as_error(),
            Some(ToolError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_server_failure_is_transport() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        let output = call(&tools, "SeqSearch", json!({ "filter": "x" })).await;
        assert!(matches!(
            output.as_error(),
            Some(ToolError::Transport { .. })
        ));
    }
}

// =============================================================================
// Version gate
// =============================================================================

mod version_tests {
    use super::*;
    use seq_mcp::VersionCheck;

    #[tokio::test]
    async fn test_supported_version() {
        let server = MockServer::start().await;
        mount_root(&server, "2024.3.13000").await;
        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        assert!(tools.startup_check().await.is_supported());
    }

    #[tokio::test]
    async fn test_out_of_range_is_not_fatal() {
        let server = MockServer::start().await;
        mount_root(&server, "2021.2.5000").await;
        let tools = tool_server(&server, StaticCredentialStore::api_key(GOOD_KEY));
        assert!(matches!(
            tools.startup_check().await,
            VersionCheck::OutOfRange { .. }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let server = MockServer::start().await;
        let tools = tool_server(&server, StaticCredentialStore::api_key("other-key"));
        assert!(matches!(
            tools.startup_check().await,
            VersionCheck::Unavailable(_)
        ));
    }
}
