//! Shared wiremock helpers for client tests.
//!
//! JSON-RPC responders echo the request id because ethers rejects replies
//! whose id does not match the request.

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, Request, Respond, ResponseTemplate};

struct JsonRpcResult {
    result: Value,
}

impl Respond for JsonRpcResult {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": request_id(request),
            "result": self.result,
        }))
    }
}

struct JsonRpcFailure {
    code: i64,
    message: String,
}

impl Respond for JsonRpcFailure {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": request_id(request),
            "error": { "code": self.code, "message": self.message },
        }))
    }
}

fn request_id(request: &Request) -> Value {
    serde_json::from_slice::<Value>(&request.body)
        .ok()
        .and_then(|body| body.get("id").cloned())
        .unwrap_or_else(|| json!(1))
}

/// Routes tracing output to the test harness when `RUST_LOG` asks for it.
/// Repeated calls are fine; only the first subscriber wins.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mocks one JSON-RPC method with a fixed `result`.
pub(crate) fn rpc_mock(method_name: &str, result: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": method_name })))
        .respond_with(JsonRpcResult { result })
}

/// Mocks one JSON-RPC method, matching on the exact params array.
pub(crate) fn rpc_mock_with_params(method_name: &str, params: Value, result: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(
            json!({ "method": method_name, "params": params }),
        ))
        .respond_with(JsonRpcResult { result })
}

/// Mocks one JSON-RPC method with an error reply, the way nodes report
/// reverts and rejected transactions.
pub(crate) fn rpc_error_mock(method_name: &str, code: i64, message: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": method_name })))
        .respond_with(JsonRpcFailure {
            code,
            message: message.to_string(),
        })
}

/// Mocks one REST route with a fixed JSON reply.
pub(crate) fn rest_mock(route: &str, body: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
}
