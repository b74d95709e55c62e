//! Newline-delimited JSON-RPC transport: one request per line on stdin, one
//! response per line on stdout. Runs on a single-threaded Tokio runtime —
//! `pinelint-core`'s `rayon` fan-out is the only parallelism in the process,
//!

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::dispatch::{Dispatcher, ToolOutcome};
use crate::protocol::{McpError, McpRequest, McpResponse, ToolCallResponse, ToolContent};
use crate::wire::{ToolErrorBody, ToolErrorDetail};

/// Drains newline-delimited JSON-RPC requests from `stdin` until EOF,
/// writing one newline-delimited response per request to `stdout`.
///
/// A line that isn't valid JSON gets a `parse_error` response instead of
/// terminating the loop — one malformed line from a misbehaving client
/// should not end the session.
pub async fn run_stdio(dispatcher: &Dispatcher) -> std::io::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<McpRequest>(trimmed) {
            Ok(request) => handle_request(dispatcher, request),
            Err(e) => McpResponse::error(
                serde_json::Value::Null,
                -32700,
                format!("failed to parse request: {e}"),
                None,
            ),
        };

        let encoded = serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"internal encoding failure"}}"#.to_string());
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}

/// Routes one request. `tools/call` is the only method the two tools ride
/// on; everything else is a JSON-RPC `method not found`.
fn handle_request(dispatcher: &Dispatcher, request: McpRequest) -> McpResponse {
    match request.method.as_str() {
        "tools/call" => handle_tool_call(dispatcher, request),
        other => McpResponse::error(
            request.id,
            -32601,
            McpError::method_not_found(format!("unknown method '{}'", other)).message,
            None,
        ),
    }
}

fn handle_tool_call(dispatcher: &Dispatcher, request: McpRequest) -> McpResponse {
    let params = match request.params {
        Some(p) => p,
        None => {
            return McpResponse::error(
                request.id,
                -32602,
                McpError::invalid_params("'tools/call' requires params".to_string()).message,
                None,
            )
        }
    };

    let name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n.to_string(),
        None => {
            return McpResponse::error(
                request.id,
                -32602,
                McpError::invalid_params("params.name is required".to_string()).message,
                None,
            )
        }
    };
    let arguments = params.get("arguments").cloned().unwrap_or(serde_json::Value::Null);

    // Tool failures ride inside the `result` envelope as `is_error: true`,
    // never as a JSON-RPC protocol-level error — only malformed requests
    // (missing method/params) get those.
    let tool_call_response = match dispatcher.call_tool(&name, arguments) {
        Ok(ToolOutcome::Value(value)) => ToolCallResponse {
            content: vec![ToolContent::Text {
                text: value.to_string(),
            }],
            is_error: false,
        },
        Ok(ToolOutcome::Stream(chunks)) => ToolCallResponse {
            content: chunks
                .into_iter()
                .map(|v| ToolContent::Text { text: v.to_string() })
                .collect(),
            is_error: false,
        },
        Err(e) => {
            let body = ToolErrorBody {
                error: ToolErrorDetail {
                    kind: e.kind(),
                    message: e.to_string(),
                },
            };
            ToolCallResponse {
                content: vec![ToolContent::Text {
                    text: serde_json::to_string(&body).expect("ToolErrorBody always serializes"),
                }],
                is_error: true,
            }
        }
    };

    let result = serde_json::to_value(tool_call_response).expect("ToolCallResponse always serializes");
    McpResponse::success(request.id, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinelint_core::reference::ReferenceIndex;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            ReferenceIndex::from_entries(vec![]),
            crate::dispatch::DispatcherLimits::default(),
        )
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let d = dispatcher();
        let request = McpRequest {
            jsonrpc: "2.0".to_string(),
            id: serde_json::json!(1),
            method: "not/a/method".to_string(),
            params: None,
        };
        let response = handle_request(&d, request);
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[test]
    fn tool_call_missing_name_is_invalid_params() {
        let d = dispatcher();
        let request = McpRequest {
            jsonrpc: "2.0".to_string(),
            id: serde_json::json!(1),
            method: "tools/call".to_string(),
            params: Some(serde_json::json!({ "arguments": {} })),
        };
        let response = handle_request(&d, request);
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[test]
    fn tool_call_success_wraps_code_review_in_content_text() {
        let d = dispatcher();
        let request = McpRequest {
            jsonrpc: "2.0".to_string(),
            id: serde_json::json!(7),
            method: "tools/call".to_string(),
            params: Some(serde_json::json!({
                "name": "code_review",
                "arguments": { "source_type": "code", "code": "indicator(\"T\")" }
            })),
        };
        let response = handle_request(&d, request);
        let result = response.result.expect("successful call has a result");
        assert_eq!(result["is_error"], false);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("\"summary\""));
    }

    #[test]
    fn unknown_tool_name_is_an_error_envelope_not_a_protocol_error() {
        let d = dispatcher();
        let request = McpRequest {
            jsonrpc: "2.0".to_string(),
            id: serde_json::json!(2),
            method: "tools/call".to_string(),
            params: Some(serde_json::json!({ "name": "not_a_tool", "arguments": {} })),
        };
        let response = handle_request(&d, request);
        assert!(response.error.is_none());
        let result = response.result.expect("method-level success even on tool error");
        assert_eq!(result["is_error"], true);
    }
}
