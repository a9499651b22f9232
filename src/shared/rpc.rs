use std::time::Duration;

use alloy_primitives::Address;
use serde_json::{json, Value};

const HTTP_TIMEOUT_SECS: u64 = 20;

fn read_json_or_text(resp: &mut ureq::http::Response<ureq::Body>) -> Value {
    let text = resp.body_mut().read_to_string().unwrap_or_default();
    serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "raw": text }))
}

pub fn rpc_json(rpc_url: &str, payload: Value) -> Result<Value, String> {
    let request = ureq::post(rpc_url)
        .header("content-type", "application/json")
        .config()
        .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
        .http_status_as_error(false)
        .build();
    let mut resp = request
        .send_json(payload)
        .map_err(|e| format!("RPC request failed: {e}"))?;
    let status = resp.status().as_u16();
    let body = read_json_or_text(&mut resp);
    if status >= 400 {
        return Err(format!("RPC HTTP failure ({status}): {body}"));
    }
    extract_result(body)
}

fn extract_result(body: Value) -> Result<Value, String> {
    if let Some(err) = body.get("error") {
        return Err(format!("RPC error: {err}"));
    }
    body.get("result")
        .cloned()
        .ok_or("RPC response missing result".to_string())
}

/// Read-only contract call against the latest block.
pub fn eth_call(rpc_url: &str, to: Address, data: &[u8]) -> Result<Vec<u8>, String> {
    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_call",
        "params": [
            {
                "to": to.to_string(),
                "data": format!("0x{}", hex::encode(data)),
            },
            "latest",
        ]
    });
    let result = rpc_json(rpc_url, payload)?;
    let hex = result
        .as_str()
        .ok_or("eth_call returned non-string result".to_string())?;
    parse_hex_bytes(hex)
}

pub fn parse_hex_bytes(value: &str) -> Result<Vec<u8>, String> {
    let clean = strip_0x(value);
    if clean.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(clean).map_err(|e| format!("invalid hex bytes '{value}': {e}"))
}

pub fn strip_0x(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}
