//! # JSON-RPC Transport
//!
//! [`Transport`] over the standard Ethereum JSON-RPC API (`eth_call`,
//! `eth_sendRawTransaction`, `eth_getTransactionReceipt`, ...) using
//! `reqwest`.
//!
//! ## Error Mapping
//!
//! | Situation | `TransportError` |
//! |-----------|------------------|
//! | HTTP send failed | `Connection` (or `Timeout` when the client timed out) |
//! | Body not a JSON-RPC response | `MalformedResponse` |
//! | `eth_call` reverted | `Reverted` with the decoded reason |
//! | `eth_sendRawTransaction` error object | `Rejected` |
//! | Any other error object | `Rpc` |

use async_trait::async_trait;
use gt_02_interface_codec::decode_revert_reason;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{
    Address, BlockHeight, CallRequest, Receipt, SignedTransaction, Transport, TransportError,
    TxHash, U256,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC code geth uses for reverted execution.
const EXECUTION_REVERTED: i64 = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    status: Option<String>,
    block_number: Option<String>,
    gas_used: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    from: Address,
    to: Option<Address>,
    #[serde(default)]
    value: Option<String>,
    input: String,
}

/// Transport backed by a node's HTTP JSON-RPC endpoint.
pub struct JsonRpcTransport {
    http_client: reqwest::Client,
    rpc_url: String,
    timeout_ms: u64,
    request_id: AtomicU64,
}

impl std::fmt::Debug for JsonRpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcTransport")
            .field("rpc_url", &self.rpc_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl JsonRpcTransport {
    /// Create a transport for `rpc_url` with a per-request timeout.
    pub fn new(rpc_url: impl Into<String>, timeout_ms: u64) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.into(),
            timeout_ms,
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this transport talks to.
    pub fn url(&self) -> &str {
        &self.rpc_url
    }

    /// Make a JSON-RPC call; `None` when the node answers `null`.
    async fn request<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, TransportError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout_ms)
                } else {
                    TransportError::Connection(e.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse(format!("{method}: {e}")))?;

        if let Some(error) = rpc_response.error {
            debug!(method, code = error.code, message = %error.message, "RPC error");
            return Err(classify_error(error));
        }
        Ok(rpc_response.result)
    }

    /// Like [`Self::request`] but a `null` result is malformed.
    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, TransportError> {
        self.request(method, params).await?.ok_or_else(|| {
            TransportError::MalformedResponse(format!("{method}: response missing result"))
        })
    }

    /// Replay a failed transaction at its block to recover the revert reason.
    async fn replay_revert_reason(&self, hash: TxHash, block: BlockHeight) -> Option<String> {
        let tx: RpcTransaction = self
            .request("eth_getTransactionByHash", [hash])
            .await
            .ok()
            .flatten()?;
        let mut call = json!({ "from": tx.from, "data": tx.input });
        if let Some(to) = tx.to {
            call["to"] = json!(to);
        }
        if let Some(value) = tx.value {
            call["value"] = json!(value);
        }
        match self
            .call::<_, String>("eth_call", (call, block_tag(Some(block))))
            .await
        {
            Err(TransportError::Reverted(reason)) => Some(reason),
            Err(e) => {
                warn!(%hash, error = %e, "Could not replay failed transaction");
                None
            }
            Ok(_) => None,
        }
    }
}

fn classify_error(error: JsonRpcError) -> TransportError {
    let reverted = error.code == EXECUTION_REVERTED || error.message.contains("execution reverted");
    if !reverted {
        return TransportError::Rpc {
            code: error.code,
            message: error.message,
        };
    }
    let from_data = error
        .data
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|data| parse_bytes(data).ok())
        .and_then(|bytes| decode_revert_reason(&bytes));
    TransportError::Reverted(from_data.unwrap_or(error.message))
}

fn block_tag(height: Option<BlockHeight>) -> String {
    match height {
        Some(height) => format!("0x{height:x}"),
        None => "latest".to_string(),
    }
}

fn hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a `0x`-prefixed quantity into a `U256`.
pub(crate) fn parse_quantity(s: &str) -> Result<U256, TransportError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16)
        .map_err(|_| TransportError::MalformedResponse(format!("bad quantity {s:?}")))
}

/// Parse a `0x`-prefixed quantity that must fit in `u64`.
pub(crate) fn parse_hex_u64(s: &str) -> Result<u64, TransportError> {
    let value = parse_quantity(s)?;
    if value > U256::from(u64::MAX) {
        return Err(TransportError::MalformedResponse(format!("{s} exceeds u64")));
    }
    Ok(value.low_u64())
}

fn parse_bytes(s: &str) -> Result<Vec<u8>, TransportError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
        .map_err(|_| TransportError::MalformedResponse(format!("bad hex data {s:?}")))
}

#[async_trait]
impl Transport for JsonRpcTransport {
    async fn read_call(
        &self,
        to: Address,
        data: &[u8],
        at_height: Option<BlockHeight>,
    ) -> Result<Vec<u8>, TransportError> {
        let call = json!({ "to": to, "data": hex_data(data) });
        let result: String = self.call("eth_call", (call, block_tag(at_height))).await?;
        parse_bytes(&result)
    }

    async fn read_call_as(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let call = json!({ "from": from, "to": to, "data": hex_data(data) });
        let result: String = self.call("eth_call", (call, "latest")).await?;
        parse_bytes(&result)
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<TxHash, TransportError> {
        let hash: TxHash = self
            .call("eth_sendRawTransaction", [hex_data(&tx.raw)])
            .await
            .map_err(|e| match e {
                TransportError::Rpc { message, .. } | TransportError::Reverted(message) => {
                    TransportError::Rejected(message)
                }
                other => other,
            })?;
        if hash != tx.hash {
            warn!(local = %tx.hash, remote = %hash, "Node reported a different transaction hash");
        }
        Ok(hash)
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, TransportError> {
        let Some(receipt) = self
            .request::<_, RpcReceipt>("eth_getTransactionReceipt", [hash])
            .await?
        else {
            return Ok(None);
        };
        // Receipts for pending blocks have no block number yet.
        let Some(block) = receipt.block_number.as_deref() else {
            return Ok(None);
        };
        let block_height = parse_hex_u64(block)?;
        let gas_used = parse_hex_u64(&receipt.gas_used)?;
        match receipt.status.as_deref().map(parse_hex_u64).transpose()? {
            Some(0) => {
                let reason = self.replay_revert_reason(hash, block_height).await;
                Ok(Some(Receipt::failure(block_height, gas_used, reason)))
            }
            _ => Ok(Some(Receipt::success(block_height, gas_used))),
        }
    }

    async fn balance_at(
        &self,
        address: Address,
        at_height: Option<BlockHeight>,
    ) -> Result<U256, TransportError> {
        let result: String = self
            .call("eth_getBalance", (address, block_tag(at_height)))
            .await?;
        parse_quantity(&result)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, TransportError> {
        let result: String = self
            .call("eth_getTransactionCount", (address, "pending"))
            .await?;
        parse_hex_u64(&result)
    }

    async fn confirmed_nonce(&self, address: Address) -> Result<u64, TransportError> {
        let result: String = self
            .call("eth_getTransactionCount", (address, "latest"))
            .await?;
        parse_hex_u64(&result)
    }

    async fn gas_price(&self) -> Result<U256, TransportError> {
        let result: String = self.call("eth_gasPrice", Vec::<()>::new()).await?;
        parse_quantity(&result)
    }

    async fn chain_id(&self) -> Result<u64, TransportError> {
        let result: String = self.call("eth_chainId", Vec::<()>::new()).await?;
        parse_hex_u64(&result)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, TransportError> {
        let mut call = json!({
            "value": format!("0x{:x}", request.value),
            "data": hex_data(&request.data),
        });
        if let Some(from) = request.from {
            call["from"] = json!(from);
        }
        if let Some(to) = request.to {
            call["to"] = json!(to);
        }
        let result: String = self.call("eth_estimateGas", [call]).await?;
        parse_hex_u64(&result)
    }

    async fn transaction_known(&self, hash: TxHash) -> Result<bool, TransportError> {
        let tx: Option<Value> = self.request("eth_getTransactionByHash", [hash]).await?;
        Ok(tx.is_some_and(|v| !v.is_null()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex_u64("0x0").unwrap(), 0);
        assert_eq!(parse_hex_u64("0xff").unwrap(), 255);
        assert_eq!(parse_hex_u64("0x12d687").unwrap(), 1_234_567);
        assert!(parse_hex_u64("0x10000000000000000").is_err());
        assert_eq!(
            parse_quantity("0xde0b6b3a7640000").unwrap(),
            U256::from(1_000_000_000_000_000_000u64)
        );
        assert!(matches!(parse_quantity("0xzz"), Err(TransportError::MalformedResponse(_))));
    }

    #[test]
    fn test_block_tag() {
        assert_eq!(block_tag(None), "latest");
        assert_eq!(block_tag(Some(255)), "0xff");
    }

    #[test]
    fn test_classify_revert_with_data() {
        // Error("not approver")
        let data = concat!(
            "0x08c379a0",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "000000000000000000000000000000000000000000000000000000000000000c",
            "6e6f7420617070726f7665720000000000000000000000000000000000000000"
        );
        let err = classify_error(JsonRpcError {
            code: 3,
            message: "execution reverted: not approver".into(),
            data: Some(Value::String(data.into())),
        });
        assert_eq!(err, TransportError::Reverted("not approver".into()));
    }

    #[test]
    fn test_classify_other_errors() {
        let err = classify_error(JsonRpcError {
            code: -32000,
            message: "nonce too low".into(),
            data: None,
        });
        assert_eq!(
            err,
            TransportError::Rpc {
                code: -32000,
                message: "nonce too low".into()
            }
        );

        let err = classify_error(JsonRpcError {
            code: -32000,
            message: "execution reverted".into(),
            data: None,
        });
        assert_eq!(err, TransportError::Reverted("execution reverted".into()));
    }

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_getTransactionCount",
            params: (Address::from_low_u64(1), "pending"),
            id: 7,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "eth_getTransactionCount");
        assert_eq!(value["params"][1], "pending");
        assert_eq!(value["id"], 7);
    }

    #[tokio::test]
    async fn test_unreachable_node_is_connection_error() {
        let transport = JsonRpcTransport::new("http://127.0.0.1:1", 500).unwrap();
        let err = transport.chain_id().await.unwrap_err();
        assert!(err.is_transient(), "unexpected {err:?}");
    }
}
