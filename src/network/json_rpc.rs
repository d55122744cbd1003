//! Sui fullnode JSON-RPC 客户端
//!
//! 每个错误在这里就被分类为 Retryable / Rejected / UnknownOutcome，
//! 由 `EndpointPool` 决定是否切换节点。

use crate::blockchain::traits::SuiRpc;
use crate::blockchain::types::{
    CoinBalance, CoinPage, DryRunResult, ObjectDataOptions, ObjectRecord, TransactionReceipt,
};
use crate::core::address::{ObjectId, SuiAddress};
use crate::core::errors::RpcError;
use crate::crypto::signature_utils::SerializedSignature;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// JSON-RPC codes for requests the node never processed
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Whether a call can change chain state. Decides how ambiguous failures
/// are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Read,
    Execute,
}

/// One fullnode reached over HTTP JSON-RPC.
pub struct JsonRpcEndpoint {
    url: String,
    http_client: HttpClient,
    coin_page_limit: Option<u32>,
    next_id: AtomicU64,
}

impl JsonRpcEndpoint {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let url = url.into();
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RpcError::rejected(url.clone(), format!("HTTP 客户端创建失败: {}", e))
            })?;
        Ok(Self { url, http_client, coin_page_limit: None, next_id: AtomicU64::new(1) })
    }

    /// Page size for `suix_getCoins`; `None` leaves it to the node.
    pub fn with_coin_page_limit(mut self, limit: Option<u32>) -> Self {
        self.coin_page_limit = limit;
        self
    }

    /// 发送 RPC 请求并分类错误
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
        kind: CallKind,
    ) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("rpc {} -> {}", method, self.url);

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(kind, method, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(kind, method, status));
        }

        let body: RpcResponse = response.json().await.map_err(|e| {
            self.ambiguous(kind, format!("{}: 解析响应失败: {}", method, e))
        })?;

        if let Some(error) = body.error {
            return Err(self.error_object(kind, method, error));
        }

        let result = body
            .result
            .ok_or_else(|| self.ambiguous(kind, format!("{}: RPC 响应中缺少结果", method)))?;
        serde_json::from_value(result).map_err(|e| {
            self.ambiguous(kind, format!("{}: unexpected result shape: {}", method, e))
        })
    }

    /// Failure after the request may have been delivered.
    fn ambiguous(&self, kind: CallKind, message: String) -> RpcError {
        match kind {
            CallKind::Read => RpcError::retryable(&self.url, message),
            CallKind::Execute => RpcError::unknown_outcome(&self.url, message),
        }
    }

    fn transport_error(&self, kind: CallKind, method: &str, e: &reqwest::Error) -> RpcError {
        let message = format!("{}: RPC 请求失败: {}", method, e);
        if e.is_connect() {
            // never reached the node
            RpcError::retryable(&self.url, message)
        } else if e.is_builder() {
            RpcError::rejected(&self.url, message)
        } else {
            self.ambiguous(kind, message)
        }
    }

    /// 408 / 429 / 503 mean the node did not process the request. Any other
    /// 4xx is a malformed request that every node would refuse.
    fn status_error(&self, kind: CallKind, method: &str, status: StatusCode) -> RpcError {
        let message = format!("{}: HTTP {}", method, status);
        match status {
            StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::SERVICE_UNAVAILABLE => RpcError::retryable(&self.url, message),
            s if s.is_client_error() => RpcError::rejected(&self.url, message),
            _ => self.ambiguous(kind, message),
        }
    }

    fn error_object(&self, kind: CallKind, method: &str, error: RpcErrorObject) -> RpcError {
        let message = format!("{}: RPC error {}: {}", method, error.code, error.message);
        match kind {
            CallKind::Execute => RpcError::rejected(&self.url, message),
            CallKind::Read => match error.code {
                INVALID_REQUEST | METHOD_NOT_FOUND | INVALID_PARAMS => {
                    RpcError::rejected(&self.url, message)
                }
                _ => {
                    warn!("{} reported {}", self.url, message);
                    RpcError::retryable(&self.url, message)
                }
            },
        }
    }
}

#[async_trait]
impl SuiRpc for JsonRpcEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[SerializedSignature],
    ) -> Result<TransactionReceipt, RpcError> {
        let signatures: Vec<String> =
            signatures.iter().map(SerializedSignature::to_base64).collect();
        let params = vec![
            json!(STANDARD.encode(tx_bytes)),
            json!(signatures),
            json!({
                "showEvents": true,
                "showEffects": true,
                "showObjectChanges": true,
                "showBalanceChanges": true,
            }),
            json!("WaitForLocalExecution"),
        ];
        self.rpc_call("sui_executeTransactionBlock", params, CallKind::Execute).await
    }

    async fn dry_run_transaction(&self, tx_bytes: &[u8]) -> Result<DryRunResult, RpcError> {
        self.rpc_call(
            "sui_dryRunTransactionBlock",
            vec![json!(STANDARD.encode(tx_bytes))],
            CallKind::Read,
        )
        .await
    }

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
        options: &ObjectDataOptions,
    ) -> Result<Vec<ObjectRecord>, RpcError> {
        let ids: Vec<String> = ids.iter().map(ObjectId::to_hex).collect();
        self.rpc_call("sui_multiGetObjects", vec![json!(ids), json!(options)], CallKind::Read).await
    }

    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> Result<CoinPage, RpcError> {
        let mut params = vec![json!(owner.to_hex()), json!(coin_type), json!(cursor)];
        if let Some(limit) = self.coin_page_limit {
            params.push(json!(limit));
        }
        self.rpc_call("suix_getCoins", params, CallKind::Read).await
    }

    async fn get_balance(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<CoinBalance, RpcError> {
        let params = vec![json!(owner.to_hex()), json!(coin_type)];
        self.rpc_call("suix_getBalance", params, CallKind::Read).await
    }
}
