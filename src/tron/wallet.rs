//! Typed client for the Tron wallet REST API.
//!
//! The wallet endpoint owns the transaction pipeline: it assembles unsigned
//! transactions server-side, accepts signed ones for broadcast, and serves
//! transaction lookups. Every route is a POST of a JSON body; errors come
//! back either as HTTP statuses or as an `Error` field inside a 200 reply,
//! and human-readable messages are often hex-encoded.

use crate::error::{ChainError, ChainResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "tron-pro-api-key";

/// Shared HTTP client for one wallet endpoint, carrying the API key header
/// on every request.
#[derive(Debug, Clone)]
pub(crate) struct WalletApi {
    client: Client,
    base_url: String,
}

impl WalletApi {
    /// Builds the client for a wallet base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the API key is not a valid
    /// header value or the HTTP client cannot be constructed.
    pub(crate) fn new(base_url: &str, api_key: Option<&str>) -> ChainResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| ChainError::configuration(format!("invalid wallet API key: {e}")))?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ChainError::configuration(format!("failed to build wallet HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Asks the wallet to assemble a native coin transfer.
    pub(crate) async fn create_transaction(
        &self,
        request: &TransferRequest,
    ) -> ChainResult<TronTransaction> {
        self.post("/wallet/createtransaction", request).await
    }

    /// Asks the wallet to assemble a smart contract call.
    ///
    /// # Errors
    ///
    /// A rejected trigger (for example a validation failure on the owner or
    /// contract address) surfaces as [`ChainError::Semantic`] with the
    /// wallet's decoded message.
    pub(crate) async fn trigger_smart_contract(
        &self,
        request: &TriggerRequest,
    ) -> ChainResult<TronTransaction> {
        let reply: TriggerReply = self.post("/wallet/triggersmartcontract", request).await?;
        if !reply.result.result {
            let code = reply.result.code.unwrap_or_else(|| "rejected".to_string());
            let message = reply
                .result
                .message
                .as_deref()
                .map(decode_hex_text)
                .unwrap_or_default();
            return Err(ChainError::semantic(format!(
                "contract trigger rejected: {code}: {message}"
            )));
        }
        reply
            .transaction
            .ok_or_else(|| ChainError::connectivity("trigger reply carried no transaction"))
    }

    /// Asks the wallet to assemble a contract deployment.
    pub(crate) async fn deploy_contract(
        &self,
        request: &DeployRequest,
    ) -> ChainResult<TronTransaction> {
        self.post("/wallet/deploycontract", request).await
    }

    /// Submits a signed transaction to the network.
    pub(crate) async fn broadcast_transaction(
        &self,
        transaction: &TronTransaction,
    ) -> ChainResult<BroadcastReply> {
        self.post("/wallet/broadcasttransaction", transaction).await
    }

    /// Fetches a transaction body by id. An unknown id yields `Ok(None)`;
    /// the wallet signals it with an empty JSON object.
    pub(crate) async fn transaction_by_id(
        &self,
        id: &str,
    ) -> ChainResult<Option<TronTransaction>> {
        let value: Value = self
            .post("/wallet/gettransactionbyid", &json!({ "value": id }))
            .await?;
        if value.get("txID").is_none() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ChainError::connectivity(format!("malformed transaction reply: {e}")))
    }

    /// Fetches execution info for a transaction id. An unconfirmed or
    /// unknown id yields the default (empty) info.
    pub(crate) async fn transaction_info_by_id(
        &self,
        id: &str,
    ) -> ChainResult<TronTransactionInfo> {
        self.post("/wallet/gettransactioninfobyid", &json!({ "value": id }))
            .await
    }

    async fn post<B, T>(&self, route: &str, body: &B) -> ChainResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{route}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ChainError::connectivity(format!("malformed wallet reply: {e}")))?;
        if let Some(message) = value.get("Error").and_then(Value::as_str) {
            return Err(ChainError::semantic(format!("wallet rejected request: {message}")));
        }
        serde_json::from_value(value)
            .map_err(|e| ChainError::connectivity(format!("unexpected wallet reply shape: {e}")))
    }
}

fn map_transport_error(error: reqwest::Error) -> ChainError {
    if error.is_timeout() {
        ChainError::connectivity(format!("wallet request timed out: {error}"))
    } else if error.is_connect() {
        ChainError::connectivity(format!("failed to reach wallet endpoint: {error}"))
    } else {
        ChainError::connectivity(format!("wallet transport error: {error}"))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> ChainError {
    match status {
        StatusCode::BAD_REQUEST => {
            ChainError::semantic(format!("wallet rejected request: {body}"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ChainError::configuration(format!("wallet API key rejected ({status}): {body}"))
        }
        StatusCode::NOT_FOUND => {
            ChainError::configuration(format!("wallet route not found ({status}): {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            ChainError::connectivity(format!("wallet rate limited: {body}"))
        }
        status if status.is_server_error() => {
            ChainError::connectivity(format!("wallet server error ({status}): {body}"))
        }
        status => ChainError::connectivity(format!("unexpected wallet status ({status}): {body}")),
    }
}

/// Decodes a hex-encoded wallet message into text, passing non-hex input
/// through unchanged.
pub(crate) fn decode_hex_text(message: &str) -> String {
    match hex::decode(message) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => message.to_string(),
    }
}

/// An assembled transaction as the wallet exchanges it, signed or not.
///
/// `raw_data` keeps unrecognized fields through [`Map`] flattening so a
/// round trip through this type never drops what the network needs to
/// replay the exact signed bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TronTransaction {
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub raw_data: RawData,
    pub raw_data_hex: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signature: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ret: Vec<ExecutionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// The operation list and envelope fields the signed bytes commit to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contract: Vec<Contract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_limit: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One operation inside a transaction. Tron batches are possible in the
/// protocol but the wallet assembles exactly one per transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Contract {
    #[serde(rename = "type")]
    pub contract_type: String,
    pub parameter: ContractParameter,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ContractParameter {
    #[serde(default)]
    pub value: ContractValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_url: Option<String>,
}

/// Union of the operation payload fields across transfer, trigger, and
/// deployment contracts. Addresses are prefixed hex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ContractValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_contract: Option<NewContract>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deployment payload carried by a `CreateSmartContract` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct NewContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-operation execution verdict attached to confirmed transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ExecutionResult {
    #[serde(rename = "contractRet", default, skip_serializing_if = "Option::is_none")]
    pub contract_ret: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `/wallet/createtransaction`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransferRequest {
    pub owner_address: String,
    pub to_address: String,
    pub amount: u64,
}

/// Body of `/wallet/triggersmartcontract`. Either `function_selector` plus
/// `parameter` or raw `data` describes the call.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct TriggerRequest {
    pub owner_address: String,
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_value: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct TriggerReply {
    #[serde(default)]
    result: TriggerVerdict,
    #[serde(default)]
    transaction: Option<TronTransaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TriggerVerdict {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Body of `/wallet/deploycontract`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeployRequest {
    pub owner_address: String,
    pub name: String,
    pub abi: String,
    pub bytecode: String,
    pub fee_limit: u64,
    pub call_value: u64,
    pub origin_energy_limit: u64,
    pub consume_user_resource_percent: u64,
}

/// Reply of `/wallet/broadcasttransaction`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BroadcastReply {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub txid: Option<String>,
}

impl BroadcastReply {
    /// The wallet's message with its hex encoding removed.
    pub(crate) fn message_text(&self) -> Option<String> {
        self.message.as_deref().map(decode_hex_text)
    }
}

/// Reply of `/wallet/gettransactioninfobyid`. Every field is optional; the
/// wallet answers an empty object for ids it has not confirmed.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TronTransactionInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fee: Option<u64>,
    #[serde(rename = "blockNumber", default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub receipt: Option<TronReceipt>,
    #[serde(default)]
    pub log: Vec<TronLog>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(rename = "resMessage", default)]
    pub res_message: Option<String>,
    #[serde(rename = "contract_address", default)]
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TronReceipt {
    #[serde(default)]
    pub energy_usage_total: Option<u64>,
    #[serde(default)]
    pub net_usage: Option<u64>,
    #[serde(default)]
    pub result: Option<String>,
}

/// One raw event entry in a transaction info reply. Address and topics are
/// bare hex without prefixes.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TronLog {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}
