//! # Tron Client
//!
//! [`ChainClient`] implementation for the Tron network, which splits its
//! interface across two endpoints: an EVM-compatible JSON-RPC endpoint for
//! reads and gas estimation, and the wallet REST API for the transaction
//! pipeline. The wallet assembles transactions server-side, so building one
//! is a network call whose result must be verified before it is handed to a
//! signer.
//!
//! ## Available Components
//!
//! - [`TronClient`]: flat-fee chain client bridging both endpoints
//!
//! Tron shares secp256k1/keccak account derivation with the EVM family;
//! only the rendering differs (Base58Check over an `0x41`-prefixed
//! payload). Energy takes the place of gas, and the fee limit is a total
//! SUN budget rather than a per-unit price.

mod address;
mod wallet;

use crate::abi::{self, AbiRegistry};
use crate::client::ChainClient;
use crate::config::{ChainConfig, ChainFamily};
use crate::error::{ChainError, ChainResult};
use crate::ethereum::{map_provider_err, private_key_to_eth_address, public_key_to_eth_address};
use crate::events::decode_known_events;
use crate::gas::{FeeModel, FeeRates, GasEstimator};
use crate::types::{
    EventLog, FeeLimit, Transaction, TransactionInfo, TransactionStatus, TxGasInfo,
    UnsignedTransaction,
};
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, H256, TransactionRequest, U256};
use ethers::utils::keccak256;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use wallet::{
    DeployRequest, TransferRequest, TriggerRequest, TronTransaction, TronTransactionInfo,
    WalletApi, decode_hex_text,
};

/// TRX carries six decimal places; one TRX is 1_000_000 SUN.
const TRON_DECIMALS: u8 = 6;

/// Energy the deployed contract's own account may burn per call.
const ORIGIN_ENERGY_LIMIT: u64 = 10_000_000;

/// Share of execution energy billed to callers, in percent.
const USER_RESOURCE_PERCENT: u64 = 100;

/// Contract name sent with deployments that carry no registered ABI.
const DEFAULT_CONTRACT_NAME: &str = "contract";

/// Converts an amount to SUN, the 64-bit unit the wallet API exchanges.
fn to_sun(value: U256, what: &str) -> ChainResult<u64> {
    if value > U256::from(u64::MAX) {
        return Err(ChainError::encoding(format!(
            "{what} {value} exceeds the 64-bit SUN range"
        )));
    }
    Ok(value.as_u64())
}

/// Total SUN budget of a priced fee. A zero price cap means the gas field
/// already carries the whole budget.
fn fee_limit_sun(fee: &FeeLimit) -> ChainResult<u64> {
    let budget = if fee.fee_cap.is_zero() {
        fee.gas
    } else {
        fee.gas.saturating_mul(fee.fee_cap)
    };
    to_sun(budget, "fee limit")
}

/// Recomputes the transaction id, the sha256 digest of the raw bytes,
/// and checks it against the id the wallet reported. The digest doubles
/// as the signing hash.
fn raw_data_digest(transaction: &TronTransaction) -> ChainResult<[u8; 32]> {
    let raw = abi::decode_hex(&transaction.raw_data_hex)?;
    let digest: [u8; 32] = Sha256::digest(&raw).into();
    let id = hex::encode(digest);
    if !transaction.tx_id.eq_ignore_ascii_case(&id) {
        return Err(ChainError::semantic(format!(
            "transaction id {} does not match the digest of its raw data {id}",
            transaction.tx_id
        )));
    }
    Ok(digest)
}

/// Derives the account a deployment creates: keccak over the transaction
/// id and the deployer's prefixed payload.
fn deployment_address(tx_id: &str, owner: Address) -> ChainResult<String> {
    let id = abi::decode_hex(tx_id)?;
    let mut preimage = Vec::with_capacity(id.len() + 21);
    preimage.extend_from_slice(&id);
    preimage.extend_from_slice(&address::prefixed_payload(owner));
    let digest = keccak256(&preimage);
    let (_, account) = digest.split_at(12);
    Ok(address::to_base58(Address::from_slice(account)))
}

fn tron_recipient(tx: &Transaction) -> ChainResult<Address> {
    let to = tx
        .to
        .as_deref()
        .ok_or_else(|| ChainError::semantic("transaction has no recipient"))?;
    address::parse(to)
}

/// Folds one raw info log into the neutral event form. Transaction info
/// carries addresses as bare account hex and topics as bare 32-byte hex.
fn parse_log(log: &wallet::TronLog) -> ChainResult<EventLog> {
    let account = address::parse(&log.address)?;
    let mut topics = Vec::with_capacity(log.topics.len());
    for topic in &log.topics {
        let bytes = abi::decode_hex(topic)?;
        if bytes.len() != 32 {
            return Err(ChainError::encoding(format!(
                "event topic must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        topics.push(H256::from_slice(&bytes));
    }
    Ok(EventLog {
        address: address::to_base58(account),
        topics,
        data: Bytes::from(abi::decode_hex(&log.data)?),
        removed: false,
    })
}

/// Folds the wallet's two verdict channels into the neutral status.
fn execution_status(
    transaction: &TronTransaction,
    info: &TronTransactionInfo,
) -> TransactionStatus {
    if matches!(info.result.as_deref(), Some("FAILED")) {
        return TransactionStatus::Failed;
    }
    match transaction
        .ret
        .first()
        .and_then(|ret| ret.contract_ret.as_deref())
    {
        Some("SUCCESS" | "DEFAULT") | None => TransactionStatus::Success,
        Some(_) => TransactionStatus::Failed,
    }
}

/// Chain client for the Tron network.
#[derive(Debug)]
pub struct TronClient {
    chain_id: u64,
    provider: Arc<Provider<Http>>,
    wallet: WalletApi,
    abis: AbiRegistry,
    estimator: GasEstimator,
    endpoint: String,
}

impl TronClient {
    /// Creates a client for the configured Tron chain. Expects the JSON-RPC
    /// endpoint first and the wallet REST endpoint second in the endpoint
    /// list. No network traffic happens here.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the configuration is not
    /// for the Tron family, either endpoint is missing or unparsable, or
    /// the API key is not a valid header value.
    pub fn new(config: &ChainConfig) -> ChainResult<Self> {
        if config.family != ChainFamily::Tron {
            return Err(ChainError::configuration(format!(
                "Tron client cannot serve a {} configuration",
                config.family
            )));
        }
        let endpoint = config.primary_endpoint()?.to_string();
        let provider = Provider::<Http>::try_from(endpoint.as_str())
            .map_err(|e| ChainError::configuration(format!("invalid endpoint {endpoint}: {e}")))?;
        let wallet = WalletApi::new(config.wallet_endpoint()?, config.api_key.as_deref())?;

        Ok(Self {
            chain_id: config.chain_id,
            provider: Arc::new(provider),
            wallet,
            abis: AbiRegistry::with_builtin()?,
            estimator: GasEstimator::with_default_buffer(),
            endpoint,
        })
    }

    /// Returns the JSON-RPC endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn bound_chain_id(&self, tx: &Transaction) -> ChainResult<u64> {
        match tx.chain_id {
            0 => Ok(self.chain_id),
            id if id == self.chain_id => Ok(id),
            id => Err(ChainError::semantic(format!(
                "transaction is bound to chain {id}, client serves chain {}",
                self.chain_id
            ))),
        }
    }

    /// Assembles the JSON-RPC call message used for simulation and energy
    /// estimation.
    fn simulation_request(&self, tx: &Transaction) -> ChainResult<TypedTransaction> {
        let mut request = TransactionRequest::new()
            .from(address::parse(&tx.from)?)
            .value(tx.amount)
            .data(tx.data.clone());
        if let Some(to) = &tx.to {
            request = request.to(address::parse(to)?);
        }
        Ok(request.into())
    }

    /// Verifies a wallet-assembled transaction and folds it into the
    /// neutral unsigned form. The payload is the full wallet JSON so
    /// broadcast can replay exactly what was signed.
    fn verified_unsigned(
        &self,
        transaction: TronTransaction,
        contract_address: Option<String>,
    ) -> ChainResult<UnsignedTransaction> {
        let digest = raw_data_digest(&transaction)?;
        let payload = serde_json::to_vec(&transaction)
            .map_err(|e| ChainError::encoding(format!("unserializable transaction: {e}")))?;
        Ok(UnsignedTransaction {
            payload: Bytes::from(payload),
            signing_hash: H256::from_slice(&digest),
            contract_address,
        })
    }

    /// Folds a wallet transaction body back into the neutral form.
    fn neutral_transaction(&self, transaction: &TronTransaction) -> ChainResult<Transaction> {
        let contract = transaction.raw_data.contract.first();
        let value = contract.map(|c| &c.parameter.value);
        let from = match value.and_then(|v| v.owner_address.as_deref()) {
            Some(hex) => address::to_base58(address::parse(hex)?),
            None => String::new(),
        };

        let mut to = None;
        let mut amount = U256::zero();
        let mut data = Bytes::new();
        match contract.map(|c| c.contract_type.as_str()) {
            Some("TransferContract") => {
                if let Some(hex) = value.and_then(|v| v.to_address.as_deref()) {
                    to = Some(address::to_base58(address::parse(hex)?));
                }
                amount = U256::from(value.and_then(|v| v.amount).unwrap_or_default());
            }
            Some("TriggerSmartContract") => {
                if let Some(hex) = value.and_then(|v| v.contract_address.as_deref()) {
                    to = Some(address::to_base58(address::parse(hex)?));
                }
                amount = U256::from(value.and_then(|v| v.call_value).unwrap_or_default());
                if let Some(call_data) = value.and_then(|v| v.data.as_deref()) {
                    data = Bytes::from(abi::decode_hex(call_data)?);
                }
            }
            Some("CreateSmartContract") => {
                if let Some(bytecode) = value
                    .and_then(|v| v.new_contract.as_ref())
                    .and_then(|new_contract| new_contract.bytecode.as_deref())
                {
                    data = Bytes::from(abi::decode_hex(bytecode)?);
                }
            }
            _ => {}
        }

        Ok(Transaction {
            from,
            to,
            amount,
            data,
            nonce: 0,
            chain_id: self.chain_id,
            fee: transaction.raw_data.fee_limit.map(|limit| FeeLimit {
                gas: U256::from(limit),
                fee_cap: U256::zero(),
                tip_cap: U256::zero(),
            }),
            abi_name: None,
            method: None,
        })
    }
}

#[async_trait]
impl ChainClient for TronClient {
    fn family(&self) -> ChainFamily {
        ChainFamily::Tron
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn fee_model(&self) -> FeeModel {
        // Flat SUN budgets; there is no fee market to track.
        FeeModel::Legacy
    }

    fn abi_registry(&self) -> &AbiRegistry {
        &self.abis
    }

    fn is_valid_address(&self, address: &str) -> bool {
        address::is_valid(address)
    }

    fn normalize_address(&self, address: &str) -> ChainResult<String> {
        Ok(address::to_base58(address::parse(address)?))
    }

    fn address_from_public_key(&self, public_key_hex: &str) -> ChainResult<String> {
        Ok(address::to_base58(public_key_to_eth_address(
            public_key_hex,
        )?))
    }

    fn address_from_private_key(&self, private_key_hex: &str) -> ChainResult<String> {
        Ok(address::to_base58(private_key_to_eth_address(
            private_key_hex,
        )?))
    }

    fn evm_address(&self, address: &str) -> ChainResult<Address> {
        address::parse(address)
    }

    fn address_to_string(&self, address: Address) -> String {
        address::to_base58(address)
    }

    fn is_native_asset(&self, asset: &str) -> bool {
        address::parse(asset)
            .map(|account| account.is_zero())
            .unwrap_or(false)
    }

    fn native_asset_address(&self) -> String {
        address::to_base58(Address::zero())
    }

    fn native_asset_decimals(&self) -> u8 {
        TRON_DECIMALS
    }

    async fn native_balance(&self, address: &str) -> ChainResult<U256> {
        let account = address::parse(address)?;
        self.provider
            .get_balance(account, None)
            .await
            .map_err(map_provider_err)
    }

    async fn nonce(&self, _address: &str) -> ChainResult<u64> {
        // Replay protection comes from expiration and block references,
        // not account nonces.
        Ok(0)
    }

    async fn nonce_at(&self, _address: &str, _block: Option<u64>) -> ChainResult<u64> {
        Ok(0)
    }

    async fn call_read_only(&self, from: &str, to: &str, data: &[u8]) -> ChainResult<Bytes> {
        let request: TypedTransaction = TransactionRequest::new()
            .from(address::parse(from)?)
            .to(address::parse(to)?)
            .data(data.to_vec())
            .into();
        self.provider
            .call(&request, None)
            .await
            .map_err(map_provider_err)
    }

    async fn latest_block_number(&self) -> ChainResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map(|number| number.as_u64())
            .map_err(map_provider_err)
    }

    async fn has_code(&self, address: &str) -> ChainResult<bool> {
        let account = address::parse(address)?;
        self.provider
            .get_code(account, None)
            .await
            .map(|code| !code.is_empty())
            .map_err(map_provider_err)
    }

    async fn suggest_gas_price(&self) -> ChainResult<FeeRates> {
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(map_provider_err)?;
        Ok(FeeRates::flat(gas_price))
    }

    async fn estimate_gas(&self, tx: &Transaction) -> ChainResult<U256> {
        // A bare coin transfer always costs the protocol minimum.
        if tx.is_plain_transfer() {
            return Ok(self.estimator.min_transfer_gas());
        }
        let request = self.simulation_request(tx)?;
        let estimate = self
            .provider
            .estimate_gas(&request, None)
            .await
            .map_err(map_provider_err)?;
        Ok(self.estimator.apply_buffer(estimate))
    }

    async fn build_transaction(&self, tx: &Transaction) -> ChainResult<UnsignedTransaction> {
        let fee = *tx.priced_fee()?;
        self.bound_chain_id(tx)?;
        let owner = address::parse(&tx.from)?;
        let owner_hex = address::to_tron_hex(owner);
        let fee_limit = fee_limit_sun(&fee)?;

        let assembled = if tx.is_deployment() {
            if tx.data.is_empty() {
                return Err(ChainError::semantic(
                    "contract deployment carries no init code",
                ));
            }
            let abi_json = match &tx.abi_name {
                Some(name) => {
                    let abi = self.abis.get(name)?;
                    serde_json::to_string(abi.as_ref()).map_err(|e| {
                        ChainError::encoding(format!("unserializable ABI {name}: {e}"))
                    })?
                }
                None => "[]".to_string(),
            };
            let request = DeployRequest {
                owner_address: owner_hex,
                name: tx
                    .abi_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CONTRACT_NAME.to_string()),
                abi: abi_json,
                bytecode: hex::encode(&tx.data),
                fee_limit,
                call_value: 0,
                origin_energy_limit: ORIGIN_ENERGY_LIMIT,
                consume_user_resource_percent: USER_RESOURCE_PERCENT,
            };
            self.wallet.deploy_contract(&request).await?
        } else if tx.is_plain_transfer() {
            let request = TransferRequest {
                owner_address: owner_hex,
                to_address: address::to_tron_hex(tron_recipient(tx)?),
                amount: to_sun(tx.amount, "transfer amount")?,
            };
            self.wallet.create_transaction(&request).await?
        } else {
            let mut request = TriggerRequest {
                owner_address: owner_hex,
                contract_address: address::to_tron_hex(tron_recipient(tx)?),
                call_value: Some(to_sun(tx.amount, "call value")?),
                fee_limit: Some(fee_limit),
                ..TriggerRequest::default()
            };
            if let (Some(abi_name), Some(method)) = (&tx.abi_name, &tx.method) {
                request.function_selector = Some(self.abis.function_selector(abi_name, method)?);
                let arguments = tx.data.get(4..).ok_or_else(|| {
                    ChainError::encoding("call data shorter than a 4-byte selector")
                })?;
                request.parameter = Some(hex::encode(arguments));
            } else {
                request.data = Some(hex::encode(&tx.data));
            }
            self.wallet.trigger_smart_contract(&request).await?
        };

        let contract_address = if tx.is_deployment() {
            let computed = deployment_address(&assembled.tx_id, owner)?;
            if let Some(reported) = assembled.contract_address.as_deref() {
                let agrees = address::parse(reported)
                    .map(|account| address::to_base58(account) == computed)
                    .unwrap_or(false);
                if !agrees {
                    tracing::warn!(
                        computed = %computed,
                        reported = %reported,
                        "deployment address mismatch"
                    );
                }
            }
            Some(computed)
        } else {
            None
        };

        tracing::debug!(
            chain_id = self.chain_id,
            deployment = tx.is_deployment(),
            "built unsigned transaction"
        );
        self.verified_unsigned(assembled, contract_address)
    }

    async fn broadcast(&self, payload: &[u8], signature: &[u8]) -> ChainResult<String> {
        if signature.len() != self.signature_length() {
            return Err(ChainError::semantic(format!(
                "signature must be {} bytes, got {}",
                self.signature_length(),
                signature.len()
            )));
        }
        let mut transaction: TronTransaction = serde_json::from_slice(payload)
            .map_err(|e| ChainError::semantic(format!("undecodable transaction payload: {e}")))?;
        let digest = raw_data_digest(&transaction)?;
        let id = hex::encode(digest);

        let (body, recovery) = signature.split_at(64);
        let recovery = recovery
            .first()
            .copied()
            .ok_or_else(|| ChainError::semantic("signature misses the recovery byte"))?;
        let parity = match recovery {
            0 | 1 => recovery,
            27 | 28 => recovery - 27,
            other => {
                return Err(ChainError::semantic(format!(
                    "invalid signature recovery id: {other}"
                )));
            }
        };
        let mut normalized = Vec::with_capacity(signature.len());
        normalized.extend_from_slice(body);
        normalized.push(parity);
        transaction.signature = vec![hex::encode(normalized)];

        let reply = self.wallet.broadcast_transaction(&transaction).await?;
        if !reply.result {
            let code = reply.code.clone().unwrap_or_else(|| "rejected".to_string());
            let message = reply.message_text().unwrap_or_default();
            return Err(ChainError::semantic(format!(
                "broadcast rejected: {code}: {message}"
            )));
        }
        if let Some(reported) = &reply.txid {
            if !reported.eq_ignore_ascii_case(&id) {
                return Err(ChainError::semantic(format!(
                    "broadcast changed the transaction id: sent {id}, network reported {reported}"
                )));
            }
        }
        tracing::info!(tx_id = %id, "broadcast transaction");
        Ok(id)
    }

    async fn transaction_by_id(&self, tx_id: &str) -> ChainResult<TransactionInfo> {
        let id = tx_id.strip_prefix("0x").unwrap_or(tx_id);
        let wallet_tx = self
            .wallet
            .transaction_by_id(id)
            .await?
            .ok_or_else(|| ChainError::not_found("transaction", tx_id))?;
        let info = self.wallet.transaction_info_by_id(id).await?;
        let transaction = self.neutral_transaction(&wallet_tx)?;

        // Known to the network but not yet in a block.
        if info.id.is_none() {
            return Ok(TransactionInfo {
                transaction,
                status: TransactionStatus::Pending,
                gas: None,
                block_number: None,
                logs: Vec::new(),
                events: Vec::new(),
                error: None,
            });
        }

        let status = execution_status(&wallet_tx, &info);
        let gas_used = U256::from(
            info.receipt
                .as_ref()
                .and_then(|receipt| receipt.energy_usage_total)
                .unwrap_or_default(),
        );
        let fee = U256::from(info.fee.unwrap_or_default());
        let gas_price = if gas_used.is_zero() {
            U256::zero()
        } else {
            fee / gas_used
        };

        let mut logs = Vec::with_capacity(info.log.len());
        for log in &info.log {
            logs.push(parse_log(log)?);
        }
        let events = decode_known_events(&logs);
        let error = if status == TransactionStatus::Failed {
            info.res_message.as_deref().map(decode_hex_text).or_else(|| {
                wallet_tx
                    .ret
                    .first()
                    .and_then(|ret| ret.contract_ret.clone())
            })
        } else {
            None
        };

        Ok(TransactionInfo {
            transaction,
            status,
            gas: Some(TxGasInfo {
                fee,
                gas_price,
                gas_used,
            }),
            block_number: info.block_number,
            logs,
            events,
            error,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::ChainConfigBuilder;
    use crate::events::DecodedEvent;
    use crate::testutil::{rest_mock, rpc_mock};
    use ethers::abi::Token;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TRON_MAINNET: u64 = 728_126_428;
    const SENDER: &str = "TYg7Uh7fG8ZQxRvWRpFziHzWc8YJLX8JtJ";
    const RECIPIENT: &str = "TVnFbxVHgu5EgCocuSB4AwKVWyscPgAodE";
    const USDT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
    const OFFLINE_ENDPOINT: &str = "http://127.0.0.1:1";
    const TRANSFER_TOPIC: &str =
        "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    // Any hex blob works as raw data; ids are digests of these bytes.
    const TRANSFER_RAW_HEX: &str = "0a025e4b220847c9dc89341b300d40f8fed3a2a72e";
    const TRIGGER_RAW_HEX: &str = "0a026aa22208c5bbbd1ee8ee4a1540b0d3a7e0c92f";
    const DEPLOY_RAW_HEX: &str = "0a02b5c62208f01ba4e7ac19d03340f8cde3b1d92f";

    fn client(rpc_endpoint: &str, wallet_endpoint: &str) -> TronClient {
        crate::testutil::init_tracing();
        let config = ChainConfigBuilder::new()
            .family(ChainFamily::Tron)
            .endpoint(rpc_endpoint)
            .endpoint(wallet_endpoint)
            .chain_id(TRON_MAINNET)
            .build()
            .unwrap();
        TronClient::new(&config).unwrap()
    }

    fn offline_client() -> TronClient {
        client(OFFLINE_ENDPOINT, OFFLINE_ENDPOINT)
    }

    fn mock_client(server: &MockServer) -> TronClient {
        client(&server.uri(), &server.uri())
    }

    fn tron_hex(address: &str) -> String {
        address::to_tron_hex(address::parse(address).unwrap())
    }

    fn raw_digest_hex(raw_data_hex: &str) -> String {
        hex::encode(Sha256::digest(hex::decode(raw_data_hex).unwrap()))
    }

    /// A wallet transaction body whose id really is the digest of its raw
    /// bytes.
    fn assembled(raw_data: Value, raw_data_hex: &str) -> Value {
        json!({
            "visible": false,
            "txID": raw_digest_hex(raw_data_hex),
            "raw_data": raw_data,
            "raw_data_hex": raw_data_hex,
        })
    }

    fn transfer_raw_data(amount: u64) -> Value {
        json!({
            "contract": [{
                "parameter": {
                    "value": {
                        "amount": amount,
                        "owner_address": tron_hex(SENDER),
                        "to_address": tron_hex(RECIPIENT),
                    },
                    "type_url": "type.googleapis.com/protocol.TransferContract"
                },
                "type": "TransferContract"
            }],
            "ref_block_bytes": "5e4b",
            "ref_block_hash": "47c9dc89341b300d",
            "expiration": 1_591_089_627_000u64,
            "timestamp": 1_591_089_567_635u64
        })
    }

    fn trigger_raw_data(call_data: &str, fee_limit: u64) -> Value {
        json!({
            "contract": [{
                "parameter": {
                    "value": {
                        "owner_address": tron_hex(SENDER),
                        "contract_address": tron_hex(USDT),
                        "data": call_data,
                    },
                    "type_url": "type.googleapis.com/protocol.TriggerSmartContract"
                },
                "type": "TriggerSmartContract"
            }],
            "fee_limit": fee_limit,
            "ref_block_bytes": "6aa2",
            "ref_block_hash": "c5bbbd1ee8ee4a15",
            "expiration": 1_646_300_940_000u64,
            "timestamp": 1_646_300_881_856u64
        })
    }

    fn priced_transfer(amount: u64) -> Transaction {
        Transaction {
            from: SENDER.into(),
            to: Some(RECIPIENT.into()),
            amount: U256::from(amount),
            chain_id: TRON_MAINNET,
            fee: Some(FeeLimit::new(
                U256::from(13_000u64),
                U256::from(420u64),
                U256::zero(),
            )),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_foreign_family_config() {
        let config = ChainConfigBuilder::new()
            .family(ChainFamily::Evm)
            .endpoint("https://rpc.ankr.com/eth")
            .chain_id(1)
            .dynamic_fee(true)
            .build()
            .unwrap();
        let err = TronClient::new(&config).unwrap_err();
        assert!(matches!(err, ChainError::Configuration { .. }));
    }

    #[test]
    fn reports_the_flat_fee_surface() {
        let client = offline_client();
        assert_eq!(client.family(), ChainFamily::Tron);
        assert_eq!(client.chain_id(), TRON_MAINNET);
        assert_eq!(client.fee_model(), FeeModel::Legacy);
        assert_eq!(client.signature_length(), 65);
        assert_eq!(client.native_asset_decimals(), 6);
    }

    #[test]
    fn address_validity_follows_base58_checksums() {
        let client = offline_client();
        assert!(client.is_valid_address(SENDER));
        assert!(client.is_valid_address(USDT));
        assert!(!client.is_valid_address("TYg7Uh7fG8ZQxRvWRpFziHzWc8YJLX8J00"));
        assert!(!client.is_valid_address(""));
        // The burn address is the native asset sentinel, not an account.
        assert!(!client.is_valid_address("T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb"));
    }

    #[test]
    fn normalizes_hex_forms_to_base58() {
        let client = offline_client();
        assert_eq!(
            client
                .normalize_address("41a614f803b6fd780986a42c78ec9c7f77e6ded13c")
                .unwrap(),
            USDT
        );
        assert_eq!(
            client
                .normalize_address("0xa614f803b6fd780986a42c78ec9c7f77e6ded13c")
                .unwrap(),
            USDT
        );
        assert_eq!(client.normalize_address(USDT).unwrap(), USDT);
        assert!(client.normalize_address("not-an-address").is_err());

        let account = client.evm_address(USDT).unwrap();
        assert_eq!(client.address_to_string(account), USDT);
    }

    #[test]
    fn derives_addresses_from_keys() {
        let client = offline_client();
        let key = "042f648f8f37f0a108cf4df48a094b4c01d322374a2bb4afbb1afa594280e69e073991ba0aeb1d1a2317088ee14dcf181edd9d46705015aaff0fa2ec366d48cb5a";
        assert_eq!(
            client.address_from_public_key(key).unwrap(),
            "TY6mooR5J3yeoNo1uANG4sjq4CJyT5UUxq"
        );

        let private = "c85ef7d79691fe79573b1a7064c19c1a9819ebdbd1faaab1a8ec92344438aaf4";
        let derived = client.address_from_private_key(private).unwrap();
        assert!(derived.starts_with('T'));
        assert_eq!(
            client.evm_address(&derived).unwrap(),
            private_key_to_eth_address(private).unwrap()
        );
    }

    #[test]
    fn native_asset_is_the_zero_payload() {
        let client = offline_client();
        assert_eq!(
            client.native_asset_address(),
            "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb"
        );
        assert!(client.is_native_asset("T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb"));
        assert!(client.is_native_asset("0x0000000000000000000000000000000000000000"));
        assert!(!client.is_native_asset(USDT));
        assert!(!client.is_native_asset("junk"));
    }

    #[tokio::test]
    async fn nonces_are_always_zero() {
        // Resolvable without any endpoint.
        let client = offline_client();
        assert_eq!(client.nonce(SENDER).await.unwrap(), 0);
        assert_eq!(client.nonce_at(SENDER, Some(5)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn suggests_a_flat_gas_price() {
        let server = MockServer::start().await;
        rpc_mock("eth_gasPrice", json!("0x1a4")).mount(&server).await;

        let client = mock_client(&server);
        let rates = client.suggest_gas_price().await.unwrap();
        assert!(rates.is_flat());
        assert_eq!(rates.fee_cap, U256::from(420u64));
        assert_eq!(rates.tip_cap, U256::zero());

        let fee = client.suggest_fee(&priced_transfer(10)).await.unwrap();
        assert_eq!(fee.gas, U256::from(21_000u64));
        assert_eq!(fee.fee_cap, U256::from(420u64));
        assert_eq!(fee.tip_cap, U256::zero());
    }

    #[tokio::test]
    async fn plain_transfers_need_no_simulation() {
        let client = offline_client();
        let estimate = client.estimate_gas(&priced_transfer(10)).await.unwrap();
        assert_eq!(estimate, U256::from(21_000u64));
    }

    #[tokio::test]
    async fn buffers_energy_estimates() {
        let server = MockServer::start().await;
        rpc_mock("eth_estimateGas", json!("0xb")).mount(&server).await;

        let client = mock_client(&server);
        let mut tx = priced_transfer(0);
        tx.to = Some(USDT.into());
        tx.data = Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]);
        // ceil(11 * 1.2) = 14
        assert_eq!(client.estimate_gas(&tx).await.unwrap(), U256::from(14u64));
    }

    #[tokio::test]
    async fn reads_native_balance_in_sun() {
        let server = MockServer::start().await;
        rpc_mock("eth_getBalance", json!("0xf4240")).mount(&server).await;

        let client = mock_client(&server);
        let balance = client.native_balance(SENDER).await.unwrap();
        assert_eq!(balance, U256::from(1_000_000u64));
    }

    #[tokio::test]
    async fn reads_block_height_and_code() {
        let server = MockServer::start().await;
        rpc_mock("eth_blockNumber", json!("0x1f5cc78")).mount(&server).await;
        rpc_mock("eth_getCode", json!("0x6080")).mount(&server).await;

        let client = mock_client(&server);
        assert_eq!(client.latest_block_number().await.unwrap(), 32_885_880);
        assert!(client.has_code(USDT).await.unwrap());
    }

    #[tokio::test]
    async fn builds_a_native_transfer_through_the_wallet() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/createtransaction"))
            .and(body_partial_json(json!({
                "owner_address": tron_hex(SENDER),
                "to_address": tron_hex(RECIPIENT),
                "amount": 1_000_000u64,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(assembled(transfer_raw_data(1_000_000), TRANSFER_RAW_HEX)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let unsigned = client
            .build_transaction(&priced_transfer(1_000_000))
            .await
            .unwrap();

        let expected = raw_digest_hex(TRANSFER_RAW_HEX);
        assert_eq!(hex::encode(unsigned.signing_hash), expected);
        assert!(unsigned.contract_address.is_none());

        // The payload is the wallet body, ready for broadcast.
        let replay: Value = serde_json::from_slice(&unsigned.payload).unwrap();
        assert_eq!(replay["txID"], Value::String(expected));
        assert_eq!(replay["raw_data"]["ref_block_bytes"], "5e4b");
    }

    #[tokio::test]
    async fn build_rejects_a_forged_transaction_id() {
        let server = MockServer::start().await;
        let mut body = assembled(transfer_raw_data(1_000_000), TRANSFER_RAW_HEX);
        body["txID"] = Value::String("00".repeat(32));
        rest_mock("/wallet/createtransaction", body).mount(&server).await;

        let client = mock_client(&server);
        let err = client
            .build_transaction(&priced_transfer(1_000_000))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not match"), "got {err}");
    }

    #[tokio::test]
    async fn build_requires_a_priced_fee() {
        let client = offline_client();
        let mut tx = priced_transfer(10);
        tx.fee = None;
        let err = client.build_transaction(&tx).await.unwrap_err();
        assert!(matches!(err, ChainError::Semantic { .. }), "got {err}");
    }

    #[tokio::test]
    async fn build_rejects_cross_chain_transactions() {
        let client = offline_client();
        let mut tx = priced_transfer(10);
        tx.chain_id = 1;
        let err = client.build_transaction(&tx).await.unwrap_err();
        assert!(err.to_string().contains("bound to chain"), "got {err}");
    }

    #[tokio::test]
    async fn trigger_calls_send_selector_and_arguments() {
        let recipient = address::parse(RECIPIENT).unwrap();
        let client_for_encoding = offline_client();
        let data = client_for_encoding
            .abi_registry()
            .encode_call(
                "erc20",
                "transfer",
                &[Token::Address(recipient), Token::Uint(U256::from(10u64))],
            )
            .unwrap();
        let arguments = hex::encode(&data[4..]);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/triggersmartcontract"))
            .and(body_partial_json(json!({
                "owner_address": tron_hex(SENDER),
                "contract_address": tron_hex(USDT),
                "function_selector": "transfer(address,uint256)",
                "parameter": arguments,
                "call_value": 0,
                "fee_limit": 5_460_000u64,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "result": true },
                "transaction": assembled(
                    trigger_raw_data(&hex::encode(&data), 5_460_000),
                    TRIGGER_RAW_HEX,
                ),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut tx = priced_transfer(0);
        tx.to = Some(USDT.into());
        tx.data = data;
        tx.abi_name = Some("erc20".into());
        tx.method = Some("transfer".into());

        let unsigned = client.build_transaction(&tx).await.unwrap();
        assert_eq!(
            hex::encode(unsigned.signing_hash),
            raw_digest_hex(TRIGGER_RAW_HEX)
        );
    }

    #[tokio::test]
    async fn trigger_without_metadata_sends_raw_calldata() {
        let data = vec![0xa9, 0x05, 0x9c, 0xbb, 0x01, 0x02];

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/triggersmartcontract"))
            .and(body_partial_json(json!({ "data": hex::encode(&data) })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "result": true },
                "transaction": assembled(
                    trigger_raw_data(&hex::encode(&data), 5_460_000),
                    TRIGGER_RAW_HEX,
                ),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut tx = priced_transfer(0);
        tx.to = Some(USDT.into());
        tx.data = Bytes::from(data);
        client.build_transaction(&tx).await.unwrap();
    }

    #[tokio::test]
    async fn deployments_precompute_the_contract_address() {
        let init_code = vec![0x60, 0x80, 0x60, 0x40, 0x52];

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/deploycontract"))
            .and(body_partial_json(json!({
                "owner_address": tron_hex(SENDER),
                "bytecode": hex::encode(&init_code),
                "abi": "[]",
                "name": "contract",
                "call_value": 0,
                "fee_limit": 5_460_000u64,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(assembled(
                json!({
                    "contract": [{
                        "parameter": {
                            "value": {
                                "owner_address": tron_hex(SENDER),
                                "new_contract": { "bytecode": hex::encode(&init_code) },
                            },
                            "type_url": "type.googleapis.com/protocol.CreateSmartContract"
                        },
                        "type": "CreateSmartContract"
                    }],
                    "fee_limit": 5_460_000u64,
                }),
                DEPLOY_RAW_HEX,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut tx = priced_transfer(0);
        tx.to = None;
        tx.amount = U256::zero();
        tx.data = Bytes::from(init_code);

        let unsigned = client.build_transaction(&tx).await.unwrap();

        // keccak over (tx id ++ prefixed owner), low 20 bytes.
        let owner = address::parse(SENDER).unwrap();
        let mut preimage = hex::decode(raw_digest_hex(DEPLOY_RAW_HEX)).unwrap();
        preimage.extend_from_slice(&address::prefixed_payload(owner));
        let account = Address::from_slice(&keccak256(&preimage)[12..]);
        assert_eq!(
            unsigned.contract_address.as_deref(),
            Some(address::to_base58(account).as_str())
        );
    }

    #[tokio::test]
    async fn deployments_embed_a_registered_abi() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/deploycontract"))
            .and(body_partial_json(json!({ "name": "erc20" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(assembled(
                json!({ "contract": [], "fee_limit": 5_460_000u64 }),
                DEPLOY_RAW_HEX,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut tx = priced_transfer(0);
        tx.to = None;
        tx.amount = U256::zero();
        tx.data = Bytes::from(vec![0x60, 0x80]);
        tx.abi_name = Some("erc20".into());
        client.build_transaction(&tx).await.unwrap();
    }

    #[tokio::test]
    async fn deployment_without_init_code_is_rejected() {
        let client = offline_client();
        let mut tx = priced_transfer(0);
        tx.to = None;
        tx.data = Bytes::new();
        let err = client.build_transaction(&tx).await.unwrap_err();
        assert!(err.to_string().contains("init code"), "got {err}");
    }

    fn signed_payload() -> (Vec<u8>, String) {
        let body = assembled(transfer_raw_data(1_000_000), TRANSFER_RAW_HEX);
        let id = raw_digest_hex(TRANSFER_RAW_HEX);
        (serde_json::to_vec(&body).unwrap(), id)
    }

    #[tokio::test]
    async fn broadcast_attaches_the_normalized_signature() {
        let (payload, id) = signed_payload();
        let mut signature = vec![1u8; 64];
        signature.push(27);
        let expected_hex = format!("{}00", hex::encode(vec![1u8; 64]));

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/broadcasttransaction"))
            .and(body_partial_json(json!({
                "txID": id,
                "signature": [expected_hex],
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "result": true, "txid": id })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let reported = client.broadcast(&payload, &signature).await.unwrap();
        assert_eq!(reported, id);
    }

    #[tokio::test]
    async fn broadcast_gates_signature_length_before_any_network() {
        let (payload, _) = signed_payload();
        let client = offline_client();
        let err = client.broadcast(&payload, &[0u8; 64]).await.unwrap_err();
        assert!(err.to_string().contains("65 bytes"), "got {err}");
    }

    #[tokio::test]
    async fn broadcast_rejects_bad_recovery_ids() {
        let (payload, _) = signed_payload();
        let mut signature = vec![1u8; 64];
        signature.push(9);
        let client = offline_client();
        let err = client.broadcast(&payload, &signature).await.unwrap_err();
        assert!(err.to_string().contains("recovery id"), "got {err}");
    }

    #[tokio::test]
    async fn broadcast_rejects_tampered_payloads() {
        let (payload, _) = signed_payload();
        let mut tampered: Value = serde_json::from_slice(&payload).unwrap();
        tampered["raw_data_hex"] = Value::String("0a025e4c".to_string());
        let tampered = serde_json::to_vec(&tampered).unwrap();

        let client = offline_client();
        let err = client.broadcast(&tampered, &[0u8; 65]).await.unwrap_err();
        assert!(err.to_string().contains("does not match"), "got {err}");
    }

    #[tokio::test]
    async fn broadcast_surfaces_node_rejections() {
        let (payload, _) = signed_payload();
        let server = MockServer::start().await;
        rest_mock(
            "/wallet/broadcasttransaction",
            json!({
                "result": false,
                "code": "SIGERROR",
                "message": hex::encode("validate signature error"),
            }),
        )
        .mount(&server)
        .await;

        let client = mock_client(&server);
        let err = client.broadcast(&payload, &[0u8; 65]).await.unwrap_err();
        assert!(err.to_string().contains("SIGERROR"), "got {err}");
        assert!(err.to_string().contains("validate signature error"), "got {err}");
    }

    #[tokio::test]
    async fn broadcast_detects_id_drift() {
        let (payload, _) = signed_payload();
        let server = MockServer::start().await;
        rest_mock(
            "/wallet/broadcasttransaction",
            json!({ "result": true, "txid": "ff".repeat(32) }),
        )
        .mount(&server)
        .await;

        let client = mock_client(&server);
        let err = client.broadcast(&payload, &[0u8; 65]).await.unwrap_err();
        assert!(
            err.to_string().contains("changed the transaction id"),
            "got {err}"
        );
    }

    #[tokio::test]
    async fn unknown_transactions_are_not_found() {
        let server = MockServer::start().await;
        rest_mock("/wallet/gettransactionbyid", json!({})).mount(&server).await;

        let client = mock_client(&server);
        let err = client
            .transaction_by_id(&"00".repeat(32))
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "got {err}");
    }

    #[tokio::test]
    async fn unconfirmed_transactions_are_pending() {
        let server = MockServer::start().await;
        rest_mock(
            "/wallet/gettransactionbyid",
            assembled(transfer_raw_data(1_000_000), TRANSFER_RAW_HEX),
        )
        .mount(&server)
        .await;
        rest_mock("/wallet/gettransactioninfobyid", json!({})).mount(&server).await;

        let client = mock_client(&server);
        let info = client
            .transaction_by_id(&raw_digest_hex(TRANSFER_RAW_HEX))
            .await
            .unwrap();

        assert_eq!(info.status, TransactionStatus::Pending);
        assert!(!info.status.is_final());
        assert!(info.gas.is_none());
        assert!(info.block_number.is_none());
        assert_eq!(info.transaction.from, SENDER);
        assert_eq!(info.transaction.to.as_deref(), Some(RECIPIENT));
        assert_eq!(info.transaction.amount, U256::from(1_000_000u64));
    }

    #[tokio::test]
    async fn confirmed_transfers_fold_execution_info() {
        let id = raw_digest_hex(TRANSFER_RAW_HEX);
        let mut body = assembled(transfer_raw_data(1_000_000), TRANSFER_RAW_HEX);
        body["ret"] = json!([{ "contractRet": "SUCCESS" }]);

        let server = MockServer::start().await;
        rest_mock("/wallet/gettransactionbyid", body).mount(&server).await;
        rest_mock(
            "/wallet/gettransactioninfobyid",
            json!({
                "id": id,
                "fee": 100_000,
                "blockNumber": 32_880_248u64,
                "receipt": { "net_usage": 265 },
            }),
        )
        .mount(&server)
        .await;

        let client = mock_client(&server);
        let info = client.transaction_by_id(&id).await.unwrap();

        assert_eq!(info.status, TransactionStatus::Success);
        assert_eq!(info.block_number, Some(32_880_248));
        let gas = info.gas.unwrap();
        assert_eq!(gas.fee, U256::from(100_000u64));
        // Bandwidth-only transfers burn no energy.
        assert_eq!(gas.gas_used, U256::zero());
        assert_eq!(gas.gas_price, U256::zero());
        assert!(info.error.is_none());
    }

    #[tokio::test]
    async fn confirmed_triggers_decode_their_logs() {
        let call_data = "a9059cbb000000000000000000000000d94a7e31a79a6b6315d4a9bd9c5b7de65b0f1bac000000000000000000000000000000000000000000000000000000000000000a";
        let id = raw_digest_hex(TRIGGER_RAW_HEX);
        let mut body = assembled(trigger_raw_data(call_data, 5_460_000), TRIGGER_RAW_HEX);
        body["ret"] = json!([{ "contractRet": "SUCCESS" }]);

        let sender_account = address::parse(SENDER).unwrap();
        let recipient_account = address::parse(RECIPIENT).unwrap();
        let pad = |account: Address| format!("{:0>64}", hex::encode(account.as_bytes()));

        let server = MockServer::start().await;
        rest_mock("/wallet/gettransactionbyid", body).mount(&server).await;
        rest_mock(
            "/wallet/gettransactioninfobyid",
            json!({
                "id": id,
                "fee": 1_345_500,
                "blockNumber": 32_880_500u64,
                "receipt": { "energy_usage_total": 13_455, "result": "SUCCESS" },
                "log": [{
                    "address": "a614f803b6fd780986a42c78ec9c7f77e6ded13c",
                    "topics": [TRANSFER_TOPIC, pad(sender_account), pad(recipient_account)],
                    "data": format!("{:0>64}", "0a"),
                }],
            }),
        )
        .mount(&server)
        .await;

        let client = mock_client(&server);
        let info = client.transaction_by_id(&id).await.unwrap();

        assert_eq!(info.status, TransactionStatus::Success);
        assert_eq!(info.transaction.to.as_deref(), Some(USDT));
        assert_eq!(
            info.transaction.fee.map(|fee| fee.gas),
            Some(U256::from(5_460_000u64))
        );

        let gas = info.gas.unwrap();
        assert_eq!(gas.gas_used, U256::from(13_455u64));
        assert_eq!(gas.gas_price, U256::from(100u64));

        assert_eq!(info.logs.len(), 1);
        assert_eq!(info.logs[0].address, USDT);
        match &info.events[0] {
            DecodedEvent::Transfer(event) => {
                assert_eq!(event.origin.contract, USDT);
                assert_eq!(event.from, sender_account);
                assert_eq!(event.to, recipient_account);
                assert_eq!(event.value, U256::from(10u64));
            }
            other => panic!("expected a transfer event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_executions_surface_the_reason() {
        let id = raw_digest_hex(TRIGGER_RAW_HEX);
        let mut body = assembled(trigger_raw_data("a9059cbb", 5_460_000), TRIGGER_RAW_HEX);
        body["ret"] = json!([{ "contractRet": "REVERT" }]);

        let server = MockServer::start().await;
        rest_mock("/wallet/gettransactionbyid", body).mount(&server).await;
        rest_mock(
            "/wallet/gettransactioninfobyid",
            json!({
                "id": id,
                "fee": 5_460_000,
                "blockNumber": 32_880_600u64,
                "receipt": { "energy_usage_total": 13_000, "result": "REVERT" },
                "result": "FAILED",
                "resMessage": hex::encode("REVERT opcode executed"),
            }),
        )
        .mount(&server)
        .await;

        let client = mock_client(&server);
        let info = client.transaction_by_id(&id).await.unwrap();

        assert_eq!(info.status, TransactionStatus::Failed);
        assert_eq!(info.error.as_deref(), Some("REVERT opcode executed"));
    }

    #[tokio::test]
    async fn lookup_accepts_prefixed_ids() {
        let id = raw_digest_hex(TRANSFER_RAW_HEX);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/gettransactionbyid"))
            .and(body_partial_json(json!({ "value": id })))
            .respond_with(ResponseTemplate::new(200).set_body_json(assembled(
                transfer_raw_data(1_000_000),
                TRANSFER_RAW_HEX,
            )))
            .expect(1)
            .mount(&server)
            .await;
        rest_mock("/wallet/gettransactioninfobyid", json!({})).mount(&server).await;

        let client = mock_client(&server);
        let info = client.transaction_by_id(&format!("0x{id}")).await.unwrap();
        assert_eq!(info.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn token_reads_go_through_json_rpc() {
        let server = MockServer::start().await;
        rpc_mock(
            "eth_call",
            json!(format!("0x{:0>64}", "6")),
        )
        .mount(&server)
        .await;

        let client = mock_client(&server);
        assert_eq!(client.decimals_of(USDT).await.unwrap(), 6);

        let data = client.transfer_data(RECIPIENT, U256::from(10u64)).unwrap();
        assert_eq!(&data[..4], [0xa9, 0x05, 0x9c, 0xbb]);
    }
}
