//! # EVM Client
//!
//! Chain client implementation for EVM chains using ethers-rs.
//!
//! One [`EvmClient`] serves any EVM chain; the configured
//! [`FeeModel`](crate::gas::FeeModel) decides whether built transactions are
//! EIP-1559 or legacy. Unsigned payloads are the type-prefixed RLP encoding,
//! so the signing hash is always the keccak digest of the payload itself and
//! [`broadcast`](crate::client::ChainClient::broadcast) can reassemble the
//! signed transaction from payload plus a 65-byte r || s || v signature.

use crate::abi::{self, AbiRegistry};
use crate::client::ChainClient;
use crate::config::{ChainConfig, ChainFamily};
use crate::error::{ChainError, ChainResult};
use crate::events::decode_known_events;
use crate::gas::{FeeModel, FeeRates, GasEstimator};
use crate::types::{
    EventLog, FeeLimit, Transaction, TransactionInfo, TransactionStatus, TxGasInfo,
    UnsignedTransaction,
};
use async_trait::async_trait;
use ethers::core::k256::ecdsa::{SigningKey, VerifyingKey};
use ethers::providers::{Http, Middleware, Provider, ProviderError, RpcError};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    Address, BlockId, BlockNumber, Bytes, Eip1559TransactionRequest, Signature, H256,
    Transaction as RpcTransaction, TransactionRequest, U256, U64,
};
use ethers::utils::rlp::{Decodable, Rlp};
use ethers::utils::{get_contract_address, keccak256, to_checksum};
use std::sync::Arc;

/// Chain id on which the non-zero native asset sentinel is honored.
const POLYGON_CHAIN_ID: u64 = 137;

/// Maps a provider failure onto the error taxonomy: a JSON-RPC error body
/// means the chain understood and rejected the request, anything else is a
/// connectivity problem.
pub(crate) fn map_provider_err(error: ProviderError) -> ChainError {
    match error.as_error_response() {
        Some(rpc) => ChainError::semantic(rpc.to_string()),
        None => ChainError::connectivity(error.to_string()),
    }
}

fn parse_address(address: &str) -> ChainResult<Address> {
    address
        .parse()
        .map_err(|_| ChainError::configuration(format!("invalid EVM address: {address}")))
}

/// Derives the 20-byte account address controlled by a SEC1-encoded
/// secp256k1 public key.
pub(crate) fn public_key_to_eth_address(public_key_hex: &str) -> ChainResult<Address> {
    let bytes = abi::decode_hex(public_key_hex)?;
    let key = VerifyingKey::from_sec1_bytes(&bytes)
        .map_err(|e| ChainError::configuration(format!("invalid public key: {e}")))?;
    let point = key.to_encoded_point(false);
    let digest = keccak256(
        point
            .as_bytes()
            .split_first()
            .map(|(_, coordinates)| coordinates)
            .unwrap_or_default(),
    );
    let (_, account) = digest.split_at(12);
    Ok(Address::from_slice(account))
}

/// Derives the 20-byte account address controlled by a secp256k1 private
/// key.
pub(crate) fn private_key_to_eth_address(private_key_hex: &str) -> ChainResult<Address> {
    let bytes = abi::decode_hex(private_key_hex)?;
    let key = SigningKey::from_slice(&bytes)
        .map_err(|e| ChainError::configuration(format!("invalid private key: {e}")))?;
    Ok(ethers::utils::secret_key_to_address(&key))
}

/// Rebuilds an ethers [`Signature`] from a raw 65-byte r || s || v signature,
/// adjusting `v` to what the decoded transaction's encoding expects. Raw
/// recovery ids of 0/1 and legacy 27/28 are both accepted; EIP-155
/// transactions get the chain-folded value.
fn signature_from_raw(raw: &[u8], tx: &TypedTransaction) -> ChainResult<Signature> {
    let (r_bytes, rest) = raw.split_at(32);
    let (s_bytes, v_bytes) = rest.split_at(32);
    let recovery = v_bytes
        .first()
        .copied()
        .ok_or_else(|| ChainError::semantic("signature misses the recovery byte"))?;
    let parity = match recovery {
        0 | 1 => u64::from(recovery),
        27 | 28 => u64::from(recovery - 27),
        other => {
            return Err(ChainError::semantic(format!(
                "invalid signature recovery id: {other}"
            )));
        }
    };
    let v = match tx {
        TypedTransaction::Legacy(request) => match request.chain_id {
            Some(chain_id) => chain_id.as_u64() * 2 + 35 + parity,
            None => 27 + parity,
        },
        _ => parity,
    };
    Ok(Signature {
        r: U256::from_big_endian(r_bytes),
        s: U256::from_big_endian(s_bytes),
        v,
    })
}

/// Chain client for EVM chains.
#[derive(Debug)]
pub struct EvmClient {
    chain_id: u64,
    fee_model: FeeModel,
    provider: Arc<Provider<Http>>,
    abis: AbiRegistry,
    estimator: GasEstimator,
    endpoint: String,
}

impl EvmClient {
    /// Creates a client for the configured EVM chain. No network traffic
    /// happens here; a bad endpoint surfaces on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the configuration is not
    /// for the EVM family or the endpoint URL cannot be parsed.
    pub fn new(config: &ChainConfig) -> ChainResult<Self> {
        if config.family != ChainFamily::Evm {
            return Err(ChainError::configuration(format!(
                "EVM client cannot serve a {} configuration",
                config.family
            )));
        }
        let endpoint = config.primary_endpoint()?.to_string();
        let provider = Provider::<Http>::try_from(endpoint.as_str())
            .map_err(|e| ChainError::configuration(format!("invalid endpoint {endpoint}: {e}")))?;

        Ok(Self {
            chain_id: config.chain_id,
            fee_model: FeeModel::from_dynamic_flag(config.dynamic_fee),
            provider: Arc::new(provider),
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

    /// Assembles the call message used for simulation and gas estimation.
    fn simulation_request(&self, tx: &Transaction) -> ChainResult<TypedTransaction> {
        let mut request = TransactionRequest::new()
            .from(parse_address(&tx.from)?)
            .value(tx.amount)
            .data(tx.data.clone());
        if let Some(to) = &tx.to {
            request = request.to(parse_address(to)?);
        }
        Ok(request.into())
    }

    /// Assembles the unsigned transaction under the configured fee model.
    fn typed_transaction(&self, tx: &Transaction, value: U256) -> ChainResult<TypedTransaction> {
        let fee = tx.priced_fee()?;
        let from = parse_address(&tx.from)?;
        let chain_id = self.bound_chain_id(tx)?;

        let typed: TypedTransaction = match self.fee_model {
            FeeModel::Dynamic => {
                let mut request = Eip1559TransactionRequest::new()
                    .from(from)
                    .value(value)
                    .data(tx.data.clone())
                    .nonce(tx.nonce)
                    .chain_id(chain_id)
                    .gas(fee.gas)
                    .max_fee_per_gas(fee.fee_cap)
                    .max_priority_fee_per_gas(fee.tip_cap);
                if let Some(to) = &tx.to {
                    request = request.to(parse_address(to)?);
                }
                request.into()
            }
            FeeModel::Legacy => {
                let mut request = TransactionRequest::new()
                    .from(from)
                    .value(value)
                    .data(tx.data.clone())
                    .nonce(tx.nonce)
                    .chain_id(chain_id)
                    .gas(fee.gas)
                    .gas_price(fee.fee_cap);
                if let Some(to) = &tx.to {
                    request = request.to(parse_address(to)?);
                }
                request.into()
            }
        };
        Ok(typed)
    }

    /// Re-simulates a failed transaction at its inclusion block to recover
    /// the revert reason. Best effort; simulation problems are reported as
    /// the reason text.
    async fn revert_reason(&self, tx: &RpcTransaction, block: Option<U64>) -> Option<String> {
        let request: TypedTransaction = tx.into();
        let block_id = block.map(|number| BlockId::from(number.as_u64()));
        match self.provider.call(&request, block_id).await {
            Ok(_) => None,
            Err(error) => match error.as_error_response() {
                Some(rpc) => Some(rpc.message.clone()),
                None => Some(error.to_string()),
            },
        }
    }
}

#[async_trait]
impl ChainClient for EvmClient {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn fee_model(&self) -> FeeModel {
        self.fee_model
    }

    fn abi_registry(&self) -> &AbiRegistry {
        &self.abis
    }

    fn is_valid_address(&self, address: &str) -> bool {
        // The zero address is the native asset sentinel, not an account.
        address
            .parse::<Address>()
            .map(|addr| !addr.is_zero())
            .unwrap_or(false)
    }

    fn normalize_address(&self, address: &str) -> ChainResult<String> {
        Ok(to_checksum(&parse_address(address)?, None))
    }

    fn address_from_public_key(&self, public_key_hex: &str) -> ChainResult<String> {
        Ok(to_checksum(&public_key_to_eth_address(public_key_hex)?, None))
    }

    fn address_from_private_key(&self, private_key_hex: &str) -> ChainResult<String> {
        Ok(to_checksum(
            &private_key_to_eth_address(private_key_hex)?,
            None,
        ))
    }

    fn evm_address(&self, address: &str) -> ChainResult<Address> {
        parse_address(address)
    }

    fn address_to_string(&self, address: Address) -> String {
        to_checksum(&address, None)
    }

    fn is_native_asset(&self, asset: &str) -> bool {
        let Ok(addr) = asset.parse::<Address>() else {
            return false;
        };
        if addr.is_zero() {
            return true;
        }
        self.chain_id == POLYGON_CHAIN_ID && addr == Address::from_low_u64_be(0x1010)
    }

    fn native_asset_address(&self) -> String {
        to_checksum(&Address::zero(), None)
    }

    fn native_asset_decimals(&self) -> u8 {
        18
    }

    async fn native_balance(&self, address: &str) -> ChainResult<U256> {
        let addr = parse_address(address)?;
        self.provider
            .get_balance(addr, None)
            .await
            .map_err(map_provider_err)
    }

    async fn nonce(&self, address: &str) -> ChainResult<u64> {
        let addr = parse_address(address)?;
        self.provider
            .get_transaction_count(addr, Some(BlockNumber::Pending.into()))
            .await
            .map(|nonce| nonce.as_u64())
            .map_err(map_provider_err)
    }

    async fn nonce_at(&self, address: &str, block: Option<u64>) -> ChainResult<u64> {
        let addr = parse_address(address)?;
        let block_id: Option<BlockId> = block.map(Into::into);
        self.provider
            .get_transaction_count(addr, block_id)
            .await
            .map(|nonce| nonce.as_u64())
            .map_err(map_provider_err)
    }

    async fn call_read_only(&self, from: &str, to: &str, data: &[u8]) -> ChainResult<Bytes> {
        let request: TypedTransaction = TransactionRequest::new()
            .from(parse_address(from)?)
            .to(parse_address(to)?)
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
        let addr = parse_address(address)?;
        self.provider
            .get_code(addr, None)
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
        match self.fee_model {
            FeeModel::Dynamic => {
                let tip_cap: U256 = self
                    .provider
                    .request("eth_maxPriorityFeePerGas", ())
                    .await
                    .map_err(map_provider_err)?;
                Ok(FeeRates::dynamic(gas_price, tip_cap))
            }
            FeeModel::Legacy => Ok(FeeRates::flat(gas_price)),
        }
    }

    async fn estimate_gas(&self, tx: &Transaction) -> ChainResult<U256> {
        // A bare value transfer always costs the protocol minimum.
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
        let contract_address = if tx.is_deployment() {
            if tx.data.is_empty() {
                return Err(ChainError::semantic(
                    "contract deployment carries no init code",
                ));
            }
            let deployer = parse_address(&tx.from)?;
            Some(to_checksum(&get_contract_address(deployer, tx.nonce), None))
        } else {
            None
        };

        // Deployments never carry value.
        let value = if tx.is_deployment() {
            U256::zero()
        } else {
            tx.amount
        };
        let typed = self.typed_transaction(tx, value)?;
        let payload = typed.rlp();
        let signing_hash = typed.sighash();

        tracing::debug!(
            chain_id = self.chain_id,
            nonce = tx.nonce,
            deployment = tx.is_deployment(),
            "built unsigned transaction"
        );

        Ok(UnsignedTransaction {
            payload,
            signing_hash,
            contract_address,
        })
    }

    async fn broadcast(&self, payload: &[u8], signature: &[u8]) -> ChainResult<String> {
        if signature.len() != self.signature_length() {
            return Err(ChainError::semantic(format!(
                "signature must be {} bytes, got {}",
                self.signature_length(),
                signature.len()
            )));
        }
        let typed = TypedTransaction::decode(&Rlp::new(payload))
            .map_err(|e| ChainError::semantic(format!("undecodable transaction payload: {e}")))?;
        let signature = signature_from_raw(signature, &typed)?;
        let raw = typed.rlp_signed(&signature);
        let hash = H256::from(keccak256(&raw));

        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(map_provider_err)?;
        let reported: H256 = *pending;
        if reported != hash {
            tracing::warn!(computed = %hash, reported = %reported, "transaction hash mismatch");
        }
        tracing::info!(chain_id = self.chain_id, tx_hash = %hash, "broadcast transaction");
        Ok(format!("{hash:#x}"))
    }

    async fn transaction_by_id(&self, tx_id: &str) -> ChainResult<TransactionInfo> {
        let hash: H256 = tx_id
            .parse()
            .map_err(|_| ChainError::configuration(format!("invalid transaction id: {tx_id}")))?;
        let tx = self
            .provider
            .get_transaction(hash)
            .await
            .map_err(map_provider_err)?
            .ok_or_else(|| ChainError::not_found("transaction", tx_id))?;
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(map_provider_err)?;

        let transaction = Transaction {
            from: to_checksum(&tx.from, None),
            to: tx.to.map(|to| to_checksum(&to, None)),
            amount: tx.value,
            data: tx.input.clone(),
            nonce: tx.nonce.as_u64(),
            chain_id: tx.chain_id.map_or(self.chain_id, |id| id.as_u64()),
            fee: Some(FeeLimit {
                gas: tx.gas,
                fee_cap: tx.max_fee_per_gas.or(tx.gas_price).unwrap_or_default(),
                tip_cap: tx.max_priority_fee_per_gas.unwrap_or_default(),
            }),
            abi_name: None,
            method: None,
        };

        let Some(receipt) = receipt else {
            return Ok(TransactionInfo {
                transaction,
                status: TransactionStatus::Pending,
                gas: None,
                block_number: None,
                logs: Vec::new(),
                events: Vec::new(),
                error: None,
            });
        };

        let status = match receipt.status {
            Some(status) if status == U64::one() => TransactionStatus::Success,
            _ => TransactionStatus::Failed,
        };
        let gas_used = receipt.gas_used.unwrap_or_default();
        let gas_price = receipt
            .effective_gas_price
            .filter(|price| !price.is_zero())
            .or(tx.gas_price)
            .unwrap_or_default();
        let logs: Vec<EventLog> = receipt
            .logs
            .iter()
            .map(|log| EventLog {
                address: to_checksum(&log.address, None),
                topics: log.topics.clone(),
                data: log.data.clone(),
                removed: log.removed.unwrap_or(false),
            })
            .collect();
        let events = decode_known_events(&logs);
        let error = if status == TransactionStatus::Failed {
            self.revert_reason(&tx, receipt.block_number).await
        } else {
            None
        };

        Ok(TransactionInfo {
            transaction,
            status,
            gas: Some(TxGasInfo {
                fee: gas_used.saturating_mul(gas_price),
                gas_price,
                gas_used,
            }),
            block_number: receipt.block_number.map(|number| number.as_u64()),
            logs,
            events,
            error,
        })
    }
}
