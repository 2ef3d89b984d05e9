//! # Chain Client Trait
//!
//! Port definition for chain-family-specific clients.
//!
//! ## Available Components
//!
//! - [`ChainClient`] - The capability surface every chain family adapter
//!   implements: addressing, reads, fee estimation, transaction building,
//!   broadcast, and lookup
//! - Default token-standard helpers (`balance_of`, `allowance`,
//!   `transfer_data`, ...) built on the required methods
//!
//! Clients are cheap handles over a shared connection; they are created by
//! the [`registry`](crate::registry) and shared as `Arc<dyn ChainClient>`.
//! Addresses cross this boundary as strings in the family's canonical form
//! (EIP-55 hex for EVM chains, base58check for Tron); the
//! [`evm_address`](ChainClient::evm_address) /
//! [`address_to_string`](ChainClient::address_to_string) pair bridges them
//! to the 20-byte form ABI encoding works in.

use crate::abi::{self, AbiRegistry, ERC20_ABI_NAME};
use crate::config::ChainFamily;
use crate::error::{ChainError, ChainResult};
use crate::gas::{FeeModel, FeeRates, gas_shortfall};
use crate::types::{
    FeeLimit, SIGNATURE_LENGTH, Transaction, TransactionInfo, UnsignedTransaction,
};
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, Bytes, U256};
use std::fmt;

/// Extracts the single return value of a call, rejecting any other arity.
pub(crate) fn single_token(tokens: Vec<Token>, method: &str) -> ChainResult<Token> {
    if tokens.len() != 1 {
        return Err(ChainError::encoding(format!(
            "{method} returned {} values, expected 1",
            tokens.len()
        )));
    }
    tokens
        .into_iter()
        .next()
        .ok_or_else(|| ChainError::encoding(format!("{method} returned no values")))
}

/// Trait for chain-family-specific client operations.
///
/// One implementation exists per [`ChainFamily`]; a configured chain binds an
/// implementation to an endpoint and a numeric chain id. All methods are
/// safe to call concurrently.
#[async_trait]
pub trait ChainClient: Send + Sync + fmt::Debug {
    /// Returns the chain family this client speaks.
    fn family(&self) -> ChainFamily;

    /// Returns the numeric chain id this client is bound to.
    fn chain_id(&self) -> u64;

    /// Returns the fee model transactions on this chain are priced under.
    fn fee_model(&self) -> FeeModel;

    /// Returns the client's ABI registry. The ERC-20 interface is always
    /// pre-registered under [`ERC20_ABI_NAME`].
    fn abi_registry(&self) -> &AbiRegistry;

    /// Returns the byte length [`broadcast`](Self::broadcast) requires of a
    /// signature.
    fn signature_length(&self) -> usize {
        SIGNATURE_LENGTH
    }

    // ----- addressing -----

    /// Returns true when `address` is well formed for this family.
    fn is_valid_address(&self, address: &str) -> bool;

    /// Rewrites `address` into the family's canonical form (EIP-55
    /// checksummed hex for EVM chains, base58check for Tron).
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the address cannot be
    /// parsed at all.
    fn normalize_address(&self, address: &str) -> ChainResult<String>;

    /// Derives the canonical address controlled by an uncompressed SEC1
    /// public key, given as hex with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the key is not a valid
    /// point on the curve.
    fn address_from_public_key(&self, public_key_hex: &str) -> ChainResult<String>;

    /// Derives the canonical address controlled by a secp256k1 private key,
    /// given as hex with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the scalar is out of
    /// range.
    fn address_from_private_key(&self, private_key_hex: &str) -> ChainResult<String>;

    /// Parses a canonical address string into the 20-byte form used for ABI
    /// encoding. For Tron this strips the `0x41` network prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the address cannot be
    /// parsed.
    fn evm_address(&self, address: &str) -> ChainResult<Address>;

    /// Renders a 20-byte address back into the family's canonical string
    /// form.
    fn address_to_string(&self, address: Address) -> String;

    /// Returns true when `asset` denotes the chain's native asset rather
    /// than a token contract.
    fn is_native_asset(&self, asset: &str) -> bool;

    /// Returns the sentinel address that denotes the native asset.
    fn native_asset_address(&self) -> String;

    /// Returns the number of decimals of the native asset.
    fn native_asset_decimals(&self) -> u8;

    // ----- reads -----

    /// Returns the native asset balance of `address`, in the chain's
    /// smallest unit.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Connectivity`] when the endpoint is
    /// unreachable and [`ChainError::Configuration`] when the address is
    /// malformed.
    async fn native_balance(&self, address: &str) -> ChainResult<U256>;

    /// Returns the next usable nonce for `address`, counting pending
    /// transactions. Families without account nonces return zero.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Connectivity`] when the endpoint is
    /// unreachable.
    async fn nonce(&self, address: &str) -> ChainResult<u64>;

    /// Returns the nonce of `address` at a specific block, or at the latest
    /// block when `block` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Connectivity`] when the endpoint is
    /// unreachable.
    async fn nonce_at(&self, address: &str, block: Option<u64>) -> ChainResult<u64>;

    /// Executes a read-only contract call and returns the raw return data.
    ///
    /// # Arguments
    ///
    /// * `from` - Caller address in canonical form
    /// * `to` - Contract address in canonical form
    /// * `data` - ABI-encoded call data
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Semantic`] when the call reverts and
    /// [`ChainError::Connectivity`] when the endpoint is unreachable.
    async fn call_read_only(&self, from: &str, to: &str, data: &[u8]) -> ChainResult<Bytes>;

    /// Returns the number of the latest block.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Connectivity`] when the endpoint is
    /// unreachable.
    async fn latest_block_number(&self) -> ChainResult<u64>;

    /// Returns true when `address` holds contract code.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Connectivity`] when the endpoint is
    /// unreachable.
    async fn has_code(&self, address: &str) -> ChainResult<bool>;

    // ----- fees -----

    /// Suggests current gas pricing. Dynamic-fee chains return a fee cap,
    /// tip cap and the base fee derived from them; flat-fee chains return
    /// the flat price with zeroed caps.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Connectivity`] when the endpoint is
    /// unreachable.
    async fn suggest_gas_price(&self) -> ChainResult<FeeRates>;

    /// Estimates the gas budget for `tx`, with a safety buffer applied.
    /// Plain value transfers cost a fixed minimum and are answered without
    /// touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Semantic`] when simulation reverts and
    /// [`ChainError::Connectivity`] when the endpoint is unreachable.
    async fn estimate_gas(&self, tx: &Transaction) -> ChainResult<U256>;

    /// Suggests a complete fee limit for `tx` by combining
    /// [`suggest_gas_price`](Self::suggest_gas_price) and
    /// [`estimate_gas`](Self::estimate_gas).
    ///
    /// # Errors
    ///
    /// Propagates errors from the two underlying calls.
    async fn suggest_fee(&self, tx: &Transaction) -> ChainResult<FeeLimit> {
        let rates = self.suggest_gas_price().await?;
        let gas = self.estimate_gas(tx).await?;
        Ok(rates.fee_limit(gas))
    }

    /// Returns how much native balance the sender is missing to cover the
    /// worst-case fee of `tx`, or zero when the balance suffices. Uses the
    /// transaction's own fee limit when priced, otherwise suggests one.
    ///
    /// # Errors
    ///
    /// Propagates errors from balance lookup and fee suggestion.
    async fn lacked_gas(&self, tx: &Transaction) -> ChainResult<U256> {
        let fee = match &tx.fee {
            Some(fee) if fee.is_priced() => *fee,
            _ => self.suggest_fee(tx).await?,
        };
        let balance = self.native_balance(&tx.from).await?;
        Ok(gas_shortfall(balance, fee.gas, fee.fee_cap))
    }

    // ----- transaction pipeline -----

    /// Builds an unsigned transaction ready for external signing. `tx` must
    /// carry a priced fee limit. A `None` recipient builds a contract
    /// deployment and pre-computes the deployed address.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Semantic`] when the transaction is not priced,
    /// [`ChainError::Configuration`] when an address is malformed, and
    /// [`ChainError::Connectivity`] when the family needs the endpoint to
    /// assemble the payload.
    async fn build_transaction(&self, tx: &Transaction) -> ChainResult<UnsignedTransaction>;

    /// Builds an unsigned contract deployment from an ABI, runtime
    /// bytecode, and constructor arguments. The transferred amount is
    /// forced to zero.
    ///
    /// # Arguments
    ///
    /// * `tx` - Template carrying sender, nonce, chain id and fee limit
    /// * `abi_json` - Contract ABI as JSON text
    /// * `bytecode_hex` - Contract creation bytecode as hex
    /// * `args` - Constructor arguments
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when arguments are supplied to
    /// a constructorless ABI, [`ChainError::Encoding`] when argument
    /// encoding fails, plus anything
    /// [`build_transaction`](Self::build_transaction) raises.
    async fn build_deployment(
        &self,
        tx: &Transaction,
        abi_json: &str,
        bytecode_hex: &str,
        args: &[Token],
    ) -> ChainResult<UnsignedTransaction> {
        let init_code = abi::deploy_data(abi_json, bytecode_hex, args)?;
        let mut deploy = tx.clone();
        deploy.to = None;
        deploy.data = init_code;
        deploy.amount = U256::zero();
        self.build_transaction(&deploy).await
    }

    /// Attaches a signature to a previously built payload and submits it,
    /// returning the transaction id. The signature must be exactly
    /// [`signature_length`](Self::signature_length) bytes; this is checked
    /// before any network traffic.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Semantic`] for a malformed signature or
    /// payload and [`ChainError::Connectivity`] when submission fails to
    /// reach the chain.
    async fn broadcast(&self, payload: &[u8], signature: &[u8]) -> ChainResult<String>;

    /// Looks up a transaction by id and folds execution outcome, fees and
    /// decoded logs into one record. Transactions known to the chain but
    /// not yet confirmed report [`Pending`](crate::types::TransactionStatus::Pending).
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] when the chain has never seen the
    /// id and [`ChainError::Connectivity`] when the endpoint is
    /// unreachable.
    async fn transaction_by_id(&self, tx_id: &str) -> ChainResult<TransactionInfo>;

    // ----- token-standard helpers -----

    /// Returns the ERC-20 balance of `holder` on the `token` contract.
    ///
    /// # Errors
    ///
    /// Propagates encoding and call errors.
    async fn balance_of(&self, token: &str, holder: &str) -> ChainResult<U256> {
        let data = self.abi_registry().encode_call(
            ERC20_ABI_NAME,
            "balanceOf",
            &[Token::Address(self.evm_address(holder)?)],
        )?;
        let output = self.call_read_only(holder, token, &data).await?;
        let values = self
            .abi_registry()
            .decode_result(ERC20_ABI_NAME, "balanceOf", &output)?;
        abi::as_uint(&single_token(values, "balanceOf")?)
    }

    /// Returns the ERC-20 allowance `owner` granted to `spender` on the
    /// `token` contract.
    ///
    /// # Errors
    ///
    /// Propagates encoding and call errors.
    async fn allowance(&self, token: &str, owner: &str, spender: &str) -> ChainResult<U256> {
        let data = self.abi_registry().encode_call(
            ERC20_ABI_NAME,
            "allowance",
            &[
                Token::Address(self.evm_address(owner)?),
                Token::Address(self.evm_address(spender)?),
            ],
        )?;
        let output = self.call_read_only(owner, token, &data).await?;
        let values = self
            .abi_registry()
            .decode_result(ERC20_ABI_NAME, "allowance", &output)?;
        abi::as_uint(&single_token(values, "allowance")?)
    }

    /// Returns the number of decimals the `token` contract reports.
    ///
    /// # Errors
    ///
    /// Propagates encoding and call errors; values outside `u8` are an
    /// [`ChainError::Encoding`] error.
    async fn decimals_of(&self, token: &str) -> ChainResult<u8> {
        let data = self
            .abi_registry()
            .encode_call(ERC20_ABI_NAME, "decimals", &[])?;
        let from = self.native_asset_address();
        let output = self.call_read_only(&from, token, &data).await?;
        let values = self
            .abi_registry()
            .decode_result(ERC20_ABI_NAME, "decimals", &output)?;
        let value = abi::as_uint(&single_token(values, "decimals")?)?;
        if value > U256::from(u8::MAX) {
            return Err(ChainError::encoding("decimals value exceeds u8 range"));
        }
        u8::try_from(value.low_u64())
            .map_err(|_| ChainError::encoding("decimals value exceeds u8 range"))
    }

    /// Returns the symbol the `token` contract reports.
    ///
    /// # Errors
    ///
    /// Propagates encoding and call errors.
    async fn symbol_of(&self, token: &str) -> ChainResult<String> {
        let data = self
            .abi_registry()
            .encode_call(ERC20_ABI_NAME, "symbol", &[])?;
        let from = self.native_asset_address();
        let output = self.call_read_only(&from, token, &data).await?;
        let values = self
            .abi_registry()
            .decode_result(ERC20_ABI_NAME, "symbol", &output)?;
        abi::as_string(&single_token(values, "symbol")?)
    }

    /// Returns the total supply the `token` contract reports.
    ///
    /// # Errors
    ///
    /// Propagates encoding and call errors.
    async fn total_supply_of(&self, token: &str) -> ChainResult<U256> {
        let data = self
            .abi_registry()
            .encode_call(ERC20_ABI_NAME, "totalSupply", &[])?;
        let from = self.native_asset_address();
        let output = self.call_read_only(&from, token, &data).await?;
        let values = self
            .abi_registry()
            .decode_result(ERC20_ABI_NAME, "totalSupply", &output)?;
        abi::as_uint(&single_token(values, "totalSupply")?)
    }

    /// Encodes ERC-20 `transfer` call data for `to` and `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when `to` is malformed.
    fn transfer_data(&self, to: &str, amount: U256) -> ChainResult<Bytes> {
        self.abi_registry().encode_call(
            ERC20_ABI_NAME,
            "transfer",
            &[Token::Address(self.evm_address(to)?), Token::Uint(amount)],
        )
    }

    /// Encodes ERC-20 `approve` call data for `spender` and `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when `spender` is malformed.
    fn approve_data(&self, spender: &str, amount: U256) -> ChainResult<Bytes> {
        self.abi_registry().encode_call(
            ERC20_ABI_NAME,
            "approve",
            &[
                Token::Address(self.evm_address(spender)?),
                Token::Uint(amount),
            ],
        )
    }
}
