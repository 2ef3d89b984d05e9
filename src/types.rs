//! # Chain Types
//!
//! Chain-neutral data model shared by every family adapter.
//!
//! ## Available Components
//!
//! - [`Transaction`] - Neutral transaction description supplied by callers
//! - [`FeeLimit`] - Gas budget and price caps attached to a transaction
//! - [`UnsignedTransaction`] - Build output: payload, signing hash, optional
//!   deployment address
//! - [`TransactionStatus`] - Lifecycle status of an on-chain transaction
//! - [`TxGasInfo`] - Gas usage and fee actually paid
//! - [`TransactionInfo`] - Full lookup result including raw and decoded logs
//! - [`EventLog`] - Chain-neutral event log record
//!
//! Callers describe what they want in these types; the family adapters
//! translate them to the chain's wire format.

use crate::error::{ChainError, ChainResult};
use crate::events::DecodedEvent;
use ethers::types::{Bytes, H256, U256};
use serde::{Deserialize, Serialize};

/// Expected byte length of a recoverable ECDSA signature (`r ++ s ++ v`).
pub const SIGNATURE_LENGTH: usize = 65;

/// Chain-neutral transaction description.
///
/// An empty `to` marks a contract deployment; empty `data` with a recipient
/// is a plain value transfer. `abi_name` and `method` are optional metadata
/// consumed by adapters that need a human-readable function selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender address in the family's canonical string form.
    pub from: String,
    /// Recipient address; `None` signals a contract deployment.
    pub to: Option<String>,
    /// Native value transferred, in the chain's smallest unit.
    pub amount: U256,
    /// Call data (or init code for deployments).
    pub data: Bytes,
    /// Account nonce, where the family uses nonces.
    pub nonce: u64,
    /// Numeric chain id the transaction is bound to.
    pub chain_id: u64,
    /// Fee budget; required before building for broadcast.
    pub fee: Option<FeeLimit>,
    /// Name of a registered ABI describing the called contract.
    pub abi_name: Option<String>,
    /// Method name within `abi_name` that `data` encodes.
    pub method: Option<String>,
}

impl Transaction {
    /// Returns true when this transaction deploys a contract.
    #[must_use]
    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }

    /// Returns true when this transaction carries no call data.
    #[must_use]
    pub fn is_plain_transfer(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the fee limit this transaction must carry before it can be
    /// built for broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Semantic`] when the fee limit is missing or its
    /// gas budget is zero.
    pub fn priced_fee(&self) -> ChainResult<&FeeLimit> {
        match &self.fee {
            Some(fee) if fee.is_priced() => Ok(fee),
            Some(_) => Err(ChainError::semantic(
                "fee limit has a zero gas budget; price the transaction first",
            )),
            None => Err(ChainError::semantic(
                "transaction carries no fee limit; price the transaction first",
            )),
        }
    }
}

/// Gas budget and price caps for a transaction.
///
/// Interpretation is family-specific: on dynamic-fee chains `fee_cap` is the
/// max fee per gas and `tip_cap` the priority fee; on legacy chains
/// `fee_cap` is the flat gas price; on flat-fee chains the product of `gas`
/// and `fee_cap` bounds the total fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeLimit {
    /// Gas unit budget.
    pub gas: U256,
    /// Absolute price ceiling per gas unit.
    pub fee_cap: U256,
    /// Priority tip ceiling per gas unit (dynamic-fee chains only).
    pub tip_cap: U256,
}

impl FeeLimit {
    /// Creates a fee limit from its three components.
    #[must_use]
    pub fn new(gas: U256, fee_cap: U256, tip_cap: U256) -> Self {
        Self {
            gas,
            fee_cap,
            tip_cap,
        }
    }

    /// Returns true when the gas budget is non-zero, the minimum for a
    /// transaction to be broadcast.
    #[must_use]
    pub fn is_priced(&self) -> bool {
        !self.gas.is_zero()
    }
}

/// Output of transaction building: everything an external signer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Family-specific unsigned payload (RLP for EVM, transaction JSON for
    /// Tron). Round-trips through [`broadcast`](crate::client::ChainClient::broadcast).
    pub payload: Bytes,
    /// Digest the external signer must sign.
    pub signing_hash: H256,
    /// Pre-computed contract address, present exactly for deployments.
    pub contract_address: Option<String>,
}

impl UnsignedTransaction {
    /// Returns true when this payload deploys a contract.
    #[must_use]
    pub fn is_deployment(&self) -> bool {
        self.contract_address.is_some()
    }
}

/// Lifecycle status of an on-chain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Known to the chain but not yet confirmed in a block.
    Pending,
    /// Executed successfully.
    Success,
    /// Executed and reverted or ran out of resources.
    Failed,
    /// On chain but malformed; no execution outcome can be attributed.
    Invalid,
}

impl TransactionStatus {
    /// Returns true once the status can no longer change.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Gas usage and fee actually paid by a confirmed transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxGasInfo {
    /// Total fee paid, `gas_used * gas_price`.
    pub fee: U256,
    /// Effective price per gas unit (the receipt's effective price when the
    /// chain reports one).
    pub gas_price: U256,
    /// Gas units consumed.
    pub gas_used: U256,
}

/// Chain-neutral event log record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    /// Emitting contract, in the family's canonical string form.
    pub address: String,
    /// Indexed topics; `topics[0]` is the event signature hash.
    pub topics: Vec<H256>,
    /// Non-indexed data payload.
    pub data: Bytes,
    /// True when the log was removed by a chain reorganization.
    pub removed: bool,
}

impl EventLog {
    /// Returns the event signature topic, if the log has any topics.
    #[must_use]
    pub fn topic0(&self) -> Option<H256> {
        self.topics.first().copied()
    }
}

/// Full result of a transaction lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInfo {
    /// Echo of the transaction as the chain reports it.
    pub transaction: Transaction,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Gas usage and fee; `None` while pending.
    pub gas: Option<TxGasInfo>,
    /// Containing block; `None` while pending.
    pub block_number: Option<u64>,
    /// Raw event logs emitted by the transaction.
    pub logs: Vec<EventLog>,
    /// Logs decoded against the built-in event set.
    pub events: Vec<DecodedEvent>,
    /// Failure reason, recovered where the chain exposes one.
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn deployment_is_signaled_by_empty_recipient() {
        let tx = Transaction {
            data: Bytes::from(vec![0x60, 0x80]),
            ..Default::default()
        };
        assert!(tx.is_deployment());

        let tx = Transaction {
            to: Some("0x0000000022D53366457F9d5E68Ec105046FC4383".into()),
            ..Default::default()
        };
        assert!(!tx.is_deployment());
        assert!(tx.is_plain_transfer());
    }

    #[test]
    fn priced_fee_requires_non_zero_gas() {
        let mut tx = Transaction::default();
        assert!(tx.priced_fee().is_err());

        tx.fee = Some(FeeLimit::default());
        assert!(tx.priced_fee().is_err());

        tx.fee = Some(FeeLimit::new(
            U256::from(21_000),
            U256::from(875_000_000u64),
            U256::zero(),
        ));
        let fee = tx.priced_fee().unwrap();
        assert_eq!(fee.gas, U256::from(21_000));
    }

    #[test]
    fn status_finality() {
        assert!(!TransactionStatus::Pending.is_final());
        assert!(TransactionStatus::Success.is_final());
        assert!(TransactionStatus::Failed.is_final());
        assert!(TransactionStatus::Invalid.is_final());
    }

    #[test]
    fn topic0_of_empty_log() {
        let log = EventLog::default();
        assert_eq!(log.topic0(), None);
    }

    #[test]
    fn transaction_serde_round_trip() {
        let tx = Transaction {
            from: "0xF2c1105fb02A1acC3C25EE1AeDb46639BC424857".into(),
            to: Some("0x0000000022D53366457F9d5E68Ec105046FC4383".into()),
            amount: U256::from(1_000_000u64),
            nonce: 7,
            chain_id: 1,
            fee: Some(FeeLimit::new(
                U256::from(21_000),
                U256::from(875_000_000u64),
                U256::zero(),
            )),
            ..Default::default()
        };
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }
}
