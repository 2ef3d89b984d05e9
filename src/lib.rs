//! # Chain Client
//!
//! Chain-agnostic clients for reading state, pricing fees, building and
//! broadcasting transactions, and decoding event logs on EVM networks and
//! Tron.
//!
//! Clients never hold keys. Building a transaction yields an unsigned
//! payload plus the exact digest to sign; a 65-byte compact signature comes
//! back from an external signer and broadcast reassembles the signed form.
//! ABI handling, fee estimation, and event decoding share one neutral model
//! across chain families, so calling code stays family-blind.
//!
//! ## Available Components
//!
//! - [`ChainClient`]: capability trait every chain family implements
//! - [`EvmClient`]: JSON-RPC client for EVM chains, legacy and EIP-1559 fees
//! - [`TronClient`]: dual-endpoint client for Tron's flat-fee model
//! - [`ClientRegistry`] / [`ClientManager`]: shared client instances per chain
//! - [`AbiRegistry`]: named contract ABIs with call and event codecs
//! - [`ChainsConfig`]: TOML-backed multi-chain configuration
//!
//! ## Supported Chains
//!
//! - Ethereum mainnet and L2s (Arbitrum, Optimism, Base)
//! - BNB Smart Chain and Polygon
//! - Tron

pub mod abi;
pub mod client;
pub mod config;
pub mod error;
pub mod ethereum;
pub mod events;
pub mod gas;
pub mod registry;
pub mod tron;
pub mod types;

#[cfg(test)]
mod testutil;

pub use abi::{AbiRegistry, ERC20_ABI_NAME, deploy_data};
pub use client::ChainClient;
pub use config::{ChainConfig, ChainConfigBuilder, ChainFamily, ChainsConfig};
pub use error::{ChainError, ChainResult};
pub use ethereum::EvmClient;
pub use events::{
    ApprovalEvent, ApprovalForAllEvent, DecodedEvent, EventOrigin, GenericEvent, TransferEvent,
    decode_event_log, decode_event_logs, decode_known_event, decode_known_events,
};
pub use gas::{FeeModel, FeeRates, GasEstimator, gas_shortfall};
pub use registry::{ClientManager, ClientRegistry, build_client};
pub use tron::TronClient;
pub use types::{
    EventLog, FeeLimit, SIGNATURE_LENGTH, Transaction, TransactionInfo, TransactionStatus,
    TxGasInfo, UnsignedTransaction,
};
