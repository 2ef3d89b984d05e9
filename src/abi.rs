//! # ABI Registry and Call-Data Codec
//!
//! Named ABI store plus the encode/decode surface built on it.
//!
//! ## Available Components
//!
//! - [`AbiRegistry`] - Concurrent named ABI store; parse once, share snapshots
//! - [`ERC20_ABI_NAME`] / [`ERC20_ABI_JSON`] - Built-in ERC-20 ABI registered
//!   by every client
//! - [`deploy_data`] - Init-code assembly for contract deployments
//! - Token extraction helpers ([`as_uint`], [`as_address`], [`as_bool`],
//!   [`as_string`], [`as_bytes`])
//!
//! Registration parses the JSON exactly once; readers share the parsed ABI
//! through an `Arc` and never re-parse. Re-registering a name replaces the
//! stored ABI (last write wins).

use crate::error::{ChainError, ChainResult};
use crate::types::EventLog;
use dashmap::DashMap;
use ethers::abi::{Abi, Event, Function, RawLog, Token};
use ethers::types::{Address, Bytes, H256, U256};
use std::sync::Arc;

/// Name under which the built-in ERC-20 ABI is registered.
pub const ERC20_ABI_NAME: &str = "erc20";

/// The built-in ERC-20 ABI: the standard read surface plus `approve`,
/// `transferFrom`, and a `transfer` without outputs as many deployed tokens
/// declare it.
pub const ERC20_ABI_JSON: &str = r#"[{"inputs":[],"name":"totalSupply","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},{"inputs":[{"internalType":"address","name":"account","type":"address"}],"name":"balanceOf","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},{"inputs":[{"internalType":"address","name":"owner","type":"address"},{"internalType":"address","name":"spender","type":"address"}],"name":"allowance","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},{"inputs":[],"name":"symbol","outputs":[{"internalType":"string","name":"","type":"string"}],"stateMutability":"view","type":"function"},{"inputs":[],"name":"decimals","outputs":[{"internalType":"uint8","name":"","type":"uint8"}],"stateMutability":"view","type":"function"},{"inputs":[{"internalType":"address","name":"spender","type":"address"},{"internalType":"uint256","name":"value","type":"uint256"}],"name":"approve","outputs":[{"internalType":"bool","name":"","type":"bool"}],"stateMutability":"nonpayable","type":"function"},{"inputs":[{"internalType":"address","name":"from","type":"address"},{"internalType":"address","name":"to","type":"address"},{"internalType":"uint256","name":"value","type":"uint256"}],"name":"transferFrom","outputs":[{"internalType":"bool","name":"","type":"bool"}],"stateMutability":"nonpayable","type":"function"},{"constant":false,"inputs":[{"name":"_to","type":"address"},{"name":"_value","type":"uint256"}],"name":"transfer","outputs":[],"payable":false,"stateMutability":"nonpayable","type":"function"}]"#;

/// Concurrent registry of named contract ABIs.
///
/// Clients pre-register the built-in ERC-20 ABI at construction; callers add
/// their own ABIs before encoding calls or decoding results against them.
#[derive(Debug, Default)]
pub struct AbiRegistry {
    entries: DashMap<String, Arc<Abi>>,
}

impl AbiRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in ERC-20 ABI registered.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] if the built-in ABI fails to
    /// parse, which indicates a packaging defect.
    pub fn with_builtin() -> ChainResult<Self> {
        let registry = Self::new();
        registry.register(ERC20_ABI_NAME, ERC20_ABI_JSON)?;
        Ok(registry)
    }

    /// Parses `json` and stores it under `name`, replacing any previous ABI
    /// with that name.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the JSON is not a valid
    /// contract ABI.
    pub fn register(&self, name: impl Into<String>, json: &str) -> ChainResult<()> {
        let name = name.into();
        let abi: Abi = serde_json::from_str(json).map_err(|e| {
            ChainError::configuration(format!("invalid ABI JSON for '{name}': {e}"))
        })?;
        tracing::debug!(abi = %name, functions = abi.functions().count(), "registered ABI");
        self.entries.insert(name, Arc::new(abi));
        Ok(())
    }

    /// Returns true when an ABI is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the parsed ABI registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] when no ABI has that name.
    pub fn get(&self, name: &str) -> ChainResult<Arc<Abi>> {
        self.entries
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ChainError::not_found("abi", name))
    }

    /// Returns the number of registered ABIs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no ABIs are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encodes a call to `method` with `args`: 4-byte selector followed by
    /// the ABI-encoded arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] for an unknown ABI or method and
    /// [`ChainError::Encoding`] when the arguments do not match the method
    /// signature.
    pub fn encode_call(&self, name: &str, method: &str, args: &[Token]) -> ChainResult<Bytes> {
        let function = self.function(name, method)?;
        let data = function.encode_input(args).map_err(|e| {
            ChainError::encoding(format!("encoding arguments for {method} failed: {e}"))
        })?;
        Ok(Bytes::from(data))
    }

    /// Decodes call data (including the selector) back into the arguments of
    /// `method`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] for an unknown ABI or method and
    /// [`ChainError::Encoding`] when the data is too short or does not match
    /// the method signature.
    pub fn decode_call(&self, name: &str, method: &str, data: &[u8]) -> ChainResult<Vec<Token>> {
        let function = self.function(name, method)?;
        let args = data.get(4..).ok_or_else(|| {
            ChainError::encoding("call data shorter than a 4-byte selector".to_string())
        })?;
        function
            .decode_input(args)
            .map_err(|e| ChainError::encoding(format!("decoding arguments of {method} failed: {e}")))
    }

    /// Decodes return data against the output types of `method`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] for an unknown ABI or method and
    /// [`ChainError::Encoding`] when the data does not match the outputs.
    pub fn decode_result(&self, name: &str, method: &str, data: &[u8]) -> ChainResult<Vec<Token>> {
        let function = self.function(name, method)?;
        function
            .decode_output(data)
            .map_err(|e| ChainError::encoding(format!("decoding output of {method} failed: {e}")))
    }

    /// Finds the event in ABI `name` whose signature hash equals `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] when the ABI is unknown or declares
    /// no event with that signature.
    pub fn event_by_topic(&self, name: &str, topic: H256) -> ChainResult<Event> {
        let abi = self.get(name)?;
        abi.events()
            .find(|event| event.signature() == topic)
            .cloned()
            .ok_or_else(|| ChainError::not_found("event", format!("{topic:#x}")))
    }

    /// Decodes an event log against the event whose signature matches
    /// `topics[0]`, returning the values in declaration order (indexed
    /// values come from topics, the rest from the data section).
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Encoding`] when the log has no topics or its
    /// shape does not match the event, and [`ChainError::NotFound`] when no
    /// event matches.
    pub fn decode_event_by_topic(&self, name: &str, log: &EventLog) -> ChainResult<Vec<Token>> {
        let topic0 = log
            .topic0()
            .ok_or_else(|| ChainError::encoding("event log carries no topics"))?;
        let event = self.event_by_topic(name, topic0)?;
        let parsed = event
            .parse_log(RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            })
            .map_err(|e| {
                ChainError::encoding(format!("decoding event {} failed: {e}", event.name))
            })?;
        Ok(parsed.params.into_iter().map(|param| param.value).collect())
    }

    /// Returns the human-readable selector of `method`, e.g.
    /// `"transfer(address,uint256)"`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] for an unknown ABI or method.
    pub fn function_selector(&self, name: &str, method: &str) -> ChainResult<String> {
        let function = self.function(name, method)?;
        let params: Vec<String> = function
            .inputs
            .iter()
            .map(|param| param.kind.to_string())
            .collect();
        Ok(format!("{}({})", function.name, params.join(",")))
    }

    fn function(&self, name: &str, method: &str) -> ChainResult<Function> {
        let abi = self.get(name)?;
        abi.function(method)
            .cloned()
            .map_err(|_| ChainError::not_found("method", format!("{name}.{method}")))
    }
}

/// Assembles deployment init code: byte-code followed by the ABI-encoded
/// constructor arguments. An ABI without a constructor yields the byte-code
/// alone.
///
/// # Errors
///
/// Returns [`ChainError::Configuration`] for invalid ABI JSON or arguments
/// against a constructor-less ABI, and [`ChainError::Encoding`] for invalid
/// byte-code hex or arguments that do not match the constructor.
pub fn deploy_data(abi_json: &str, bytecode_hex: &str, args: &[Token]) -> ChainResult<Bytes> {
    let abi: Abi = serde_json::from_str(abi_json)
        .map_err(|e| ChainError::configuration(format!("invalid ABI JSON: {e}")))?;
    let code = decode_hex(bytecode_hex)?;

    match &abi.constructor {
        Some(constructor) => constructor
            .encode_input(code, args)
            .map(Bytes::from)
            .map_err(|e| ChainError::encoding(format!("encoding constructor failed: {e}"))),
        None if args.is_empty() => Ok(Bytes::from(code)),
        None => Err(ChainError::configuration(
            "ABI declares no constructor but constructor arguments were provided",
        )),
    }
}

/// Decodes a hex string, accepting an optional `0x` prefix.
///
/// # Errors
///
/// Returns [`ChainError::Encoding`] for non-hex input.
pub fn decode_hex(input: &str) -> ChainResult<Vec<u8>> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(stripped).map_err(|e| ChainError::encoding(format!("invalid hex: {e}")))
}

/// Extracts an unsigned integer token.
///
/// # Errors
///
/// Returns [`ChainError::Encoding`] for any other token variant.
pub fn as_uint(token: &Token) -> ChainResult<U256> {
    match token {
        Token::Uint(value) | Token::Int(value) => Ok(*value),
        other => Err(ChainError::encoding(format!(
            "expected integer token, got {other:?}"
        ))),
    }
}

/// Extracts an address token.
///
/// # Errors
///
/// Returns [`ChainError::Encoding`] for any other token variant.
pub fn as_address(token: &Token) -> ChainResult<Address> {
    match token {
        Token::Address(value) => Ok(*value),
        other => Err(ChainError::encoding(format!(
            "expected address token, got {other:?}"
        ))),
    }
}

/// Extracts a boolean token.
///
/// # Errors
///
/// Returns [`ChainError::Encoding`] for any other token variant.
pub fn as_bool(token: &Token) -> ChainResult<bool> {
    match token {
        Token::Bool(value) => Ok(*value),
        other => Err(ChainError::encoding(format!(
            "expected bool token, got {other:?}"
        ))),
    }
}

/// Extracts a string token.
///
/// # Errors
///
/// Returns [`ChainError::Encoding`] for any other token variant.
pub fn as_string(token: &Token) -> ChainResult<String> {
    match token {
        Token::String(value) => Ok(value.clone()),
        other => Err(ChainError::encoding(format!(
            "expected string token, got {other:?}"
        ))),
    }
}

/// Extracts a dynamic or fixed bytes token.
///
/// # Errors
///
/// Returns [`ChainError::Encoding`] for any other token variant.
pub fn as_bytes(token: &Token) -> ChainResult<Vec<u8>> {
    match token {
        Token::Bytes(value) | Token::FixedBytes(value) => Ok(value.clone()),
        other => Err(ChainError::encoding(format!(
            "expected bytes token, got {other:?}"
        ))),
    }
}
