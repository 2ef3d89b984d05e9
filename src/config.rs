//! # Chain Configuration
//!
//! Configuration for chain endpoints and multi-chain support.
//!
//! ## Available Components
//!
//! - [`ChainFamily`] - The closed set of supported chain families
//! - [`ChainConfig`] - Endpoints, chain id, and fee model for one chain
//! - [`ChainConfigBuilder`] - Fluent construction with validation
//! - [`ChainsConfig`] - Named chain set loaded from TOML
//!
//! Endpoint layout is positional: `endpoints[0]` is the JSON-RPC endpoint
//! for every family; Tron additionally requires the wallet REST base URL at
//! `endpoints[1]` (a third, solidity-node URL is accepted and ignored).

use crate::error::{ChainError, ChainResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The supported chain families. The set is closed; adding a family is a
/// code change, not a configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// EVM chains speaking JSON-RPC with RLP transactions.
    Evm,
    /// Tron chains speaking JSON-RPC for reads plus the wallet REST API.
    Tron,
}

impl ChainFamily {
    /// Returns the lowercase tag used in configuration files and cache keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Evm => "evm",
            Self::Tron => "tron",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a single chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain family selecting the adapter implementation.
    pub family: ChainFamily,
    /// Endpoint URLs, primary JSON-RPC first.
    pub endpoints: Vec<String>,
    /// Numeric chain id transactions are bound to.
    pub chain_id: u64,
    /// Selects the dynamic (EIP-1559) fee model on EVM chains. Flat-fee
    /// families ignore it.
    #[serde(default)]
    pub dynamic_fee: bool,
    /// Provider API key; Tron clients send it as the `TRON-PRO-API-KEY`
    /// header on wallet requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ChainConfig {
    /// Creates a configuration with the default fee model and no API key.
    #[must_use]
    pub fn new(family: ChainFamily, endpoints: Vec<String>, chain_id: u64) -> Self {
        Self {
            family,
            endpoints,
            chain_id,
            dynamic_fee: false,
            api_key: None,
        }
    }

    /// Returns the primary JSON-RPC endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when no endpoints are set.
    pub fn primary_endpoint(&self) -> ChainResult<&str> {
        self.endpoints
            .first()
            .map(String::as_str)
            .ok_or_else(|| ChainError::configuration("no endpoints configured"))
    }

    /// Returns the wallet REST base URL (Tron family).
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the wallet endpoint is
    /// missing.
    pub fn wallet_endpoint(&self) -> ChainResult<&str> {
        self.endpoints
            .get(1)
            .map(String::as_str)
            .ok_or_else(|| ChainError::configuration("wallet endpoint (endpoints[1]) not configured"))
    }

    /// Returns the registry cache key, `"{family}:{primary_endpoint}"`.
    ///
    /// Two configs with the same family and primary endpoint share a client.
    #[must_use]
    pub fn client_key(&self) -> String {
        let primary = self.endpoints.first().map(String::as_str).unwrap_or_default();
        format!("{}:{}", self.family, primary)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when endpoints are missing or
    /// malformed, or the chain id is zero.
    pub fn validate(&self) -> ChainResult<()> {
        if self.endpoints.is_empty() {
            return Err(ChainError::configuration("endpoints must not be empty"));
        }
        for endpoint in &self.endpoints {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ChainError::configuration(format!(
                    "endpoint '{endpoint}' must use an http(s) scheme"
                )));
            }
        }
        if self.chain_id == 0 {
            return Err(ChainError::configuration("chain_id must be non-zero"));
        }
        if self.family == ChainFamily::Tron && self.endpoints.len() < 2 {
            return Err(ChainError::configuration(
                "tron requires a JSON-RPC endpoint and a wallet REST endpoint",
            ));
        }
        Ok(())
    }
}

/// Builder for [`ChainConfig`].
#[derive(Debug, Default)]
pub struct ChainConfigBuilder {
    family: Option<ChainFamily>,
    endpoints: Vec<String>,
    chain_id: Option<u64>,
    dynamic_fee: bool,
    api_key: Option<String>,
}

impl ChainConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chain family.
    #[must_use]
    pub fn family(mut self, family: ChainFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Adds an endpoint URL.
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoints.push(url.into());
        self
    }

    /// Sets the chain id.
    #[must_use]
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Selects the dynamic fee model.
    #[must_use]
    pub fn dynamic_fee(mut self, dynamic: bool) -> Self {
        self.dynamic_fee = dynamic;
        self
    }

    /// Sets the provider API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when required fields are
    /// missing or validation fails.
    pub fn build(self) -> ChainResult<ChainConfig> {
        let family = self
            .family
            .ok_or_else(|| ChainError::configuration("family is required"))?;
        let chain_id = self
            .chain_id
            .ok_or_else(|| ChainError::configuration("chain_id is required"))?;

        let config = ChainConfig {
            family,
            endpoints: self.endpoints,
            chain_id,
            dynamic_fee: self.dynamic_fee,
            api_key: self.api_key,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Named chain set, typically loaded from a TOML document where each table
/// is one chain:
///
/// ```toml
/// [ethereum]
/// family = "evm"
/// endpoints = ["https://rpc.example.com"]
/// chain_id = 1
/// dynamic_fee = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainsConfig {
    /// Chain configurations indexed by name.
    #[serde(flatten)]
    pub chains: HashMap<String, ChainConfig>,
}

impl ChainsConfig {
    /// Parses a TOML document after substituting `${VAR}` references from
    /// the process environment, then validates every chain.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] on unset variables, TOML parse
    /// failures, or invalid chain entries.
    pub fn from_toml_str(toml_str: &str) -> ChainResult<Self> {
        let substituted = substitute_env_vars(toml_str)?;
        let config: Self = toml::from_str(&substituted)
            .map_err(|e| ChainError::configuration(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Gets a chain configuration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.get(name)
    }

    /// Returns all configured chain names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.chains.keys().map(String::as_str).collect()
    }

    /// Returns the number of configured chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns true if no chains are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Validates every chain entry.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] naming the first invalid chain.
    pub fn validate(&self) -> ChainResult<()> {
        for (name, config) in &self.chains {
            config
                .validate()
                .map_err(|e| ChainError::configuration(format!("chain '{name}': {e}")))?;
        }
        Ok(())
    }
}

/// Substitutes `${VAR}` references in `input` with values from the process
/// environment.
///
/// # Errors
///
/// Returns [`ChainError::Configuration`] when a referenced variable is not
/// set.
pub fn substitute_env_vars(input: &str) -> ChainResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        let (head, tail) = rest.split_at(open);
        out.push_str(head);
        let Some(body) = tail.strip_prefix("${") else {
            break;
        };
        match body.find('}') {
            Some(close) => {
                let (name, after) = body.split_at(close);
                let value = std::env::var(name).map_err(|_| {
                    ChainError::configuration(format!("environment variable not set: {name}"))
                })?;
                out.push_str(&value);
                rest = after.strip_prefix('}').unwrap_or(after);
            }
            None => {
                // Unterminated reference; keep the remainder verbatim.
                out.push_str(tail);
                return Ok(out);
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}
