//! # Client Registry
//!
//! Construction and sharing of chain clients.
//!
//! ## Available Components
//!
//! - [`build_client`] - Family dispatch from a validated configuration
//! - [`ClientRegistry`] - Get-or-create cache keyed by family and endpoint
//! - [`ClientManager`] - Immutable chain-id index built eagerly at startup
//!
//! Callers own their registry instance and pass it where clients are
//! resolved; there is no process-global map. Clients are cheap handles over
//! a shared HTTP connection, so handing out `Arc` clones is the intended
//! sharing model.

use crate::client::ChainClient;
use crate::config::{ChainConfig, ChainFamily};
use crate::error::{ChainError, ChainResult};
use crate::ethereum::EvmClient;
use crate::tron::TronClient;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Constructs a client for the configuration's family.
///
/// Construction is synchronous and performs no network traffic; a bad
/// endpoint surfaces on the first call through the client.
///
/// # Errors
///
/// Returns [`ChainError::Configuration`] when the configuration fails
/// validation or the endpoint URL cannot be parsed.
pub fn build_client(config: &ChainConfig) -> ChainResult<Arc<dyn ChainClient>> {
    config.validate()?;
    let client: Arc<dyn ChainClient> = match config.family {
        ChainFamily::Evm => Arc::new(EvmClient::new(config)?),
        ChainFamily::Tron => Arc::new(TronClient::new(config)?),
    };
    Ok(client)
}

/// Get-or-create cache of chain clients.
///
/// Clients are cached under `"{family}:{primary_endpoint}"`, so two
/// configurations pointing at the same endpoint share one client and one
/// connection pool. The whole get-or-create runs under a single lock:
/// concurrent resolvers of the same key observe exactly one construction and
/// all receive the same `Arc`.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<String, Arc<dyn ChainClient>>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached client for `config`, constructing and caching it
    /// on first use.
    ///
    /// A failed construction is returned to the caller and leaves no cache
    /// entry behind, so a later call with a corrected configuration retries.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Configuration`] when the configuration is
    /// invalid or client construction fails.
    pub fn resolve(&self, config: &ChainConfig) -> ChainResult<Arc<dyn ChainClient>> {
        config.validate()?;
        let key = config.client_key();

        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&key) {
            tracing::debug!(key = %key, "client cache hit");
            return Ok(Arc::clone(client));
        }
        tracing::debug!(key = %key, "client cache miss");
        let client = build_client(config)?;
        tracing::info!(key = %key, chain_id = config.chain_id, "constructed chain client");
        clients.insert(key, Arc::clone(&client));
        Ok(client)
    }

    /// Returns the number of cached clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Returns true when no clients are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

/// Immutable chain-id index of clients, built once at startup.
///
/// Every client is constructed eagerly in [`ClientManager::new`]; lookups
/// never construct. This suits services that declare their chain set up
/// front and treat an unknown chain id as a routing error.
#[derive(Debug)]
pub struct ClientManager {
    clients: HashMap<u64, Arc<dyn ChainClient>>,
}

impl ClientManager {
    /// Builds a client for every configuration, keyed by chain id.
    ///
    /// # Errors
    ///
    /// Fails fast on the first construction error and returns
    /// [`ChainError::Configuration`] when two configurations claim the same
    /// chain id.
    pub fn new(configs: &[ChainConfig]) -> ChainResult<Self> {
        let mut clients = HashMap::with_capacity(configs.len());
        for config in configs {
            let client = build_client(config)?;
            if clients.insert(config.chain_id, client).is_some() {
                return Err(ChainError::configuration(format!(
                    "duplicate configuration for chain {}",
                    config.chain_id
                )));
            }
        }
        Ok(Self { clients })
    }

    /// Returns the client bound to `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] for an unconfigured chain id.
    pub fn client(&self, chain_id: u64) -> ChainResult<Arc<dyn ChainClient>> {
        self.clients
            .get(&chain_id)
            .map(Arc::clone)
            .ok_or_else(|| ChainError::not_found("chain", chain_id.to_string()))
    }

    /// Returns the configured chain ids, in no particular order.
    #[must_use]
    pub fn chain_ids(&self) -> Vec<u64> {
        self.clients.keys().copied().collect()
    }

    /// Returns the number of configured chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true when no chains are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ChainConfigBuilder;

    fn evm_config(endpoint: &str, chain_id: u64) -> ChainConfig {
        ChainConfigBuilder::new()
            .family(ChainFamily::Evm)
            .endpoint(endpoint)
            .chain_id(chain_id)
            .dynamic_fee(true)
            .build()
            .unwrap()
    }

    fn tron_config(chain_id: u64) -> ChainConfig {
        ChainConfigBuilder::new()
            .family(ChainFamily::Tron)
            .endpoint("https://api.trongrid.io/jsonrpc")
            .endpoint("https://api.trongrid.io")
            .chain_id(chain_id)
            .build()
            .unwrap()
    }

    #[test]
    fn build_client_dispatches_on_family() {
        let evm = build_client(&evm_config("https://rpc.example.com", 1)).unwrap();
        assert_eq!(evm.family(), ChainFamily::Evm);
        assert_eq!(evm.chain_id(), 1);

        let tron = build_client(&tron_config(728_126_428)).unwrap();
        assert_eq!(tron.family(), ChainFamily::Tron);
        assert_eq!(tron.chain_id(), 728_126_428);
    }

    #[test]
    fn build_client_validates_first() {
        let config = ChainConfig::new(ChainFamily::Evm, vec![], 1);
        let err = build_client(&config).unwrap_err();
        assert!(err.is_caller_error());
    }

    #[test]
    fn resolve_caches_per_key() {
        let registry = ClientRegistry::new();
        assert!(registry.is_empty());

        let first = registry.resolve(&evm_config("https://rpc.example.com", 1)).unwrap();
        let second = registry.resolve(&evm_config("https://rpc.example.com", 1)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);

        let other = registry.resolve(&evm_config("https://other.example.com", 1)).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_separates_families_sharing_an_endpoint() {
        let registry = ClientRegistry::new();
        let evm = registry.resolve(&evm_config("https://node.example.com", 1)).unwrap();

        let tron = ChainConfigBuilder::new()
            .family(ChainFamily::Tron)
            .endpoint("https://node.example.com")
            .endpoint("https://node.example.com/wallet")
            .chain_id(728_126_428)
            .build()
            .unwrap();
        let tron = registry.resolve(&tron).unwrap();

        assert_eq!(registry.len(), 2);
        assert_ne!(evm.family(), tron.family());
    }

    #[test]
    fn resolve_does_not_cache_failures() {
        let registry = ClientRegistry::new();
        let broken = ChainConfig::new(ChainFamily::Evm, vec!["ftp://x".into()], 1);
        assert!(registry.resolve(&broken).is_err());
        assert!(registry.is_empty());

        // A corrected config with the same endpoint retries construction.
        let fixed = evm_config("https://rpc.example.com", 1);
        assert!(registry.resolve(&fixed).is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_resolution_constructs_once() {
        let registry = Arc::new(ClientRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                registry
                    .resolve(&evm_config("https://rpc.example.com", 1))
                    .unwrap()
            }));
        }
        let clients: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(registry.len(), 1);
        for client in &clients {
            assert!(Arc::ptr_eq(&clients[0], client));
        }
    }

    #[test]
    fn manager_builds_eagerly_and_looks_up_by_chain_id() {
        let manager = ClientManager::new(&[
            evm_config("https://rpc.example.com", 1),
            tron_config(728_126_428),
        ])
        .unwrap();

        assert_eq!(manager.len(), 2);
        let mut ids = manager.chain_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 728_126_428]);

        assert_eq!(manager.client(1).unwrap().family(), ChainFamily::Evm);
        assert_eq!(
            manager.client(728_126_428).unwrap().family(),
            ChainFamily::Tron
        );
    }

    #[test]
    fn manager_rejects_unknown_chain_id() {
        let manager = ClientManager::new(&[evm_config("https://rpc.example.com", 1)]).unwrap();
        let err = manager.client(999).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn manager_rejects_duplicate_chain_ids() {
        let err = ClientManager::new(&[
            evm_config("https://a.example.com", 1),
            evm_config("https://b.example.com", 1),
        ])
        .unwrap_err();
        assert!(err.is_caller_error());
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn manager_fails_fast_on_construction_error() {
        let err = ClientManager::new(&[
            evm_config("https://rpc.example.com", 1),
            ChainConfig::new(ChainFamily::Tron, vec!["https://only-rpc".into()], 2),
        ])
        .unwrap_err();
        assert!(err.is_caller_error());
    }

    #[test]
    fn empty_manager() {
        let manager = ClientManager::new(&[]).unwrap();
        assert!(manager.is_empty());
        assert!(manager.chain_ids().is_empty());
    }
}
