/// Resolver configuration and the validated chain registry
///
/// Callers supply a `ResolverConfig` once at construction; it is validated
/// into an immutable `ChainRegistry` that every resolution reads from. A
/// misconfigured resolver fails to construct rather than failing requests
/// sporadically.
use crate::caip::{AssetNamespace, ChainId};
use crate::error::{NftError, NftResult};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Default skew window, roughly one block interval
const DEFAULT_CLOCK_SKEW_MILLIS: u64 = 15_000;

fn default_clock_skew_millis() -> u64 {
    DEFAULT_CLOCK_SKEW_MILLIS
}

/// Per-chain endpoint configuration as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Block-timestamp indexer endpoint
    pub blocks_endpoint: String,
    /// Requested times within this window of "now" resolve as current state
    #[serde(default = "default_clock_skew_millis")]
    pub clock_skew_millis: u64,
    /// Ownership indexer endpoints, keyed by asset namespace
    ///
    /// Custom indexers are supported by overriding these per chain; the
    /// resolution logic never hard-codes an endpoint.
    #[serde(default)]
    pub asset_endpoints: HashMap<AssetNamespace, String>,
}

/// Caller-supplied resolver configuration: CAIP-2 chain id → endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub chains: HashMap<String, ChainConfig>,
}

/// Validated endpoints for one chain
#[derive(Debug, Clone)]
pub struct ChainEndpoints {
    pub blocks: Url,
    pub clock_skew: TimeDelta,
    assets: HashMap<AssetNamespace, Url>,
}

impl ChainEndpoints {
    /// Ownership endpoint for an asset namespace
    pub fn asset_endpoint(&self, namespace: AssetNamespace) -> NftResult<&Url> {
        self.assets.get(&namespace).ok_or_else(|| {
            NftError::Config(format!("no {namespace} endpoint configured for chain"))
        })
    }
}

/// Immutable registry of configured chains
///
/// Built exactly once at resolver construction; shared read-only across
/// all requests for the life of the resolver.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: HashMap<ChainId, ChainEndpoints>,
}

impl ChainRegistry {
    /// Validate a caller-supplied configuration
    pub fn from_config(config: &ResolverConfig) -> NftResult<Self> {
        if config.chains.is_empty() {
            return Err(NftError::Config("no chains configured".to_string()));
        }

        let mut chains = HashMap::with_capacity(config.chains.len());
        for (key, chain_config) in &config.chains {
            let chain_id: ChainId = key.parse().map_err(|_| {
                NftError::Config(format!("invalid chain id key: {key}"))
            })?;

            let blocks = parse_endpoint(key, "blocksEndpoint", &chain_config.blocks_endpoint)?;

            let mut assets = HashMap::with_capacity(chain_config.asset_endpoints.len());
            for (namespace, endpoint) in &chain_config.asset_endpoints {
                let url = parse_endpoint(key, namespace.as_str(), endpoint)?;
                assets.insert(*namespace, url);
            }

            let skew_millis = i64::try_from(chain_config.clock_skew_millis).map_err(|_| {
                NftError::Config(format!(
                    "clockSkewMillis out of range for chain {key}: {}",
                    chain_config.clock_skew_millis
                ))
            })?;

            chains.insert(
                chain_id,
                ChainEndpoints {
                    blocks,
                    clock_skew: TimeDelta::milliseconds(skew_millis),
                    assets,
                },
            );
        }

        Ok(ChainRegistry { chains })
    }

    /// Iterate over the configured chain ids
    pub fn chain_ids(&self) -> impl Iterator<Item = &ChainId> {
        self.chains.keys()
    }

    /// Endpoints for a chain, or `ChainNotConfigured`
    pub fn endpoints(&self, chain_id: &ChainId) -> NftResult<&ChainEndpoints> {
        self.chains
            .get(chain_id)
            .ok_or_else(|| NftError::ChainNotConfigured(chain_id.to_string()))
    }
}

fn parse_endpoint(chain_key: &str, name: &str, value: &str) -> NftResult<Url> {
    Url::parse(value).map_err(|e| {
        NftError::Config(format!("invalid {name} URL for chain {chain_key}: {value} ({e})"))
    })
}
