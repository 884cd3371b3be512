/// Indexer contracts
///
/// The resolver core never talks to an indexer directly; it depends on
/// these trait boundaries. Production deployments use the subgraph-backed
/// implementations; tests substitute in-memory fakes.

pub mod subgraph;

pub use subgraph::SubgraphClient;

use crate::caip::{AccountId, AssetNamespace, AssetReference};
use crate::config::ChainEndpoints;
use crate::error::{NftError, NftResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

/// Block-timestamp indexer contract
#[async_trait]
pub trait BlockIndexer: Send + Sync {
    /// Highest block number whose timestamp is at or before `at`
    async fn block_at_or_before(&self, endpoint: &Url, at: DateTime<Utc>)
        -> NftResult<Option<u64>>;
}

/// Ownership indexer contract, one method per supported token standard
#[async_trait]
pub trait OwnershipIndexer: Send + Sync {
    /// Owner of an erc721 token, if the token exists at the given block
    async fn erc721_owner(
        &self,
        endpoint: &Url,
        contract: &str,
        token_id: &str,
        block: Option<u64>,
    ) -> NftResult<Option<String>>;

    /// All erc1155 holders with strictly positive balance at the given block
    async fn erc1155_holders(
        &self,
        endpoint: &Url,
        contract: &str,
        token_id: &str,
        block: Option<u64>,
    ) -> NftResult<Vec<String>>;
}

/// Look up the owning accounts of an asset, dispatching on its namespace
///
/// An empty result is `OwnerNotFound` naming the contract and token id.
/// Returned accounts preserve the indexer's order.
pub async fn lookup_owners(
    indexer: &dyn OwnershipIndexer,
    asset: &AssetReference,
    endpoints: &ChainEndpoints,
    block: Option<u64>,
) -> NftResult<Vec<AccountId>> {
    let endpoint = endpoints.asset_endpoint(asset.namespace)?;

    let addresses = match asset.namespace {
        AssetNamespace::Erc721 => indexer
            .erc721_owner(endpoint, &asset.contract, &asset.token_id, block)
            .await?
            .into_iter()
            .collect(),
        AssetNamespace::Erc1155 => {
            indexer
                .erc1155_holders(endpoint, &asset.contract, &asset.token_id, block)
                .await?
        }
    };

    if addresses.is_empty() {
        return Err(NftError::OwnerNotFound {
            contract: asset.contract.clone(),
            token_id: asset.token_id.clone(),
        });
    }

    tracing::debug!(
        asset = %asset.contract,
        token = %asset.token_id,
        owners = addresses.len(),
        "resolved asset owners"
    );

    Ok(addresses
        .into_iter()
        .map(|address| AccountId::new(asset.chain_id.clone(), address))
        .collect())
}
