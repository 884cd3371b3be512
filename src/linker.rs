/// Controller attribution
///
/// Each owning account may have an externally asserted controller DID in an
/// identity-link store. Lookups are independent reads, so they fan out
/// concurrently; results are gathered back in owner order.
use crate::caip::AccountId;
use crate::error::NftResult;
use async_trait::async_trait;
use futures::future;

/// Identity-link store contract: account → asserted controller DID
#[async_trait]
pub trait IdentityLinkStore: Send + Sync {
    async fn controller_for(&self, account: &AccountId) -> NftResult<Option<String>>;
}

/// A link store with no entries, for deployments without an identity-link
/// source; every asset then resolves without a controller.
pub struct NoLinkStore;

#[async_trait]
impl IdentityLinkStore for NoLinkStore {
    async fn controller_for(&self, _account: &AccountId) -> NftResult<Option<String>> {
        Ok(None)
    }
}

/// Resolve controller DIDs for a list of owners
///
/// Output order follows owner order regardless of completion order.
/// Accounts without a link are skipped. Duplicate controllers across
/// multiple owners are kept, one entry per linked owner.
pub async fn link_controllers(
    store: &dyn IdentityLinkStore,
    owners: &[AccountId],
) -> NftResult<Vec<String>> {
    let lookups = owners.iter().map(|owner| store.controller_for(owner));
    let resolved = future::try_join_all(lookups).await?;
    Ok(resolved.into_iter().flatten().collect())
}
