/// Block-time resolution
///
/// Decides whether a requested `versionTime` needs a block-height pin, and
/// fetches one when it does. "asof" semantics: the pinned block is the most
/// recent one at or before the requested time, never after it.
use crate::config::ChainEndpoints;
use crate::error::{NftError, NftResult};
use crate::indexer::BlockIndexer;
use chrono::{DateTime, Utc};

/// Resolve the block height a request should be pinned to
///
/// `None` means "query latest state". A requested time within the chain's
/// skew window of `now` (inclusive at the boundary) is treated as current,
/// skipping the block lookup; a fresh write would not be indexed under a
/// height yet anyway.
pub async fn pin_height(
    blocks: &dyn BlockIndexer,
    endpoints: &ChainEndpoints,
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> NftResult<Option<u64>> {
    let Some(requested) = requested else {
        return Ok(None);
    };

    if now - requested <= endpoints.clock_skew {
        tracing::debug!(%requested, "versionTime within skew window, resolving current state");
        return Ok(None);
    }

    let height = blocks
        .block_at_or_before(&endpoints.blocks, requested)
        .await?
        .ok_or(NftError::NoBlockBeforeTimestamp(requested))?;

    tracing::debug!(%requested, height, "pinned historical block height");
    Ok(Some(height))
}
