/// did:nft identifier codec
///
/// Grammar:
/// `did:nft:<namespace>:<reference>_<assetNamespace>:<contract>_<tokenId>[?versionTime=<ISO8601>]`
///
/// The token id is accepted in decimal or `0x` hex and always emitted as
/// canonical `0x` hex, so encoding is stable after the first decode.
use crate::caip::{AssetNamespace, AssetReference, ChainId};
use crate::error::{NftError, NftResult};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// The did:nft method prefix
pub const DID_NFT_PREFIX: &str = "did:nft:";

/// Query parameter selecting a historical snapshot
const VERSION_TIME_PARAM: &str = "versionTime";

/// A decoded did:nft identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftDid {
    pub asset: AssetReference,
    /// Requested historical snapshot, if any
    pub version_time: Option<DateTime<Utc>>,
}

impl NftDid {
    pub fn new(asset: AssetReference) -> Self {
        Self {
            asset,
            version_time: None,
        }
    }

    /// The canonical DID string without any query suffix
    ///
    /// This is the form used as the document id; `versionTime` selects a
    /// snapshot of the same subject rather than naming a different one.
    pub fn canonical(&self) -> String {
        format!(
            "{}{}_{}:{}_{}",
            DID_NFT_PREFIX,
            self.asset.chain_id,
            self.asset.namespace,
            self.asset.contract,
            self.asset.token_id,
        )
    }
}

impl fmt::Display for NftDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())?;
        if let Some(version_time) = self.version_time {
            // Whole-second UTC; sub-second precision is truncated
            let truncated = version_time.to_rfc3339_opts(SecondsFormat::Secs, true);
            write!(f, "?{VERSION_TIME_PARAM}={truncated}")?;
        }
        Ok(())
    }
}

impl FromStr for NftDid {
    type Err = NftError;

    fn from_str(did: &str) -> NftResult<Self> {
        let method_specific = did.strip_prefix(DID_NFT_PREFIX).ok_or_else(|| {
            NftError::MalformedIdentifier(format!("not a did:nft identifier: {did}"))
        })?;

        let (body, query) = match method_specific.split_once('?') {
            Some((body, query)) => (body, Some(query)),
            None => (method_specific, None),
        };

        // Two top-level separators split the id into chain, asset, token
        let segments: Vec<&str> = body.split('_').collect();
        if segments.len() != 3 {
            return Err(NftError::MalformedIdentifier(format!(
                "expected <chainId>_<assetNamespace>:<contract>_<tokenId>, got: {body}"
            )));
        }
        let (chain, asset, token_id) = (segments[0], segments[1], segments[2]);

        let chain_id: ChainId = chain.parse()?;

        let (namespace, contract) = asset.split_once(':').ok_or_else(|| {
            NftError::MalformedIdentifier(format!(
                "expected <assetNamespace>:<contract>, got: {asset}"
            ))
        })?;
        let namespace: AssetNamespace = namespace.parse()?;
        let asset = AssetReference::new(chain_id, namespace, contract, token_id)?;
        let version_time = query.map(parse_version_time).transpose()?.flatten();

        Ok(NftDid {
            asset,
            version_time,
        })
    }
}

/// Extract `versionTime` from a DID query string, ignoring other parameters
fn parse_version_time(query: &str) -> NftResult<Option<DateTime<Utc>>> {
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key != VERSION_TIME_PARAM {
            continue;
        }
        let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| {
            NftError::MalformedIdentifier(format!("invalid versionTime {value}: {e}"))
        })?;
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(None)
}
