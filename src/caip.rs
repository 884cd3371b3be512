/// Chain-agnostic identifiers (CAIP-2 chains, CAIP-10 accounts, asset references)
///
/// These are the canonical addressing types the rest of the pipeline works
/// with; the did:nft codec translates to and from them.
use crate::error::{NftError, NftResult};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CAIP-2 chain identifier, e.g. `eip155:1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId {
    pub namespace: String,
    pub reference: String,
}

impl ChainId {
    pub fn new(namespace: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            reference: reference.into(),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl FromStr for ChainId {
    type Err = NftError;

    fn from_str(s: &str) -> NftResult<Self> {
        let (namespace, reference) = s
            .split_once(':')
            .ok_or_else(|| NftError::MalformedIdentifier(format!("invalid chain id: {s}")))?;

        // CAIP-2 grammar: namespace [-a-z0-9]{3,8}, reference [-_a-zA-Z0-9]{1,32}
        let namespace_ok = (3..=8).contains(&namespace.len())
            && namespace
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        let reference_ok = (1..=32).contains(&reference.len())
            && reference
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !namespace_ok || !reference_ok {
            return Err(NftError::MalformedIdentifier(format!(
                "invalid chain id: {s}"
            )));
        }

        Ok(ChainId::new(namespace, reference))
    }
}

impl TryFrom<String> for ChainId {
    type Error = NftError;

    fn try_from(s: String) -> NftResult<Self> {
        s.parse()
    }
}

impl From<ChainId> for String {
    fn from(chain_id: ChainId) -> Self {
        chain_id.to_string()
    }
}

/// A CAIP-10 account identifier, e.g. `eip155:1:0xab16a9...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountId {
    pub chain_id: ChainId,
    pub address: String,
}

impl AccountId {
    pub fn new(chain_id: ChainId, address: impl Into<String>) -> Self {
        Self {
            chain_id,
            address: address.into(),
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.address)
    }
}

/// The token standards the resolver understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetNamespace {
    Erc721,
    Erc1155,
}

impl AssetNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetNamespace::Erc721 => "erc721",
            AssetNamespace::Erc1155 => "erc1155",
        }
    }
}

impl fmt::Display for AssetNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetNamespace {
    type Err = NftError;

    fn from_str(s: &str) -> NftResult<Self> {
        match s {
            "erc721" => Ok(AssetNamespace::Erc721),
            "erc1155" => Ok(AssetNamespace::Erc1155),
            other => Err(NftError::MalformedIdentifier(format!(
                "unsupported asset namespace: {other}"
            ))),
        }
    }
}

/// A chain-agnostic reference to one token on one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub chain_id: ChainId,
    pub namespace: AssetNamespace,
    pub contract: String,
    /// Canonical `0x`-prefixed lowercase hex, no leading zeros
    pub token_id: String,
}

impl AssetReference {
    pub fn new(
        chain_id: ChainId,
        namespace: AssetNamespace,
        contract: impl Into<String>,
        token_id: &str,
    ) -> NftResult<Self> {
        let contract = contract.into().to_lowercase();
        if contract.is_empty() {
            return Err(NftError::MalformedIdentifier(
                "empty contract address".to_string(),
            ));
        }
        Ok(Self {
            chain_id,
            namespace,
            contract,
            token_id: canonical_token_id(token_id)?,
        })
    }

    /// Token id as a decimal string (the form subgraph indexers key on)
    pub fn token_id_decimal(&self) -> String {
        // token_id is validated hex by construction
        let digits = self.token_id.trim_start_matches("0x");
        BigUint::parse_bytes(digits.as_bytes(), 16)
            .map(|n| n.to_str_radix(10))
            .unwrap_or_else(|| "0".to_string())
    }
}

/// Canonicalize a token id to `0x`-prefixed lowercase hex
///
/// Accepts decimal or `0x` hex input; both spellings of the same token
/// collapse to one canonical form. Token ids are uint256, so parsing goes
/// through `BigUint` rather than a native integer type.
pub fn canonical_token_id(raw: &str) -> NftResult<String> {
    let malformed = || NftError::MalformedIdentifier(format!("invalid token id: {raw}"));

    let value = if let Some(hex_digits) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))
    {
        if hex_digits.is_empty() {
            return Err(malformed());
        }
        BigUint::parse_bytes(hex_digits.as_bytes(), 16).ok_or_else(malformed)?
    } else {
        if raw.is_empty() {
            return Err(malformed());
        }
        BigUint::parse_bytes(raw.as_bytes(), 10).ok_or_else(malformed)?
    };

    Ok(format!("0x{}", value.to_str_radix(16)))
}
