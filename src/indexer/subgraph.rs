/// Subgraph-backed indexer client
///
/// Implements the block and ownership indexer contracts against Graph
/// Protocol style endpoints. Query documents are built here so resolution
/// logic stays indexer-agnostic; swapping in a custom indexer only needs a
/// different endpoint (or a different trait implementation).
use crate::error::{NftError, NftResult};
use crate::indexer::{BlockIndexer, OwnershipIndexer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde_json::{json, Value};
use url::Url;

/// GraphQL client over the configured subgraph endpoints
#[derive(Clone)]
pub struct SubgraphClient {
    http_client: reqwest::Client,
}

impl SubgraphClient {
    pub fn new() -> NftResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("nft-did-resolver/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| NftError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http_client })
    }

    /// POST a GraphQL document and return the `data` member
    async fn query(&self, endpoint: &Url, document: String) -> NftResult<Value> {
        let response = self
            .http_client
            .post(endpoint.clone())
            .json(&json!({ "query": document }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NftError::Transport(format!(
                "subgraph {} returned status {}",
                endpoint,
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        if let Some(errors) = body.get("errors") {
            return Err(NftError::Transport(format!(
                "subgraph {endpoint} returned errors: {errors}"
            )));
        }

        body.get("data")
            .cloned()
            .ok_or_else(|| NftError::Transport(format!("subgraph {endpoint} returned no data")))
    }
}

/// Subgraphs key tokens by decimal id; the canonical form is hex
fn decimal_token_id(token_id: &str) -> String {
    let digits = token_id.trim_start_matches("0x");
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .map(|n| n.to_str_radix(10))
        .unwrap_or_else(|| "0".to_string())
}

fn block_filter(block: Option<u64>) -> String {
    match block {
        Some(number) => format!(", block: {{ number: {number} }}"),
        None => String::new(),
    }
}

fn blocks_document(at: DateTime<Utc>) -> String {
    format!(
        r#"query {{
  blocks(first: 1, orderBy: timestamp, orderDirection: desc, where: {{ timestamp_lte: "{}" }}) {{
    number
  }}
}}"#,
        at.timestamp()
    )
}

fn erc721_document(contract: &str, token_id: &str, block: Option<u64>) -> String {
    format!(
        r#"query {{
  tokens(where: {{ contract: "{contract}", tokenID: "{token}" }}{filter}) {{
    owner {{
      id
    }}
  }}
}}"#,
        contract = contract,
        token = decimal_token_id(token_id),
        filter = block_filter(block),
    )
}

fn erc1155_document(contract: &str, token_id: &str, block: Option<u64>) -> String {
    format!(
        r#"query {{
  tokens(where: {{ registry: "{contract}", identifier: "{token}" }}{filter}) {{
    balances(where: {{ value_gt: 0 }}) {{
      account {{
        id
      }}
    }}
  }}
}}"#,
        contract = contract,
        token = decimal_token_id(token_id),
        filter = block_filter(block),
    )
}

#[async_trait]
impl BlockIndexer for SubgraphClient {
    async fn block_at_or_before(
        &self,
        endpoint: &Url,
        at: DateTime<Utc>,
    ) -> NftResult<Option<u64>> {
        let data = self.query(endpoint, blocks_document(at)).await?;
        let blocks = data
            .get("blocks")
            .and_then(Value::as_array)
            .ok_or_else(|| NftError::Transport("malformed blocks payload".to_string()))?;

        let Some(first) = blocks.first() else {
            return Ok(None);
        };
        let number = first
            .get("number")
            .and_then(Value::as_str)
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(|| NftError::Transport("malformed block number".to_string()))?;

        Ok(Some(number))
    }
}

#[async_trait]
impl OwnershipIndexer for SubgraphClient {
    async fn erc721_owner(
        &self,
        endpoint: &Url,
        contract: &str,
        token_id: &str,
        block: Option<u64>,
    ) -> NftResult<Option<String>> {
        let data = self
            .query(endpoint, erc721_document(contract, token_id, block))
            .await?;
        let tokens = data
            .get("tokens")
            .and_then(Value::as_array)
            .ok_or_else(|| NftError::Transport("malformed erc721 payload".to_string()))?;

        let Some(first) = tokens.first() else {
            return Ok(None);
        };
        let owner = first
            .get("owner")
            .and_then(|owner| owner.get("id"))
            .and_then(Value::as_str)
            .ok_or_else(|| NftError::Transport("malformed erc721 owner".to_string()))?;

        Ok(Some(owner.to_string()))
    }

    async fn erc1155_holders(
        &self,
        endpoint: &Url,
        contract: &str,
        token_id: &str,
        block: Option<u64>,
    ) -> NftResult<Vec<String>> {
        let data = self
            .query(endpoint, erc1155_document(contract, token_id, block))
            .await?;
        let tokens = data
            .get("tokens")
            .and_then(Value::as_array)
            .ok_or_else(|| NftError::Transport("malformed erc1155 payload".to_string()))?;

        let mut holders = Vec::new();
        for token in tokens {
            let balances = token
                .get("balances")
                .and_then(Value::as_array)
                .ok_or_else(|| NftError::Transport("malformed erc1155 balances".to_string()))?;
            for balance in balances {
                let account = balance
                    .get("account")
                    .and_then(|account| account.get("id"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        NftError::Transport("malformed erc1155 account".to_string())
                    })?;
                holders.push(account.to_string());
            }
        }

        Ok(holders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_token_id() {
        assert_eq!(decimal_token_id("0xbc6b9"), "771769");
        assert_eq!(decimal_token_id("0x1"), "1");
    }

    #[test]
    fn test_block_filter() {
        assert_eq!(block_filter(None), "");
        assert_eq!(block_filter(Some(42)), ", block: { number: 42 }");
    }

    #[test]
    fn test_blocks_document_filters_at_or_before() {
        let at = chrono::DateTime::parse_from_rfc3339("2021-02-03T04:05:06Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let document = blocks_document(at);
        assert!(document.contains(r#"timestamp_lte: "1612325106""#));
        assert!(document.contains("first: 1"));
        assert!(document.contains("orderDirection: desc"));
    }

    #[test]
    fn test_erc721_document_keys_on_decimal_token_id() {
        let document = erc721_document("0xcontract", "0xbc6b9", None);
        assert!(document.contains(r#"contract: "0xcontract""#));
        assert!(document.contains(r#"tokenID: "771769""#));
        assert!(!document.contains("block:"));

        let pinned = erc721_document("0xcontract", "0xbc6b9", Some(11_565_019));
        assert!(pinned.contains("block: { number: 11565019 }"));
    }

    #[test]
    fn test_erc1155_document_skips_zero_balances() {
        let document = erc1155_document("0xcontract", "0x5", None);
        assert!(document.contains(r#"registry: "0xcontract""#));
        assert!(document.contains(r#"identifier: "5""#));
        assert!(document.contains("value_gt: 0"));
        assert!(!document.contains("block:"));

        let pinned = erc1155_document("0xcontract", "0x5", Some(42));
        assert!(pinned.contains("block: { number: 42 }"));
    }
}
