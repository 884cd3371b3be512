/// End-to-end resolution pipeline tests
///
/// Drives the full dispatch against in-memory indexer and link-store
/// fakes that record every collaborator call, so call ordering and
/// argument flow can be asserted alongside the result envelopes.
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use nft_did_resolver::{
    AccountId, AssetNamespace, BlockIndexer, ChainConfig, IdentityLinkStore, NftResolver,
    OwnershipIndexer, ResolutionOptions, ResolverConfig, DID_JSON, DID_LD_JSON,
};
use nft_did_resolver::error::NftResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

const CONTRACT: &str = "0x06012c8cf7eaabc4b141f7b5732f25acd5bfcc89";

/// One entry per collaborator call, in call order
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Blocks { at: DateTime<Utc> },
    Erc721 { block: Option<u64> },
    Erc1155 { block: Option<u64> },
    Link { address: String },
}

/// Scripted collaborator standing in for the subgraph and link store
#[derive(Default)]
struct FakeIndexers {
    block_height: Option<u64>,
    erc721_owner: Option<String>,
    erc1155_holders: Vec<String>,
    links: HashMap<String, String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeIndexers {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BlockIndexer for FakeIndexers {
    async fn block_at_or_before(
        &self,
        _endpoint: &Url,
        at: DateTime<Utc>,
    ) -> NftResult<Option<u64>> {
        self.record(Call::Blocks { at });
        Ok(self.block_height)
    }
}

#[async_trait]
impl OwnershipIndexer for FakeIndexers {
    async fn erc721_owner(
        &self,
        _endpoint: &Url,
        _contract: &str,
        _token_id: &str,
        block: Option<u64>,
    ) -> NftResult<Option<String>> {
        self.record(Call::Erc721 { block });
        Ok(self.erc721_owner.clone())
    }

    async fn erc1155_holders(
        &self,
        _endpoint: &Url,
        _contract: &str,
        _token_id: &str,
        block: Option<u64>,
    ) -> NftResult<Vec<String>> {
        self.record(Call::Erc1155 { block });
        Ok(self.erc1155_holders.clone())
    }
}

#[async_trait]
impl IdentityLinkStore for FakeIndexers {
    async fn controller_for(&self, account: &AccountId) -> NftResult<Option<String>> {
        self.record(Call::Link {
            address: account.address.clone(),
        });
        Ok(self.links.get(&account.address).cloned())
    }
}

fn config() -> ResolverConfig {
    let mut asset_endpoints = HashMap::new();
    asset_endpoints.insert(
        AssetNamespace::Erc721,
        "https://indexer.example/erc721".to_string(),
    );
    asset_endpoints.insert(
        AssetNamespace::Erc1155,
        "https://indexer.example/erc1155".to_string(),
    );
    let mut chains = HashMap::new();
    chains.insert(
        "eip155:1".to_string(),
        ChainConfig {
            blocks_endpoint: "https://indexer.example/blocks".to_string(),
            clock_skew_millis: 15_000,
            asset_endpoints,
        },
    );
    ResolverConfig { chains }
}

fn resolver(fakes: Arc<FakeIndexers>) -> NftResolver {
    NftResolver::with_indexers(&config(), fakes.clone(), fakes.clone(), fakes).unwrap()
}

fn erc721_did() -> String {
    format!("did:nft:eip155:1_erc721:{CONTRACT}_771769")
}

#[tokio::test]
async fn single_owner_resolution() {
    let fakes = Arc::new(FakeIndexers {
        erc721_owner: Some("0xb9c5714089478a327f09197987f16f9e5d936e8a".to_string()),
        ..Default::default()
    });
    let result = resolver(fakes.clone())
        .resolve(&erc721_did(), &ResolutionOptions::default())
        .await;

    let document = result.did_document.expect("expected a document");
    assert_eq!(
        document.id,
        format!("did:nft:eip155:1_erc721:{CONTRACT}_0xbc6b9")
    );
    assert_eq!(document.verification_method.len(), 1);
    assert_eq!(
        document.verification_method[0].blockchain_account_id,
        "eip155:1:0xb9c5714089478a327f09197987f16f9e5d936e8a"
    );
    assert!(document.controller.is_none());
    assert_eq!(
        result.did_resolution_metadata.content_type.as_deref(),
        Some(DID_JSON)
    );
    assert!(result.did_resolution_metadata.error.is_none());
}

#[tokio::test]
async fn multi_holder_resolution_preserves_order() {
    let fakes = Arc::new(FakeIndexers {
        erc1155_holders: vec![
            "0xccc".to_string(),
            "0xaaa".to_string(),
            "0xbbb".to_string(),
        ],
        ..Default::default()
    });
    let did = format!("did:nft:eip155:1_erc1155:{CONTRACT}_1");
    let result = resolver(fakes)
        .resolve(&did, &ResolutionOptions::default())
        .await;

    let document = result.did_document.expect("expected a document");
    let accounts: Vec<&str> = document
        .verification_method
        .iter()
        .map(|vm| vm.blockchain_account_id.as_str())
        .collect();
    assert_eq!(
        accounts,
        vec!["eip155:1:0xccc", "eip155:1:0xaaa", "eip155:1:0xbbb"]
    );
}

#[tokio::test]
async fn owner_not_found_names_contract_and_token() {
    let fakes = Arc::new(FakeIndexers::default());
    let result = resolver(fakes)
        .resolve(&erc721_did(), &ResolutionOptions::default())
        .await;

    assert!(result.did_document.is_none());
    assert_eq!(
        result.did_resolution_metadata.error.as_deref(),
        Some("invalidDid")
    );
    let message = result.did_resolution_metadata.message.unwrap();
    assert!(message.contains(CONTRACT));
    assert!(message.contains("0xbc6b9"));
}

#[tokio::test]
async fn historical_resolution_calls_blocks_then_owners() {
    let fakes = Arc::new(FakeIndexers {
        block_height: Some(11_565_019),
        erc721_owner: Some("0xowner".to_string()),
        ..Default::default()
    });
    let requested = "2021-02-03T04:05:06Z";
    let did = format!("{}?versionTime={requested}", erc721_did());
    let result = resolver(fakes.clone())
        .resolve(&did, &ResolutionOptions::default())
        .await;

    assert!(result.did_document.is_some());
    let calls = fakes.calls();
    assert_eq!(
        calls,
        vec![
            Call::Blocks {
                at: requested.parse().unwrap()
            },
            Call::Erc721 {
                block: Some(11_565_019)
            },
            Call::Link {
                address: "0xowner".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn version_time_within_skew_skips_block_lookup() {
    let fakes = Arc::new(FakeIndexers {
        block_height: Some(11_565_019),
        erc721_owner: Some("0xowner".to_string()),
        ..Default::default()
    });
    let just_now = (Utc::now() - TimeDelta::seconds(2)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let did = format!("{}?versionTime={just_now}", erc721_did());
    let result = resolver(fakes.clone())
        .resolve(&did, &ResolutionOptions::default())
        .await;

    assert!(result.did_document.is_some());
    let calls = fakes.calls();
    assert_eq!(calls[0], Call::Erc721 { block: None });
    assert!(!calls.iter().any(|c| matches!(c, Call::Blocks { .. })));
}

#[tokio::test]
async fn version_time_before_chain_history_is_an_error() {
    let fakes = Arc::new(FakeIndexers {
        block_height: None,
        erc721_owner: Some("0xowner".to_string()),
        ..Default::default()
    });
    let did = format!("{}?versionTime=1999-01-01T00:00:00Z", erc721_did());
    let result = resolver(fakes.clone())
        .resolve(&did, &ResolutionOptions::default())
        .await;

    assert!(result.did_document.is_none());
    assert_eq!(
        result.did_resolution_metadata.error.as_deref(),
        Some("invalidDid")
    );
    // Fail-fast: ownership is never queried after the block lookup fails
    assert_eq!(fakes.calls().len(), 1);
}

#[tokio::test]
async fn controllers_attributed_through_link_store() {
    let fakes = Arc::new(FakeIndexers {
        erc1155_holders: vec!["0xaaa".to_string(), "0xbbb".to_string()],
        links: HashMap::from([("0xbbb".to_string(), "did:3:controller".to_string())]),
        ..Default::default()
    });
    let did = format!("did:nft:eip155:1_erc1155:{CONTRACT}_0x1");
    let result = resolver(fakes)
        .resolve(&did, &ResolutionOptions::default())
        .await;

    let document = result.did_document.expect("expected a document");
    let json = serde_json::to_value(&document).unwrap();
    assert_eq!(json["controller"], "did:3:controller");
}

#[tokio::test]
async fn unsupported_asset_namespace_rejected() {
    let fakes = Arc::new(FakeIndexers {
        erc721_owner: Some("0xowner".to_string()),
        ..Default::default()
    });
    let did = format!("did:nft:eip155:1_erc20:{CONTRACT}_1");
    let result = resolver(fakes.clone())
        .resolve(&did, &ResolutionOptions::default())
        .await;

    assert!(result.did_document.is_none());
    assert!(result
        .did_resolution_metadata
        .message
        .unwrap()
        .contains("erc20"));
    // Decode fails before any collaborator is reached
    assert!(fakes.calls().is_empty());
}

#[tokio::test]
async fn unconfigured_chain_rejected() {
    let fakes = Arc::new(FakeIndexers {
        erc721_owner: Some("0xowner".to_string()),
        ..Default::default()
    });
    let did = format!("did:nft:eip155:137_erc721:{CONTRACT}_1");
    let result = resolver(fakes)
        .resolve(&did, &ResolutionOptions::default())
        .await;

    assert!(result.did_document.is_none());
    assert!(result
        .did_resolution_metadata
        .message
        .unwrap()
        .contains("eip155:137"));
}

#[tokio::test]
async fn linked_data_representation_injects_context() {
    let fakes = Arc::new(FakeIndexers {
        erc721_owner: Some("0xowner".to_string()),
        ..Default::default()
    });
    let options = ResolutionOptions {
        accept: Some(DID_LD_JSON.to_string()),
    };
    let result = resolver(fakes).resolve(&erc721_did(), &options).await;

    assert_eq!(
        result.did_resolution_metadata.content_type.as_deref(),
        Some(DID_LD_JSON)
    );
    let json = serde_json::to_value(result.did_document.unwrap()).unwrap();
    assert_eq!(json["@context"], "https://w3id.org/did/v1");
}

#[tokio::test]
async fn unsupported_representation_overrides_success() {
    let fakes = Arc::new(FakeIndexers {
        erc721_owner: Some("0xowner".to_string()),
        ..Default::default()
    });
    let options = ResolutionOptions {
        accept: Some("text/html".to_string()),
    };
    let result = resolver(fakes.clone()).resolve(&erc721_did(), &options).await;

    // The pipeline ran and succeeded, but the representation is refused
    assert!(!fakes.calls().is_empty());
    assert!(result.did_document.is_none());
    assert_eq!(
        result.did_resolution_metadata.error.as_deref(),
        Some("representationNotSupported")
    );
}

#[tokio::test]
async fn historical_pin_passes_height_to_erc1155_lookup() {
    let fakes = Arc::new(FakeIndexers {
        block_height: Some(42),
        erc1155_holders: vec!["0xholder".to_string()],
        ..Default::default()
    });
    let did = format!(
        "did:nft:eip155:1_erc1155:{CONTRACT}_5?versionTime=2020-06-01T00:00:00Z"
    );
    let result = resolver(fakes.clone())
        .resolve(&did, &ResolutionOptions::default())
        .await;

    assert!(result.did_document.is_some());
    assert!(fakes
        .calls()
        .contains(&Call::Erc1155 { block: Some(42) }));
}
