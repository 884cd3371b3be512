//! did:nft method resolver
//!
//! Resolves identifiers naming non-fungible tokens into DID documents
//! describing who controls the token, now or at a requested past moment.
//! Ownership comes from configurable per-chain indexer endpoints; owners
//! are optionally attributed to controller DIDs through an identity-link
//! store.
//!
//! ```no_run
//! use nft_did_resolver::{NftResolver, NoLinkStore, ResolutionOptions, ResolverConfig};
//! use std::sync::Arc;
//!
//! # async fn example(config: ResolverConfig) {
//! let resolver = NftResolver::new(&config, Arc::new(NoLinkStore)).unwrap();
//! let result = resolver
//!     .resolve(
//!         "did:nft:eip155:1_erc721:0x06012c8cf7eaabc4b141f7b5732f25acd5bfcc89_771769",
//!         &ResolutionOptions::default(),
//!     )
//!     .await;
//! println!("{:?}", result.did_document);
//! # }
//! ```

pub mod blocktime;
pub mod caip;
pub mod config;
pub mod did;
pub mod document;
pub mod error;
pub mod indexer;
pub mod linker;
pub mod resolver;

pub use caip::{AccountId, AssetNamespace, AssetReference, ChainId};
pub use config::{ChainConfig, ChainRegistry, ResolverConfig};
pub use did::NftDid;
pub use document::{Controller, DidDocument, VerificationMethod, DID_JSON, DID_LD_JSON};
pub use error::{NftError, NftResult};
pub use indexer::{BlockIndexer, OwnershipIndexer, SubgraphClient};
pub use linker::{IdentityLinkStore, NoLinkStore};
pub use resolver::{
    resolve_method, NftResolver, ParsedDid, ResolutionMetadata, ResolutionOptions,
    ResolutionResult, DID_METHOD_NAME,
};
