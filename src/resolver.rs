/// Resolution dispatch
///
/// The entry point an identifier-resolution dispatcher calls into. Runs the
/// pipeline fail-fast (decode, route, pin, query, link, assemble,
/// negotiate) and converts every internal failure into the uniform result
/// envelope; nothing throws past this boundary.
use crate::blocktime::pin_height;
use crate::caip::ChainId;
use crate::config::{ChainRegistry, ResolverConfig};
use crate::did::NftDid;
use crate::document::{assemble_document, DidDocument, DID_JSON, DID_LD_JSON};
use crate::error::{NftError, NftResult};
use crate::indexer::{lookup_owners, BlockIndexer, OwnershipIndexer, SubgraphClient};
use crate::linker::{link_controllers, IdentityLinkStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// The DID method this resolver handles
pub const DID_METHOD_NAME: &str = "nft";

/// Error code for any failed resolution
pub const ERROR_INVALID_DID: &str = "invalidDid";
/// Error code for an unsupported accept type
pub const ERROR_REPRESENTATION_NOT_SUPPORTED: &str = "representationNotSupported";

/// Per-call resolution options
#[derive(Debug, Clone, Default)]
pub struct ResolutionOptions {
    /// Requested content type; defaults to `application/did+json`
    pub accept: Option<String>,
}

/// Metadata about the resolution itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The uniform result envelope returned to the dispatcher
///
/// Exactly one of the success shape (document + content type) or the error
/// shape (error + message) is populated, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub did_document: Option<DidDocument>,
    pub did_document_metadata: Value,
    pub did_resolution_metadata: ResolutionMetadata,
}

impl ResolutionResult {
    fn success(document: DidDocument, content_type: &str) -> Self {
        Self {
            did_document: Some(document),
            did_document_metadata: json!({}),
            did_resolution_metadata: ResolutionMetadata {
                content_type: Some(content_type.to_string()),
                error: None,
                message: None,
            },
        }
    }

    fn error(error: &NftError) -> Self {
        let code = match error {
            NftError::RepresentationNotSupported(_) => ERROR_REPRESENTATION_NOT_SUPPORTED,
            _ => ERROR_INVALID_DID,
        };
        Self {
            did_document: None,
            did_document_metadata: json!({}),
            did_resolution_metadata: ResolutionMetadata {
                content_type: None,
                error: Some(code.to_string()),
                message: Some(error.to_string()),
            },
        }
    }
}

/// Parsed-identifier struct handed over by an external dispatcher
#[derive(Debug, Clone)]
pub struct ParsedDid {
    pub did: String,
    pub method: String,
    pub id: String,
    pub query: Option<String>,
}

/// did:nft method resolver
///
/// Holds the immutable chain registry and the collaborator handles; every
/// resolution is an independent stateless pipeline over them.
#[derive(Clone)]
pub struct NftResolver {
    registry: ChainRegistry,
    blocks: Arc<dyn BlockIndexer>,
    ownership: Arc<dyn OwnershipIndexer>,
    links: Arc<dyn IdentityLinkStore>,
}

impl std::fmt::Debug for NftResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NftResolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl NftResolver {
    /// Create a resolver backed by subgraph indexers
    ///
    /// Configuration is validated here, once; a misconfigured resolver
    /// fails to construct rather than failing requests later.
    pub fn new(config: &ResolverConfig, links: Arc<dyn IdentityLinkStore>) -> NftResult<Self> {
        let client = Arc::new(SubgraphClient::new()?);
        Self::with_indexers(config, client.clone(), client, links)
    }

    /// Create a resolver with explicit indexer implementations
    pub fn with_indexers(
        config: &ResolverConfig,
        blocks: Arc<dyn BlockIndexer>,
        ownership: Arc<dyn OwnershipIndexer>,
        links: Arc<dyn IdentityLinkStore>,
    ) -> NftResult<Self> {
        Ok(Self {
            registry: ChainRegistry::from_config(config)?,
            blocks,
            ownership,
            links,
        })
    }

    /// Resolve a did:nft identifier into a result envelope
    ///
    /// Never fails: every pipeline error is converted into the error shape
    /// at this boundary.
    pub async fn resolve(&self, did: &str, options: &ResolutionOptions) -> ResolutionResult {
        tracing::debug!(%did, "resolving did:nft identifier");
        match self.resolve_inner(did, options).await {
            Ok(result) => result,
            Err(error) => {
                tracing::debug!(%did, %error, "resolution failed");
                ResolutionResult::error(&error)
            }
        }
    }

    /// Chains configured for this resolver
    pub fn configured_chains(&self) -> impl Iterator<Item = &ChainId> {
        self.registry.chain_ids()
    }

    async fn resolve_inner(
        &self,
        did: &str,
        options: &ResolutionOptions,
    ) -> NftResult<ResolutionResult> {
        let parsed: NftDid = did.parse()?;
        let endpoints = self.registry.endpoints(&parsed.asset.chain_id)?;

        let height = pin_height(
            self.blocks.as_ref(),
            endpoints,
            parsed.version_time,
            Utc::now(),
        )
        .await?;

        let owners =
            lookup_owners(self.ownership.as_ref(), &parsed.asset, endpoints, height).await?;
        let controllers = link_controllers(self.links.as_ref(), &owners).await?;

        let document = assemble_document(&parsed.canonical(), &owners, controllers);
        negotiate(document, options.accept.as_deref())
    }
}

/// Apply content negotiation to an assembled document
///
/// The plain JSON type is the default; the linked-data type additionally
/// injects the context declaration. Anything else refuses the
/// representation, discarding an otherwise successful resolution.
fn negotiate(document: DidDocument, accept: Option<&str>) -> NftResult<ResolutionResult> {
    match accept.unwrap_or(DID_JSON) {
        DID_JSON => Ok(ResolutionResult::success(document, DID_JSON)),
        DID_LD_JSON => Ok(ResolutionResult::success(
            document.with_context(),
            DID_LD_JSON,
        )),
        other => Err(NftError::RepresentationNotSupported(other.to_string())),
    }
}

/// Method-handler entry point for an external dispatcher
///
/// Mirrors the generic handler signature: raw identifier, pre-parsed
/// identifier, resolver handle, options. A dispatch routed here for some
/// other method is refused up front; nothing else throws past this
/// boundary.
pub async fn resolve_method(
    did: &str,
    parsed: &ParsedDid,
    resolver: &NftResolver,
    options: &ResolutionOptions,
) -> ResolutionResult {
    if parsed.method != DID_METHOD_NAME {
        return ResolutionResult::error(&NftError::MalformedIdentifier(format!(
            "unsupported DID method: {}",
            parsed.method
        )));
    }
    resolver.resolve(did, options).await
}
