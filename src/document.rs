/// DID document model and assembly
use crate::caip::AccountId;
use serde::{Deserialize, Serialize};

/// Plain JSON representation (the default)
pub const DID_JSON: &str = "application/did+json";
/// Linked-data representation; adds `@context` to the document
pub const DID_LD_JSON: &str = "application/did+ld+json";
/// Context injected for the linked-data representation
pub const DID_CONTEXT: &str = "https://w3id.org/did/v1";
/// Verification method type tag for blockchain accounts
pub const BLOCKCHAIN_VERIFICATION_METHOD: &str = "BlockchainVerificationMethod2021";

/// Document controller: scalar when one, array when several
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Controller {
    One(String),
    Many(Vec<String>),
}

/// One verification method per owning account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    pub controller: String,
    pub blockchain_account_id: String,
}

/// The resolved DID document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<Controller>,
    pub verification_method: Vec<VerificationMethod>,
}

impl DidDocument {
    /// Tag the document with the linked-data context
    pub fn with_context(mut self) -> Self {
        self.context = Some(DID_CONTEXT.to_string());
        self
    }
}

/// Build the document for a DID from its owners and attributed controllers
///
/// One verification method per owner, in owner order, each anchored to the
/// DID itself and carrying the owner's CAIP-10 account id. The controller
/// member is omitted when no attribution exists.
pub fn assemble_document(
    did: &str,
    owners: &[AccountId],
    controllers: Vec<String>,
) -> DidDocument {
    let verification_method = owners
        .iter()
        .map(|owner| VerificationMethod {
            id: format!("{}#{}", did, owner.address),
            method_type: BLOCKCHAIN_VERIFICATION_METHOD.to_string(),
            controller: did.to_string(),
            blockchain_account_id: owner.to_string(),
        })
        .collect();

    let controller = match controllers.len() {
        0 => None,
        1 => Some(Controller::One(
            controllers.into_iter().next().unwrap_or_default(),
        )),
        _ => Some(Controller::Many(controllers)),
    };

    DidDocument {
        context: None,
        id: did.to_string(),
        controller,
        verification_method,
    }
}
