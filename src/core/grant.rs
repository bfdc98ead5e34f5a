//! GNAP grant negotiation objects, as used by the Open Payments authorization server.
//!
//! See: [RFC 9635](https://www.rfc-editor.org/rfc/rfc9635.html)

use std::{fmt, time::Duration};

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use super::amount::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessType {
    IncomingPayment,
    OutgoingPayment,
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessAction {
    Create,
    Complete,
    Read,
    ReadAll,
    List,
    ListAll,
}

/// Spending limits on an outgoing payment grant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debit_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive_amount: Option<Amount>,
    /// ISO 8601 repeating interval, e.g. `R/2024-01-01T00:00:00Z/P1M`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

/// One entry of the `access` array of a grant request or access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessItem {
    #[serde(rename = "type")]
    pub access_type: AccessType,
    pub actions: Vec<AccessAction>,
    /// Restricts access to resources of a single wallet address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
}

impl AccessItem {
    pub fn new(access_type: AccessType, actions: impl IntoIterator<Item = AccessAction>) -> Self {
        Self {
            access_type,
            actions: actions.into_iter().collect(),
            identifier: None,
            limits: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenRequest {
    pub access: Vec<AccessItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractStart {
    Redirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractFinishMethod {
    Redirect,
}

/// Where the authorization server sends the end-user once the interaction is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractFinish {
    pub method: InteractFinishMethod,
    pub uri: Url,
    /// Client nonce, later bound into the interaction hash.
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractRequest {
    pub start: Vec<InteractStart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<InteractFinish>,
}

impl InteractRequest {
    pub fn redirect(finish: Option<InteractFinish>) -> Self {
        Self {
            start: vec![InteractStart::Redirect],
            finish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub access_token: AccessTokenRequest,
    /// The wallet address identifying the client.
    pub client: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interact: Option<InteractRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantContinuationRequest {
    pub interact_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueAccessToken {
    pub value: String,
}

/// Handle for continuing, rotating or cancelling a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continue {
    pub access_token: ContinueAccessToken,
    pub uri: Url,
    /// Seconds the client should wait before calling the continuation URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractResponse {
    /// Where the end-user must be sent to give consent.
    pub redirect: Url,
    /// Server nonce, later bound into the interaction hash.
    pub finish: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub value: String,
    /// Management URL for rotating or revoking the token.
    pub manage: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    pub access: Vec<AccessItem>,
}

/// Token endpoint response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: AccessToken,
}

/// A grant issued by the authorization server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub access_token: AccessToken,
    #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
    pub continue_: Option<Continue>,
}

/// A grant that needs end-user interaction before it is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingGrant {
    pub interact: InteractResponse,
    #[serde(rename = "continue")]
    pub continue_: Continue,
}

impl PendingGrant {
    /// How long to wait before continuing, when the server asked for it.
    pub fn poll_after(&self) -> Option<Duration> {
        self.continue_.wait.map(Duration::from_secs)
    }
}

/// The outcome of a grant request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GrantResponse {
    Pending(PendingGrant),
    Granted(Grant),
}

/// Where a grant negotiation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantStatus {
    Pending,
    Granted,
    Revoked,
    Cancelled,
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Granted => f.write_str("granted"),
            Self::Revoked => f.write_str("revoked"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Compute the interaction hash the authorization server appends to the finish redirect.
///
/// `base64(SHA-256(client_nonce "\n" finish "\n" interact_ref "\n" grant_endpoint))`
pub fn interaction_hash(
    client_nonce: &str,
    finish: &str,
    interact_ref: &str,
    grant_endpoint: &Url,
) -> String {
    let input = format!("{client_nonce}\n{finish}\n{interact_ref}\n{grant_endpoint}");
    BASE64_STANDARD.encode(Sha256::digest(input.as_bytes()))
}

/// Check the `hash` query parameter of a finish redirect before continuing the grant.
pub fn verify_interaction_hash(
    client_nonce: &str,
    finish: &str,
    interact_ref: &str,
    grant_endpoint: &Url,
    hash: &str,
) -> bool {
    interaction_hash(client_nonce, finish, interact_ref, grant_endpoint) == hash
}
