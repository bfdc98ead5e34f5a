use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use url::Url;

use super::amount::Amount;

/// Free-form metadata attached to incoming and outgoing payments.
pub type Metadata = Map<String, Json>;

/// The account root from which every other resource is discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddress {
    pub id: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_name: Option<String>,
    pub asset_code: String,
    pub asset_scale: u8,
    pub auth_server: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_server: Option<Url>,
}

/// An Ed25519 public key as published in a wallet address key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub alg: String,
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    pub kty: String,
    pub crv: String,
    pub x: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingPayment {
    pub id: Url,
    pub wallet_address: Url,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_amount: Option<Amount>,
    pub received_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Interledger STREAM credentials for paying into an incoming payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaymentMethod {
    #[serde(rename_all = "camelCase")]
    Ilp {
        ilp_address: String,
        shared_secret: String,
    },
}

/// An [IncomingPayment] together with the methods that can be used to pay into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingPaymentWithMethods {
    #[serde(flatten)]
    pub payment: IncomingPayment,
    pub methods: Vec<PaymentMethod>,
}

impl Deref for IncomingPaymentWithMethods {
    type Target = IncomingPayment;

    fn deref(&self) -> &IncomingPayment {
        &self.payment
    }
}

/// The view of an incoming payment available without an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIncomingPayment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_amount: Option<Amount>,
    pub auth_server: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncomingPaymentArgs {
    pub wallet_address: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingPayment {
    pub id: Url,
    pub wallet_address: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    #[serde(default)]
    pub failed: bool,
    pub receiver: Url,
    pub debit_amount: Amount,
    pub receive_amount: Amount,
    pub sent_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutgoingPaymentArgs {
    pub wallet_address: Url,
    pub quote_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteMethod {
    #[default]
    Ilp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Url,
    pub wallet_address: Url,
    pub receiver: Url,
    pub debit_amount: Amount,
    pub receive_amount: Amount,
    pub method: QuoteMethod,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Which side of a quote the requested amount is fixed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteAmount {
    /// Fixed send: the sender is debited exactly this amount.
    DebitAmount(Amount),
    /// Fixed receive: the receiver is credited exactly this amount.
    ReceiveAmount(Amount),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteArgs {
    pub wallet_address: Url,
    pub receiver: Url,
    pub method: QuoteMethod,
    /// When absent the amount is inferred from the receiver's incoming amount.
    #[serde(default, flatten, skip_serializing_if = "Option::is_none")]
    pub amount: Option<QuoteAmount>,
}
