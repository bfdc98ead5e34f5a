//! This library provides a Rust client for the [Open Payments] API.
//!
//! [Open Payments]: <https://openpayments.dev>
//!
//! # Usage
//!
//! Requests to a wallet's resource server need an access token from its authorization server,
//! obtained through a GNAP grant negotiation, and must be signed with a key published at the
//! client's own wallet address.
//!
//! ```ignore
//! use open_payments::client::{AuthenticatedClient, CollectionRequestArgs, UnauthenticatedClient};
//! use open_payments::config::ClientConfig;
//! use open_payments::core::grant::{AccessAction, AccessItem, AccessTokenRequest, AccessType, GrantRequest};
//! use open_payments::core::resources::CreateIncomingPaymentArgs;
//!
//! // Discover the receiver's authorization server.
//! let wallet_address = UnauthenticatedClient::builder()
//!     .build()?
//!     .wallet_address()
//!     .get(&receiver)
//!     .await?;
//!
//! // Setup the client.
//! let client = AuthenticatedClient::builder()
//!     .with_config(&ClientConfig::from_pem(key_id, &private_key_pem)?)
//!     .build()?;
//!
//! // Ask for access to create incoming payments.
//! let negotiation = client
//!     .negotiate(
//!         &wallet_address.auth_server,
//!         &GrantRequest {
//!             access_token: AccessTokenRequest {
//!                 access: vec![AccessItem::new(
//!                     AccessType::IncomingPayment,
//!                     [AccessAction::Create, AccessAction::Read],
//!                 )],
//!             },
//!             client: client_wallet_address,
//!             interact: None,
//!         },
//!     )
//!     .await?;
//! let access_token = &negotiation.grant().context("grant requires interaction")?.access_token;
//!
//! // Create the incoming payment.
//! let incoming_payment = client
//!     .incoming_payment()
//!     .create(
//!         CollectionRequestArgs {
//!             wallet_address: &wallet_address.id,
//!             access_token: &access_token.value,
//!         },
//!         &CreateIncomingPaymentArgs {
//!             wallet_address: wallet_address.id.clone(),
//!             incoming_amount: None,
//!             expires_at: None,
//!             metadata: None,
//!         },
//!     )
//!     .await?;
//! ```
//!
//! # Response validation
//!
//! Every response is checked twice before it is returned:
//!
//! 1. *Shape*: the payload must match the schema the published OpenAPI description gives for the
//!    operation. See [`core::openapi`].
//! 2. *Consistency*: payments and quotes must be internally consistent, e.g. an incoming payment
//!    may not have received more than its incoming amount. See [`core::validation`].
//!
//! A shape failure is reported as [`Error::RequestFailed`]; a consistency failure is logged and
//! reported as [`Error::Validation`].
//!
//! [`core::openapi`]: crate::core::openapi
//! [`core::validation`]: crate::core::validation
//! [`Error::RequestFailed`]: crate::error::Error::RequestFailed
//! [`Error::Validation`]: crate::error::Error::Validation
//!
//! # Grant negotiation
//!
//! 1. *Request*: the client asks the authorization server for access. See [`GrantRoutes`].
//! 2. *Interaction*: when the server requires consent, the end-user is redirected to
//!    `interact.redirect` and comes back with an `interact_ref`.
//! 3. *Continuation*: the client exchanges the `interact_ref` for an access token.
//! 4. *Management*: the token is rotated or revoked through its `manage` URL. See
//!    [`TokenRoutes`].
//!
//! [`GrantNegotiation`] tracks these steps and rejects out of order calls.
//!
//! [`GrantRoutes`]: crate::client::grant::GrantRoutes
//! [`TokenRoutes`]: crate::client::token::TokenRoutes
//! [`GrantNegotiation`]: crate::client::negotiation::GrantNegotiation

pub mod client;
pub mod config;
pub mod core;
pub mod error;
