//! Open Payments clients.
//!
//! An [AuthenticatedClient] signs every request with the client's key and exposes all resource
//! and authorization server routes. An [UnauthenticatedClient] can only read wallet addresses and
//! the public view of incoming payments.

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use tracing::error;
use url::Url;

use crate::{
    config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT},
    core::{
        grant::GrantRequest,
        openapi::OpenApi,
        signature::RequestSigner,
        util::{AsyncHttpClient, Clock, ReqwestClient, SystemClock},
    },
    error::{Error, InvariantViolation, RequestFailure, ResourceKind, Result},
};

use grant::GrantRoutes;
use incoming_payment::{IncomingPaymentRoutes, PublicIncomingPaymentRoutes};
use negotiation::GrantNegotiation;
use outgoing_payment::OutgoingPaymentRoutes;
use quote::QuoteRoutes;
use requests::RequestExecutor;
use token::TokenRoutes;
use wallet_address::WalletAddressRoutes;

pub mod grant;
pub mod incoming_payment;
pub mod negotiation;
pub mod outgoing_payment;
pub mod quote;
pub mod requests;
pub mod token;
pub mod wallet_address;

/// Arguments for an operation on a single resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceRequestArgs<'a> {
    /// The resource's identity URL.
    pub url: &'a Url,
    pub access_token: &'a str,
}

/// Arguments for an operation on a collection scoped to a wallet address.
#[derive(Debug, Clone, Copy)]
pub struct CollectionRequestArgs<'a> {
    pub wallet_address: &'a Url,
    pub access_token: &'a str,
}

/// `walletAddress + path`, where `path` starts with `/`.
pub(crate) fn collection_url(wallet_address: &Url, path: &str) -> Result<Url> {
    format!("{}{path}", wallet_address.as_str().trim_end_matches('/'))
        .parse()
        .map_err(|e| {
            Error::request_failed(
                wallet_address,
                RequestFailure::Build(anyhow!("invalid collection url: {e}")),
            )
        })
}

/// Collapse an invariant failure into [Error::Validation], logging the underlying reason.
pub(crate) fn ensure_valid(
    url: &Url,
    kind: ResourceKind,
    checked: Result<(), InvariantViolation>,
) -> Result<()> {
    checked.map_err(|validate_error| {
        error!(%url, %validate_error, "Could not validate {kind}");
        Error::Validation(kind)
    })
}

/// Like [ensure_valid], for one element of a listed page.
pub(crate) fn ensure_valid_element(
    url: &Url,
    resource_id: &Url,
    kind: ResourceKind,
    checked: Result<(), InvariantViolation>,
) -> Result<()> {
    checked.map_err(|validate_error| {
        error!(%url, %validate_error, %resource_id, "Could not validate {kind}");
        Error::Validation(kind)
    })
}

/// A client for the Open Payments resource and authorization servers that signs its requests.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    incoming_payment: IncomingPaymentRoutes,
    outgoing_payment: OutgoingPaymentRoutes,
    quote: QuoteRoutes,
    wallet_address: WalletAddressRoutes,
    grant: GrantRoutes,
    token: TokenRoutes,
}

impl AuthenticatedClient {
    pub fn builder() -> AuthenticatedClientBuilder {
        AuthenticatedClientBuilder::default()
    }

    pub fn incoming_payment(&self) -> &IncomingPaymentRoutes {
        &self.incoming_payment
    }

    pub fn outgoing_payment(&self) -> &OutgoingPaymentRoutes {
        &self.outgoing_payment
    }

    pub fn quote(&self) -> &QuoteRoutes {
        &self.quote
    }

    pub fn wallet_address(&self) -> &WalletAddressRoutes {
        &self.wallet_address
    }

    pub fn grant(&self) -> &GrantRoutes {
        &self.grant
    }

    pub fn token(&self) -> &TokenRoutes {
        &self.token
    }

    /// Request a grant from `auth_server` and track it through continuation, rotation and
    /// revocation.
    pub async fn negotiate(
        &self,
        auth_server: &Url,
        request: &GrantRequest,
    ) -> Result<GrantNegotiation> {
        GrantNegotiation::request(self.grant.clone(), self.token.clone(), auth_server, request)
            .await
    }
}

/// Builder struct for [AuthenticatedClient].
#[derive(Debug, Clone)]
pub struct AuthenticatedClientBuilder {
    http_client: Option<Arc<dyn AsyncHttpClient + Send + Sync>>,
    signer: Option<Arc<dyn RequestSigner + Send + Sync>>,
    request_timeout: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl Default for AuthenticatedClientBuilder {
    fn default() -> Self {
        Self {
            http_client: None,
            signer: None,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthenticatedClientBuilder {
    /// Build the client, compiling the response validators for every route.
    pub fn build(self) -> Result<AuthenticatedClient> {
        let Self {
            http_client,
            signer,
            request_timeout,
            clock,
        } = self;

        let Some(signer) = signer else {
            return Err(Error::Config(anyhow!(
                "signer is required, see `with_config` or `with_signer`"
            )));
        };

        let http_client = match http_client {
            Some(http_client) => http_client,
            None => Arc::new(ReqwestClient::new().map_err(Error::Config)?),
        };

        let executor = Arc::new(RequestExecutor::new(
            http_client,
            Some(signer),
            request_timeout,
        ));
        let resource_server = OpenApi::resource_server()?;
        let auth_server = OpenApi::auth_server()?;

        Ok(AuthenticatedClient {
            incoming_payment: IncomingPaymentRoutes::new(executor.clone(), &resource_server)?,
            outgoing_payment: OutgoingPaymentRoutes::new(executor.clone(), &resource_server)?,
            quote: QuoteRoutes::new(executor.clone(), &resource_server, clock)?,
            wallet_address: WalletAddressRoutes::new(executor.clone(), &resource_server)?,
            grant: GrantRoutes::new(executor.clone(), &auth_server)?,
            token: TokenRoutes::new(executor, &auth_server)?,
        })
    }

    /// Sign requests with the configured key and apply its request timeout.
    pub fn with_config(self, config: &ClientConfig) -> Self {
        self.with_signer(Arc::new(config.signer()))
            .with_request_timeout(config.request_timeout)
    }

    /// Set the [RequestSigner] that holds the client's private key.
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner + Send + Sync>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Defaults to a [ReqwestClient].
    pub fn with_http_client(mut self, http_client: Arc<dyn AsyncHttpClient + Send + Sync>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// `None` waits on the transport indefinitely.
    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Set the [Clock] that quote expiry is checked against.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// A client that sends unsigned requests, for the publicly readable resources.
#[derive(Debug, Clone)]
pub struct UnauthenticatedClient {
    incoming_payment: PublicIncomingPaymentRoutes,
    wallet_address: WalletAddressRoutes,
}

impl UnauthenticatedClient {
    pub fn builder() -> UnauthenticatedClientBuilder {
        UnauthenticatedClientBuilder::default()
    }

    pub fn incoming_payment(&self) -> &PublicIncomingPaymentRoutes {
        &self.incoming_payment
    }

    pub fn wallet_address(&self) -> &WalletAddressRoutes {
        &self.wallet_address
    }
}

/// Builder struct for [UnauthenticatedClient].
#[derive(Debug, Clone)]
pub struct UnauthenticatedClientBuilder {
    http_client: Option<Arc<dyn AsyncHttpClient + Send + Sync>>,
    request_timeout: Option<Duration>,
}

impl Default for UnauthenticatedClientBuilder {
    fn default() -> Self {
        Self {
            http_client: None,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl UnauthenticatedClientBuilder {
    pub fn build(self) -> Result<UnauthenticatedClient> {
        let http_client = match self.http_client {
            Some(http_client) => http_client,
            None => Arc::new(ReqwestClient::new().map_err(Error::Config)?),
        };

        let executor = Arc::new(RequestExecutor::new(
            http_client,
            None,
            self.request_timeout,
        ));
        let resource_server = OpenApi::resource_server()?;

        Ok(UnauthenticatedClient {
            incoming_payment: PublicIncomingPaymentRoutes::new(executor.clone(), &resource_server)?,
            wallet_address: WalletAddressRoutes::new(executor, &resource_server)?,
        })
    }

    /// Defaults to a [ReqwestClient].
    pub fn with_http_client(mut self, http_client: Arc<dyn AsyncHttpClient + Send + Sync>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
