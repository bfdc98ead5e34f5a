use std::sync::Arc;

use http::Method;
use url::Url;

use crate::{
    core::{
        openapi::{OpenApi, OpenApiError, SchemaValidator},
        resources::{JsonWebKeySet, WalletAddress},
    },
    error::Result,
};

use super::{
    collection_url,
    requests::{GetArgs, RequestExecutor},
};

#[derive(Debug, Clone)]
pub struct WalletAddressRoutes {
    executor: Arc<RequestExecutor>,
    get: SchemaValidator<WalletAddress>,
    get_keys: SchemaValidator<JsonWebKeySet>,
}

impl WalletAddressRoutes {
    pub(crate) fn new(
        executor: Arc<RequestExecutor>,
        openapi: &OpenApi,
    ) -> Result<Self, OpenApiError> {
        Ok(Self {
            get: openapi.create_response_validator("/", Method::GET)?,
            get_keys: openapi.create_response_validator("/jwks.json", Method::GET)?,
            executor,
        })
    }

    pub async fn get(&self, url: &Url) -> Result<WalletAddress> {
        self.executor
            .get(
                GetArgs::<()> {
                    url: url.clone(),
                    access_token: None,
                    query: None,
                },
                &self.get,
            )
            .await
    }

    /// The keys that requests from this wallet address's clients are signed with.
    pub async fn get_keys(&self, wallet_address: &Url) -> Result<JsonWebKeySet> {
        self.executor
            .get(
                GetArgs::<()> {
                    url: collection_url(wallet_address, "/jwks.json")?,
                    access_token: None,
                    query: None,
                },
                &self.get_keys,
            )
            .await
    }
}
