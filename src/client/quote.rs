use std::sync::Arc;

use http::Method;

use crate::{
    core::{
        openapi::{OpenApi, OpenApiError, SchemaValidator},
        resources::{CreateQuoteArgs, Quote},
        util::Clock,
        validation::validate_quote,
    },
    error::{ResourceKind, Result},
};

use super::{
    collection_url, ensure_valid,
    requests::{GetArgs, PostArgs, RequestExecutor},
    CollectionRequestArgs, ResourceRequestArgs,
};

const KIND: ResourceKind = ResourceKind::Quote;

#[derive(Debug, Clone)]
pub struct QuoteRoutes {
    executor: Arc<RequestExecutor>,
    clock: Arc<dyn Clock>,
    get: SchemaValidator<Quote>,
    create: SchemaValidator<Quote>,
}

impl QuoteRoutes {
    pub(crate) fn new(
        executor: Arc<RequestExecutor>,
        openapi: &OpenApi,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, OpenApiError> {
        Ok(Self {
            get: openapi.create_response_validator("/quotes/{id}", Method::GET)?,
            create: openapi.create_response_validator("/quotes", Method::POST)?,
            executor,
            clock,
        })
    }

    /// Fetch a quote. An expired quote is rejected.
    pub async fn get(&self, args: ResourceRequestArgs<'_>) -> Result<Quote> {
        let quote = self
            .executor
            .get(
                GetArgs::<()> {
                    url: args.url.clone(),
                    access_token: Some(args.access_token),
                    query: None,
                },
                &self.get,
            )
            .await?;

        ensure_valid(args.url, KIND, validate_quote(&quote, self.clock.now()))?;
        Ok(quote)
    }

    pub async fn create(
        &self,
        args: CollectionRequestArgs<'_>,
        quote: &CreateQuoteArgs,
    ) -> Result<Quote> {
        let url = collection_url(args.wallet_address, "/quotes")?;
        let quote = self
            .executor
            .post(
                PostArgs {
                    url: url.clone(),
                    access_token: Some(args.access_token),
                    body: Some(quote),
                },
                &self.create,
            )
            .await?;

        ensure_valid(&url, KIND, validate_quote(&quote, self.clock.now()))?;
        Ok(quote)
    }
}
