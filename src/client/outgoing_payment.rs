use std::sync::Arc;

use http::Method;

use crate::{
    core::{
        openapi::{OpenApi, OpenApiError, SchemaValidator},
        pagination::{PaginationArgs, PaginationResult},
        resources::{CreateOutgoingPaymentArgs, OutgoingPayment},
        validation::{validate_created_outgoing_payment, validate_outgoing_payment},
    },
    error::{ResourceKind, Result},
};

use super::{
    collection_url, ensure_valid, ensure_valid_element,
    requests::{GetArgs, PostArgs, RequestExecutor},
    CollectionRequestArgs, ResourceRequestArgs,
};

const KIND: ResourceKind = ResourceKind::OutgoingPayment;

#[derive(Debug, Clone)]
pub struct OutgoingPaymentRoutes {
    executor: Arc<RequestExecutor>,
    get: SchemaValidator<OutgoingPayment>,
    create: SchemaValidator<OutgoingPayment>,
    list: SchemaValidator<PaginationResult<OutgoingPayment>>,
}

impl OutgoingPaymentRoutes {
    pub(crate) fn new(
        executor: Arc<RequestExecutor>,
        openapi: &OpenApi,
    ) -> Result<Self, OpenApiError> {
        Ok(Self {
            get: openapi.create_response_validator("/outgoing-payments/{id}", Method::GET)?,
            create: openapi.create_response_validator("/outgoing-payments", Method::POST)?,
            list: openapi.create_response_validator("/outgoing-payments", Method::GET)?,
            executor,
        })
    }

    pub async fn get(&self, args: ResourceRequestArgs<'_>) -> Result<OutgoingPayment> {
        let payment = self
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

        ensure_valid(args.url, KIND, validate_outgoing_payment(&payment))?;
        Ok(payment)
    }

    /// Create an outgoing payment that executes the given quote.
    pub async fn create(
        &self,
        args: CollectionRequestArgs<'_>,
        payment: &CreateOutgoingPaymentArgs,
    ) -> Result<OutgoingPayment> {
        let url = collection_url(args.wallet_address, "/outgoing-payments")?;
        let payment = self
            .executor
            .post(
                PostArgs {
                    url: url.clone(),
                    access_token: Some(args.access_token),
                    body: Some(payment),
                },
                &self.create,
            )
            .await?;

        ensure_valid(&url, KIND, validate_created_outgoing_payment(&payment))?;
        Ok(payment)
    }

    pub async fn list(
        &self,
        args: CollectionRequestArgs<'_>,
        pagination: Option<&PaginationArgs>,
    ) -> Result<PaginationResult<OutgoingPayment>> {
        let url = collection_url(args.wallet_address, "/outgoing-payments")?;
        let query = pagination.map(PaginationArgs::query);
        let page: PaginationResult<OutgoingPayment> = self
            .executor
            .get(
                GetArgs {
                    url: url.clone(),
                    access_token: Some(args.access_token),
                    query: query.as_ref(),
                },
                &self.list,
            )
            .await?;

        for payment in &page.result {
            ensure_valid_element(&url, &payment.id, KIND, validate_outgoing_payment(payment))?;
        }

        Ok(page)
    }
}
