use std::sync::Arc;

use http::Method;
use url::Url;

use crate::{
    core::{
        openapi::{OpenApi, OpenApiError, SchemaValidator},
        pagination::{PaginationArgs, PaginationResult},
        resources::{
            CreateIncomingPaymentArgs, IncomingPayment, IncomingPaymentWithMethods,
            PublicIncomingPayment,
        },
        validation::{
            validate_completed_incoming_payment, validate_created_incoming_payment,
            validate_incoming_payment,
        },
    },
    error::{ResourceKind, Result},
};

use super::{
    collection_url, ensure_valid, ensure_valid_element,
    requests::{GetArgs, PostArgs, RequestExecutor},
    CollectionRequestArgs, ResourceRequestArgs,
};

const KIND: ResourceKind = ResourceKind::IncomingPayment;

#[derive(Debug, Clone)]
pub struct IncomingPaymentRoutes {
    executor: Arc<RequestExecutor>,
    public: PublicIncomingPaymentRoutes,
    get: SchemaValidator<IncomingPaymentWithMethods>,
    create: SchemaValidator<IncomingPaymentWithMethods>,
    complete: SchemaValidator<IncomingPayment>,
    list: SchemaValidator<PaginationResult<IncomingPayment>>,
}

impl IncomingPaymentRoutes {
    pub(crate) fn new(
        executor: Arc<RequestExecutor>,
        openapi: &OpenApi,
    ) -> Result<Self, OpenApiError> {
        Ok(Self {
            public: PublicIncomingPaymentRoutes::new(executor.clone(), openapi)?,
            get: openapi.create_response_validator("/incoming-payments/{id}", Method::GET)?,
            create: openapi.create_response_validator("/incoming-payments", Method::POST)?,
            complete: openapi
                .create_response_validator("/incoming-payments/{id}/complete", Method::POST)?,
            list: openapi.create_response_validator("/incoming-payments", Method::GET)?,
            executor,
        })
    }

    pub async fn get(&self, args: ResourceRequestArgs<'_>) -> Result<IncomingPaymentWithMethods> {
        let payment: IncomingPaymentWithMethods = self
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

        ensure_valid(args.url, KIND, validate_incoming_payment(&payment))?;
        Ok(payment)
    }

    /// Read the publicly visible fields of an incoming payment, without an access token.
    pub async fn get_public(&self, url: &Url) -> Result<PublicIncomingPayment> {
        self.public.get(url).await
    }

    pub async fn create(
        &self,
        args: CollectionRequestArgs<'_>,
        payment: &CreateIncomingPaymentArgs,
    ) -> Result<IncomingPaymentWithMethods> {
        let url = collection_url(args.wallet_address, "/incoming-payments")?;
        let payment: IncomingPaymentWithMethods = self
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

        ensure_valid(&url, KIND, validate_created_incoming_payment(&payment))?;
        Ok(payment)
    }

    /// Mark an incoming payment as completed so that it accepts no further funds.
    pub async fn complete(&self, args: ResourceRequestArgs<'_>) -> Result<IncomingPayment> {
        let url = collection_url(args.url, "/complete")?;
        let payment: IncomingPayment = self
            .executor
            .post(
                PostArgs::<()> {
                    url: url.clone(),
                    access_token: Some(args.access_token),
                    body: None,
                },
                &self.complete,
            )
            .await?;

        ensure_valid(&url, KIND, validate_completed_incoming_payment(&payment))?;
        Ok(payment)
    }

    /// List one page of a wallet address's incoming payments.
    ///
    /// Fails as a whole when any element of the page is inconsistent.
    pub async fn list(
        &self,
        args: CollectionRequestArgs<'_>,
        pagination: Option<&PaginationArgs>,
    ) -> Result<PaginationResult<IncomingPayment>> {
        let url = collection_url(args.wallet_address, "/incoming-payments")?;
        let query = pagination.map(PaginationArgs::query);
        let page: PaginationResult<IncomingPayment> = self
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
            ensure_valid_element(&url, &payment.id, KIND, validate_incoming_payment(payment))?;
        }

        Ok(page)
    }
}

/// The incoming payment route available to an unauthenticated client.
#[derive(Debug, Clone)]
pub struct PublicIncomingPaymentRoutes {
    executor: Arc<RequestExecutor>,
    get: SchemaValidator<PublicIncomingPayment>,
}

impl PublicIncomingPaymentRoutes {
    pub(crate) fn new(
        executor: Arc<RequestExecutor>,
        openapi: &OpenApi,
    ) -> Result<Self, OpenApiError> {
        Ok(Self {
            get: openapi.create_response_validator("/incoming-payments/{id}", Method::GET)?,
            executor,
        })
    }

    pub async fn get(&self, url: &Url) -> Result<PublicIncomingPayment> {
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
}

#[cfg(test)]
mod test {
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::{
        error::{Error, RequestFailure},
        tests::{incoming_payment_json, routes, MockHttpClient, ACCESS_TOKEN, WALLET_ADDRESS},
    };

    fn wallet_address() -> Url {
        WALLET_ADDRESS.parse().unwrap()
    }

    #[tokio::test]
    async fn get() {
        let http_client = MockHttpClient::new();
        let mut payment = incoming_payment_json();
        payment["methods"] = json!([{
            "type": "ilp",
            "ilpAddress": "test.rafiki.abc",
            "sharedSecret": "c2VjcmV0"
        }]);
        http_client.respond_json(StatusCode::OK, payment.clone());

        let url: Url = payment["id"].as_str().unwrap().parse().unwrap();
        let fetched = routes(&http_client)
            .incoming_payment()
            .get(ResourceRequestArgs {
                url: &url,
                access_token: ACCESS_TOKEN,
            })
            .await
            .unwrap();

        assert_eq!(fetched.id, url);
        assert_eq!(fetched.methods.len(), 1);
        assert_eq!(http_client.request(0).uri().to_string(), url.as_str());
    }

    #[tokio::test]
    async fn get_inconsistent() {
        let http_client = MockHttpClient::new();
        let mut payment = incoming_payment_json();
        payment["methods"] = json!([]);
        payment["receivedAmount"]["value"] = json!("11");
        http_client.respond_json(StatusCode::OK, payment.clone());

        let url: Url = payment["id"].as_str().unwrap().parse().unwrap();
        let err = routes(&http_client)
            .incoming_payment()
            .get(ResourceRequestArgs {
                url: &url,
                access_token: ACCESS_TOKEN,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(ResourceKind::IncomingPayment)));
        assert_eq!(err.to_string(), "Could not validate incoming payment");
    }

    #[tokio::test]
    async fn create() {
        let http_client = MockHttpClient::new();
        let mut payment = incoming_payment_json();
        payment["methods"] = json!([]);
        http_client.respond_json(StatusCode::CREATED, payment);

        let created = routes(&http_client)
            .incoming_payment()
            .create(
                CollectionRequestArgs {
                    wallet_address: &wallet_address(),
                    access_token: ACCESS_TOKEN,
                },
                &CreateIncomingPaymentArgs {
                    wallet_address: wallet_address(),
                    incoming_amount: Some(crate::core::amount::Amount::new(10u64, "USD", 2)),
                    expires_at: None,
                    metadata: None,
                },
            )
            .await
            .unwrap();
        assert!(!created.completed);

        let request = http_client.request(0);
        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.uri().to_string(),
            format!("{WALLET_ADDRESS}/incoming-payments")
        );
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(request.body()).unwrap(),
            json!({
                "walletAddress": WALLET_ADDRESS,
                "incomingAmount": { "value": "10", "assetCode": "USD", "assetScale": 2 }
            })
        );
    }

    #[tokio::test]
    async fn create_already_completed() {
        let http_client = MockHttpClient::new();
        let mut payment = incoming_payment_json();
        payment["methods"] = json!([]);
        payment["completed"] = json!(true);
        http_client.respond_json(StatusCode::CREATED, payment);

        let err = routes(&http_client)
            .incoming_payment()
            .create(
                CollectionRequestArgs {
                    wallet_address: &wallet_address(),
                    access_token: ACCESS_TOKEN,
                },
                &CreateIncomingPaymentArgs {
                    wallet_address: wallet_address(),
                    incoming_amount: None,
                    expires_at: None,
                    metadata: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ResourceKind::IncomingPayment)));
    }

    #[tokio::test]
    async fn complete() {
        let http_client = MockHttpClient::new();
        let mut payment = incoming_payment_json();
        payment["completed"] = json!(true);
        http_client.respond_json(StatusCode::OK, payment.clone());

        let url: Url = payment["id"].as_str().unwrap().parse().unwrap();
        let completed = routes(&http_client)
            .incoming_payment()
            .complete(ResourceRequestArgs {
                url: &url,
                access_token: ACCESS_TOKEN,
            })
            .await
            .unwrap();
        assert!(completed.completed);
        assert_eq!(
            http_client.request(0).uri().to_string(),
            format!("{url}/complete")
        );
    }

    #[tokio::test]
    async fn complete_not_completed() {
        let http_client = MockHttpClient::new();
        let payment = incoming_payment_json();
        http_client.respond_json(StatusCode::OK, payment.clone());

        let url: Url = payment["id"].as_str().unwrap().parse().unwrap();
        let err = routes(&http_client)
            .incoming_payment()
            .complete(ResourceRequestArgs {
                url: &url,
                access_token: ACCESS_TOKEN,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ResourceKind::IncomingPayment)));
    }

    fn page(result: Vec<serde_json::Value>) -> serde_json::Value {
        json!({
            "pagination": {
                "startCursor": "first-id",
                "endCursor": "last-id",
                "hasNextPage": true,
                "hasPreviousPage": false
            },
            "result": result
        })
    }

    #[tokio::test]
    async fn list_with_cursor() {
        let http_client = MockHttpClient::new();
        http_client.respond_json(
            StatusCode::OK,
            page(vec![
                incoming_payment_json(),
                incoming_payment_json(),
                incoming_payment_json(),
            ]),
        );

        let listed = routes(&http_client)
            .incoming_payment()
            .list(
                CollectionRequestArgs {
                    wallet_address: &wallet_address(),
                    access_token: ACCESS_TOKEN,
                },
                Some(&PaginationArgs::after("first-id", Some(5))),
            )
            .await
            .unwrap();

        assert_eq!(listed.result.len(), 3);
        assert_eq!(
            listed.next_page(Some(5)),
            Some(PaginationArgs::after("last-id", Some(5)))
        );
        assert_eq!(
            http_client.request(0).uri().to_string(),
            format!("{WALLET_ADDRESS}/incoming-payments?first=5&cursor=first-id")
        );
    }

    #[tokio::test]
    async fn list_fails_on_any_invalid_element() {
        let http_client = MockHttpClient::new();
        let mut invalid = incoming_payment_json();
        invalid["receivedAmount"]["value"] = json!("10");
        http_client.respond_json(
            StatusCode::OK,
            page(vec![incoming_payment_json(), invalid, incoming_payment_json()]),
        );

        let err = routes(&http_client)
            .incoming_payment()
            .list(
                CollectionRequestArgs {
                    wallet_address: &wallet_address(),
                    access_token: ACCESS_TOKEN,
                },
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(ResourceKind::IncomingPayment)));
        assert_eq!(
            http_client.request(0).uri().to_string(),
            format!("{WALLET_ADDRESS}/incoming-payments")
        );
    }

    #[tokio::test]
    async fn schema_checked_before_invariants() {
        let http_client = MockHttpClient::new();
        let mut payment = incoming_payment_json();
        payment["completed"] = json!(true);
        payment.as_object_mut().unwrap().remove("createdAt");
        http_client.respond_json(StatusCode::OK, payment.clone());

        let url: Url = payment["id"].as_str().unwrap().parse().unwrap();
        let err = routes(&http_client)
            .incoming_payment()
            .complete(ResourceRequestArgs {
                url: &url,
                access_token: ACCESS_TOKEN,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.request_failure(),
            Some(RequestFailure::Schema(violation)) if violation.keyword == "required"
        ));
    }

    #[tokio::test]
    async fn get_public() {
        let http_client = MockHttpClient::new();
        http_client.respond_json(
            StatusCode::OK,
            json!({
                "receivedAmount": { "value": "0", "assetCode": "USD", "assetScale": 2 },
                "authServer": "https://auth.wallet.example/authorize"
            }),
        );

        let url: Url = format!("{WALLET_ADDRESS}/incoming-payments/{}", uuid::Uuid::new_v4())
            .parse()
            .unwrap();
        let payment = routes(&http_client)
            .incoming_payment()
            .get_public(&url)
            .await
            .unwrap();
        assert_eq!(
            payment.auth_server.as_str(),
            "https://auth.wallet.example/authorize"
        );

        let request = http_client.request(0);
        assert!(!request.headers().contains_key(http::header::AUTHORIZATION));
    }
}
