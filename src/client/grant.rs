use std::sync::Arc;

use http::Method;
use url::Url;

use crate::{
    core::{
        grant::{Continue, Grant, GrantContinuationRequest, GrantRequest, GrantResponse},
        openapi::{OpenApi, OpenApiError, SchemaValidator},
    },
    error::Result,
};

use super::requests::{DeleteArgs, PostArgs, RequestExecutor};

/// Grant requests against an authorization server.
#[derive(Debug, Clone)]
pub struct GrantRoutes {
    executor: Arc<RequestExecutor>,
    request: SchemaValidator<GrantResponse>,
    continue_: SchemaValidator<Grant>,
}

impl GrantRoutes {
    pub(crate) fn new(
        executor: Arc<RequestExecutor>,
        openapi: &OpenApi,
    ) -> Result<Self, OpenApiError> {
        Ok(Self {
            request: openapi.create_response_validator("/", Method::POST)?,
            continue_: openapi.create_response_validator("/continue/{id}", Method::POST)?,
            executor,
        })
    }

    /// Request a grant. The server either issues it directly or asks for end-user interaction.
    pub async fn request(&self, auth_server: &Url, request: &GrantRequest) -> Result<GrantResponse> {
        self.executor
            .post(
                PostArgs {
                    url: auth_server.clone(),
                    access_token: None,
                    body: Some(request),
                },
                &self.request,
            )
            .await
    }

    /// Continue a pending grant.
    ///
    /// `interact_ref` is the reference received on the finish redirect; without one the call
    /// polls the grant, which should not happen before `continue.wait` seconds have elapsed.
    pub async fn continue_grant(
        &self,
        continue_: &Continue,
        interact_ref: Option<&str>,
    ) -> Result<Grant> {
        let body = interact_ref.map(|interact_ref| GrantContinuationRequest {
            interact_ref: interact_ref.to_owned(),
        });

        self.executor
            .post(
                PostArgs {
                    url: continue_.uri.clone(),
                    access_token: Some(&continue_.access_token.value),
                    body: body.as_ref(),
                },
                &self.continue_,
            )
            .await
    }

    /// Abandon a pending grant.
    pub async fn cancel(&self, continue_: &Continue) -> Result<()> {
        self.executor
            .delete(DeleteArgs {
                url: continue_.uri.clone(),
                access_token: Some(&continue_.access_token.value),
            })
            .await
    }
}

#[cfg(test)]
mod test {
    use http::{header::AUTHORIZATION, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::{
        core::grant::{AccessAction, AccessItem, AccessTokenRequest, AccessType},
        tests::{grant_json, pending_grant_json, routes, MockHttpClient, AUTH_SERVER, WALLET_ADDRESS},
    };

    fn grant_request() -> GrantRequest {
        GrantRequest {
            access_token: AccessTokenRequest {
                access: vec![AccessItem::new(
                    AccessType::IncomingPayment,
                    [AccessAction::Create, AccessAction::Read],
                )],
            },
            client: WALLET_ADDRESS.parse().unwrap(),
            interact: None,
        }
    }

    #[tokio::test]
    async fn request_granted() {
        let http_client = MockHttpClient::new();
        http_client.respond_json(StatusCode::OK, grant_json());

        let response = routes(&http_client)
            .grant()
            .request(&AUTH_SERVER.parse().unwrap(), &grant_request())
            .await
            .unwrap();
        assert!(matches!(response, GrantResponse::Granted(_)));

        let request = http_client.request(0);
        assert_eq!(request.uri().to_string(), AUTH_SERVER);
        assert!(!request.headers().contains_key(AUTHORIZATION));
        assert!(request.headers().contains_key("signature"));
    }

    #[tokio::test]
    async fn request_pending() {
        let http_client = MockHttpClient::new();
        http_client.respond_json(StatusCode::OK, pending_grant_json());

        let response = routes(&http_client)
            .grant()
            .request(&AUTH_SERVER.parse().unwrap(), &grant_request())
            .await
            .unwrap();
        let GrantResponse::Pending(pending) = response else {
            panic!("expected a pending grant")
        };
        assert_eq!(pending.continue_.access_token.value, "33OMUKMKSKU80UPRY5NM");
    }

    #[tokio::test]
    async fn continue_with_interact_ref() {
        let http_client = MockHttpClient::new();
        http_client.respond_json(StatusCode::OK, grant_json());

        let pending: crate::core::grant::PendingGrant =
            serde_json::from_value(pending_grant_json()).unwrap();
        routes(&http_client)
            .grant()
            .continue_grant(&pending.continue_, Some("4IFWWIKYBC2PQ6U56NL1"))
            .await
            .unwrap();

        let request = http_client.request(0);
        assert_eq!(request.uri().to_string(), pending.continue_.uri.as_str());
        assert_eq!(request.headers()[AUTHORIZATION], "GNAP 33OMUKMKSKU80UPRY5NM");
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(request.body()).unwrap(),
            json!({ "interact_ref": "4IFWWIKYBC2PQ6U56NL1" })
        );
    }

    #[tokio::test]
    async fn poll_without_interact_ref() {
        let http_client = MockHttpClient::new();
        http_client.respond_json(StatusCode::OK, grant_json());

        let pending: crate::core::grant::PendingGrant =
            serde_json::from_value(pending_grant_json()).unwrap();
        routes(&http_client)
            .grant()
            .continue_grant(&pending.continue_, None)
            .await
            .unwrap();

        assert!(http_client.request(0).body().is_empty());
    }

    #[tokio::test]
    async fn cancel() {
        let http_client = MockHttpClient::new();
        http_client.respond(StatusCode::NO_CONTENT, Vec::new());

        let pending: crate::core::grant::PendingGrant =
            serde_json::from_value(pending_grant_json()).unwrap();
        routes(&http_client)
            .grant()
            .cancel(&pending.continue_)
            .await
            .unwrap();

        let request = http_client.request(0);
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.uri().to_string(), pending.continue_.uri.as_str());
    }
}
