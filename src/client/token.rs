use std::sync::Arc;

use http::Method;

use crate::{
    core::{
        grant::{AccessToken, AccessTokenResponse},
        openapi::{OpenApi, OpenApiError, SchemaValidator},
    },
    error::Result,
};

use super::requests::{DeleteArgs, PostArgs, RequestExecutor};

/// Management of issued access tokens, through their `manage` URL.
#[derive(Debug, Clone)]
pub struct TokenRoutes {
    executor: Arc<RequestExecutor>,
    rotate: SchemaValidator<AccessTokenResponse>,
}

impl TokenRoutes {
    pub(crate) fn new(
        executor: Arc<RequestExecutor>,
        openapi: &OpenApi,
    ) -> Result<Self, OpenApiError> {
        Ok(Self {
            rotate: openapi.create_response_validator("/token/{id}", Method::POST)?,
            executor,
        })
    }

    /// Exchange `token` for a fresh one. The old token stops working.
    pub async fn rotate(&self, token: &AccessToken) -> Result<AccessToken> {
        self.executor
            .post(
                PostArgs::<()> {
                    url: token.manage.clone(),
                    access_token: Some(&token.value),
                    body: None,
                },
                &self.rotate,
            )
            .await
            .map(|response| response.access_token)
    }

    pub async fn revoke(&self, token: &AccessToken) -> Result<()> {
        self.executor
            .delete(DeleteArgs {
                url: token.manage.clone(),
                access_token: Some(&token.value),
            })
            .await
    }
}
