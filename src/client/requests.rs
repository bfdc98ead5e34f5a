use std::{fmt, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::Utc;
use http::{header::AUTHORIZATION, Method, Request, Response};
use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, warn};
use url::Url;

use crate::{
    core::{
        openapi::ResponseValidator,
        signature::{sign_request, RequestSigner},
        util::{base_request, AsyncHttpClient},
    },
    error::{Error, RequestFailure, Result},
};

#[derive(Debug, Clone)]
pub struct GetArgs<'a, Q = ()> {
    pub url: Url,
    pub access_token: Option<&'a str>,
    /// Serialized into the query string; `None` fields are omitted.
    pub query: Option<&'a Q>,
}

#[derive(Debug, Clone)]
pub struct PostArgs<'a, B = ()> {
    pub url: Url,
    pub access_token: Option<&'a str>,
    pub body: Option<&'a B>,
}

#[derive(Debug, Clone)]
pub struct DeleteArgs<'a> {
    pub url: Url,
    pub access_token: Option<&'a str>,
}

/// Issues signed requests and validates every response against the interface description.
#[derive(Clone)]
pub struct RequestExecutor {
    http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
    signer: Option<Arc<dyn RequestSigner + Send + Sync>>,
    request_timeout: Option<Duration>,
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("http_client", &self.http_client)
            .field("signer", &self.signer)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl RequestExecutor {
    pub fn new(
        http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
        signer: Option<Arc<dyn RequestSigner + Send + Sync>>,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            http_client,
            signer,
            request_timeout,
        }
    }

    pub async fn get<T, Q: Serialize, V: ResponseValidator<T> + ?Sized>(
        &self,
        args: GetArgs<'_, Q>,
        validator: &V,
    ) -> Result<T> {
        let GetArgs {
            mut url,
            access_token,
            query,
        } = args;

        if let Some(query) = query {
            let query = serde_urlencoded::to_string(query)
                .context("unable to encode query parameters")
                .map_err(|e| Error::request_failed(&url, RequestFailure::Build(e)))?;
            url.set_query((!query.is_empty()).then_some(query.as_str()));
        }

        let response = self.send(Method::GET, &url, access_token, None).await?;
        self.validate(&url, response, validator)
    }

    pub async fn post<T, B: Serialize, V: ResponseValidator<T> + ?Sized>(
        &self,
        args: PostArgs<'_, B>,
        validator: &V,
    ) -> Result<T> {
        let PostArgs {
            url,
            access_token,
            body,
        } = args;

        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .context("unable to encode request body")
            .map_err(|e| Error::request_failed(&url, RequestFailure::Build(e)))?;

        let response = self.send(Method::POST, &url, access_token, body).await?;
        self.validate(&url, response, validator)
    }

    /// Send a DELETE request. The response body, if any, is ignored.
    pub async fn delete(&self, args: DeleteArgs<'_>) -> Result<()> {
        let DeleteArgs { url, access_token } = args;
        self.send(Method::DELETE, &url, access_token, None)
            .await
            .map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        access_token: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<Response<Vec<u8>>> {
        let fail = |cause: RequestFailure| {
            warn!(%url, %method, %cause, "request failed");
            Error::request_failed(url, cause)
        };

        let mut request = self
            .build(method.clone(), url, access_token, body)
            .map_err(|e| fail(RequestFailure::Build(e)))?;

        if let Some(signer) = &self.signer {
            sign_request(&mut request, signer.as_ref(), Utc::now().timestamp())
                .await
                .map_err(|e| fail(RequestFailure::Signing(e)))?;
        }

        debug!(%url, %method, "sending request");
        let execution = self.http_client.execute(request);
        let response = match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, execution)
                .await
                .map_err(|_| fail(RequestFailure::Timeout(timeout)))?,
            None => execution.await,
        }
        .map_err(|e| fail(RequestFailure::Transport(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = String::from_utf8_lossy(response.body()).into_owned();
            return Err(fail(RequestFailure::Status { status, body }));
        }

        Ok(response)
    }

    fn build(
        &self,
        method: Method,
        url: &Url,
        access_token: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<Request<Vec<u8>>> {
        let mut builder = base_request().method(method).uri(url.as_str());
        if let Some(access_token) = access_token {
            builder = builder.header(AUTHORIZATION, format!("GNAP {access_token}"));
        }
        builder
            .body(body.unwrap_or_default())
            .context("unable to construct request")
    }

    fn validate<T, V: ResponseValidator<T> + ?Sized>(
        &self,
        url: &Url,
        response: Response<Vec<u8>>,
        validator: &V,
    ) -> Result<T> {
        let payload: Json = serde_json::from_slice(response.body()).map_err(|e| {
            warn!(%url, error = %e, "unable to decode response");
            Error::request_failed(url, RequestFailure::Decode(e))
        })?;

        validator.validate(payload).map_err(|violation| {
            warn!(%url, %violation, "response does not match the interface");
            Error::request_failed(url, violation)
        })
    }
}
