use std::{fmt, time::Duration};

use http::StatusCode;
use url::Url;

use crate::core::{
    grant::GrantStatus,
    openapi::{OpenApiError, SchemaViolation},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the Open Payments clients.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be completed, or its response did not satisfy the published
    /// interface.
    #[error("request to {url} failed: {cause}")]
    RequestFailed {
        url: Url,
        #[source]
        cause: RequestFailure,
    },
    /// The resource passed schema validation but is not internally consistent.
    ///
    /// The underlying [InvariantViolation] is logged, not returned.
    #[error("Could not validate {0}")]
    Validation(ResourceKind),
    /// A grant operation was attempted in a state that does not allow it.
    #[error("grant is {actual}, but the operation requires it to be {expected}")]
    StateMismatch {
        expected: GrantStatus,
        actual: GrantStatus,
    },
    #[error(transparent)]
    OpenApi(#[from] OpenApiError),
    #[error("invalid client configuration: {0:#}")]
    Config(anyhow::Error),
}

impl Error {
    pub(crate) fn request_failed(url: &Url, cause: impl Into<RequestFailure>) -> Self {
        Self::RequestFailed {
            url: url.clone(),
            cause: cause.into(),
        }
    }

    /// The underlying cause when this is a [Error::RequestFailed].
    pub fn request_failure(&self) -> Option<&RequestFailure> {
        match self {
            Self::RequestFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Underlying cause of an [Error::RequestFailed].
#[derive(Debug, thiserror::Error)]
pub enum RequestFailure {
    #[error("unable to build request: {0:#}")]
    Build(anyhow::Error),
    #[error("unable to sign request: {0:#}")]
    Signing(anyhow::Error),
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected response status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unable to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

/// Domain consistency checks that a schema cannot express.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{0} asset code or asset scale does not match up {1}")]
    AssetMismatch(&'static str, &'static str),
    #[error("Received amount is larger than incoming amount")]
    ReceivedExceedsIncoming,
    #[error("Incoming amount matches received amount but payment is not completed")]
    IncomingAmountReachedButNotCompleted,
    #[error("Received amount is a non-zero value")]
    NonZeroReceivedAmount,
    #[error("Can not create a completed incoming payment")]
    CreatedCompleted,
    #[error("Incoming payment could not be completed")]
    NotCompleted,
    #[error("Debit amount is zero")]
    ZeroDebitAmount,
    #[error("Receive amount is zero")]
    ZeroReceiveAmount,
    #[error("Quote expired at {0}")]
    QuoteExpired(chrono::DateTime<chrono::Utc>),
    #[error("Sent amount is larger than debit amount")]
    SentExceedsDebit,
    #[error("Outgoing payment is failed but the full debit amount was sent")]
    FailedButFullySent,
    #[error("Sent amount is a non-zero value")]
    NonZeroSentAmount,
    #[error("Can not create a failed outgoing payment")]
    CreatedFailed,
}

/// The kinds of resource whose validation failures are collapsed into [Error::Validation].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    IncomingPayment,
    OutgoingPayment,
    Quote,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncomingPayment => f.write_str("incoming payment"),
            Self::OutgoingPayment => f.write_str("outgoing payment"),
            Self::Quote => f.write_str("quote"),
        }
    }
}
