//! Tracks a single grant from request to revocation.
//!
//! ```text
//! request ──► Pending ──continue_with──► Granted ──rotate──► Granted
//!               │                           │
//!               └──cancel──► Cancelled      └──revoke──► Revoked
//! ```
//!
//! Each operation checks the current state before touching the network and fails with
//! [Error::StateMismatch] when called out of order.

use tracing::{debug, info};
use url::Url;

use crate::{
    core::grant::{AccessToken, Grant, GrantRequest, GrantResponse, GrantStatus, PendingGrant},
    error::{Error, Result},
};

use super::{grant::GrantRoutes, token::TokenRoutes};

#[derive(Debug, Clone)]
enum GrantState {
    Pending(PendingGrant),
    Granted(Grant),
    Revoked,
    Cancelled,
}

impl GrantState {
    fn status(&self) -> GrantStatus {
        match self {
            Self::Pending(_) => GrantStatus::Pending,
            Self::Granted(_) => GrantStatus::Granted,
            Self::Revoked => GrantStatus::Revoked,
            Self::Cancelled => GrantStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GrantNegotiation {
    grant: GrantRoutes,
    token: TokenRoutes,
    state: GrantState,
}

impl GrantNegotiation {
    pub(crate) async fn request(
        grant: GrantRoutes,
        token: TokenRoutes,
        auth_server: &Url,
        request: &GrantRequest,
    ) -> Result<Self> {
        let state = match grant.request(auth_server, request).await? {
            GrantResponse::Pending(pending) => {
                debug!(redirect = %pending.interact.redirect, "grant requires interaction");
                GrantState::Pending(pending)
            }
            GrantResponse::Granted(granted) => GrantState::Granted(granted),
        };

        Ok(Self {
            grant,
            token,
            state,
        })
    }

    pub fn status(&self) -> GrantStatus {
        self.state.status()
    }

    /// The interaction the end-user must complete, while the grant is pending.
    pub fn pending(&self) -> Option<&PendingGrant> {
        match &self.state {
            GrantState::Pending(pending) => Some(pending),
            _ => None,
        }
    }

    /// The issued grant, once granted.
    pub fn grant(&self) -> Option<&Grant> {
        match &self.state {
            GrantState::Granted(grant) => Some(grant),
            _ => None,
        }
    }

    /// Continue a pending grant, with the `interact_ref` from the finish redirect or `None` to
    /// poll.
    ///
    /// The negotiation stays pending when the call fails.
    pub async fn continue_with(&mut self, interact_ref: Option<&str>) -> Result<Grant> {
        let GrantState::Pending(pending) = &self.state else {
            return Err(self.mismatch(GrantStatus::Pending));
        };

        let grant = self
            .grant
            .continue_grant(&pending.continue_, interact_ref)
            .await?;
        info!("grant issued");
        self.state = GrantState::Granted(grant.clone());
        Ok(grant)
    }

    /// Rotate the access token, replacing it in the tracked grant.
    pub async fn rotate(&mut self) -> Result<AccessToken> {
        let actual = self.status();
        let GrantState::Granted(grant) = &mut self.state else {
            return Err(Error::StateMismatch {
                expected: GrantStatus::Granted,
                actual,
            });
        };

        let token = self.token.rotate(&grant.access_token).await?;
        grant.access_token = token.clone();
        Ok(token)
    }

    pub async fn revoke(&mut self) -> Result<()> {
        let GrantState::Granted(grant) = &self.state else {
            return Err(self.mismatch(GrantStatus::Granted));
        };

        self.token.revoke(&grant.access_token).await?;
        info!("access token revoked");
        self.state = GrantState::Revoked;
        Ok(())
    }

    pub async fn cancel(&mut self) -> Result<()> {
        let GrantState::Pending(pending) = &self.state else {
            return Err(self.mismatch(GrantStatus::Pending));
        };

        self.grant.cancel(&pending.continue_).await?;
        info!("pending grant cancelled");
        self.state = GrantState::Cancelled;
        Ok(())
    }

    fn mismatch(&self, expected: GrantStatus) -> Error {
        Error::StateMismatch {
            expected,
            actual: self.status(),
        }
    }
}
