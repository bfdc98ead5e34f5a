//! HTTP message signatures for Open Payments requests.
//!
//! Requests are signed per [RFC 9421](https://www.rfc-editor.org/rfc/rfc9421.html) with the
//! client's Ed25519 key. The signature always covers `@method` and `@target-uri`, the
//! `authorization` header when an access token is attached, and the `content-digest`,
//! `content-length` and `content-type` headers when the request has a body.

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::prelude::*;
use ed25519_dalek::{Signer, SigningKey};
use http::{
    header::{AUTHORIZATION, CONTENT_LENGTH},
    HeaderName, HeaderValue, Request,
};
use sha2::{Digest, Sha512};

use super::resources::Jwk;

pub const SIGNATURE: HeaderName = HeaderName::from_static("signature");
pub const SIGNATURE_INPUT: HeaderName = HeaderName::from_static("signature-input");
pub const CONTENT_DIGEST: HeaderName = HeaderName::from_static("content-digest");

const LABEL: &str = "sig1";

#[async_trait]
pub trait RequestSigner: fmt::Debug {
    /// Identifier of the key, as registered in the client's wallet address key set.
    fn key_id(&self) -> &str;
    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>>;
}

pub struct Ed25519Signer {
    key_id: String,
    key: SigningKey,
}

impl Ed25519Signer {
    pub fn new(key_id: impl Into<String>, key: SigningKey) -> Self {
        Self {
            key_id: key_id.into(),
            key,
        }
    }

    /// The public key, as it must be published at the client's wallet address.
    pub fn jwk(&self) -> Jwk {
        Jwk {
            kid: self.key_id.clone(),
            alg: "EdDSA".into(),
            key_use: Some("sig".into()),
            kty: "OKP".into(),
            crv: "Ed25519".into(),
            x: BASE64_URL_SAFE_NO_PAD.encode(self.key.verifying_key().as_bytes()),
        }
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestSigner for Ed25519Signer {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(payload).to_bytes().to_vec())
    }
}

/// Add `Content-Digest` (for requests with a body), `Signature-Input` and `Signature` headers.
///
/// `created` is the signature creation time in seconds since the Unix epoch.
pub async fn sign_request<S: RequestSigner + ?Sized>(
    request: &mut Request<Vec<u8>>,
    signer: &S,
    created: i64,
) -> Result<()> {
    let has_body = !request.body().is_empty();
    if has_body {
        let digest = BASE64_STANDARD.encode(Sha512::digest(request.body()));
        let length = request.body().len();
        let headers = request.headers_mut();
        headers.insert(
            CONTENT_DIGEST,
            HeaderValue::from_str(&format!("sha-512=:{digest}:"))?,
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    }

    let mut components = vec!["@method", "@target-uri"];
    if request.headers().contains_key(AUTHORIZATION) {
        components.push("authorization");
    }
    if has_body {
        components.extend(["content-digest", "content-length", "content-type"]);
    }

    let params = signature_params(&components, signer.key_id(), created);
    let base = signature_base(request, &components, &params)?;
    let signature = signer
        .sign(base.as_bytes())
        .await
        .context("signer failed")?;

    let headers = request.headers_mut();
    headers.insert(
        SIGNATURE_INPUT,
        HeaderValue::from_str(&format!("{LABEL}={params}"))?,
    );
    headers.insert(
        SIGNATURE,
        HeaderValue::from_str(&format!("{LABEL}=:{}:", BASE64_STANDARD.encode(signature)))?,
    );

    Ok(())
}

fn signature_params(components: &[&str], key_id: &str, created: i64) -> String {
    let components = components
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(" ");
    format!("({components});keyid=\"{key_id}\";created={created}")
}

fn signature_base(request: &Request<Vec<u8>>, components: &[&str], params: &str) -> Result<String> {
    let mut base = String::new();
    for component in components {
        let value = match *component {
            "@method" => request.method().as_str().to_owned(),
            "@target-uri" => request.uri().to_string(),
            header => request
                .headers()
                .get(header)
                .with_context(|| format!("missing `{header}` header"))?
                .to_str()
                .with_context(|| format!("`{header}` header is not visible ASCII"))?
                .trim()
                .to_owned(),
        };
        base.push_str(&format!("\"{component}\": {value}\n"));
    }
    base.push_str(&format!("\"@signature-params\": {params}"));
    Ok(base)
}
