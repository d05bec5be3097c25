//! Opaque signed API keys
//!
//! A key is `base64url(claims-json) . base64url(hmac-sha256 tag)`. The
//! signing key is derived from the configured secret and the fixed context
//! label `"api-key"`, so a key issued here cannot be replayed against any
//! other token kind signed with the same secret. Verification is
//! constant-time via [`Mac::verify_slice`]. There is no expiry.

mod error;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

pub use error::ApiKeyError;

type HmacSha256 = Hmac<Sha256>;

/// Context label that scopes API keys to their purpose
const CONTEXT_LABEL: &[u8] = b"api-key";

/// Claims carried inside an API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyClaims {
    /// Stable user identifier
    pub uid: String,
}

/// Issues and verifies opaque API keys with a symmetric secret
#[derive(Clone)]
pub struct ApiKeySigner {
    signing_key: Vec<u8>,
}

impl ApiKeySigner {
    /// Creates a signer, deriving the context-scoped signing key from the
    /// shared secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(CONTEXT_LABEL);

        Self {
            signing_key: mac.finalize().into_bytes().to_vec(),
        }
    }

    /// Serializes and signs the claims into an opaque token
    ///
    /// # Errors
    ///
    /// Returns `ApiKeyError::Serialization` if the claims cannot be encoded
    pub fn issue(&self, claims: &ApiKeyClaims) -> Result<String, ApiKeyError> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let tag = self.sign(payload.as_bytes());
        Ok(format!("{payload}.{}", URL_SAFE_NO_PAD.encode(tag)))
    }

    /// Returns the original claims if signature and encoding are valid
    ///
    /// # Errors
    ///
    /// Returns `ApiKeyError::InvalidToken` on any malformed, tampered or
    /// wrongly-signed input
    pub fn verify(&self, token: &str) -> Result<ApiKeyClaims, ApiKeyError> {
        let (payload, tag) = token.split_once('.').ok_or(ApiKeyError::InvalidToken)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| ApiKeyError::InvalidToken)?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| ApiKeyError::InvalidToken)?;

        let claims = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| ApiKeyError::InvalidToken)?;
        serde_json::from_slice(&claims).map_err(|_| ApiKeyError::InvalidToken)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.signing_key).expect("HMAC accepts keys of any length")
    }
}
