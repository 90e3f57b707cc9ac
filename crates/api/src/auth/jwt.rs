//! RS256 token validation with realm signing keys.
//!
//! The identity provider publishes its signing keys as a JWKS document at
//! `{issuer}/realms/{realm}/protocol/openid-connect/certs`. Keys are
//! fetched once at startup (no rotation handling); tokens are then
//! validated locally by `kid` lookup.

use std::collections::HashMap;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// JWKS document published by the identity provider.
#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

/// A single JSON Web Key. Only RSA signing keys are used.
#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    #[serde(rename = "use")]
    key_use: Option<String>,
    kid: String,
    n: Option<String>,
    e: Option<String>,
}

/// Claims extracted from a validated access token.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject identifier assigned by the identity provider.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp), validated on decode.
    pub exp: i64,
    pub preferred_username: Option<String>,
    pub email: Option<String>,
}

/// Errors from key loading and token validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to fetch JWKS: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("no valid signing keys found in realm")]
    NoSigningKeys,

    #[error("token has no kid header")]
    MissingKid,

    #[error("no public key for kid {0}")]
    UnknownKid(String),

    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Realm signing keys, indexed by `kid`.
pub struct KeyStore {
    keys: HashMap<String, DecodingKey>,
}

impl KeyStore {
    /// Fetch the realm's JWKS and build decoding keys from every RSA
    /// signing key in it.
    pub async fn fetch(issuer_url: &str, realm: &str) -> Result<Self, AuthError> {
        let jwks_url = format!("{issuer_url}/realms/{realm}/protocol/openid-connect/certs");

        let jwks: Jwks = reqwest::get(&jwks_url).await?.json().await?;

        let mut keys = HashMap::new();
        for key in jwks.keys {
            if key.kty != "RSA" || key.key_use.as_deref() != Some("sig") {
                continue;
            }
            let (Some(n), Some(e)) = (&key.n, &key.e) else {
                continue;
            };
            match DecodingKey::from_rsa_components(n, e) {
                Ok(decoding_key) => {
                    keys.insert(key.kid.clone(), decoding_key);
                }
                Err(e) => {
                    tracing::warn!(kid = %key.kid, error = %e, "skipping unparseable signing key");
                }
            }
        }

        if keys.is_empty() {
            return Err(AuthError::NoSigningKeys);
        }

        tracing::info!(count = keys.len(), "realm signing keys loaded");
        Ok(Self { keys })
    }

    /// Validate an RS256 access token and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(AuthError::MissingKid)?;

        let key = self
            .keys
            .get(&kid)
            .ok_or_else(|| AuthError::UnknownKid(kid.clone()))?;

        let validation = Validation::new(Algorithm::RS256);
        let data = decode::<Claims>(token, key, &validation)?;
        Ok(data.claims)
    }
}
