//! Operator bearer tokens.
//!
//! The import trigger only needs to know who is calling and whether they
//! are an admin, so that is all a token carries besides expiry and issuer.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct OperatorClaims {
    sub: String,
    #[serde(default)]
    is_admin: bool,
    exp: i64,
    iss: String,
}

/// Caller resolved from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub subject: String,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Sign a token for `subject` that expires after `valid_for`.
    pub fn issue(&self, subject: &str, is_admin: bool, valid_for: Duration) -> Result<String> {
        let claims = OperatorClaims {
            sub: subject.to_string(),
            is_admin,
            exp: (Utc::now() + valid_for).timestamp(),
            iss: self.issuer.clone(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Check signature, expiry and issuer.
    pub fn operator(&self, token: &str) -> Result<Operator> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<OperatorClaims>(token, &self.decoding_key, &validation)?.claims;
        Ok(Operator {
            subject: claims.sub,
            is_admin: claims.is_admin,
        })
    }
}
