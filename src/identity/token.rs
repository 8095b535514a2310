//! Identity token issuance.
//!
//! Every proxied request carries a freshly signed HS256 JWT. Tokens are
//! issue-only: they carry no expiry and the gateway never looks at them again.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenConfig;

/// Development signing secret shipped with the gateway.
///
/// This value is public and therefore offers no protection. It is kept as the
/// default so that deployments which never configured a secret keep issuing
/// the same tokens; set `token.secret`, `--jwt-secret` or `GATEWAY_JWT_SECRET`
/// in any real deployment.
pub const DEFAULT_SIGNING_SECRET: &str = "a9ddbcaba8c0ac1a0a812dc0c2f08514b23f2db0a68343cb8199ebb38a6d91e4ebfb378e22ad39c2d01 d0b4ec9c34aa91056862ddace3fbbd6852ee60c36acbf";

/// Claims carried by an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Unique token id (UUID v4).
    pub jti: String,
    /// Subject the token asserts.
    pub user: String,
    /// Issuance date, `YYYY-MM-DD`.
    ///
    /// Taken from the same UTC instant as `iat`, not the host's local
    /// calendar, so near midnight it can differ from the local date.
    pub date: String,
}

impl Claims {
    /// Build a fresh claim set for `subject` at `now`.
    pub fn new(subject: &str, now: DateTime<Utc>) -> Self {
        Self {
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            user: subject.to_string(),
            date: now.date_naive().to_string(),
        }
    }
}

/// Signs identity tokens with a symmetric key.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    subject: String,
}

impl TokenIssuer {
    /// Create an issuer from a secret and a default subject.
    pub fn new(secret: &str, subject: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            subject: subject.into(),
        }
    }

    /// Create an issuer from the token section of the configuration.
    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(&config.secret, config.subject.clone())
    }

    /// Issue a token asserting `subject`.
    pub fn issue(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims::new(subject, Utc::now());
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        tracing::trace!(jti = %claims.jti, user = %claims.user, "Issued identity token");
        Ok(token)
    }

    /// Issue a token for the configured subject.
    pub fn issue_default(&self) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(&self.subject)
    }

    /// Check the signature of `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::from_config(&TokenConfig::default())
    }
}
