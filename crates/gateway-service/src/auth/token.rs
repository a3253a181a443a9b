//! Bearer token verification.
//!
//! Tokens are compact JWS with HS256 signatures over a shared secret. The
//! verifier checks the signature, the expiry, and (when configured) the
//! issuer, then projects the claims into a [`ClaimsPrincipal`]. Every
//! rejection reason is logged but the caller only ever sees
//! `NotAuthenticated`, so responses cannot be used to probe the verifier.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::{ServiceError, ServiceResult};
use gateway_core::config::AuthConfig;

use super::claims::ClaimsPrincipal;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// The claims the gateway consumes; everything else in the token is ignored.
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    pub hdid: Option<String>,
    pub scope: Option<String>,
    pub name: Option<String>,
    pub sub: Option<String>,
    pub exp: Option<i64>,
    pub iss: Option<String>,
}

pub struct TokenVerifier {
    secret: Vec<u8>,
    issuer: Option<String>,
}

impl TokenVerifier {
    /// ## Summary
    /// Builds a verifier from the auth configuration.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` when the token secret is not valid
    /// base64.
    pub fn new(config: &AuthConfig) -> ServiceResult<Self> {
        let secret = STANDARD
            .decode(&config.token_secret)
            .map_err(|_| {
                ServiceError::InvalidConfiguration("auth.token_secret is not base64".to_string())
            })?;
        Ok(Self {
            secret,
            issuer: config.issuer.clone(),
        })
    }

    /// ## Summary
    /// Verifies a compact token and projects its claims.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` for any malformed, forged, expired, or
    /// wrong-issuer token.
    pub fn verify(&self, token: &str) -> ServiceResult<ClaimsPrincipal> {
        let claims = self.decode(token)?;

        let now = chrono::Utc::now().timestamp();
        match claims.exp {
            Some(exp) if exp >= now => {}
            Some(_) => {
                tracing::debug!("Rejected expired bearer token");
                return Err(ServiceError::NotAuthenticated);
            }
            None => {
                tracing::debug!("Rejected bearer token without expiry");
                return Err(ServiceError::NotAuthenticated);
            }
        }

        if let Some(expected) = &self.issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                tracing::debug!(issuer = ?claims.iss, "Rejected bearer token from wrong issuer");
                return Err(ServiceError::NotAuthenticated);
            }
        }

        Ok(ClaimsPrincipal {
            hdid: claims.hdid,
            scope: claims.scope,
            name: claims.name,
            subject: claims.sub,
        })
    }

    fn decode(&self, token: &str) -> ServiceResult<TokenClaims> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            tracing::debug!("Rejected bearer token: not a three-part compact JWS");
            return Err(ServiceError::NotAuthenticated);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| ServiceError::NotAuthenticated)?;
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| {
                ServiceError::InvalidConfiguration("auth.token_secret is empty".to_string())
            })?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            tracing::debug!("Rejected bearer token with invalid signature");
            return Err(ServiceError::NotAuthenticated);
        }

        let header_json = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| ServiceError::NotAuthenticated)?;
        let header: Header =
            serde_json::from_slice(&header_json).map_err(|_| ServiceError::NotAuthenticated)?;
        if header.alg != "HS256" {
            tracing::debug!(alg = header.alg, "Rejected bearer token with unexpected algorithm");
            return Err(ServiceError::NotAuthenticated);
        }

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| ServiceError::NotAuthenticated)?;
        serde_json::from_slice(&payload_json).map_err(|_| ServiceError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            token_secret: STANDARD.encode(SECRET),
            issuer: issuer.map(str::to_string),
        }
    }

    fn mint(claims: &serde_json::Value) -> String {
        mint_with_secret(claims, SECRET)
    }

    fn mint_with_secret(claims: &serde_json::Value, secret: &[u8]) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        let mut mac = HmacSha256::new_from_slice(secret).expect("hmac accepts any key length");
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{header}.{payload}.{signature}")
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn valid_token_yields_principal() {
        let verifier = TokenVerifier::new(&config(None)).expect("valid config");
        let token = mint(&serde_json::json!({
            "hdid": "P123",
            "scope": "user/Patient.read",
            "name": "Pat Test",
            "sub": "subject-1",
            "exp": future_exp(),
        }));

        let principal = verifier.verify(&token).expect("token should verify");
        assert_eq!(principal.hdid.as_deref(), Some("P123"));
        assert_eq!(principal.scope.as_deref(), Some("user/Patient.read"));
        assert_eq!(principal.subject.as_deref(), Some("subject-1"));
    }

    #[test]
    fn forged_signature_is_rejected() {
        let verifier = TokenVerifier::new(&config(None)).expect("valid config");
        let token = mint_with_secret(
            &serde_json::json!({"hdid": "P123", "exp": future_exp()}),
            b"some-other-secret",
        );
        assert!(matches!(
            verifier.verify(&token),
            Err(ServiceError::NotAuthenticated)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = TokenVerifier::new(&config(None)).expect("valid config");
        let token = mint(&serde_json::json!({
            "hdid": "P123",
            "exp": chrono::Utc::now().timestamp() - 60,
        }));
        assert!(matches!(
            verifier.verify(&token),
            Err(ServiceError::NotAuthenticated)
        ));
    }

    #[test]
    fn missing_expiry_is_rejected() {
        let verifier = TokenVerifier::new(&config(None)).expect("valid config");
        let token = mint(&serde_json::json!({"hdid": "P123"}));
        assert!(matches!(
            verifier.verify(&token),
            Err(ServiceError::NotAuthenticated)
        ));
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let verifier =
            TokenVerifier::new(&config(Some("https://sso.example.ca"))).expect("valid config");

        let wrong = mint(&serde_json::json!({
            "exp": future_exp(),
            "iss": "https://evil.example.com",
        }));
        assert!(matches!(
            verifier.verify(&wrong),
            Err(ServiceError::NotAuthenticated)
        ));

        let right = mint(&serde_json::json!({
            "exp": future_exp(),
            "iss": "https://sso.example.ca",
        }));
        assert!(verifier.verify(&right).is_ok());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let verifier = TokenVerifier::new(&config(None)).expect("valid config");
        for bad in ["", "abc", "a.b", "a.b.c.d", "!!.!!.!!"] {
            assert!(
                matches!(verifier.verify(bad), Err(ServiceError::NotAuthenticated)),
                "expected rejection for {bad:?}"
            );
        }
    }
}
