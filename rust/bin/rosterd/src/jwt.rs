//! JWT bearer-token authentication.
//!
//! Validates `Authorization: Bearer <token>` and resolves the subject to
//! a numeric user id. Token issuance lives with the external identity
//! provider; this server only verifies.

use axum::http::HeaderMap;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use roster_core::{Authenticator, ServiceError};

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: numeric user id, as a string.
    pub sub: String,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<i64, ServiceError> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ServiceError::Unauthorized("missing authorization token".into()))?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))?;

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| ServiceError::Unauthorized("token subject is not a user id".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: now_unix() + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now_unix() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {}", token).parse().unwrap());
        headers
    }

    #[test]
    fn valid_token_resolves_user_id() {
        let auth = JwtAuthenticator::new("s3cret");
        let user = auth.authenticate(&bearer(&token("s3cret", "42"))).unwrap();
        assert_eq!(user, 42);
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let auth = JwtAuthenticator::new("s3cret");
        let err = auth.authenticate(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let auth = JwtAuthenticator::new("s3cret");
        let err = auth
            .authenticate(&bearer(&token("other", "42")))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn non_numeric_subject_is_unauthorized() {
        let auth = JwtAuthenticator::new("s3cret");
        let err = auth
            .authenticate(&bearer(&token("s3cret", "root")))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
