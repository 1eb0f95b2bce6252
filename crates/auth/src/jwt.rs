//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// HMAC-SHA256 signed tokens with a shared secret.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window lives in `issued_at`/`expires_at`, checked by
        // `validate_claims`; there is no numeric `exp` to require.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|_| TokenValidationError::Invalid)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use sitebook_core::{TenantId, UserId};

    fn token(secret: &str, claims: &JwtClaims) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret.as_bytes()))
            .unwrap()
    }

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            tenant_id: TenantId::new(),
            roles: vec![Role::new(Role::ADMIN)],
            issued_at: now,
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn accepts_tokens_signed_with_the_secret() {
        let now = Utc::now();
        let c = claims(now);
        let validator = Hs256JwtValidator::new("s3cret");
        assert_eq!(validator.validate(&token("s3cret", &c), now), Ok(c));
    }

    #[test]
    fn rejects_foreign_signatures_and_garbage() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new("s3cret");
        assert_eq!(
            validator.validate(&token("other", &claims(now)), now),
            Err(TokenValidationError::Invalid)
        );
        assert_eq!(validator.validate("not-a-jwt", now), Err(TokenValidationError::Invalid));
    }

    #[test]
    fn rejects_expired_tokens() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new("s3cret");
        let t = token("s3cret", &claims(now - Duration::hours(1)));
        assert_eq!(validator.validate(&t, now), Err(TokenValidationError::Expired));
    }
}
