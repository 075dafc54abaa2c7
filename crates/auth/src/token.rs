//! HS256 bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{validate_claims, JwtClaims, TokenError};
use crate::user::UserAccount;

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints bearer tokens for authenticated accounts.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &UserAccount, now: DateTime<Utc>) -> Result<IssuedToken, TokenError>;
}

/// Verifies bearer tokens presented by clients.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Symmetric-key (HMAC-SHA256) issuer and validator.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Hs256Jwt {
    pub fn new(secret: &[u8], issuer: impl Into<String>, audience: impl Into<String>, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // The time window is checked against the caller's clock in `validate_claims`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation
    }
}

impl TokenIssuer for Hs256Jwt {
    fn issue(&self, user: &UserAccount, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = JwtClaims {
            sub: user.id,
            name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use soil_core::UserId;

    fn account() -> UserAccount {
        UserAccount {
            id: UserId::new(),
            full_name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            password_hash: "unused".to_string(),
            role: Role::user(),
            version: 1,
        }
    }

    fn jwt(secret: &str) -> Hs256Jwt {
        Hs256Jwt::new(secret.as_bytes(), "soil", "soil-clients", Duration::hours(6))
    }

    #[test]
    fn issued_token_validates_and_carries_identity() {
        let issuer = jwt("s3cret");
        let user = account();
        let now = Utc::now();

        let issued = issuer.issue(&user, now).unwrap();
        assert_eq!(issued.expires_at, now + Duration::hours(6));

        let claims = issuer.validate(&issued.token, now).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Grace Hopper");
        assert_eq!(claims.email, "grace@example.com");
        assert_eq!(claims.role, Role::user());
        assert_eq!(claims.exp - claims.iat, 6 * 3600);
    }

    #[test]
    fn token_expires_after_ttl() {
        let issuer = jwt("s3cret");
        let now = Utc::now();
        let issued = issuer.issue(&account(), now).unwrap();

        let later = now + Duration::hours(6) + Duration::seconds(1);
        assert_eq!(issuer.validate(&issued.token, later), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_or_audience_is_rejected() {
        let now = Utc::now();
        let issued = jwt("s3cret").issue(&account(), now).unwrap();

        assert!(matches!(
            jwt("other").validate(&issued.token, now),
            Err(TokenError::Invalid(_))
        ));

        let other_aud = Hs256Jwt::new(b"s3cret", "soil", "someone-else", Duration::hours(6));
        assert!(matches!(
            other_aud.validate(&issued.token, now),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(jwt("s3cret").validate("not.a.token", Utc::now()).is_err());
    }
}
