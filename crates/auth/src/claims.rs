use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use soil_core::UserId;

use crate::Role;

/// Claims carried by a bearer token.
///
/// Timestamps are Unix seconds (`iat`/`exp`) as registered JWT claims require.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the account id.
    pub sub: UserId,

    /// Display name.
    pub name: String,

    pub email: String,

    pub role: Role,

    pub iss: String,

    pub aud: String,

    /// Issued-at, Unix seconds.
    pub iat: i64,

    /// Expiry, Unix seconds.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Check the claim time window against `now`.
///
/// Signature, issuer and audience are verified by the decoder; this covers
/// what the decoder does not (`iat` in the future, inverted windows).
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn claims(iat: i64, exp: i64) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::user(),
            iss: "soil".to_string(),
            aud: "soil-clients".to_string(),
            iat,
            exp,
        }
    }

    #[test]
    fn window_checks() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let t = now.timestamp();

        assert_eq!(validate_claims(&claims(t - 10, t + 10), now), Ok(()));
        assert_eq!(validate_claims(&claims(t - 20, t), now), Err(TokenError::Expired));
        assert_eq!(validate_claims(&claims(t + 5, t + 10), now), Err(TokenError::NotYetValid));
        assert_eq!(validate_claims(&claims(t, t), now), Err(TokenError::InvalidTimeWindow));
    }
}
