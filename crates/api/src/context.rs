use soil_auth::JwtClaims;
use soil_core::UserId;

/// Authenticated caller, taken from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    claims: JwtClaims,
}

impl PrincipalContext {
    pub fn new(claims: JwtClaims) -> Self {
        Self { claims }
    }

    pub fn user_id(&self) -> UserId {
        self.claims.sub
    }

    pub fn claims(&self) -> &JwtClaims {
        &self.claims
    }
}
