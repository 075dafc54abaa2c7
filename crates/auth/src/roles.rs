use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role carried in identity claims.
///
/// Roles are opaque strings at this layer. Nothing in the API gates on them
/// yet; they are issued in tokens and surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const USER: &'static str = "User";
    pub const ADMIN: &'static str = "Admin";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Role assigned to every new account.
    pub fn user() -> Self {
        Self(Cow::Borrowed(Self::USER))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::user()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
