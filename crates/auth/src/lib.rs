//! `soil-auth` — identity boundary.
//!
//! Password hashing, bearer-token issuance/verification, the user account
//! document, and the client-side session state provider. Decoupled from HTTP
//! and from any particular store.

pub mod claims;
pub mod password;
pub mod roles;
pub mod session;
pub mod token;
pub mod user;

pub use claims::{validate_claims, JwtClaims, TokenError};
pub use password::{PasswordError, PasswordHasher};
pub use roles::Role;
pub use session::{AuthStateProvider, CredentialStorage, Identity};
pub use token::{Hs256Jwt, IssuedToken, JwtValidator, TokenIssuer};
pub use user::{normalize_email, SignIn, SignUp, UserAccount, UserSummary, ValidSignUp};
