//! Account signup/signin and bearer token issuance.

use std::sync::Arc;

use chrono::Utc;

use soil_auth::{
    JwtClaims, JwtValidator, PasswordHasher, SignIn, SignUp, TokenError, TokenIssuer,
    UserAccount, UserSummary,
};
use soil_core::UserId;
use soil_infra::{DocumentStore, Filter, StoreError};

use crate::app::dto::AuthResponse;
use crate::app::errors::ApiError;
use crate::app::services::records::store_failure;

const EMAIL_TAKEN: &str = "Email already exists.";
const BAD_CREDENTIALS: &str = "Invalid credentials.";

/// Signs and verifies bearer tokens.
pub trait TokenService: TokenIssuer + JwtValidator {}

impl<T: TokenIssuer + JwtValidator> TokenService for T {}

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn DocumentStore<UserAccount>>,
    hasher: PasswordHasher,
    tokens: Arc<dyn TokenService>,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn DocumentStore<UserAccount>>,
        hasher: PasswordHasher,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, ApiError> {
        self.users
            .find_one(Filter::eq("email", email))
            .await
            .map_err(|e| store_failure::<UserAccount>("find_by_email", e))
    }

    /// Returns the confirmation message.
    pub async fn signup(&self, cmd: SignUp) -> Result<String, ApiError> {
        let signup = cmd.validate()?;

        if self.find_by_email(&signup.email).await?.is_some() {
            return Err(ApiError::bad_request(EMAIL_TAKEN));
        }

        let hasher = self.hasher;
        let password = signup.password.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::internal(format!("hash task failed: {e}")))?
            .map_err(|e| ApiError::internal(e.to_string()))?;

        let account = UserAccount::register(UserId::new(), &signup, hash);
        match self.users.insert(account).await {
            Ok(account) => {
                tracing::info!(user_id = %account.id, "account created");
                Ok("User created successfully.".to_string())
            }
            // Lost a race with a concurrent signup for the same address.
            Err(StoreError::Constraint(_)) => Err(ApiError::bad_request(EMAIL_TAKEN)),
            Err(e) => Err(store_failure::<UserAccount>("signup", e)),
        }
    }

    pub async fn signin(&self, cmd: SignIn) -> Result<AuthResponse, ApiError> {
        let (email, password) = cmd.validate()?;

        let Some(account) = self.find_by_email(&email).await? else {
            tracing::info!("signin for unknown account");
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        let hasher = self.hasher;
        let stored = account.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| ApiError::internal(format!("verify task failed: {e}")))?;
        if !verified {
            tracing::info!(user_id = %account.id, "signin with wrong password");
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let issued = self
            .tokens
            .issue(&account, Utc::now())
            .map_err(|e| ApiError::internal(e.to_string()))?;

        Ok(AuthResponse {
            token: issued.token,
            user: UserSummary::from(&account),
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, TokenError> {
        self.tokens.validate(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use soil_auth::Hs256Jwt;
    use soil_infra::{InMemoryDocumentStore, Query};

    fn service() -> (IdentityService, Arc<InMemoryDocumentStore<UserAccount>>) {
        let users = Arc::new(InMemoryDocumentStore::new().with_unique_field("email"));
        let jwt = Hs256Jwt::new(b"test-secret", "soil", "soil-clients", Duration::hours(6));
        let svc = IdentityService::new(users.clone(), PasswordHasher::new(4), Arc::new(jwt));
        (svc, users)
    }

    fn signup(email: &str) -> SignUp {
        SignUp {
            full_name: Some("Ana Reyes".to_string()),
            email: Some(email.to_string()),
            password: Some("hunter22".to_string()),
        }
    }

    fn signin(email: &str, password: &str) -> SignIn {
        SignIn {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn signup_then_signin_issues_a_verifiable_token() {
        let (svc, _) = service();
        let msg = svc.signup(signup("ana@example.com")).await.unwrap();
        assert_eq!(msg, "User created successfully.");

        let auth = svc.signin(signin(" ANA@example.com ", "hunter22")).await.unwrap();
        assert_eq!(auth.user.email, "ana@example.com");
        assert_eq!(auth.user.role.as_str(), "User");

        let claims = svc.verify_token(&auth.token).unwrap();
        assert_eq!(claims.sub, auth.user.id);
        assert_eq!(claims.name, "Ana Reyes");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_a_second_document() {
        let (svc, users) = service();
        svc.signup(signup("ana@example.com")).await.unwrap();

        let err = svc.signup(signup("Ana@Example.com")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Email already exists."));
        assert_eq!(users.find(&Query::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let (svc, users) = service();
        svc.signup(signup("ana@example.com")).await.unwrap();
        let stored = users.find(&Query::all()).await.unwrap().remove(0);
        assert_ne!(stored.password_hash, "hunter22");
        assert!(stored.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn bad_credentials_share_one_message() {
        let (svc, _) = service();
        svc.signup(signup("ana@example.com")).await.unwrap();

        let wrong = svc.signin(signin("ana@example.com", "nope")).await.unwrap_err();
        let unknown = svc.signin(signin("bob@example.com", "hunter22")).await.unwrap_err();
        for err in [wrong, unknown] {
            assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid credentials."));
        }
    }

    #[tokio::test]
    async fn blank_fields_are_bad_requests() {
        let (svc, _) = service();
        let err = svc.signup(SignUp::default()).await.unwrap_err();
        assert_eq!(
            err.public_message(),
            "Full name, email, and password are required."
        );
        let err = svc.signin(SignIn::default()).await.unwrap_err();
        assert_eq!(err.public_message(), "Email and password are required.");
    }
}
