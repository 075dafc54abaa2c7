use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use soil_auth::{JwtClaims, SignIn, SignUp, UserSummary};
use soil_core::ExpectedVersion;
use soil_financial::{CreateTransaction, UpdateTransaction};
use soil_purchasing::{PurchaseRequestDraft, StockQuantities};
use soil_sales::{CreateSale, UpdateSale};

use crate::app::errors::ApiError;

/// `Json<T>` whose rejection is a `{"message"}` 400 instead of axum's plain-text body.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// `Query<T>` with the same `{"message"}` rejection as [`JsonBody`].
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<SignUpRequest> for SignUp {
    fn from(r: SignUpRequest) -> Self {
        SignUp {
            full_name: r.full_name,
            email: r.email,
            password: r.password,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<SignInRequest> for SignIn {
    fn from(r: SignInRequest) -> Self {
        SignIn {
            email: r.email,
            password: r.password,
        }
    }
}

/// Body of `POST /api/financial` and `PUT /api/financial/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRequest {
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Decimal,
    pub transaction_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub transaction_type: Option<String>,
    pub notes: Option<String>,
    /// Version the client read; enables compare-and-swap on update.
    pub version: Option<u64>,
}

impl TransactionRequest {
    pub fn into_create(self) -> CreateTransaction {
        CreateTransaction {
            description: self.description,
            category: self.category,
            amount: self.amount,
            transaction_date: self.transaction_date,
            payment_method: self.payment_method,
            transaction_type: self.transaction_type,
            notes: self.notes,
        }
    }

    pub fn into_update(self) -> (UpdateTransaction, ExpectedVersion) {
        let expected = ExpectedVersion::from_optional(self.version);
        let cmd = UpdateTransaction {
            description: self.description,
            category: self.category,
            amount: self.amount,
            transaction_date: self.transaction_date,
            payment_method: self.payment_method,
            transaction_type: self.transaction_type,
            notes: self.notes,
        };
        (cmd, expected)
    }
}

/// Body of `POST /api/sales` and `PUT /api/sales/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleRequest {
    pub product_name: Option<String>,
    pub quantity: i64,
    pub amount: Decimal,
    pub category: Option<String>,
    pub description: Option<String>,
    pub sale_date: Option<DateTime<Utc>>,
    pub version: Option<u64>,
}

impl SaleRequest {
    pub fn into_create(self) -> CreateSale {
        CreateSale {
            product_name: self.product_name,
            quantity: self.quantity,
            amount: self.amount,
            category: self.category,
            description: self.description,
            sale_date: self.sale_date,
        }
    }

    pub fn into_update(self) -> (UpdateSale, ExpectedVersion) {
        let expected = ExpectedVersion::from_optional(self.version);
        let cmd = UpdateSale {
            product_name: self.product_name,
            quantity: self.quantity,
            amount: self.amount,
            category: self.category,
            description: self.description,
            sale_date: self.sale_date,
        };
        (cmd, expected)
    }
}

/// Body of the purchase-request endpoints. `id` is only read by `savepr`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseRequestBody {
    pub id: Option<String>,
    #[serde(flatten)]
    pub quantities: StockQuantities,
    pub total_amount: Decimal,
    pub request_date: Option<DateTime<Utc>>,
    pub version: Option<u64>,
}

impl PurchaseRequestBody {
    /// The id, if the client sent a non-blank one.
    pub fn target_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn into_draft(self) -> (PurchaseRequestDraft, ExpectedVersion) {
        let expected = ExpectedVersion::from_optional(self.version);
        let draft = PurchaseRequestDraft {
            quantities: self.quantities,
            total_amount: self.total_amount,
            request_date: self.request_date,
        };
        (draft, expected)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub query: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&JwtClaims> for WhoAmIResponse {
    fn from(c: &JwtClaims) -> Self {
        Self {
            id: c.sub.to_string(),
            name: c.name.clone(),
            email: c.email.clone(),
            role: c.role.as_str().to_string(),
        }
    }
}
