//! Request and response bodies for the account, favorites, and lead endpoints.
//!
//! Search bodies live in `pacas_core::search`; everything here is specific to
//! talking to the backend.

use pacas_core::{Favorite, SearchParams};
use serde::{Deserialize, Serialize};

/// Account details as the backend reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

/// Answer from `GET /api/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserStatus {
    #[serde(default, alias = "authenticated")]
    pub logged_in: bool,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

/// Generic acknowledgement returned by most POST endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

/// Error body carried by non-2xx answers.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error.or(self.message).or(self.details)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NextPageRequest<'a> {
    pub search_params: &'a SearchParams,
    pub current_page: u32,
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyCodeRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PropertyUrlRequest<'a> {
    pub property_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavoritesResponse {
    #[serde(default)]
    pub favorites: Vec<Favorite>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavoriteCheckResponse {
    #[serde(default)]
    pub is_favorite: bool,
}

/// Body of `POST /api/register`.
#[derive(Clone, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub code: String,
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("code", &self.code)
            .finish()
    }
}

/// Why a lead was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadType {
    PropertyView,
    AccountCreation,
}

/// Body of `POST /api/capture-lead`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRequest {
    pub email: String,
    pub property_url: String,
    pub property_title: String,
    pub property_price: String,
    pub site: String,
    pub phone: String,
    pub name: String,
    pub wants_callback: bool,
    pub lead_type: LeadType,
}
