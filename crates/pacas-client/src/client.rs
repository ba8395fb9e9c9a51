//! HTTP client for the PacasHomes backend API.
//!
//! Wraps `reqwest` with the backend's status conventions, session cookie
//! handling, and typed bodies. Search calls retry transient failures; every
//! other call is sent once.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use pacas_core::{AppConfig, Favorite, SearchParams, SearchResponse};
use reqwest::header::{COOKIE, RETRY_AFTER, SET_COOKIE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::retry::retry_with_backoff;
use crate::types::{
    Ack, EmailRequest, ErrorBody, FavoriteCheckResponse, FavoritesResponse, LeadRequest,
    LoginRequest, NextPageRequest, PropertyUrlRequest, RegistrationRequest, UserInfo, UserStatus,
    VerifyCodeRequest,
};

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Client for the PacasHomes backend.
///
/// Use [`PacasClient::new`] with the loaded [`AppConfig`], or
/// [`PacasClient::with_base_url`] to point at a mock server in tests.
pub struct PacasClient {
    client: Client,
    base_url: Url,
    session_cookie: RwLock<Option<String>>,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl PacasClient {
    /// Builds a client from the runtime configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ClientError::InvalidBaseUrl`] for a malformed base URL.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Ok(Self::with_base_url(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_retry(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Creates a client with a custom base URL and no retries.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so joining `api/...` appends to the
        // configured path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            session_cookie: RwLock::new(None),
            max_retries: 0,
            retry_backoff_base_ms: 0,
        })
    }

    /// Sets the retry budget applied to search calls.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Replaces the session cookie sent with every request.
    pub fn set_session_cookie(&self, cookie: Option<String>) {
        *self
            .session_cookie
            .write()
            .unwrap_or_else(PoisonError::into_inner) = cookie;
    }

    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.session_cookie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs a first-page search against the endpoint for `params.site`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] when the backend rejects the parameters.
    /// - [`ClientError::UnexpectedStatus`] or [`ClientError::Http`] once
    ///   retries are exhausted.
    /// - [`ClientError::Deserialize`] if the body is not a search response.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, ClientError> {
        let path = params.site.search_path();
        tracing::debug!(site = %params.site, location = %params.location, "searching");
        retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            self.post_json(path, params)
        })
        .await
    }

    /// Fetches backend page `page` for an earlier search.
    ///
    /// # Errors
    ///
    /// Same as [`PacasClient::search`].
    pub async fn next_page(
        &self,
        params: &SearchParams,
        page: u32,
    ) -> Result<SearchResponse, ClientError> {
        let body = NextPageRequest {
            search_params: params,
            current_page: page,
        };
        tracing::debug!(page, "fetching next backend page");
        retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            self.post_json("/api/search/next-page", &body)
        })
        .await
    }

    /// Reports whether the stored session cookie belongs to a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] or [`ClientError::Deserialize`] on
    /// transport or body failures.
    pub async fn current_user(&self) -> Result<UserStatus, ClientError> {
        self.get_json("/api/user").await
    }

    /// Signs in and keeps the returned session cookie for later calls.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] for a 400 (e.g. wrong password).
    /// - [`ClientError::Rejected`] when the backend answers `success: false`.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserInfo, ClientError> {
        let response = self
            .request(Method::POST, "/api/login")?
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let response = check_status(response).await?;
        let cookie = session_cookie_from(&response);
        let ack = ack_result(parse_body::<Ack>(response, "login").await?)?;

        if cookie.is_some() {
            self.set_session_cookie(cookie);
        }
        tracing::info!(email, "signed in");
        Ok(ack.user.unwrap_or_else(|| UserInfo {
            email: email.to_owned(),
            ..UserInfo::default()
        }))
    }

    /// Ends the backend session and forgets the cookie.
    ///
    /// The local cookie is cleared even when the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error, after clearing the cookie.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self
            .post_json::<_, Ack>("/api/logout", &serde_json::json!({}))
            .await
            .and_then(ack_result);
        self.set_session_cookie(None);
        result.map(|_| ())
    }

    /// Asks the backend to email a six-digit verification code.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] or [`ClientError::Rejected`] when the
    /// backend refuses the address.
    pub async fn send_verification_code(&self, email: &str) -> Result<(), ClientError> {
        let ack: Ack = self
            .post_json("/api/send-verification-code", &EmailRequest { email })
            .await?;
        ack_result(ack).map(|_| ())
    }

    /// Checks a verification code with the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] or [`ClientError::Rejected`] for a wrong
    /// or expired code.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<(), ClientError> {
        let ack: Ack = self
            .post_json("/api/verify-code", &VerifyCodeRequest { email, code })
            .await?;
        ack_result(ack).map(|_| ())
    }

    /// Creates the account. Captures a session cookie if the backend sets one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] or [`ClientError::Rejected`] when the
    /// backend refuses the registration.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<UserInfo, ClientError> {
        let response = self
            .request(Method::POST, "/api/register")?
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;
        let cookie = session_cookie_from(&response);
        let ack = ack_result(parse_body::<Ack>(response, "register").await?)?;

        if cookie.is_some() {
            self.set_session_cookie(cookie);
        }
        tracing::info!(email = %request.email, "account created");
        Ok(ack.user.unwrap_or_else(|| UserInfo {
            email: request.email.clone(),
            name: Some(request.name.clone()),
            phone: Some(request.phone.clone()),
            email_verified: true,
        }))
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotSignedIn`] without a valid session.
    pub async fn favorites(&self) -> Result<Vec<Favorite>, ClientError> {
        let body: FavoritesResponse = self.get_json("/api/favorites").await?;
        Ok(body.favorites)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotSignedIn`] without a valid session, or
    /// [`ClientError::Rejected`] if the backend refuses the favorite.
    pub async fn add_favorite(&self, favorite: &Favorite) -> Result<(), ClientError> {
        let ack: Ack = self.post_json("/api/favorites/add", favorite).await?;
        ack_result(ack).map(|_| ())
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotSignedIn`] without a valid session.
    pub async fn remove_favorite(&self, property_url: &str) -> Result<(), ClientError> {
        let ack: Ack = self
            .post_json("/api/favorites/remove", &PropertyUrlRequest { property_url })
            .await?;
        ack_result(ack).map(|_| ())
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotSignedIn`] without a valid session.
    pub async fn is_favorite(&self, property_url: &str) -> Result<bool, ClientError> {
        let body: FavoriteCheckResponse = self
            .post_json("/api/favorites/check", &PropertyUrlRequest { property_url })
            .await?;
        Ok(body.is_favorite)
    }

    /// Records a lead. Sent once; callers decide what to do with failures.
    ///
    /// # Errors
    ///
    /// Returns any transport, status, or rejection error.
    pub async fn capture_lead(&self, lead: &LeadRequest) -> Result<(), ClientError> {
        let ack: Ack = self.post_json("/api/capture-lead", lead).await?;
        ack_result(ack).map(|_| ())
    }

    /// Joins an absolute API path (`/api/...`) onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Starts a request carrying the session cookie, if any.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%method, %url, "backend request");
        let builder = self.client.request(method, url);
        Ok(match self.session_cookie() {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path)?.send().await?;
        let response = check_status(response).await?;
        parse_body(response, path).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        let response = check_status(response).await?;
        parse_body(response, path).await
    }
}

/// Maps non-2xx answers onto [`ClientError`] variants.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::UNAUTHORIZED => Err(ClientError::NotSignedIn),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            Err(ClientError::RateLimited { retry_after_secs })
        }
        StatusCode::BAD_REQUEST => {
            let message = error_message(response)
                .await
                .unwrap_or_else(|| "the backend rejected the request".to_owned());
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
        _ => {
            let url = response.url().to_string();
            Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url,
                message: error_message(response).await,
            })
        }
    }
}

/// Error text from a `{error, message, details}` body, if the body is one.
async fn error_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
}

async fn parse_body<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, ClientError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ClientError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Turns `success: false` into [`ClientError::Rejected`].
fn ack_result(ack: Ack) -> Result<Ack, ClientError> {
    if ack.success == Some(false) {
        let message = ack
            .error
            .or(ack.message)
            .unwrap_or_else(|| "the backend rejected the request".to_owned());
        return Err(ClientError::Rejected(message));
    }
    Ok(ack)
}

/// `name=value` pairs from every `Set-Cookie` header, joined for a `Cookie` header.
fn session_cookie_from(response: &Response) -> Option<String> {
    let pairs: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
