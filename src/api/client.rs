use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::error::ApiError;
use super::models::{
    CommentPayload, CreateOfferPayload, LoginRequest, Market, MarketId, NewProduct,
    OfferDetails, OfferId, OfferSummary, Page, Product, ProductId, ProductSearch,
    RefreshRequest, ResetPasswordRequest, SearchResults, Tokens,
};
use crate::catalog::MAX_SEARCH_RESULTS;

/// `/offer/create` answers with either the bare id or `{ "id": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedOffer {
    Wrapped { id: OfferId },
    Bare(OfferId),
}

impl CreatedOffer {
    fn into_id(self) -> OfferId {
        match self {
            Self::Wrapped { id } | Self::Bare(id) => id,
        }
    }
}

/// HTTP client for the agent ordering API.
///
/// Holds the session tokens in memory. Persisting them between runs is up
/// to the caller (see [`ApiClient::tokens`] / [`ApiClient::with_tokens`]).
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: RwLock<Option<Tokens>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!("base url must be http(s): {base_url}")));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            tokens: RwLock::new(None),
        })
    }

    /// Resume a session from previously saved tokens.
    pub fn with_tokens(self, tokens: Tokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
            ..self
        }
    }

    /// Current tokens, if logged in.
    pub async fn tokens(&self) -> Option<Tokens> {
        self.tokens.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.read().await.as_ref() {
            Some(tokens) => request.bearer_auth(&tokens.access_token),
            None => request,
        }
    }

    /// Send an authenticated request. On 401 the access token is refreshed
    /// once and the request replayed once.
    async fn send<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let response = self.authorized(build(&self.http)).await.send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        debug!("access token rejected, refreshing");
        if !self.refresh().await? {
            self.clear_session().await;
            return Err(ApiError::Unauthorized);
        }

        let response = self.authorized(build(&self.http)).await.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("still unauthorized after refresh, dropping session");
            self.clear_session().await;
            return Err(ApiError::Unauthorized);
        }
        check_status(response).await
    }

    /// Swap the refresh token for a new pair. `Ok(false)` when there is no
    /// refresh token or the server refused it.
    async fn refresh(&self) -> Result<bool, ApiError> {
        let Some(refresh_token) = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.refresh_token.clone())
        else {
            return Ok(false);
        };

        let response = self
            .http
            .post(self.url("auth/refresh"))
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "token refresh refused");
            return Ok(false);
        }

        let tokens: Tokens = response.json().await?;
        *self.tokens.write().await = Some(tokens);
        info!("session refreshed");
        Ok(true)
    }

    async fn clear_session(&self) {
        *self.tokens.write().await = None;
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    #[instrument(skip(self, password))]
    pub async fn login(&self, phone: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("auth/login"))
            .json(&LoginRequest { phone, password })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::InvalidCredentials);
        }

        let tokens: Tokens = check_status(response).await?.json().await?;
        *self.tokens.write().await = Some(tokens);
        info!("logged in");
        Ok(())
    }

    /// Ask the backend to send reset instructions to the phone number.
    #[instrument(skip(self))]
    pub async fn reset_password(&self, phone: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("auth/reset-password"))
            .json(&ResetPasswordRequest { phone })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Log out. The local session is dropped even if the call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.send(|http| http.get(self.url("auth/logout"))).await;
        self.clear_session().await;
        result.map(|_| ())
    }

    // =========================================================================
    // PRODUCTS
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_products(&self, page: u32, limit: u32) -> Result<Page<Product>, ApiError> {
        let response = self
            .send(|http| {
                http.get(self.url("products/all"))
                    .query(&[("limit", limit), ("page", page)])
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Look up catalog entries by barcode or name. Keeps the first few hits.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &ProductSearch) -> Result<Vec<Product>, ApiError> {
        let response = self
            .send(|http| http.post(self.url("products/details")).json(query))
            .await?;
        let mut results: SearchResults = response.json().await?;
        results.data.truncate(MAX_SEARCH_RESULTS);
        Ok(results.data)
    }

    #[instrument(skip(self), fields(name = %product.name))]
    pub async fn add_product(&self, product: &NewProduct) -> Result<(), ApiError> {
        let response = self
            .send(|http| http.post(self.url("products/add")).json(product))
            .await?;
        if response.status() != StatusCode::CREATED {
            debug!(status = %response.status(), "product add returned non-201 success");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %product.id))]
    pub async fn update_product(&self, product: &Product) -> Result<(), ApiError> {
        self.send(|http| http.put(self.url("products/update")).json(product))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.send(|http| http.delete(self.url(&format!("products/{id}"))))
            .await?;
        Ok(())
    }

    // =========================================================================
    // MARKETS & OFFERS
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_markets(&self) -> Result<Vec<Market>, ApiError> {
        let response = self.send(|http| http.get(self.url("offer/markets"))).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    pub async fn list_offers(
        &self,
        market_id: &MarketId,
        page: u32,
        limit: u32,
    ) -> Result<Page<OfferSummary>, ApiError> {
        let response = self
            .send(|http| {
                http.get(self.url(&format!("offer/all/{market_id}")))
                    .query(&[("limit", limit), ("page", page)])
            })
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    pub async fn get_offer(&self, offer_id: &OfferId) -> Result<OfferDetails, ApiError> {
        let response = self
            .send(|http| http.get(self.url(&format!("offer/{offer_id}"))))
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, payload), fields(market = %payload.market_id, lines = payload.items.len()))]
    pub async fn create_offer(&self, payload: &CreateOfferPayload) -> Result<OfferId, ApiError> {
        let response = self
            .send(|http| http.post(self.url("offer/create")).json(payload))
            .await?;
        let created: CreatedOffer = response.json().await?;
        Ok(created.into_id())
    }

    #[instrument(skip(self, payload), fields(offer = %payload.offer_id))]
    pub async fn attach_comment(&self, payload: &CommentPayload) -> Result<(), ApiError> {
        self.send(|http| http.post(self.url("offer/comment")).json(payload))
            .await?;
        Ok(())
    }
}

/// Map non-success statuses onto [`ApiError`].
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::BAD_REQUEST => ApiError::BadRequest(body),
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::SessionExpired,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        _ => ApiError::Status { status, body },
    })
}
