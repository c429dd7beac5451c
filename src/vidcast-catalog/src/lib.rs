//! HTTP client for the remote video catalog.
//!
//! The client is transport only: it fetches and deserializes, and reports
//! failures as [`CatalogError`]. Whether a failure is hard (abort the
//! invocation) or soft (proceed without the data) is the caller's policy.

pub mod models;

use models::{
    Category, CategoryListResponse, CategoryResponse, Language, LanguagesResponse, MediaItem,
    MediaItemResponse, SearchHit, SearchResponse,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use vidcast_core::LanguageCode;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Search result pages are capped server-side anyway; ask for one page.
const SEARCH_LIMIT: &str = "24";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("authentication rejected by {url}")]
    Auth { url: String },
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("invalid catalog url: {0}")]
    InvalidUrl(String),
}

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    token_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str, token_url: &str) -> Result<Self, CatalogError> {
        let base_url =
            Url::parse(base_url).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        let token_url =
            Url::parse(token_url).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Http {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url,
            token_url,
        })
    }

    /// Top-level category listing for a language.
    pub async fn category_list(&self, lang: &LanguageCode) -> Result<Vec<Category>, CatalogError> {
        let mut url = self.endpoint(&["categories", lang.as_ref()])?;
        url.query_pairs_mut().append_pair("detailed", "true");
        let response: CategoryListResponse = self.get_json(url, None).await?;
        Ok(response.categories)
    }

    /// One category with its subcategories and media.
    pub async fn category(
        &self,
        lang: &LanguageCode,
        key: &str,
    ) -> Result<Category, CatalogError> {
        let mut url = self.endpoint(&["categories", lang.as_ref(), key])?;
        url.query_pairs_mut().append_pair("detailed", "1");
        let response: CategoryResponse = self.get_json(url, None).await?;
        Ok(response.category)
    }

    /// A single media item in the given language. The endpoint responds
    /// with a one-element list; the first entry is authoritative.
    pub async fn media_item(
        &self,
        lang: &LanguageCode,
        key: &str,
    ) -> Result<MediaItem, CatalogError> {
        let url = self.endpoint(&["media-items", lang.as_ref(), key])?;
        let display_url = url.to_string();
        let response: MediaItemResponse = self.get_json(url, None).await?;
        response
            .media
            .into_iter()
            .next()
            .ok_or(CatalogError::Decode {
                url: display_url,
                message: "empty media list".to_owned(),
            })
    }

    /// The language catalog, localized to the active language.
    pub async fn languages(&self, lang: &LanguageCode) -> Result<Vec<Language>, CatalogError> {
        let url = self.endpoint(&["languages", lang.as_ref()])?;
        let response: LanguagesResponse = self.get_json(url, None).await?;
        Ok(response.languages)
    }

    /// Full-text search; requires a bearer token. A 401 surfaces as
    /// [`CatalogError::Auth`] so the caller can refresh and retry.
    pub async fn search(
        &self,
        lang: &LanguageCode,
        query: &str,
        token: &str,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("lang", lang.as_ref())
            .append_pair("limit", SEARCH_LIMIT);
        let response: SearchResponse = self.get_json(url, Some(token)).await?;
        Ok(response.hits)
    }

    /// Fetch a fresh search token; the body is the bare token text.
    pub async fn fetch_token(&self) -> Result<String, CatalogError> {
        let url = self.token_url.clone();
        tracing::info!("requesting new authentication token from {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let token = response.text().await.map_err(|e| CatalogError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let token = token.trim().to_owned();
        if token.is_empty() {
            return Err(CatalogError::Decode {
                url: url.to_string(),
                message: "empty token body".to_owned(),
            });
        }
        Ok(token)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl("base url cannot be a base".to_owned()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: Option<&str>,
    ) -> Result<T, CatalogError> {
        tracing::info!("opening {url}");
        let mut request = self.client.get(url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| CatalogError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(CatalogError::Auth {
                    url: url.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(CatalogError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                })
            }
            _ => {}
        }
        response.json().await.map_err(|e| CatalogError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
