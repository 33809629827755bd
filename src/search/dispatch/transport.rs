//! Transport to the search server
//!
//! `IndexTransport` is the seam between the dispatch workers / query façade
//! and the network. `SolrHttpTransport` speaks the HTTP protocol:
//!
//! - `POST {prefix}/update?commit=true` with an XML body and basic auth
//! - `GET {prefix}/select?wt=json&q=...`

use futures::future::BoxFuture;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::config::SearchConfig;
use crate::search::errors::{SearchError, SearchResult};
use crate::utils::UPDATE_CONTENT_TYPE;

/// Longest error body kept in `HttpStatus` errors
const MAX_ERROR_BODY: usize = 512;

/// Network access to the search server
pub trait IndexTransport: Send + Sync + 'static {
    /// Apply an update command and commit it
    fn post_update(&self, body: String) -> BoxFuture<'_, SearchResult<()>>;

    /// Run a read-only query, returning the raw JSON response body
    fn select(&self, query: &str, rows: Option<u32>) -> BoxFuture<'_, SearchResult<String>>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct SolrHttpTransport {
    client: Client,
    update_url: Url,
    select_url: Url,
    user: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl SolrHttpTransport {
    /// Build the HTTP client and resolve endpoint URLs from config
    ///
    /// # Errors
    ///
    /// Returns `Registration` if the configured host does not form a valid
    /// URL, or `Transport` if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let base = config.base_url();
        let mut update_url = Url::parse(&format!("{base}/update"))
            .map_err(|e| SearchError::Registration(format!("Invalid search URL {base}: {e}")))?;
        update_url.query_pairs_mut().append_pair("commit", "true");
        let select_url = Url::parse(&format!("{base}/select"))
            .map_err(|e| SearchError::Registration(format!("Invalid search URL {base}: {e}")))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SearchError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            update_url,
            select_url,
            user: config.user().map(str::to_string),
            password: config.password().map(str::to_string),
            timeout: config.request_timeout(),
        })
    }

    #[must_use]
    pub fn update_url(&self) -> &Url {
        &self.update_url
    }

    #[must_use]
    pub fn select_url(&self) -> &Url {
        &self.select_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.user {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }

    fn map_send_error(&self, error: reqwest::Error) -> SearchError {
        if error.is_timeout() {
            SearchError::Timeout(self.timeout)
        } else {
            SearchError::from(error)
        }
    }

    async fn check_status(response: reqwest::Response) -> SearchResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(SearchError::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }
}

impl IndexTransport for SolrHttpTransport {
    fn post_update(&self, body: String) -> BoxFuture<'_, SearchResult<()>> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.update_url.clone())
                .header(reqwest::header::CONTENT_TYPE, UPDATE_CONTENT_TYPE)
                .body(body);
            let response = self
                .authorize(request)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;
            Self::check_status(response).await?;
            Ok(())
        })
    }

    fn select(&self, query: &str, rows: Option<u32>) -> BoxFuture<'_, SearchResult<String>> {
        let mut url = self.select_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("wt", "json");
            pairs.append_pair("q", query);
            if let Some(rows) = rows {
                pairs.append_pair("rows", &rows.to_string());
            }
        }

        Box::pin(async move {
            let response = self
                .authorize(self.client.get(url))
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;
            let response = Self::check_status(response).await?;
            response.text().await.map_err(|e| self.map_send_error(e))
        })
    }
}
