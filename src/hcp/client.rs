//! TFE HTTP client for API interactions

use futures::stream::{self, StreamExt};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::api;
use crate::error::{Result, TfeError};
use crate::hcp::traits::PaginatedResponse;

/// TFE API client
pub struct TfeClient {
    client: Client,
    token: String,
    /// Service URL, e.g. `https://app.terraform.io`
    url: String,
    /// Custom base URL override (for testing with mock servers)
    base_url_override: Option<String>,
}

impl TfeClient {
    /// Create a new TFE client with optimized connection settings
    pub fn new(token: String, url: String) -> Self {
        let client = Client::builder()
            // Connection pool settings - reuse connections
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            // TCP keepalive to maintain connections
            .tcp_keepalive(Duration::from_secs(60))
            // Timeouts
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            url: url.trim_end_matches('/').to_string(),
            base_url_override: None,
        }
    }

    /// Create a client with custom base URL (for testing with mock servers)
    #[cfg(test)]
    pub fn with_base_url(token: String, url: String, base_url: String) -> Self {
        let client = Client::builder().build().unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            url,
            base_url_override: Some(base_url),
        }
    }

    /// Build the base URL for API requests
    pub(crate) fn base_url(&self) -> String {
        if let Some(ref url) = self.base_url_override {
            return url.clone();
        }
        format!("{}/{}", self.url, api::BASE_PATH.trim_start_matches('/'))
    }

    /// Service URL this client talks to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add standard headers to a request builder
    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/vnd.api+json")
    }

    /// Create a GET request builder with standard headers
    pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.get(url))
    }

    /// Create a POST request builder with standard headers
    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.post(url))
    }

    /// Create a DELETE request builder with standard headers
    pub(crate) fn delete(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.delete(url))
    }

    /// Parse an API response, returning error for non-success status codes
    ///
    /// Simplifies the common pattern of checking status and parsing JSON.
    pub(crate) async fn parse_api_response<T>(
        &self,
        response: reqwest::Response,
        error_context: &str,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if !response.status().is_success() {
            return Err(TfeError::Api {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", error_context),
            });
        }
        Ok(response.json().await?)
    }

    /// Verify the token works by reading the account details
    ///
    /// Returns the username of the authenticated account.
    pub async fn check_connection(&self) -> Result<String> {
        let url = format!("{}/{}", self.base_url(), api::ACCOUNT_DETAILS);
        debug!("Checking API connection via: {}", url);

        let response = self.get(&url).send().await?;
        let account: serde_json::Value =
            self.parse_api_response(response, "account details").await?;

        Ok(account["data"]["attributes"]["username"]
            .as_str()
            .unwrap_or("unknown")
            .to_string())
    }

    /// Fetch all pages from a paginated API endpoint with parallel fetching
    ///
    /// This method fetches page 1 first to learn total_pages, then fetches
    /// remaining pages in parallel (with concurrency limit).
    ///
    /// Items are returned in page order regardless of which request finished first.
    ///
    /// # Arguments
    /// * `path` - API path (e.g., "/organizations/my-org/registry-modules")
    /// * `error_context` - Context for error messages (e.g., "registry modules for organization 'my-org'")
    ///
    /// # Type Parameters
    /// * `T` - The item type (e.g., a raw `serde_json::Value` record)
    /// * `R` - The response type that implements PaginatedResponse<T>
    pub async fn fetch_all_pages<T, R>(&self, path: &str, error_context: &str) -> Result<Vec<T>>
    where
        T: Send,
        R: DeserializeOwned + PaginatedResponse<T> + Send,
    {
        let separator = if path.contains('?') { "&" } else { "?" };
        let page_url = |page_num: u32| {
            format!(
                "{}{}{}page[size]={}&page[number]={}",
                self.base_url(),
                path,
                separator,
                api::DEFAULT_PAGE_SIZE,
                page_num
            )
        };

        let (_, mut all_items, total_pages) = self
            .fetch_single_page::<T, R>(page_url(1), 1, error_context)
            .await?;

        if total_pages <= 1 {
            return Ok(all_items);
        }

        debug!(
            "Fetching {} remaining pages of {} (max {} concurrent)",
            total_pages - 1,
            error_context,
            api::MAX_CONCURRENT_PAGE_REQUESTS
        );

        let page_futures = (2..=total_pages).map(|page_num| {
            self.fetch_single_page::<T, R>(page_url(page_num), page_num, error_context)
        });

        let mut pages = stream::iter(page_futures)
            .buffer_unordered(api::MAX_CONCURRENT_PAGE_REQUESTS)
            .collect::<Vec<Result<(u32, Vec<T>, u32)>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        // Completion order is arbitrary; callers rely on page order
        pages.sort_by_key(|(page_num, _, _)| *page_num);
        for (_, items, _) in pages {
            all_items.extend(items);
        }

        debug!(
            "Fetched {} total items for {}",
            all_items.len(),
            error_context
        );
        Ok(all_items)
    }

    /// Fetch a single page, returning its number, items and the reported page count
    ///
    /// A response without pagination metadata counts as a single page.
    async fn fetch_single_page<T, R>(
        &self,
        url: String,
        page_num: u32,
        error_context: &str,
    ) -> Result<(u32, Vec<T>, u32)>
    where
        R: DeserializeOwned + PaginatedResponse<T>,
    {
        debug!("Fetching page {} from: {}", page_num, url);

        let response = self.get(&url).send().await?;

        let page_context = if page_num == 1 {
            error_context.to_string()
        } else {
            format!("{} (page {})", error_context, page_num)
        };
        let resp: R = self.parse_api_response(response, &page_context).await?;
        let total_pages = resp
            .meta()
            .and_then(|m| m.pagination.as_ref())
            .map(|p| p.total_pages)
            .unwrap_or(1);
        let items = resp.into_data();

        debug!(
            "Page {}/{} returned {} items",
            page_num,
            total_pages,
            items.len()
        );
        Ok((page_num, items, total_pages))
    }
}

#[cfg(test)]
impl TfeClient {
    /// Create a test client with mock base URL
    pub fn test_client(base_url: &str) -> Self {
        Self::with_base_url(
            "test-token".to_string(),
            "https://mock.terraform.io".to_string(),
            base_url.to_string(),
        )
    }
}


#[cfg(test)]
mod pagination_tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::hcp::traits::ApiListResponse;

    fn page(names: &[&str], current: u32, total: u32) -> Value {
        let total_count = names.len() as u32 * total;
        json!({
            "data": names.iter().map(|n| json!({ "attributes": { "name": n } })).collect::<Vec<_>>(),
            "meta": {
                "pagination": {
                    "current-page": current,
                    "total-pages": total,
                    "total-count": total_count
                }
            }
        })
    }

    async fn mount_page(server: &MockServer, number: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page[number]", number))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn fetch(client: &TfeClient, path: &str) -> Result<Vec<Value>> {
        client
            .fetch_all_pages::<Value, ApiListResponse<Value>>(path, "items")
            .await
    }

    #[tokio::test]
    async fn test_fetch_all_pages_keeps_page_order() {
        let mock_server = MockServer::start().await;
        mount_page(&mock_server, "1", 200, page(&["a", "b"], 1, 3)).await;
        mount_page(&mock_server, "2", 200, page(&["c", "d"], 2, 3)).await;
        mount_page(&mock_server, "3", 200, page(&["e"], 3, 3)).await;

        let client = TfeClient::test_client(&mock_server.uri());
        let items = fetch(&client, "/items").await.unwrap();

        let names: Vec<&str> = items
            .iter()
            .map(|i| i["attributes"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_no_pagination_meta() {
        let mock_server = MockServer::start().await;
        mount_page(&mock_server, "1", 200, json!({ "data": [{ "id": "only" }] })).await;

        let client = TfeClient::test_client(&mock_server.uri());
        let items = fetch(&client, "/items").await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_error_on_subsequent_page() {
        let mock_server = MockServer::start().await;
        mount_page(&mock_server, "1", 200, page(&["a"], 1, 2)).await;
        mount_page(&mock_server, "2", 500, json!({})).await;

        let client = TfeClient::test_client(&mock_server.uri());
        match fetch(&client, "/items").await.unwrap_err() {
            TfeError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("page 2"));
            }
            _ => panic!("Expected TfeError::Api"),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_pages_with_existing_query_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("filter[provider]", "aws"))
            .and(query_param("page[number]", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(&["vpc"], 1, 1)))
            .mount(&mock_server)
            .await;

        let client = TfeClient::test_client(&mock_server.uri());
        let items = fetch(&client, "/items?filter[provider]=aws").await.unwrap();
        assert_eq!(items.len(), 1);
    }
}
