//! HTTP plumbing shared by all Admin API calls for one store.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, de::DeserializeOwned};

use super::{GraphQLError, GraphQLErrorLocation, ShopifyError};
use crate::config::StoreConfig;

/// Admin API client for a single store.
///
/// Cheaply cloneable via `Arc`. The access token rides in a default header;
/// REST paths are relative to `/admin/api/{version}/`.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    store: String,
    api_version: String,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl StoreClient {
    /// Create a new client for the given store.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &StoreConfig) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|e| ShopifyError::Parse(format!("Invalid access token format: {e}")))?;
        token.set_sensitive(true);
        headers.insert("X-Shopify-Access-Token", token);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(StoreClientInner {
                client,
                store: config.store.clone(),
                api_version: config.api_version.clone(),
            }),
        })
    }

    /// The store domain this client talks to.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    fn rest_url(&self, path: &str) -> String {
        format!(
            "https://{}/admin/api/{}/{path}",
            self.inner.store, self.inner.api_version
        )
    }

    fn graphql_url(&self) -> String {
        self.rest_url("graphql.json")
    }

    /// Execute a GET request against the REST API.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ShopifyError> {
        let response = self.inner.client.get(self.rest_url(path)).send().await?;
        self.handle_response(response).await
    }

    /// Execute a POST request against the REST API.
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(self.rest_url(path))
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Execute a GraphQL query or mutation.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::RateLimited` when throttled,
    /// `ShopifyError::Unauthorized` on auth failures,
    /// `ShopifyError::GraphQL` if the query itself returns errors, and
    /// `ShopifyError::Http` on network failures.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .inner
            .client
            .post(self.graphql_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_seconds(&response);
            return Err(ShopifyError::RateLimited(retry_after));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ShopifyError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let graphql_response: GraphQLResponse<T> = response
            .json()
            .await
            .map_err(|e| ShopifyError::Parse(format!("Failed to parse GraphQL response: {e}")))?;

        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(ShopifyError::GraphQL(converted));
        }

        graphql_response.data.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    /// Handle a REST response and parse the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ShopifyError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ShopifyError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse an error response from the REST API.
    async fn parse_error(response: reqwest::Response) -> ShopifyError {
        let status = response.status().as_u16();

        if status == 429 {
            return ShopifyError::RateLimited(retry_after_seconds(&response));
        }
        if status == 401 || status == 403 {
            return ShopifyError::Unauthorized;
        }
        if status == 404 {
            return ShopifyError::NotFound("Resource not found".to_string());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        ShopifyError::Api { status, message }
    }
}

fn retry_after_seconds(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("store", &self.inner.store)
            .field("api_version", &self.inner.api_version)
            .finish_non_exhaustive()
    }
}
