//! Graph session and access-token lifecycle.
//!
//! [`SharePointClient`] owns one reused HTTP session and the current bearer
//! token. Tokens are never tracked for expiry: any failed Graph call renews the
//! token by re-issuing the client-credentials grant, then tries again.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_GRAPH_BASE_URL, DEFAULT_LOGIN_BASE_URL};
use super::error::SharePointError;
use super::models::TokenResponse;
use super::retry::{RetryBudget, RetryDecision};
use crate::config::SharePointConfig;
use crate::user_agent;

/// Base URLs of the identity platform and the Graph API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEndpoints {
    /// Identity platform host, without trailing slash.
    pub login_base_url: String,
    /// Graph API root including the version segment, without trailing slash.
    pub graph_base_url: String,
}

impl Default for GraphEndpoints {
    fn default() -> Self {
        Self {
            login_base_url: DEFAULT_LOGIN_BASE_URL.to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
        }
    }
}

impl GraphEndpoints {
    /// OAuth2 v2.0 token endpoint for a tenant.
    #[must_use]
    pub fn token_url(&self, tenant: &str) -> String {
        format!("{}/{tenant}/oauth2/v2.0/token", self.login_base_url)
    }
}

/// Client for the SharePoint endpoints of Microsoft Graph.
///
/// Every operation takes `&mut self` because any of them may renew the
/// access token.
///
/// # Example
///
/// ```no_run
/// use sharepoint_sync_core::{SharePointClient, load_config};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sharepoint.json"))?;
/// let mut client = SharePointClient::connect(&config).await?;
/// let site = client.get_site_id(&config.site_name).await?;
/// println!("site id: {}", site.id);
/// # Ok(())
/// # }
/// ```
pub struct SharePointClient {
    pub(crate) client: Client,
    pub(crate) endpoints: GraphEndpoints,
    token_url: String,
    token_form: [(&'static str, String); 4],
    access_token: String,
    pub(crate) show_progress: bool,
}

impl std::fmt::Debug for SharePointClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharePointClient")
            .field("endpoints", &self.endpoints)
            .field("token_url", &self.token_url)
            .field("show_progress", &self.show_progress)
            .finish_non_exhaustive()
    }
}

impl SharePointClient {
    /// Builds the session and acquires the first access token.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::Config`] for an invalid endpoint override,
    /// otherwise the errors of [`connect_with_endpoints`](Self::connect_with_endpoints).
    #[instrument(skip(config), fields(tenant = %config.tenant_name))]
    pub async fn connect(config: &SharePointConfig) -> Result<Self, SharePointError> {
        let endpoints = config.endpoints().map_err(SharePointError::Config)?;
        Self::connect_with_endpoints(config, endpoints).await
    }

    /// Like [`connect`](Self::connect) but with explicit endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError`] when the session cannot be built or the
    /// token request fails.
    pub async fn connect_with_endpoints(
        config: &SharePointConfig,
        endpoints: GraphEndpoints,
    ) -> Result<Self, SharePointError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(SharePointError::ClientBuild)?;

        let token_url = endpoints.token_url(&config.tenant_name);
        let mut sharepoint = Self {
            client,
            endpoints,
            token_url,
            token_form: [
                ("client_id", config.client_id.clone()),
                ("client_secret", config.client_secret.clone()),
                ("grant_type", config.grant_type.clone()),
                ("scope", config.scope.clone()),
            ],
            access_token: String::new(),
            show_progress: true,
        };
        sharepoint.get_access_token().await?;
        info!("access token acquired");
        Ok(sharepoint)
    }

    /// Enables or disables download progress bars.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The bearer token currently attached to Graph requests.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Requests a token with the client-credentials grant and stores it.
    ///
    /// # Errors
    ///
    /// Returns the status-mapped error when the token endpoint answers with
    /// anything but 200, [`SharePointError::Network`] when it cannot be
    /// reached, and [`SharePointError::MissingField`] when the response has
    /// no `access_token`.
    #[instrument(skip(self))]
    pub async fn get_access_token(&mut self) -> Result<String, SharePointError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&self.token_form)
            .send()
            .await
            .map_err(|e| SharePointError::network(&self.token_url, e))?;

        let status = response.status().as_u16();
        if status != 200 {
            error!(status, "token request failed");
            let body = response.text().await.unwrap_or_default();
            return Err(SharePointError::from_status(&self.token_url, status, body));
        }

        let payload: TokenResponse = read_json(response, &self.token_url).await?;
        let token = payload
            .access_token
            .ok_or_else(|| SharePointError::missing_field(&self.token_url, "access_token"))?;
        self.access_token.clone_from(&token);
        Ok(token)
    }

    /// Replaces the current token with a freshly issued one.
    ///
    /// # Errors
    ///
    /// Same as [`get_access_token`](Self::get_access_token).
    pub async fn renew_access_token(&mut self) -> Result<(), SharePointError> {
        debug!("renewing access token");
        self.get_access_token().await?;
        Ok(())
    }

    /// Joins a Graph path (starting with `/`) onto the base URL.
    pub(crate) fn graph_url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoints.graph_base_url)
    }

    /// GETs a Graph URL, renewing the token and retrying on failure.
    ///
    /// Network errors, including a body cut off after a 200, retry without
    /// consuming the budget; non-200 responses consume one attempt each.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &mut self,
        url: &str,
        budget: RetryBudget,
    ) -> Result<T, SharePointError> {
        let mut failed_responses = 0_u32;
        loop {
            let sent = self
                .client
                .get(url)
                .bearer_auth(&self.access_token)
                .header(CONTENT_TYPE, "application/json")
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    error!(url, error = %e, "connection error, trying to reconnect");
                    self.renew_access_token().await?;
                    continue;
                }
            };

            let status = response.status().as_u16();
            if status == 200 {
                match response.bytes().await {
                    Ok(body) => return decode_json(&body, url),
                    Err(e) => {
                        error!(
                            url,
                            error = %e,
                            "connection dropped while reading body, trying to reconnect"
                        );
                        self.renew_access_token().await?;
                        continue;
                    }
                }
            }

            error!(url, status, "error status, trying to renew access token");
            let body = response.text().await.unwrap_or_default();
            self.renew_access_token().await?;
            failed_responses += 1;
            if budget.after_failed_response(failed_responses) == RetryDecision::GiveUp {
                return Err(SharePointError::from_status(url, status, body));
            }
        }
    }
}

/// Reads a response body and decodes it as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    url: &str,
) -> Result<T, SharePointError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| SharePointError::network(url, e))?;
    decode_json(&bytes, url)
}

/// Decodes a fully read response body.
pub(crate) fn decode_json<T: DeserializeOwned>(
    body: &[u8],
    url: &str,
) -> Result<T, SharePointError> {
    serde_json::from_slice(body).map_err(|e| SharePointError::decode(url, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints_point_at_public_cloud() {
        let endpoints = GraphEndpoints::default();
        assert_eq!(
            endpoints.token_url("contoso.onmicrosoft.com"),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/token"
        );
        assert_eq!(endpoints.graph_base_url, "https://graph.microsoft.com/v1.0");
    }

    #[test]
    fn test_token_url_uses_login_override() {
        let endpoints = GraphEndpoints {
            login_base_url: "http://127.0.0.1:8080".to_string(),
            ..GraphEndpoints::default()
        };
        assert_eq!(
            endpoints.token_url("tenant"),
            "http://127.0.0.1:8080/tenant/oauth2/v2.0/token"
        );
    }
}
