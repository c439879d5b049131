// HTTP transport for the Bugzilla REST API.
// Issues GET requests and turns responses into JSON payloads or errors.

use std::future::Future;

use reqwest::{
    Client, Response,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use url::Url;

use crate::error::{BugzillaError, Result};

/// A response body together with the URL it was finally served from.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedResponse {
    /// URL after following redirects.
    pub resolved_url: String,
    /// Parsed JSON body.
    pub data: Value,
}

/// Performs the network side of a fetch.
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> impl Future<Output = Result<FetchedResponse>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("bugzilla-cache/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(BugzillaError::Http)?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Check response status and convert errors.
    fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(BugzillaError::Status {
                status,
                url: response.url().to_string(),
            })
        }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<FetchedResponse> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(BugzillaError::Http)?;

        let response = Self::check_response(response)?;
        let resolved_url = response.url().to_string();
        let data: Value = response.json().await?;

        Ok(FetchedResponse { resolved_url, data })
    }
}
