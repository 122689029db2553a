//! Shared HTTP plumbing for institution APIs.
//!
//! Each institution gateway drives its own endpoints through this client,
//! which owns the credential header, the timeout, and the response-to-error
//! mapping. A non-success status surfaces the raw body in the error; there
//! is no retry at this layer.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use ledgerport_core::errors::{Error, Result};

/// Default timeout for institution API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the session credential is presented to the institution.
///
/// Acquiring the token is the invoking collaborator's job; renewal and
/// expiry are out of scope here. An expired credential surfaces as a
/// `Fetch` error with the institution's 401 body.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Sent as `Authorization: Bearer {token}`.
    Bearer(String),
    /// A pre-assembled `Cookie` header value.
    Cookie(String),
}

impl Credential {
    fn header(&self) -> Result<(HeaderName, HeaderValue)> {
        match self {
            Credential::Bearer(token) => {
                HeaderValue::from_str(&format!("Bearer {}", token)).map(|v| (AUTHORIZATION, v))
            }
            Credential::Cookie(cookie) => HeaderValue::from_str(cookie).map(|v| (COOKIE, v)),
        }
        .map_err(|e| Error::Unexpected(format!("invalid credential format: {}", e)))
    }
}

/// HTTP client for one institution session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth: (HeaderName, HeaderValue),
}

impl ApiClient {
    /// Create a client for an institution's API.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential contains bytes that cannot form a
    /// header value, or if the HTTP client cannot be initialized.
    pub fn new(base_url: &str, credential: &Credential) -> Result<Self> {
        let auth = credential.header()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Default headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(self.auth.0.clone(), self.auth.1.clone());
        headers
    }

    /// GET a JSON endpoint.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} ({} params)", url, query.len());

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        parse_response(response).await
    }

    /// POST a JSON body to an endpoint.
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        parse_response(response).await
    }
}

/// Map an HTTP response to a decoded envelope, or to an error carrying the
/// raw body.
async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(Error::Fetch {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        Error::MalformedResponse(format!(
            "{} in {}",
            e,
            body.chars().take(200).collect::<String>()
        ))
    })
}
