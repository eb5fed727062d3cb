//! FHIR network collaborator.
//!
//! A thin async client for the two operations the host needs against a FHIR
//! server: creating a resource and fetching a path. The [`FhirBackend`]
//! trait is the seam order submission is written against, so the service
//! layer tests with an in-memory backend and never touches the network.
//!
//! Deliberately minimal: no retries, no response inspection beyond
//! success/failure, no caching. Upstream failures surface to the caller
//! unchanged.

use async_trait::async_trait;
use serde_json::Value;

/// Errors returned by the FHIR client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured base URL is unusable.
    #[error("invalid FHIR base URL: {0:?}")]
    InvalidBaseUrl(String),

    /// A resource submitted for creation carries no `resourceType`, so no
    /// endpoint path can be derived for it.
    #[error("resource has no resourceType, cannot derive a create path")]
    MissingResourceType,

    /// Transport-level failure (connection, timeout, body decode).
    #[error("FHIR request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("FHIR server returned status {status} for {path}")]
    UnexpectedStatus { status: u16, path: String },
}

/// Type alias for Results that can fail with a [`ClientError`].
pub type ClientResult<T> = Result<T, ClientError>;

/// The two operations the host consumes from a FHIR server.
#[async_trait]
pub trait FhirBackend: Send + Sync {
    /// Create a resource. The endpoint path is derived from the resource's
    /// `resourceType`; the created resource is returned as the server sent
    /// it.
    async fn create(&self, resource: &Value) -> ClientResult<Value>;

    /// Fetch a resource by relative path (e.g. `Patient/123`).
    async fn request(&self, path: &str) -> ClientResult<Value>;
}

/// HTTP implementation of [`FhirBackend`] over reqwest.
#[derive(Clone, Debug)]
pub struct HttpFhirClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpFhirClient {
    /// Create a client for the given FHIR base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] when the URL is empty or not
    /// http(s).
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let raw = base_url.into();
        let trimmed = raw.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(raw));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            http: reqwest::Client::new(),
        })
    }

    /// The normalised base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl FhirBackend for HttpFhirClient {
    async fn create(&self, resource: &Value) -> ClientResult<Value> {
        let resource_type = resource
            .get("resourceType")
            .and_then(Value::as_str)
            .ok_or(ClientError::MissingResourceType)?;

        let response = self
            .http
            .post(self.url_for(resource_type))
            .json(resource)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                path: resource_type.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    async fn request(&self, path: &str) -> ClientResult<Value> {
        let response = self.http.get(self.url_for(path)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_http_and_https_base_urls() {
        let client = HttpFhirClient::new("http://localhost:4004/fhir/").expect("valid url");
        assert_eq!(client.base_url(), "http://localhost:4004/fhir");

        assert!(HttpFhirClient::new("https://fhir.example.org").is_ok());
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for bad in ["", "   ", "localhost:4004", "ftp://fhir.example.org"] {
            assert!(matches!(
                HttpFhirClient::new(bad),
                Err(ClientError::InvalidBaseUrl(_))
            ));
        }
    }

    #[test]
    fn joins_paths_without_doubled_slashes() {
        let client = HttpFhirClient::new("http://localhost:4004/fhir/").expect("valid url");
        assert_eq!(
            client.url_for("ServiceRequest"),
            "http://localhost:4004/fhir/ServiceRequest"
        );
        assert_eq!(
            client.url_for("/Patient/123"),
            "http://localhost:4004/fhir/Patient/123"
        );
    }

    #[tokio::test]
    async fn create_rejects_untyped_resources_before_sending() {
        let client = HttpFhirClient::new("http://localhost:4004/fhir").expect("valid url");
        // No resourceType: the error fires before any request is made.
        let err = client
            .create(&json!({ "status": "active" }))
            .await
            .expect_err("should reject");
        assert!(matches!(err, ClientError::MissingResourceType));
    }
}
