//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::{CoreError, CoreResult};

/// Default FHIR server base URL for local development.
pub const DEFAULT_FHIR_BASE_URL: &str = "http://localhost:4004/fhir/";

/// Default SMART client id the host registers the embedded app under.
pub const DEFAULT_CLIENT_ID: &str = "my-client-id";

/// Default SMART scopes requested for the launched session.
pub const DEFAULT_SCOPE: &str =
    "launch/patient patient/*.read user/*.read offline_access openid fhirUser";

/// Host configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct EhrConfig {
    fhir_base_url: String,
    client_id: String,
    scope: String,
}

impl EhrConfig {
    /// Create a new `EhrConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] when any field is empty or
    /// whitespace-only.
    pub fn new(
        fhir_base_url: impl Into<String>,
        client_id: impl Into<String>,
        scope: impl Into<String>,
    ) -> CoreResult<Self> {
        let fhir_base_url = fhir_base_url.into();
        let client_id = client_id.into();
        let scope = scope.into();

        if fhir_base_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "fhir_base_url cannot be empty".into(),
            ));
        }
        if client_id.trim().is_empty() {
            return Err(CoreError::InvalidConfig("client_id cannot be empty".into()));
        }
        if scope.trim().is_empty() {
            return Err(CoreError::InvalidConfig("scope cannot be empty".into()));
        }

        Ok(Self {
            fhir_base_url,
            client_id,
            scope,
        })
    }

    /// Local-development defaults.
    pub fn local() -> Self {
        Self {
            fhir_base_url: DEFAULT_FHIR_BASE_URL.into(),
            client_id: DEFAULT_CLIENT_ID.into(),
            scope: DEFAULT_SCOPE.into(),
        }
    }

    pub fn fhir_base_url(&self) -> &str {
        &self.fhir_base_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}
