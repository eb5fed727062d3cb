//! # EHR Core
//!
//! Core orchestration for the simulated EHR host.
//!
//! This crate ties the pure crates together on the clinician's behalf:
//! - Session state fed by the host message channel and pre-seeded from a
//!   decoded launch context
//! - Order submission: all-or-nothing batch construction followed by one
//!   concurrent create per record against the FHIR collaborator
//! - Startup-resolved runtime configuration
//!
//! **No API concerns**: HTTP endpoints, status codes and OpenAPI belong in
//! the `ehr-run` binary.

pub mod config;
pub mod orders;
pub mod session;

pub use config::EhrConfig;
pub use orders::{OrderSelection, OrderService};
pub use session::{PartyRef, Session, SessionEvent};

/// Errors returned by the orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("launch token error: {0}")]
    Launch(#[from] launch::LaunchError),
    #[error("order error: {0}")]
    Order(#[from] fhir::OrderError),
    #[error("FHIR client error: {0}")]
    Client(#[from] fhir_client::ClientError),
    #[error("failed to serialise order payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`CoreError`].
pub type CoreResult<T> = std::result::Result<T, CoreError>;
