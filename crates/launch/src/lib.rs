//! Launch-context support for the simulated EHR host.
//!
//! This crate owns the **launch token**: the single opaque string the host
//! page places in the embedded application's `launch` query parameter. The
//! token carries the patient id list, the provider id list, and the encounter
//! selection mode for the session being launched.
//!
//! This crate focuses on:
//! - the domain-level [`LaunchContext`] record
//! - a reversible, URL-safe string encoding of that record
//! - strict decoding that never yields a partially populated context
//!
//! The crate is pure: no network, no DOM, no clock. Callers decide what a
//! malformed token means for the user (typically: skip pre-selection).

pub mod codec;
pub mod context;

pub use codec::{decode, encode};
pub use context::{EncounterSelection, LaunchContext};

/// Errors returned by the `launch` crate.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The token cannot be parsed into a launch context. The detail names
    /// the failing layer (base64, UTF-8, JSON shape) and, where one exists,
    /// the path to the offending field.
    #[error("malformed launch token: {detail}")]
    MalformedToken { detail: String },

    /// Serialising a context to the wire failed. Not reachable for
    /// well-formed contexts; kept so `encode` propagates instead of
    /// panicking.
    #[error("failed to serialise launch context: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`LaunchError`].
pub type LaunchResult<T> = Result<T, LaunchError>;
