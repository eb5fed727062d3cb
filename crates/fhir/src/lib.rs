//! FHIR wire/boundary support for the simulated EHR host.
//!
//! This crate provides **wire models** and **builders** for the FHIR
//! resources the host submits on the clinician's behalf:
//! - diagnostic and therapeutic `ServiceRequest` orders, built from the
//!   fixed order catalogs
//! - the PHQ-9 questionnaire order and its `QuestionnaireResponse`
//!
//! This crate focuses on:
//! - FHIR semantic alignment (JSON wire structs, standard code systems)
//! - translation from catalog keys and party ids to canonical resources
//!
//! Everything here is pure and synchronous. Submission to a FHIR server is
//! the `fhir-client` crate's concern; this crate never performs I/O.

pub mod catalog;
pub mod questionnaire;
pub mod service_request;
pub mod wire;

// Re-export the types callers build orders with
pub use catalog::{CatalogEntry, OrderKind};
pub use questionnaire::QuestionnaireResponse;
pub use service_request::ServiceRequest;
pub use wire::{CodeableConcept, Coding, Reference};

use std::fmt;

/// The party an order identifier belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartyRole {
    /// The patient the order is for.
    Subject,
    /// The practitioner placing the order.
    Requester,
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyRole::Subject => write!(f, "subject"),
            PartyRole::Requester => write!(f, "requester"),
        }
    }
}

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The key is not present in the catalog for the given order kind.
    #[error("unknown {kind} catalog key: {key:?}")]
    UnknownCatalogKey { kind: OrderKind, key: String },

    /// A subject or requester id was empty or whitespace-only. Callers must
    /// resolve both parties before building orders.
    #[error("missing {0} identifier")]
    MissingIdentifier(PartyRole),

    /// A PHQ-9 answer was outside the questionnaire's 0–3 scale.
    #[error("PHQ-9 answer for item {item} out of range: {value}")]
    AnswerOutOfRange { item: usize, value: u8 },
}

/// Type alias for Results that can fail with an [`OrderError`].
pub type OrderResult<T> = Result<T, OrderError>;
