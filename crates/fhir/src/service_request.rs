//! ServiceRequest wire model and order builders.
//!
//! Responsibilities:
//! - Define the wire model for the `ServiceRequest` resources the host
//!   creates on the FHIR server
//! - Translate a catalog key plus subject/requester ids into a canonical,
//!   standards-coded order
//! - Validate whole selections before any record is produced
//!
//! Builders are pure functions of their inputs: no clock, no hidden state,
//! no network. The caller owns submission.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, systems, OrderKind};
use crate::wire::{CodeableConcept, Coding, Reference};
use crate::{OrderError, PartyRole};

// ============================================================================
// Wire model
// ============================================================================

/// Wire representation of a `ServiceRequest` resource.
///
/// This is the exact structure POSTed to the FHIR server. Optional
/// repetitions are omitted from the wire when empty.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub resource_type: String,

    pub status: String,

    pub intent: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    pub subject: Reference,

    pub requester: Reference,

    pub code: CodeableConcept,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_code: Vec<CodeableConcept>,
}

// ============================================================================
// Builders
// ============================================================================

impl ServiceRequest {
    /// Build a canonical order for one catalog key.
    ///
    /// The result is an active order of the given kind, coded with the
    /// catalog's coding triple, referencing `Patient/{subject_id}` and
    /// `Practitioner/{requester_id}`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingIdentifier`] when either id is empty or
    /// whitespace-only, and [`OrderError::UnknownCatalogKey`] when the key
    /// is absent from the catalog for `kind`.
    pub fn build(
        kind: OrderKind,
        key: &str,
        subject_id: &str,
        requester_id: &str,
    ) -> Result<Self, OrderError> {
        let subject_id = require_id(PartyRole::Subject, subject_id)?;
        let requester_id = require_id(PartyRole::Requester, requester_id)?;

        let entry = catalog::lookup(kind, key).ok_or_else(|| OrderError::UnknownCatalogKey {
            kind,
            key: key.to_string(),
        })?;

        Ok(from_entry(kind, entry, subject_id, requester_id))
    }

    /// Build one order per selected key, all-or-nothing.
    ///
    /// The whole selection is validated before any record is constructed: a
    /// single unknown key (or an unusable id) aborts the batch and yields no
    /// records, so the caller never submits a partial selection.
    pub fn build_batch<'a, I>(
        selection: I,
        subject_id: &str,
        requester_id: &str,
    ) -> Result<Vec<Self>, OrderError>
    where
        I: IntoIterator<Item = (OrderKind, &'a str)>,
    {
        let subject_id = require_id(PartyRole::Subject, subject_id)?;
        let requester_id = require_id(PartyRole::Requester, requester_id)?;

        // Validate the whole selection first.
        let mut resolved = Vec::new();
        for (kind, key) in selection {
            let entry =
                catalog::lookup(kind, key).ok_or_else(|| OrderError::UnknownCatalogKey {
                    kind,
                    key: key.to_string(),
                })?;
            resolved.push((kind, entry));
        }

        Ok(resolved
            .into_iter()
            .map(|(kind, entry)| from_entry(kind, entry, subject_id, requester_id))
            .collect())
    }

    /// Build a PHQ-9 questionnaire order.
    ///
    /// Coded LOINC 89579-2 with a suspected-depression reason; carries no
    /// service category, matching how the questionnaire is ordered outside
    /// the test/treatment catalogs.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingIdentifier`] when either id is empty or
    /// whitespace-only.
    pub fn phq9(subject_id: &str, requester_id: &str) -> Result<Self, OrderError> {
        let subject_id = require_id(PartyRole::Subject, subject_id)?;
        let requester_id = require_id(PartyRole::Requester, requester_id)?;

        Ok(Self {
            resource_type: "ServiceRequest".to_string(),
            status: "active".to_string(),
            intent: "order".to_string(),
            category: Vec::new(),
            subject: Reference::patient(subject_id),
            requester: Reference::practitioner(requester_id),
            code: CodeableConcept::from_coding(
                Coding::new(systems::LOINC, "89579-2")
                    .with_display("Patient Health Questionnaire-9"),
            ),
            reason_code: vec![CodeableConcept::from_coding(
                Coding::new(systems::CONDITION_CODE, "problem").with_display("Depression"),
            )
            .with_text("Suspected depression")],
        })
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Construct the canonical order for a resolved catalog entry.
fn from_entry(
    kind: OrderKind,
    entry: &catalog::CatalogEntry,
    subject_id: &str,
    requester_id: &str,
) -> ServiceRequest {
    ServiceRequest {
        resource_type: "ServiceRequest".to_string(),
        status: "active".to_string(),
        intent: "order".to_string(),
        category: vec![CodeableConcept::from_coding(kind.category_coding())],
        subject: Reference::patient(subject_id),
        requester: Reference::practitioner(requester_id),
        code: CodeableConcept::from_coding(entry.coding()).with_text(entry.key),
        reason_code: vec![CodeableConcept::from_text(format!(
            "Ordered {} for {} purposes",
            entry.key, kind
        ))],
    }
}

/// Reject empty/whitespace identifiers, returning the trimmed id.
pub(crate) fn require_id(role: PartyRole, id: &str) -> Result<&str, OrderError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(OrderError::MissingIdentifier(role));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_coded_blood_test_order() {
        let order = ServiceRequest::build(OrderKind::Diagnostic, "Blood Test", "123", "456")
            .expect("build order");

        assert_eq!(order.resource_type, "ServiceRequest");
        assert_eq!(order.status, "active");
        assert_eq!(order.intent, "order");
        assert_eq!(order.subject.reference, "Patient/123");
        assert_eq!(order.requester.reference, "Practitioner/456");

        let coding = &order.code.coding[0];
        assert_eq!(coding.system, "http://loinc.org");
        assert_eq!(coding.code, "33747-0");
        assert_eq!(coding.display.as_deref(), Some("General blood panel"));
        assert_eq!(order.code.text.as_deref(), Some("Blood Test"));

        let category = &order.category[0].coding[0];
        assert_eq!(category.system, systems::SERVICE_CATEGORY);
        assert_eq!(category.code, "diagnostic");
        assert_eq!(
            order.reason_code[0].text.as_deref(),
            Some("Ordered Blood Test for diagnostic purposes")
        );
    }

    #[test]
    fn builds_a_therapeutic_order_with_snomed_coding() {
        let order = ServiceRequest::build(OrderKind::Therapeutic, "Surgery", "p-9", "dr-2")
            .expect("build order");

        let coding = &order.code.coding[0];
        assert_eq!(coding.system, "http://snomed.info/sct");
        assert_eq!(coding.code, "387713003");
        assert_eq!(order.category[0].coding[0].code, "therapeutic");
        assert_eq!(
            order.reason_code[0].text.as_deref(),
            Some("Ordered Surgery for therapeutic purposes")
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ServiceRequest::build(OrderKind::Diagnostic, "Unknown Thing", "123", "456")
            .expect_err("should reject");
        match err {
            OrderError::UnknownCatalogKey { kind, key } => {
                assert_eq!(kind, OrderKind::Diagnostic);
                assert_eq!(key, "Unknown Thing");
            }
            other => panic!("expected UnknownCatalogKey, got {other:?}"),
        }
    }

    #[test]
    fn keys_do_not_cross_catalogs() {
        // "Surgery" is therapeutic; ordering it as a test must fail.
        assert!(matches!(
            ServiceRequest::build(OrderKind::Diagnostic, "Surgery", "123", "456"),
            Err(OrderError::UnknownCatalogKey { .. })
        ));
    }

    #[test]
    fn rejects_missing_identifiers() {
        let err = ServiceRequest::build(OrderKind::Therapeutic, "Surgery", "", "456")
            .expect_err("should reject");
        assert!(matches!(
            err,
            OrderError::MissingIdentifier(PartyRole::Subject)
        ));

        let err = ServiceRequest::build(OrderKind::Therapeutic, "Surgery", "123", "   ")
            .expect_err("should reject");
        assert!(matches!(
            err,
            OrderError::MissingIdentifier(PartyRole::Requester)
        ));
    }

    #[test]
    fn batch_produces_one_order_per_key() {
        let orders = ServiceRequest::build_batch(
            [
                (OrderKind::Diagnostic, "Blood Test"),
                (OrderKind::Diagnostic, "X-Ray"),
                (OrderKind::Therapeutic, "Medication"),
            ],
            "123",
            "456",
        )
        .expect("build batch");

        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].code.text.as_deref(), Some("Blood Test"));
        assert_eq!(orders[1].code.text.as_deref(), Some("X-Ray"));
        assert_eq!(orders[2].code.text.as_deref(), Some("Medication"));
        assert_eq!(orders[2].category[0].coding[0].code, "therapeutic");
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let err = ServiceRequest::build_batch(
            [
                (OrderKind::Diagnostic, "Blood Test"),
                (OrderKind::Diagnostic, "NotARealTest"),
            ],
            "123",
            "456",
        )
        .expect_err("should reject whole batch");

        assert!(matches!(err, OrderError::UnknownCatalogKey { key, .. } if key == "NotARealTest"));
    }

    #[test]
    fn empty_batch_is_fine() {
        let selection: [(OrderKind, &str); 0] = [];
        let orders = ServiceRequest::build_batch(selection, "123", "456").expect("empty batch");
        assert!(orders.is_empty());
    }

    #[test]
    fn phq9_order_is_coded_for_depression_screening() {
        let order = ServiceRequest::phq9("123", "456").expect("build phq9 order");

        let coding = &order.code.coding[0];
        assert_eq!(coding.system, "http://loinc.org");
        assert_eq!(coding.code, "89579-2");
        assert!(order.category.is_empty());

        let reason = &order.reason_code[0];
        assert_eq!(reason.coding[0].code, "problem");
        assert_eq!(reason.text.as_deref(), Some("Suspected depression"));
    }

    #[test]
    fn serialises_with_fhir_field_names() {
        let order = ServiceRequest::build(OrderKind::Diagnostic, "CT Scan", "123", "456")
            .expect("build order");
        let json = serde_json::to_value(&order).expect("serialise order");

        assert_eq!(json["resourceType"], "ServiceRequest");
        assert!(json.get("reasonCode").is_some());
        assert!(json.get("reason_code").is_none());
        assert_eq!(json["subject"]["reference"], "Patient/123");
    }
}
