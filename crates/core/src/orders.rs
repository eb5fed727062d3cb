//! Order submission orchestration.
//!
//! Responsibilities:
//! - Carry the clinician's dialog selection (test and treatment keys)
//! - Build the whole batch before anything leaves the process
//!   (all-or-nothing: one bad key means no network traffic at all)
//! - Submit one create per record concurrently and fail the batch on any
//!   upstream failure, surfacing the error unchanged

use fhir::{OrderKind, ServiceRequest};
use fhir_client::FhirBackend;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::CoreResult;

/// The clinician's order dialog selection.
///
/// Keys are catalog keys; tests come before treatments in submission order,
/// matching the dialog's layout.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OrderSelection {
    #[serde(default)]
    pub tests: Vec<String>,

    #[serde(default)]
    pub treatments: Vec<String>,
}

impl OrderSelection {
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty() && self.treatments.is_empty()
    }

    /// Total number of selected keys.
    pub fn len(&self) -> usize {
        self.tests.len() + self.treatments.len()
    }

    /// The selection as `(kind, key)` pairs in submission order.
    fn keyed(&self) -> impl Iterator<Item = (OrderKind, &str)> {
        self.tests
            .iter()
            .map(|key| (OrderKind::Diagnostic, key.as_str()))
            .chain(
                self.treatments
                    .iter()
                    .map(|key| (OrderKind::Therapeutic, key.as_str())),
            )
    }
}

/// Submits built orders to a FHIR backend.
///
/// Generic over [`FhirBackend`] so tests run against an in-memory backend.
#[derive(Clone, Debug)]
pub struct OrderService<B> {
    backend: B,
}

impl<B: FhirBackend> OrderService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Build and submit the whole selection.
    ///
    /// Construction is all-or-nothing: the selection is validated and every
    /// record built before the first create is issued, so an unknown key or
    /// an unresolved party produces no network traffic. Submission fans out
    /// one concurrent create per record; if any create fails the whole call
    /// fails with that error and the batch is reported failed.
    ///
    /// Returns the created resources as the server sent them.
    pub async fn place_orders(
        &self,
        selection: &OrderSelection,
        subject_id: &str,
        requester_id: &str,
    ) -> CoreResult<Vec<Value>> {
        let orders = ServiceRequest::build_batch(selection.keyed(), subject_id, requester_id)?;

        let payloads = orders
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let batch_id = Uuid::new_v4();
        tracing::info!(%batch_id, orders = payloads.len(), "submitting order batch");

        let created =
            try_join_all(payloads.iter().map(|payload| self.backend.create(payload))).await?;

        tracing::info!(%batch_id, created = created.len(), "order batch accepted");
        Ok(created)
    }

    /// Build and submit a PHQ-9 questionnaire order.
    pub async fn place_phq9_order(
        &self,
        subject_id: &str,
        requester_id: &str,
    ) -> CoreResult<Value> {
        let order = ServiceRequest::phq9(subject_id, requester_id)?;
        let payload = serde_json::to_value(&order)?;

        tracing::info!("submitting PHQ-9 order");
        Ok(self.backend.create(&payload).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;
    use async_trait::async_trait;
    use fhir::OrderError;
    use fhir_client::{ClientError, ClientResult};
    use std::sync::Mutex;

    /// In-memory backend recording every create, optionally failing them.
    #[derive(Default)]
    struct RecordingBackend {
        created: Mutex<Vec<Value>>,
        fail_creates: bool,
    }

    impl RecordingBackend {
        fn failing() -> Self {
            Self {
                fail_creates: true,
                ..Self::default()
            }
        }

        fn created(&self) -> Vec<Value> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FhirBackend for RecordingBackend {
        async fn create(&self, resource: &Value) -> ClientResult<Value> {
            if self.fail_creates {
                return Err(ClientError::UnexpectedStatus {
                    status: 500,
                    path: "ServiceRequest".into(),
                });
            }
            self.created.lock().unwrap().push(resource.clone());
            Ok(resource.clone())
        }

        async fn request(&self, _path: &str) -> ClientResult<Value> {
            Ok(Value::Null)
        }
    }

    fn selection(tests: &[&str], treatments: &[&str]) -> OrderSelection {
        OrderSelection {
            tests: tests.iter().map(|s| s.to_string()).collect(),
            treatments: treatments.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn submits_one_create_per_selected_key() {
        let service = OrderService::new(RecordingBackend::default());

        let created = service
            .place_orders(
                &selection(&["Blood Test", "MRI Scan"], &["Medication"]),
                "123",
                "456",
            )
            .await
            .expect("place orders");

        assert_eq!(created.len(), 3);
        let recorded = service.backend.created();
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[0]["code"]["text"], "Blood Test");
        assert_eq!(recorded[1]["code"]["text"], "MRI Scan");
        assert_eq!(recorded[2]["code"]["text"], "Medication");
        assert_eq!(recorded[2]["category"][0]["coding"][0]["code"], "therapeutic");
        assert_eq!(recorded[0]["subject"]["reference"], "Patient/123");
    }

    #[tokio::test]
    async fn unknown_key_aborts_before_any_network_call() {
        let service = OrderService::new(RecordingBackend::default());

        let err = service
            .place_orders(
                &selection(&["Blood Test", "NotARealTest"], &[]),
                "123",
                "456",
            )
            .await
            .expect_err("should reject batch");

        assert!(matches!(
            err,
            CoreError::Order(OrderError::UnknownCatalogKey { ref key, .. }) if key == "NotARealTest"
        ));
        assert!(service.backend.created().is_empty());
    }

    #[tokio::test]
    async fn unresolved_party_aborts_before_any_network_call() {
        let service = OrderService::new(RecordingBackend::default());

        let err = service
            .place_orders(&selection(&["Blood Test"], &[]), "", "456")
            .await
            .expect_err("should reject batch");

        assert!(matches!(
            err,
            CoreError::Order(OrderError::MissingIdentifier(_))
        ));
        assert!(service.backend.created().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_fails_the_whole_batch() {
        let service = OrderService::new(RecordingBackend::failing());

        let err = service
            .place_orders(&selection(&["Blood Test"], &["Surgery"]), "123", "456")
            .await
            .expect_err("should propagate upstream failure");

        assert!(matches!(
            err,
            CoreError::Client(ClientError::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn empty_selection_submits_nothing() {
        let service = OrderService::new(RecordingBackend::default());

        let created = service
            .place_orders(&OrderSelection::default(), "123", "456")
            .await
            .expect("empty batch");

        assert!(created.is_empty());
        assert!(service.backend.created().is_empty());
    }

    #[tokio::test]
    async fn places_a_phq9_order() {
        let service = OrderService::new(RecordingBackend::default());

        let created = service
            .place_phq9_order("123", "456")
            .await
            .expect("place phq9");

        assert_eq!(created["code"]["coding"][0]["code"], "89579-2");
        assert_eq!(service.backend.created().len(), 1);
    }
}
