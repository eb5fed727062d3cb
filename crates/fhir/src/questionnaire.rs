//! QuestionnaireResponse wire model and PHQ-9 builder.
//!
//! Responsibilities:
//! - Define the wire model for completed questionnaire responses
//! - Build a PHQ-9 response from a patient's answers
//!
//! The `authored` timestamp is supplied by the caller so the builder stays a
//! pure function of its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::service_request::require_id;
use crate::wire::Reference;
use crate::{OrderError, PartyRole};

/// Canonical URL of the PHQ-9 questionnaire definition.
pub const PHQ9_QUESTIONNAIRE_URL: &str = "http://example.org/questionnaire/phq-9";

/// Number of items on the PHQ-9 questionnaire.
pub const PHQ9_ITEM_COUNT: usize = 9;

/// Highest score a single PHQ-9 item can take.
const PHQ9_MAX_ANSWER: u8 = 3;

// ============================================================================
// Wire model
// ============================================================================

/// Wire representation of a `QuestionnaireResponse` resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    pub resource_type: String,

    pub status: String,

    pub subject: Reference,

    /// Canonical URL of the questionnaire this response answers.
    pub questionnaire: String,

    /// When the answers were gathered (RFC 3339).
    pub authored: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<ResponseItem>,
}

/// One answered question.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseItem {
    pub link_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answer: Vec<ResponseAnswer>,
}

/// A single integer answer value.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAnswer {
    pub value_integer: i64,
}

// ============================================================================
// Builders
// ============================================================================

impl QuestionnaireResponse {
    /// Build a completed PHQ-9 response from a patient's answers.
    ///
    /// Answers map positionally to items `phq1..phq9`. Partially answered
    /// questionnaires (fewer than nine answers) are allowed and produce only
    /// the answered items; anything past the ninth answer is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingIdentifier`] when the subject id is
    /// unusable, and [`OrderError::AnswerOutOfRange`] when an answer falls
    /// outside the 0–3 item scale.
    pub fn phq9(
        subject_id: &str,
        answers: &[u8],
        authored: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        let subject_id = require_id(PartyRole::Subject, subject_id)?;

        let mut items = Vec::with_capacity(answers.len().min(PHQ9_ITEM_COUNT));
        for (idx, &value) in answers.iter().take(PHQ9_ITEM_COUNT).enumerate() {
            if value > PHQ9_MAX_ANSWER {
                return Err(OrderError::AnswerOutOfRange {
                    item: idx + 1,
                    value,
                });
            }
            items.push(ResponseItem {
                link_id: format!("phq{}", idx + 1),
                answer: vec![ResponseAnswer {
                    value_integer: i64::from(value),
                }],
            });
        }

        Ok(Self {
            resource_type: "QuestionnaireResponse".to_string(),
            status: "completed".to_string(),
            subject: Reference::patient(subject_id),
            questionnaire: PHQ9_QUESTIONNAIRE_URL.to_string(),
            authored: authored.to_rfc3339(),
            item: items,
        })
    }

    /// Sum of all answer values (the PHQ-9 severity score, 0–27 when fully
    /// answered).
    pub fn total_score(&self) -> i64 {
        self.item
            .iter()
            .flat_map(|item| item.answer.iter())
            .map(|answer| answer.value_integer)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn authored_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 23, 13, 58, 4).unwrap()
    }

    #[test]
    fn builds_items_in_question_order() {
        let response = QuestionnaireResponse::phq9("123", &[2, 1, 0, 3], authored_at())
            .expect("build response");

        assert_eq!(response.resource_type, "QuestionnaireResponse");
        assert_eq!(response.status, "completed");
        assert_eq!(response.subject.reference, "Patient/123");
        assert_eq!(response.questionnaire, PHQ9_QUESTIONNAIRE_URL);

        let link_ids: Vec<_> = response.item.iter().map(|i| i.link_id.as_str()).collect();
        assert_eq!(link_ids, vec!["phq1", "phq2", "phq3", "phq4"]);
        assert_eq!(response.item[0].answer[0].value_integer, 2);
    }

    #[test]
    fn scores_sum_across_items() {
        let response =
            QuestionnaireResponse::phq9("123", &[3, 3, 3, 3, 3, 3, 3, 3, 3], authored_at())
                .expect("build response");
        assert_eq!(response.item.len(), PHQ9_ITEM_COUNT);
        assert_eq!(response.total_score(), 27);
    }

    #[test]
    fn rejects_out_of_scale_answers() {
        let err = QuestionnaireResponse::phq9("123", &[1, 4], authored_at())
            .expect_err("should reject");
        match err {
            OrderError::AnswerOutOfRange { item, value } => {
                assert_eq!(item, 2);
                assert_eq!(value, 4);
            }
            other => panic!("expected AnswerOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_subject() {
        assert!(matches!(
            QuestionnaireResponse::phq9("  ", &[1], authored_at()),
            Err(OrderError::MissingIdentifier(PartyRole::Subject))
        ));
    }

    #[test]
    fn serialises_with_fhir_field_names() {
        let response =
            QuestionnaireResponse::phq9("123", &[2, 1], authored_at()).expect("build response");
        let json = serde_json::to_value(&response).expect("serialise response");

        assert_eq!(json["resourceType"], "QuestionnaireResponse");
        assert_eq!(json["item"][0]["linkId"], "phq1");
        assert_eq!(json["item"][0]["answer"][0]["valueInteger"], 2);
    }
}
