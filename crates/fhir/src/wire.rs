//! Shared FHIR wire datatypes.
//!
//! The minimal subset of FHIR R4 datatypes the host's resources need:
//! [`Coding`], [`CodeableConcept`] and [`Reference`]. These are the exact
//! structures serialised to JSON; optional fields are omitted from the wire
//! rather than serialised as null.

use serde::{Deserialize, Serialize};

/// A coded value from a terminology system.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Coding {
    /// Canonical URL of the code system (e.g. `http://loinc.org`).
    pub system: String,

    /// The code within that system.
    pub code: String,

    /// Human-readable display text for the code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    /// Create a coding without display text.
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: None,
        }
    }

    /// Attach display text.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// A concept expressed as one or more codings plus optional free text.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// A concept carrying a single coding and no text.
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            text: None,
        }
    }

    /// A concept carrying only free text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// Attach free text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A literal reference to another resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Reference {
    pub reference: String,
}

impl Reference {
    /// Reference to a `Patient` resource by id.
    pub fn patient(id: &str) -> Self {
        Self {
            reference: format!("Patient/{id}"),
        }
    }

    /// Reference to a `Practitioner` resource by id.
    pub fn practitioner(id: &str) -> Self {
        Self {
            reference: format!("Practitioner/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coding_omits_absent_display_on_the_wire() {
        let json = serde_json::to_value(Coding::new("http://loinc.org", "33747-0"))
            .expect("serialise coding");
        assert_eq!(json["system"], "http://loinc.org");
        assert_eq!(json["code"], "33747-0");
        assert!(json.get("display").is_none());
    }

    #[test]
    fn concept_round_trips_through_json() {
        let concept = CodeableConcept::from_coding(
            Coding::new("http://snomed.info/sct", "387713003").with_display("Surgical procedure"),
        )
        .with_text("Surgery");

        let json = serde_json::to_string(&concept).expect("serialise concept");
        let reparsed: CodeableConcept = serde_json::from_str(&json).expect("reparse concept");
        assert_eq!(concept, reparsed);
    }

    #[test]
    fn references_resolve_to_typed_paths() {
        assert_eq!(Reference::patient("123").reference, "Patient/123");
        assert_eq!(Reference::practitioner("456").reference, "Practitioner/456");
    }
}
