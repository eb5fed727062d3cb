//! Domain-level launch context types.
//!
//! Responsibilities:
//! - Define the [`LaunchContext`] record the codec encodes and decodes
//! - Define the encounter selection mode and its wire tokens
//! - Provide the exactly-one-id helpers the host uses for pre-selection

/// How the encounter for the launched session is chosen.
///
/// Three reserved sentinel tokens exist on the wire: `AUTO`, `MANUAL` and
/// `NONE`. Any other wire value is carried verbatim as a literal encounter
/// id — it is never an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncounterSelection {
    /// Pick the most recent encounter automatically.
    Auto,
    /// Ask the user to pick an encounter at launch time.
    Manual,
    /// Launch without an encounter.
    None,
    /// Launch against this specific encounter.
    Id(String),
}

impl Default for EncounterSelection {
    fn default() -> Self {
        EncounterSelection::None
    }
}

impl EncounterSelection {
    /// Convert to the wire token.
    pub fn to_wire(&self) -> &str {
        match self {
            EncounterSelection::Auto => "AUTO",
            EncounterSelection::Manual => "MANUAL",
            EncounterSelection::None => "NONE",
            EncounterSelection::Id(id) => id,
        }
    }

    /// Parse from a wire token.
    ///
    /// Total by contract: unrecognised values are literal encounter ids.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "AUTO" => EncounterSelection::Auto,
            "MANUAL" => EncounterSelection::Manual,
            "NONE" => EncounterSelection::None,
            other => EncounterSelection::Id(other.to_string()),
        }
    }
}

/// The structured record a launch token carries.
///
/// Id lists are ordered and may be empty; they are never absent. Insertion
/// order is semantically relevant: the host pre-selects a party only when a
/// list holds exactly one id, and displays selection pickers in list order
/// otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchContext {
    /// Candidate patient ids for the session, in presentation order.
    pub patient_ids: Vec<String>,

    /// Candidate provider (practitioner) ids, in presentation order.
    pub provider_ids: Vec<String>,

    /// Encounter selection mode for the session.
    pub encounter: EncounterSelection,
}

impl LaunchContext {
    /// The patient id to pre-select, present only when the context names
    /// exactly one patient.
    pub fn sole_patient_id(&self) -> Option<&str> {
        match self.patient_ids.as_slice() {
            [id] => Some(id),
            _ => None,
        }
    }

    /// The provider id to pre-select, present only when the context names
    /// exactly one provider.
    pub fn sole_provider_id(&self) -> Option<&str> {
        match self.provider_ids.as_slice() {
            [id] => Some(id),
            _ => None,
        }
    }
}
