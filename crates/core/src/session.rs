//! Clinician session state.
//!
//! Responsibilities:
//! - Hold the caller-owned mutable state the host page displays: current
//!   user, current patient, current encounter id
//! - Apply the host message channel's events (`setUser`, `setPatient`,
//!   `setEncounterID`)
//! - Seed the state from a decoded launch context, pre-selecting a party
//!   only when the context names exactly one candidate

use launch::{EncounterSelection, LaunchContext};
use serde::{Deserialize, Serialize};

/// A selected party: resource id plus optional display name.
///
/// The host channel delivers full FHIR resources; only the id and a display
/// string survive into session state.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PartyRef {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl PartyRef {
    /// A party known only by id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: None,
        }
    }
}

/// Events delivered by the host message channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The authenticated user (practitioner) changed.
    SetUser(PartyRef),
    /// The patient in context changed.
    SetPatient(PartyRef),
    /// The encounter in context changed.
    SetEncounterId(String),
}

/// Caller-owned session state for one hosted launch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<PartyRef>,
    patient: Option<PartyRef>,
    encounter_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session from a decoded launch context.
    ///
    /// A party is pre-selected only when its id list holds exactly one
    /// entry; with zero or several candidates the selection stays open for
    /// the user. A literal encounter id fixes the encounter immediately;
    /// the `AUTO`/`MANUAL`/`NONE` sentinels leave it unresolved.
    pub fn from_launch(ctx: &LaunchContext) -> Self {
        let encounter_id = match &ctx.encounter {
            EncounterSelection::Id(id) => Some(id.clone()),
            _ => None,
        };

        Self {
            user: ctx.sole_provider_id().map(PartyRef::by_id),
            patient: ctx.sole_patient_id().map(PartyRef::by_id),
            encounter_id,
        }
    }

    /// Apply one host channel event.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SetUser(user) => self.user = Some(user),
            SessionEvent::SetPatient(patient) => self.patient = Some(patient),
            SessionEvent::SetEncounterId(id) => self.encounter_id = Some(id),
        }
    }

    pub fn user(&self) -> Option<&PartyRef> {
        self.user.as_ref()
    }

    pub fn patient(&self) -> Option<&PartyRef> {
        self.patient.as_ref()
    }

    pub fn encounter_id(&self) -> Option<&str> {
        self.encounter_id.as_deref()
    }

    /// The `(subject, requester)` id pair order submission needs.
    ///
    /// `None` until both patient and user are resolved; the UI layer uses
    /// this to short-circuit submission instead of letting an order with an
    /// empty reference reach the builder.
    pub fn order_parties(&self) -> Option<(&str, &str)> {
        match (&self.patient, &self.user) {
            (Some(patient), Some(user)) => Some((patient.id.as_str(), user.id.as_str())),
            _ => None,
        }
    }
}
