//! Launch token encoding and decoding.
//!
//! Responsibilities:
//! - Define a strict wire model for the token payload
//! - Encode a [`LaunchContext`] into a single URL-safe string
//! - Decode a token back into a context, rejecting anything malformed
//!
//! Wire format: the context is serialised as a compact JSON object
//! (`{"patients":[...],"providers":[...],"encounter":"..."}`) and the JSON
//! text is base64url-encoded without padding. JSON string escaping is what
//! lets ids containing commas, spaces or non-ASCII characters round-trip
//! without a bespoke delimiter rule, and the base64url alphabet keeps the
//! token safe inside a URL query-string value with no further escaping.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::context::{EncounterSelection, LaunchContext};
use crate::LaunchError;

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of the token payload.
///
/// Absent id lists decode to empty vectors and an absent `encounter` key
/// decodes to the `NONE` sentinel, so a minimal token is valid. Unknown keys
/// are rejected: a token this codec did not produce must fail loudly rather
/// than decode to a guessed context.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct LaunchWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    patients: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    providers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    encounter: Option<String>,
}

// ============================================================================
// Public codec operations
// ============================================================================

/// Encode a launch context into a URL-safe token.
///
/// Deterministic and total for any well-formed context: the same context
/// always yields the same token, and empty id lists are fine.
///
/// # Errors
///
/// Returns [`LaunchError::Serialization`] if the payload cannot be
/// serialised; this is not reachable for well-formed contexts.
pub fn encode(ctx: &LaunchContext) -> Result<String, LaunchError> {
    let wire = domain_to_wire(ctx);
    let payload = serde_json::to_string(&wire)?;
    Ok(URL_SAFE_NO_PAD.encode(payload))
}

/// Decode a launch token back into a [`LaunchContext`].
///
/// Pure: no network, no environment. Decoding either yields the full
/// context or fails; it never returns a partially populated record.
///
/// # Errors
///
/// Returns [`LaunchError::MalformedToken`] when the token is not valid
/// unpadded base64url, the payload is not UTF-8, the JSON does not match the
/// expected shape (wrong structure, non-string ids), or an unrecognised
/// field is present. The error detail carries a best-effort path (e.g.
/// `patients[1]`) to the failing field.
pub fn decode(token: &str) -> Result<LaunchContext, LaunchError> {
    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|err| {
        LaunchError::MalformedToken {
            detail: format!("invalid base64url payload: {err}"),
        }
    })?;

    let text = String::from_utf8(bytes).map_err(|err| LaunchError::MalformedToken {
        detail: format!("payload is not UTF-8: {err}"),
    })?;

    let mut deserializer = serde_json::Deserializer::from_str(&text);
    let wire: LaunchWire =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() { "<root>" } else { path.as_str() };
            LaunchError::MalformedToken {
                detail: format!("payload shape mismatch at {path}: {source}"),
            }
        })?;

    Ok(wire_to_domain(wire))
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn domain_to_wire(ctx: &LaunchContext) -> LaunchWire {
    LaunchWire {
        patients: ctx.patient_ids.clone(),
        providers: ctx.provider_ids.clone(),
        encounter: Some(ctx.encounter.to_wire().to_string()),
    }
}

fn wire_to_domain(wire: LaunchWire) -> LaunchContext {
    LaunchContext {
        patient_ids: wire.patients,
        provider_ids: wire.providers,
        encounter: wire
            .encounter
            .as_deref()
            .map(EncounterSelection::from_wire)
            .unwrap_or_default(),
    }
}
