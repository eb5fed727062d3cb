//! Fixed order catalogs.
//!
//! Responsibilities:
//! - Define the order kinds and their service-category codings
//! - Hold the diagnostic (LOINC) and therapeutic (SNOMED CT) catalogs
//! - Provide definition-order key listing and O(1) key lookup
//!
//! Both catalogs are immutable for the process lifetime. Key order is the
//! definition order below; the UI and the tests rely on it being stable.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::wire::Coding;

/// Canonical code system URLs used by the catalogs and builders.
pub mod systems {
    pub const LOINC: &str = "http://loinc.org";
    pub const SNOMED_CT: &str = "http://snomed.info/sct";
    pub const SERVICE_CATEGORY: &str =
        "http://terminology.hl7.org/CodeSystem/service-category";
    pub const CONDITION_CODE: &str = "http://terminology.hl7.org/CodeSystem/condition-code";
}

/// The two disjoint order categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderKind {
    /// Tests: imaging, panels, labs.
    Diagnostic,
    /// Treatments: therapy, procedures, medication.
    Therapeutic,
}

impl OrderKind {
    /// Convert to the FHIR service-category code.
    pub fn to_wire(self) -> &'static str {
        match self {
            OrderKind::Diagnostic => "diagnostic",
            OrderKind::Therapeutic => "therapeutic",
        }
    }

    /// Parse from the FHIR service-category code.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "diagnostic" => Some(OrderKind::Diagnostic),
            "therapeutic" => Some(OrderKind::Therapeutic),
            _ => None,
        }
    }

    /// The service-category coding an order of this kind carries.
    pub(crate) fn category_coding(self) -> Coding {
        let display = match self {
            OrderKind::Diagnostic => "Diagnostic",
            OrderKind::Therapeutic => "Therapeutic",
        };
        Coding::new(systems::SERVICE_CATEGORY, self.to_wire()).with_display(display)
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_wire())
    }
}

/// One orderable item: a human-readable key mapped to its coding triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The key shown to the clinician (e.g. "Blood Test").
    pub key: &'static str,
    /// Code system URL.
    pub system: &'static str,
    /// Code within the system.
    pub code: &'static str,
    /// Standard display text for the code.
    pub display: &'static str,
}

impl CatalogEntry {
    /// The entry's coding triple as a wire [`Coding`].
    pub fn coding(&self) -> Coding {
        Coding::new(self.system, self.code).with_display(self.display)
    }
}

// LOINC codes for the orderable tests
const DIAGNOSTIC: &[CatalogEntry] = &[
    CatalogEntry {
        key: "Blood Test",
        system: systems::LOINC,
        code: "33747-0",
        display: "General blood panel",
    },
    CatalogEntry {
        key: "X-Ray",
        system: systems::LOINC,
        code: "36643-5",
        display: "X-ray study",
    },
    CatalogEntry {
        key: "MRI Scan",
        system: systems::LOINC,
        code: "24627-2",
        display: "Magnetic resonance imaging study",
    },
    CatalogEntry {
        key: "CT Scan",
        system: systems::LOINC,
        code: "24604-1",
        display: "Computed tomography study",
    },
    CatalogEntry {
        key: "Urine Test",
        system: systems::LOINC,
        code: "24357-6",
        display: "Urinalysis complete panel",
    },
];

// SNOMED CT codes for the orderable treatments
const THERAPEUTIC: &[CatalogEntry] = &[
    CatalogEntry {
        key: "Physical Therapy",
        system: systems::SNOMED_CT,
        code: "108369006",
        display: "Physical therapy",
    },
    CatalogEntry {
        key: "Chemotherapy",
        system: systems::SNOMED_CT,
        code: "367336001",
        display: "Chemotherapy",
    },
    CatalogEntry {
        key: "Radiation Therapy",
        system: systems::SNOMED_CT,
        code: "108290001",
        display: "Radiation therapy",
    },
    CatalogEntry {
        key: "Surgery",
        system: systems::SNOMED_CT,
        code: "387713003",
        display: "Surgical procedure",
    },
    CatalogEntry {
        key: "Medication",
        system: systems::SNOMED_CT,
        code: "432102000",
        display: "Administration of substance",
    },
];

static DIAGNOSTIC_INDEX: LazyLock<HashMap<&'static str, &'static CatalogEntry>> =
    LazyLock::new(|| DIAGNOSTIC.iter().map(|e| (e.key, e)).collect());

static THERAPEUTIC_INDEX: LazyLock<HashMap<&'static str, &'static CatalogEntry>> =
    LazyLock::new(|| THERAPEUTIC.iter().map(|e| (e.key, e)).collect());

/// The catalog for a kind, in definition order.
pub fn entries(kind: OrderKind) -> &'static [CatalogEntry] {
    match kind {
        OrderKind::Diagnostic => DIAGNOSTIC,
        OrderKind::Therapeutic => THERAPEUTIC,
    }
}

/// The catalog keys for a kind, in definition order.
pub fn keys(kind: OrderKind) -> Vec<&'static str> {
    entries(kind).iter().map(|e| e.key).collect()
}

/// Look up a catalog entry by key.
pub fn lookup(kind: OrderKind, key: &str) -> Option<&'static CatalogEntry> {
    let index = match kind {
        OrderKind::Diagnostic => &DIAGNOSTIC_INDEX,
        OrderKind::Therapeutic => &THERAPEUTIC_INDEX,
    };
    index.get(key).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_keys_are_complete_and_ordered() {
        assert_eq!(
            keys(OrderKind::Diagnostic),
            vec!["Blood Test", "X-Ray", "MRI Scan", "CT Scan", "Urine Test"]
        );
    }

    #[test]
    fn therapeutic_keys_are_complete_and_ordered() {
        assert_eq!(
            keys(OrderKind::Therapeutic),
            vec![
                "Physical Therapy",
                "Chemotherapy",
                "Radiation Therapy",
                "Surgery",
                "Medication"
            ]
        );
    }

    #[test]
    fn lookup_returns_the_coding_triple() {
        let entry = lookup(OrderKind::Diagnostic, "Blood Test").expect("known key");
        assert_eq!(entry.system, systems::LOINC);
        assert_eq!(entry.code, "33747-0");
        assert_eq!(entry.display, "General blood panel");

        let entry = lookup(OrderKind::Therapeutic, "Surgery").expect("known key");
        assert_eq!(entry.system, systems::SNOMED_CT);
        assert_eq!(entry.code, "387713003");
    }

    #[test]
    fn catalogs_are_disjoint() {
        for entry in DIAGNOSTIC {
            assert!(lookup(OrderKind::Therapeutic, entry.key).is_none());
        }
        for entry in THERAPEUTIC {
            assert!(lookup(OrderKind::Diagnostic, entry.key).is_none());
        }
    }

    #[test]
    fn lookup_misses_unknown_keys() {
        assert!(lookup(OrderKind::Diagnostic, "Unknown Thing").is_none());
        // Keys are case-sensitive.
        assert!(lookup(OrderKind::Diagnostic, "blood test").is_none());
    }

    #[test]
    fn kind_wire_codes_round_trip() {
        for kind in [OrderKind::Diagnostic, OrderKind::Therapeutic] {
            assert_eq!(OrderKind::from_wire(kind.to_wire()), Some(kind));
        }
        assert_eq!(OrderKind::from_wire("imaging"), None);
    }
}
