//! Shipment data model and static carrier/mode rule sets

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Carrier {
    FedEx,
    #[serde(rename = "UPS")]
    Ups,
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Carrier::FedEx => "FedEx",
            Carrier::Ups => "UPS",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    Air,
    Ground,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportMode::Air => "Air",
            TransportMode::Ground => "Ground",
        })
    }
}

impl TransportMode {
    /// Governing regulation for this mode
    pub fn regulation(&self) -> &'static str {
        match self {
            TransportMode::Air => "IATA DGR",
            TransportMode::Ground => "DOT 49 CFR",
        }
    }
}

/// Dangerous-goods shipment as collected from the declaration form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazmatShipment {
    pub carrier: Carrier,
    pub mode: TransportMode,
    pub service: String,
    pub un_number: String,
    pub proper_shipping_name: String,
    #[serde(default)]
    pub technical_name: Option<String>,
    pub hazard_class: String,
    #[serde(default)]
    pub packing_group: Option<String>,
    pub quantity: f64,
    pub quantity_unit: String,
    #[serde(default)]
    pub packaging_type: Option<String>,
    #[serde(default)]
    pub packing_instruction: Option<String>,
    #[serde(default)]
    pub cargo_aircraft_only: bool,
    #[serde(default)]
    pub reportable_quantity: bool,
}

/// One carrier rule embedded in the validation prompt. The id keys the
/// `rule.<id>` settings toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegulationRule {
    pub id: &'static str,
    pub text: &'static str,
}

/// Carrier-specific rule set embedded verbatim in the validation prompt
/// as hard constraints.
pub fn regulation_rules(carrier: Carrier, mode: TransportMode) -> &'static [RegulationRule] {
    match (carrier, mode) {
        (Carrier::FedEx, TransportMode::Air) => &[
            RegulationRule {
                id: "accessible-dg",
                text: "Accessible DG (Classes 1, 2.1, 2.2-CAO, 3, 4, 5, 8) require premium services (Priority/First Overnight).",
            },
            RegulationRule {
                id: "inaccessible-dg",
                text: "Inaccessible DG (Classes 2.2-non-CAO, 6.1, 6.2, 7, 9) allowed on economy services.",
            },
            RegulationRule {
                id: "iata-domestic",
                text: "All shipments must follow IATA DGR even if domestic.",
            },
            RegulationRule {
                id: "sameday",
                text: "FedEx SameDay only accepts UN 3373 and Dry Ice.",
            },
        ],
        (Carrier::FedEx, TransportMode::Ground) => &[
            RegulationRule {
                id: "explosives",
                text: "No Class 1.1, 1.2, 1.3, 1.5 explosives.",
            },
            RegulationRule {
                id: "poison-gas",
                text: "No Class 2.3 poison gas.",
            },
            RegulationRule {
                id: "spontaneously-combustible",
                text: "No Class 4.2 spontaneously combustible.",
            },
            RegulationRule {
                id: "infectious",
                text: "No Class 6.2 infectious substances (including UN 3373).",
            },
            RegulationRule {
                id: "reportable-quantity",
                text: "No Reportable Quantity shipments.",
            },
            RegulationRule {
                id: "hazardous-waste",
                text: "No hazardous waste.",
            },
            RegulationRule {
                id: "contiguous-us",
                text: "Contiguous US only.",
            },
        ],
        (Carrier::Ups, TransportMode::Air) => &[
            RegulationRule {
                id: "iata-variations",
                text: "Follows IATA DGR with UPS variations.",
            },
            RegulationRule {
                id: "passenger-aircraft",
                text: "Some classes restricted on passenger aircraft.",
            },
        ],
        (Carrier::Ups, TransportMode::Ground) => &[
            RegulationRule {
                id: "dot-49cfr",
                text: "Follows DOT 49 CFR.",
            },
            RegulationRule {
                id: "prohibitions",
                text: "Specific prohibitions on certain explosives and toxic substances.",
            },
        ],
    }
}
