//! Prompt construction
//!
//! Prompts interleave the shipment field dump, the carrier/mode rule set
//! verbatim, and the rendered context block. The context block is only
//! present when at least one source contributed content.

use super::result::SdsFields;
use crate::shipment::{regulation_rules, HazmatShipment};
use std::collections::HashMap;
use std::fmt::Write;

/// SDS text is truncated to this many characters before it goes into the
/// extraction prompt.
pub const SDS_TEXT_LIMIT: usize = 30_000;

/// Prompt for the main compliance validation call. Rules toggled off in
/// `rule_toggles` are left out; unknown ids default to enabled.
pub fn build_validation_prompt(
    shipment: &HazmatShipment,
    sds: Option<&SdsFields>,
    context: &str,
    rule_toggles: &HashMap<String, bool>,
) -> String {
    let mut prompt = String::new();

    writeln!(
        prompt,
        "You are a dangerous-goods compliance auditor. Validate the following \
         shipment against {} for {} {} service.",
        shipment.mode.regulation(),
        shipment.carrier,
        shipment.mode
    )
    .ok();

    prompt.push_str("\nShipment declaration:\n");
    push_field(&mut prompt, "Carrier", &shipment.carrier.to_string());
    push_field(&mut prompt, "Mode", &shipment.mode.to_string());
    push_field(&mut prompt, "Service", &shipment.service);
    push_field(&mut prompt, "UN number", &shipment.un_number);
    push_field(
        &mut prompt,
        "Proper shipping name",
        &shipment.proper_shipping_name,
    );
    if let Some(technical) = &shipment.technical_name {
        push_field(&mut prompt, "Technical name", technical);
    }
    push_field(&mut prompt, "Hazard class", &shipment.hazard_class);
    if let Some(group) = &shipment.packing_group {
        push_field(&mut prompt, "Packing group", group);
    }
    push_field(
        &mut prompt,
        "Quantity",
        &format!("{} {}", shipment.quantity, shipment.quantity_unit),
    );
    if let Some(packaging) = &shipment.packaging_type {
        push_field(&mut prompt, "Packaging type", packaging);
    }
    if let Some(instruction) = &shipment.packing_instruction {
        push_field(&mut prompt, "Packing instruction", instruction);
    }
    push_field(
        &mut prompt,
        "Cargo aircraft only",
        if shipment.cargo_aircraft_only { "yes" } else { "no" },
    );
    push_field(
        &mut prompt,
        "Reportable quantity",
        if shipment.reportable_quantity { "yes" } else { "no" },
    );

    if let Some(sds) = sds {
        prompt.push_str("\nFields extracted from the attached safety data sheet:\n");
        if let Some(v) = &sds.un_number {
            push_field(&mut prompt, "SDS UN number", v);
        }
        if let Some(v) = &sds.proper_shipping_name {
            push_field(&mut prompt, "SDS proper shipping name", v);
        }
        if let Some(v) = &sds.hazard_class {
            push_field(&mut prompt, "SDS hazard class", v);
        }
        if let Some(v) = &sds.packing_group {
            push_field(&mut prompt, "SDS packing group", v);
        }
        if let Some(v) = &sds.flash_point {
            push_field(&mut prompt, "SDS flash point", v);
        }
        prompt.push_str(
            "Cross-check the declaration against the SDS and flag any mismatch.\n",
        );
    }

    prompt.push_str("\nCarrier rules (hard constraints, apply verbatim):\n");
    for rule in regulation_rules(shipment.carrier, shipment.mode) {
        if rule_toggles.get(rule.id).copied().unwrap_or(true) {
            writeln!(prompt, "- {}", rule.text).ok();
        }
    }

    if !context.is_empty() {
        prompt.push_str(
            "\nReference context, ordered by trust weight (higher weight is more \
             authoritative; prefer higher-weight sources on conflict):\n\n",
        );
        prompt.push_str(context);
        prompt.push('\n');
        prompt.push_str(
            "\nWhen a finding relies on reference context, cite the source name \
             in the issue's \"citation\" field.\n",
        );
    }

    push_verdict_schema(&mut prompt);
    prompt
}

/// Prompt for pulling structured fields out of raw SDS text.
pub fn build_sds_extraction_prompt(sds_text: &str) -> String {
    let truncated: String = sds_text.chars().take(SDS_TEXT_LIMIT).collect();

    format!(
        "Extract the transport-relevant fields from this safety data sheet.\n\n\
         Respond with a single JSON object:\n\
         {{\n\
         \x20 \"unNumber\": string | null,\n\
         \x20 \"properShippingName\": string | null,\n\
         \x20 \"hazardClass\": string | null,\n\
         \x20 \"packingGroup\": string | null,\n\
         \x20 \"flashPoint\": string | null,\n\
         \x20 \"confidence\": {{ \"<fieldName>\": number between 0 and 1 }}\n\
         }}\n\
         Use null for anything the document does not state. No prose outside \
         the JSON object.\n\n\
         Document text:\n{truncated}"
    )
}

/// Stage one of screenshot validation: read the declaration fields off
/// the image, no judgement yet.
pub fn build_screenshot_read_prompt() -> String {
    "This image is a screenshot of a dangerous-goods shipment declaration \
     form. Read every visible field value exactly as shown. Do not assess \
     compliance.\n\n\
     Respond with a single JSON object:\n\
     {\n\
     \x20 \"carrier\": string | null,\n\
     \x20 \"mode\": string | null,\n\
     \x20 \"service\": string | null,\n\
     \x20 \"unNumber\": string | null,\n\
     \x20 \"properShippingName\": string | null,\n\
     \x20 \"hazardClass\": string | null,\n\
     \x20 \"packingGroup\": string | null,\n\
     \x20 \"quantity\": string | null,\n\
     \x20 \"notes\": string\n\
     }\n\
     Use null for fields that are not visible. No prose outside the JSON \
     object."
        .to_string()
}

/// Stage two of screenshot validation: judge the fields read in stage one.
/// `observed` is the stage-one JSON, the raw stage-one text when that JSON
/// could not be parsed, or empty when stage one failed outright.
pub fn build_screenshot_validation_prompt(observed: &str, context: &str) -> String {
    let observed = if observed.is_empty() {
        "(the fields could not be read ahead of time; read them directly \
         from the attached image)"
    } else {
        observed
    };

    let mut prompt = format!(
        "You are a dangerous-goods compliance auditor. The following fields \
         were read from a screenshot of a shipment declaration form:\n\n\
         {observed}\n\n\
         Validate them against the governing regulation for the visible \
         carrier and transport mode (IATA DGR for air, DOT 49 CFR for \
         ground). Treat unreadable or missing fields as warnings, not \
         failures."
    );

    if !context.is_empty() {
        prompt.push_str(
            "\n\nReference context, ordered by trust weight (higher weight is \
             more authoritative):\n\n",
        );
        prompt.push_str(context);
        prompt.push_str(
            "\n\nWhen a finding relies on reference context, cite the source \
             name in the issue's \"citation\" field.",
        );
    }

    push_verdict_schema(&mut prompt);
    prompt
}

/// Response schema shared by both validation prompts, matching
/// [`super::result::ValidationResult`].
fn push_verdict_schema(prompt: &mut String) {
    prompt.push_str(
        "\nRespond with a single JSON object:\n\
         {\n\
         \x20 \"status\": \"pass\" | \"warnings\" | \"fail\",\n\
         \x20 \"summary\": string,\n\
         \x20 \"issues\": [{\n\
         \x20   \"description\": string,\n\
         \x20   \"confidence\": number between 0 and 100,\n\
         \x20   \"regulationReference\": string,\n\
         \x20   \"recommendation\": string,\n\
         \x20   \"severity\": \"Critical\" | \"Warning\" | \"Info\",\n\
         \x20   \"explanation\": string | null,\n\
         \x20   \"citation\": string | null\n\
         \x20 }]\n\
         }\n\
         No prose outside the JSON object.",
    );
}

fn push_field(prompt: &mut String, label: &str, value: &str) {
    writeln!(prompt, "- {label}: {value}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shipment::{Carrier, TransportMode};

    fn shipment() -> HazmatShipment {
        HazmatShipment {
            carrier: Carrier::FedEx,
            mode: TransportMode::Air,
            service: "FedEx Priority Overnight".to_string(),
            un_number: "UN1263".to_string(),
            proper_shipping_name: "Paint".to_string(),
            technical_name: None,
            hazard_class: "3".to_string(),
            packing_group: Some("II".to_string()),
            quantity: 4.0,
            quantity_unit: "L".to_string(),
            packaging_type: None,
            packing_instruction: Some("353".to_string()),
            cargo_aircraft_only: false,
            reportable_quantity: false,
        }
    }

    fn no_toggles() -> HashMap<String, bool> {
        HashMap::new()
    }

    #[test]
    fn test_validation_prompt_embeds_rules_verbatim() {
        let prompt = build_validation_prompt(&shipment(), None, "", &no_toggles());
        for rule in regulation_rules(Carrier::FedEx, TransportMode::Air) {
            assert!(prompt.contains(rule.text), "missing rule: {}", rule.text);
        }
        assert!(prompt.contains("UN1263"));
        assert!(prompt.contains("IATA DGR"));
        assert!(prompt.contains("regulationReference"));
        assert!(prompt.contains("recommendation"));
    }

    #[test]
    fn test_toggled_off_rule_is_left_out() {
        let mut toggles = HashMap::new();
        toggles.insert("sameday".to_string(), false);
        let prompt = build_validation_prompt(&shipment(), None, "", &toggles);
        assert!(!prompt.contains("FedEx SameDay"));
        assert!(prompt.contains("Accessible DG"));
    }

    #[test]
    fn test_unknown_toggle_id_changes_nothing() {
        let mut toggles = HashMap::new();
        toggles.insert("no-such-rule".to_string(), false);
        let prompt = build_validation_prompt(&shipment(), None, "", &toggles);
        for rule in regulation_rules(Carrier::FedEx, TransportMode::Air) {
            assert!(prompt.contains(rule.text));
        }
    }

    #[test]
    fn test_context_block_only_when_nonempty() {
        let without = build_validation_prompt(&shipment(), None, "", &no_toggles());
        assert!(!without.contains("Reference context"));

        let with = build_validation_prompt(
            &shipment(),
            None,
            "[Source: ERG | type: remote | weight: 80/100]\nno aerosols",
            &no_toggles(),
        );
        assert!(with.contains("Reference context"));
        assert!(with.contains("no aerosols"));
        assert!(with.contains("citation"));
    }

    #[test]
    fn test_sds_prompt_truncates_long_text() {
        let long = "x".repeat(SDS_TEXT_LIMIT + 5_000);
        let prompt = build_sds_extraction_prompt(&long);
        let run = prompt.chars().filter(|c| *c == 'x').count();
        assert_eq!(run, SDS_TEXT_LIMIT);
    }

    #[test]
    fn test_sds_fields_appear_in_validation_prompt() {
        let sds = SdsFields {
            un_number: Some("UN1263".to_string()),
            flash_point: Some("23 C".to_string()),
            ..Default::default()
        };
        let prompt = build_validation_prompt(&shipment(), Some(&sds), "", &no_toggles());
        assert!(prompt.contains("SDS UN number"));
        assert!(prompt.contains("23 C"));
    }

    #[test]
    fn test_screenshot_prompt_without_observed_fields() {
        let prompt = build_screenshot_validation_prompt("", "");
        assert!(prompt.contains("could not be read ahead of time"));
    }
}
