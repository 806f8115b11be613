//! Validation and extraction result types

use crate::cost::UsageInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Issue severity as reported by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    #[serde(alias = "info")]
    Info,
    #[serde(alias = "warning")]
    Warning,
    #[serde(alias = "critical")]
    Critical,
}

/// Overall verdict, derived deterministically from issue severities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[serde(alias = "Pass")]
    Pass,
    #[serde(alias = "Warnings")]
    Warnings,
    #[serde(alias = "Fail")]
    Fail,
}

/// Single finding against a regulation rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub description: String,
    /// Model's confidence in the finding, 0-100
    #[serde(default)]
    pub confidence: u8,
    #[serde(default)]
    pub regulation_reference: String,
    #[serde(default)]
    pub recommendation: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Which context source backed the finding, when the model cites one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

/// Complete validation outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub summary: String,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
    /// Free-form extras some models attach alongside the verdict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageInfo>,
}

/// Status is a pure function of the worst issue severity. The model also
/// reports a status field; when the two disagree the derived one wins and
/// the disagreement is logged.
pub fn derive_status(issues: &[ValidationIssue]) -> ValidationStatus {
    match issues.iter().map(|i| i.severity).max() {
        Some(Severity::Critical) => ValidationStatus::Fail,
        Some(Severity::Warning) => ValidationStatus::Warnings,
        _ => ValidationStatus::Pass,
    }
}

/// Fields pulled out of a safety data sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdsFields {
    #[serde(default)]
    pub un_number: Option<String>,
    #[serde(default)]
    pub proper_shipping_name: Option<String>,
    #[serde(default)]
    pub hazard_class: Option<String>,
    #[serde(default)]
    pub packing_group: Option<String>,
    #[serde(default)]
    pub flash_point: Option<String>,
    /// Per-field confidence 0.0-1.0 as reported by the model
    #[serde(default)]
    pub confidence: HashMap<String, f64>,
}
