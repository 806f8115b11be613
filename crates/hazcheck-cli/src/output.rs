//! Terminal and JSON rendering of results

use crate::app::OutputFormat;
use anyhow::Result;
use hazcheck_core::llm::{SdsFields, Severity, ValidationResult, ValidationStatus};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub fn print_validation_result(result: &ValidationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        OutputFormat::Cli => print_validation_terminal(result),
    }
}

fn print_validation_terminal(result: &ValidationResult) -> Result<()> {
    let mut out = StandardStream::stdout(ColorChoice::Auto);

    let (label, color) = match result.status {
        ValidationStatus::Pass => ("PASS", Color::Green),
        ValidationStatus::Warnings => ("WARNINGS", Color::Yellow),
        ValidationStatus::Fail => ("FAIL", Color::Red),
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label}")?;
    out.reset()?;
    writeln!(out, "  {}", result.summary)?;

    for issue in &result.issues {
        let (tag, color) = match issue.severity {
            Severity::Critical => ("critical", Color::Red),
            Severity::Warning => ("warning", Color::Yellow),
            Severity::Info => ("info", Color::Cyan),
        };
        write!(out, "  ")?;
        out.set_color(ColorSpec::new().set_fg(Some(color)))?;
        write!(out, "[{tag}]")?;
        out.reset()?;
        write!(out, " {}", issue.description)?;
        if !issue.regulation_reference.is_empty() {
            write!(out, " ({})", issue.regulation_reference)?;
        }
        if issue.confidence > 0 {
            write!(out, " [{}%]", issue.confidence)?;
        }
        writeln!(out)?;
        if let Some(explanation) = &issue.explanation {
            writeln!(out, "    {explanation}")?;
        }
        if !issue.recommendation.is_empty() {
            writeln!(out, "    recommendation: {}", issue.recommendation)?;
        }
        if let Some(citation) = &issue.citation {
            writeln!(out, "    source: {citation}")?;
        }
    }

    if let Some(usage) = &result.usage {
        writeln!(
            out,
            "  {} tokens ({} in / {} out), est. ${:.4}",
            usage.total_tokens, usage.prompt_tokens, usage.candidate_tokens, usage.estimated_cost
        )?;
    }

    Ok(())
}

pub fn print_sds_fields(fields: &SdsFields, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(fields)?);
        return Ok(());
    }

    let rows = [
        ("UN number", &fields.un_number),
        ("Proper shipping name", &fields.proper_shipping_name),
        ("Hazard class", &fields.hazard_class),
        ("Packing group", &fields.packing_group),
        ("Flash point", &fields.flash_point),
    ];
    for (label, value) in rows {
        println!("{label}: {}", value.as_deref().unwrap_or("-"));
    }
    if !fields.confidence.is_empty() {
        let mut keys: Vec<&String> = fields.confidence.keys().collect();
        keys.sort();
        let summary: Vec<String> = keys
            .into_iter()
            .map(|k| format!("{k} {:.0}%", fields.confidence[k] * 100.0))
            .collect();
        println!("Confidence: {}", summary.join(", "));
    }
    Ok(())
}
