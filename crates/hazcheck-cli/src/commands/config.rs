//! Settings commands

use crate::app::{ConfigAction, ConfigArgs};
use anyhow::{bail, Result};
use hazcheck_core::config::Settings;

pub async fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            println!("config file: {}", Settings::default_path().display());
            println!(
                "api-key: {}",
                if settings.api_key.is_some() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!("validation-model: {}", settings.validation_model);
            println!("extraction-model: {}", settings.extraction_model);
            println!("screenshot-model: {}", settings.screenshot_model);
            println!("servers: {}", settings.servers.len());
            if !settings.rule_toggles.is_empty() {
                let mut rules: Vec<_> = settings.rule_toggles.iter().collect();
                rules.sort();
                for (rule, enabled) in rules {
                    println!("rule.{rule}: {enabled}");
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load()?;
            match key.as_str() {
                "api-key" => settings.api_key = Some(value),
                "validation-model" => settings.validation_model = value,
                "extraction-model" => settings.extraction_model = value,
                "screenshot-model" => settings.screenshot_model = value,
                _ => {
                    if let Some(rule) = key.strip_prefix("rule.") {
                        let enabled: bool = value
                            .parse()
                            .map_err(|_| anyhow::anyhow!("expected true or false"))?;
                        settings.rule_toggles.insert(rule.to_string(), enabled);
                    } else {
                        bail!(
                            "unknown key '{key}' (api-key, validation-model, \
                             extraction-model, screenshot-model, rule.<id>)"
                        );
                    }
                }
            }
            settings.save()?;
            println!("Set {key}");
        }
    }
    Ok(())
}
