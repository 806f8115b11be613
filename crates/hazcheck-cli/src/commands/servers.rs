//! Knowledge server management commands

use crate::app::{ServersAction, ServersArgs};
use anyhow::{bail, Result};
use hazcheck_core::config::{KnowledgeServerConfig, Settings};

pub async fn run(args: ServersArgs) -> Result<()> {
    let mut settings = Settings::load()?;

    match args.action {
        ServersAction::Add { name, url, weight } => {
            if settings.servers.iter().any(|s| s.name == name) {
                bail!("server '{name}' already exists");
            }
            settings.servers.push(KnowledgeServerConfig {
                name: name.clone(),
                url,
                enabled: true,
                weight: weight.min(100),
            });
            settings.save()?;
            println!("Added server '{name}'");
        }
        ServersAction::List => {
            if settings.servers.is_empty() {
                println!("No servers configured");
            } else {
                for server in &settings.servers {
                    let state = if server.enabled { "enabled" } else { "disabled" };
                    println!(
                        "{:<20} weight {:>3}  {:<8} {}",
                        server.name, server.weight, state, server.url
                    );
                }
            }
        }
        ServersAction::Remove { name } => {
            let before = settings.servers.len();
            settings.servers.retain(|s| s.name != name);
            if settings.servers.len() == before {
                bail!("no such server: {name}");
            }
            settings.save()?;
            println!("Removed server '{name}'");
        }
        ServersAction::Enable { name } => {
            set_enabled(&mut settings, &name, true)?;
            println!("Enabled server '{name}'");
        }
        ServersAction::Disable { name } => {
            set_enabled(&mut settings, &name, false)?;
            println!("Disabled server '{name}'");
        }
        ServersAction::Weight { name, weight } => {
            let server = find_mut(&mut settings, &name)?;
            server.weight = weight.min(100);
            settings.save()?;
            println!("Set weight of '{name}' to {}", weight.min(100));
        }
    }
    Ok(())
}

fn set_enabled(settings: &mut Settings, name: &str, enabled: bool) -> Result<()> {
    find_mut(settings, name)?.enabled = enabled;
    settings.save()?;
    Ok(())
}

fn find_mut<'a>(
    settings: &'a mut Settings,
    name: &str,
) -> Result<&'a mut KnowledgeServerConfig> {
    settings
        .servers
        .iter_mut()
        .find(|s| s.name == name)
        .ok_or_else(|| anyhow::anyhow!("no such server: {name}"))
}
