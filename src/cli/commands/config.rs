//! Config command implementation.

use crate::agent::AgentMode;
use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{bail, Result};

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut settings = settings;
            apply_set(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::info(&format!(
                "Saved to {}",
                Settings::default_config_path().display()
            ));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            // Try to open in editor
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment to the settings, validating the value.
fn apply_set(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),
        "llm.model" => settings.llm.model = value.to_string(),
        "llm.timeout_seconds" => {
            settings.llm.timeout_seconds = value.parse().map_err(|_| {
                anyhow::anyhow!("llm.timeout_seconds must be a number, got '{}'", value)
            })?;
        }
        "agent.max_iterations" => {
            settings.agent.max_iterations = value.parse().map_err(|_| {
                anyhow::anyhow!("agent.max_iterations must be a number, got '{}'", value)
            })?;
        }
        "agent.mode" => {
            value.parse::<AgentMode>().map_err(anyhow::Error::msg)?;
            settings.agent.mode = value.to_string();
        }
        "database.support_path" => settings.database.support_path = value.to_string(),
        "database.inventory_path" => settings.database.inventory_path = value.to_string(),
        "prompts.custom_dir" => settings.prompts.custom_dir = Some(value.to_string()),
        _ => bail!(
            "Unknown config key: {}. Run 'ombud config show' to see available keys.",
            key
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_set_known_keys() {
        let mut settings = Settings::default();
        apply_set(&mut settings, "llm.model", "gpt-4o").unwrap();
        apply_set(&mut settings, "agent.max_iterations", "5").unwrap();
        apply_set(&mut settings, "agent.mode", "planning").unwrap();
        apply_set(&mut settings, "prompts.custom_dir", "~/prompts").unwrap();

        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.agent.max_iterations, 5);
        assert_eq!(settings.agent.mode, "planning");
        assert_eq!(settings.prompts.custom_dir.as_deref(), Some("~/prompts"));
    }

    #[test]
    fn test_apply_set_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(apply_set(&mut settings, "agent.max_iterations", "lots").is_err());
        assert!(apply_set(&mut settings, "agent.mode", "freestyle").is_err());
        assert!(apply_set(&mut settings, "llm.temperature", "0.7").is_err());
    }
}
