use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::chat_gpt::{ServiceConfig, DEFAULT_API_ENDPOINT, DEFAULT_MODEL};
use crate::utils::naming_style::NamingStyle;

const SETTINGS_PATH: &str = "storage/settings.yaml";
const API_KEY_ENV: &str = "OPEN_AI_API_KEY";

/// Language value meaning "detect from the document".
pub const AUTO_LANGUAGE: &str = "auto";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub model: String,
    pub naming_style: String,
    pub language: String,
    pub context_lines: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: None,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            naming_style: NamingStyle::CamelCase.to_string(),
            language: AUTO_LANGUAGE.to_string(),
            context_lines: 5,
        }
    }
}

impl Settings {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            api_key: self.api_key.clone(),
            api_endpoint: self.api_endpoint.clone(),
            model: self.model.clone(),
        }
    }

    pub fn naming_style(&self) -> NamingStyle {
        self.naming_style.parse().unwrap_or_default()
    }
}

/// Load the settings from disk and the environment. Called on every command,
/// so edits take effect without restarting the bot.
pub fn get_settings() -> Result<Settings, anyhow::Error> {
    let mut settings = read_settings_file(Path::new(SETTINGS_PATH))?;
    apply_api_key_override(&mut settings, std::env::var(API_KEY_ENV).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings, anyhow::Error> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("Cannot open file '{}'", path.display()))
        }
    };
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    parse_settings(&contents)
        .with_context(|| format!("Cannot deserialize file '{}'", path.display()))
}

fn parse_settings(contents: &str) -> Result<Settings, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(contents)
}

fn apply_api_key_override(settings: &mut Settings, env_key: Option<String>) {
    if let Some(key) = env_key.filter(|key| !key.trim().is_empty()) {
        settings.api_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let settings = read_settings_file(Path::new("storage/does-not-exist.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.service_config(), ServiceConfig::default());
        assert_eq!(settings.naming_style(), NamingStyle::CamelCase);
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let settings = parse_settings(
            "api_key: sk-file\nnaming_style: snake_case\ncontext_lines: 3\n",
        )
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("sk-file"));
        assert_eq!(settings.naming_style(), NamingStyle::SnakeCase);
        assert_eq!(settings.context_lines, 3);
        assert_eq!(settings.api_endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(settings.language, AUTO_LANGUAGE);
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse_settings("\n").unwrap(), Settings::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(parse_settings("context_lines: [many]").is_err());
    }

    #[test]
    fn environment_key_overrides_file_key() {
        let mut settings = Settings {
            api_key: Some("sk-file".to_string()),
            ..Settings::default()
        };
        apply_api_key_override(&mut settings, Some("sk-env".to_string()));
        assert_eq!(settings.api_key.as_deref(), Some("sk-env"));

        apply_api_key_override(&mut settings, Some(String::new()));
        assert_eq!(settings.api_key.as_deref(), Some("sk-env"));

        apply_api_key_override(&mut settings, None);
        assert_eq!(settings.api_key.as_deref(), Some("sk-env"));
    }
}
