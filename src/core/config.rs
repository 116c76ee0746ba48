use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the dialogue API, including the `/api` prefix.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Where downloaded audio is written (console front end only).
    #[serde(default = "default_output")]
    pub output_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            output_folder: default_output(),
        }
    }
}

fn default_api_base() -> String {
    "http://127.0.0.1:5000/api".to_string()
}
fn default_output() -> String {
    "downloads".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("{} not found. Please create one.", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("{} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }

    /// Browser configuration: the API lives under `/api` on the page origin.
    #[cfg(target_arch = "wasm32")]
    pub fn for_browser() -> Self {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
        Self {
            api_base: format!("{}/api", origin),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::load_or_default(&dir.path().join(CONFIG_FILE))?;
        assert_eq!(config.api_base, "http://127.0.0.1:5000/api");
        assert_eq!(config.output_folder, "downloads");
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "api_base: http://tts.local:8080/api\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.api_base, "http://tts.local:8080/api");
        assert_eq!(config.output_folder, "downloads");
        Ok(())
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("absent.yml")).is_err());
    }
}
