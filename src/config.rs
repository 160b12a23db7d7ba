use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("planit")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlanitConfig {
    /// Base URL of the PlanIt backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the session file lives.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for PlanitConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_dir: default_data_dir(),
        }
    }
}

impl PlanitConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("planit")
            .join("config.json")
    }

    /// Load from the config file, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        let path = Self::config_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, content)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: PlanitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.base_url, "http://localhost:5000");
        assert!(cfg.data_dir.ends_with("planit"));
    }

    #[test]
    fn session_path_under_data_dir() {
        let cfg = PlanitConfig {
            base_url: default_base_url(),
            data_dir: PathBuf::from("/tmp/planit-test"),
        };
        assert_eq!(cfg.session_path(), PathBuf::from("/tmp/planit-test/session.json"));
    }
}
