//! CLI configuration.
//!
//! Loaded from TOML at startup; a missing or unparsable file falls back to
//! defaults. Every table is `#[serde(default)]`, so a file only needs the
//! keys it overrides.

use std::path::Path;

use coherence_core::EngineConfig;
use serde::{Deserialize, Serialize};

/// File name of the config inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scoring and trigger parameters.
    pub engine: EngineConfig,
    /// Where guidance text comes from.
    pub guidance: GuidanceConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceSource {
    /// Pick from the built-in phrase lists.
    #[default]
    Canned,
    /// POST to an HTTP endpoint.
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    pub source: GuidanceSource,
    /// Upper bound on one fetch, milliseconds.
    pub fetch_timeout_ms: u64,
    /// Phrases for the canned source, sustained-low case.
    pub suggestions: Vec<String>,
    /// Phrases for the canned source, sharp-drop case.
    pub practices: Vec<String>,
    pub http: HttpGuidanceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpGuidanceConfig {
    pub url: String,
    /// Bearer token sent with each request, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub suggestion_prompt: String,
    pub practice_prompt: String,
}

const DEFAULT_SUGGESTIONS: &[&str] = &[
    "Que tal uma pausa de cinco minutos longe das telas?",
    "Beba um copo de água e alongue os ombros devagar.",
    "Escreva três coisas pelas quais você é grato hoje.",
    "Uma caminhada curta ao ar livre pode ajudar a clarear a mente.",
    "Mande uma mensagem para alguém de quem você gosta.",
];

const DEFAULT_PRACTICES: &[&str] = &[
    "Respiração 4-7-8: inspire por 4 segundos, segure por 7, expire por 8. Repita quatro vezes.",
    "Ancoragem 5-4-3-2-1: nomeie 5 coisas que vê, 4 que toca, 3 que ouve, 2 que cheira e 1 que saboreia.",
    "Coloque a mão no peito, sinta a respiração e diga a si mesmo: isto vai passar.",
    "Respiração quadrada: inspire 4, segure 4, expire 4, segure 4, por dois minutos.",
];

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            source: GuidanceSource::default(),
            fetch_timeout_ms: 30_000,
            suggestions: DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            practices: DEFAULT_PRACTICES.iter().map(|s| s.to_string()).collect(),
            http: HttpGuidanceConfig::default(),
        }
    }
}

impl Default for HttpGuidanceConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8787/guidance".to_string(),
            api_key: None,
            suggestion_prompt: "Sugira, em uma frase curta e gentil, uma pequena ação de \
                                autocuidado para alguém que está se sentindo para baixo."
                .to_string(),
            practice_prompt: "Descreva, em até três frases, uma prática de respiração ou \
                              ancoragem para alguém que acabou de ficar muito abalado."
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("failed to parse {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_named_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[engine]\ncooldown_ms = 1000\n\n[guidance]\nsource = \"http\"\n",
        )
        .unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.engine.cooldown_ms, 1000);
        assert_eq!(config.engine.drop_threshold, 20.0);
        assert_eq!(config.guidance.source, GuidanceSource::Http);
        assert!(!config.guidance.practices.is_empty());
    }

    #[test]
    fn test_invalid_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "engine = [not toml").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("cooldown_ms = 300000"));
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
