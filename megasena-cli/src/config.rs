//! Configuration de `megasena`, lue depuis `megasena.toml`.
//!
//! Le fichier est cherché dans le répertoire de configuration de l'utilisateur
//! (ou au chemin donné par `--config`). Un fichier absent donne les valeurs par
//! défaut ; les options de la ligne de commande priment sur le fichier.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "megasena.toml";

pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("br", "megasena", "megasena").map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn default_config_path() -> PathBuf {
    config_dir()
        .map(|p| p.join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Fichier local : CSV, ou tableur (xlsx, xls, ods) selon l'extension
    File,
    /// CSV téléchargé en HTTP(S)
    Remote,
    /// Base SQLite remplie par `megasena import`
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub analysis: AnalysisConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub file: PathBuf,
    pub url: Option<String>,
    /// Chemin de la base ; `data/megasena.db` si absent.
    pub db: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            file: PathBuf::from("data/mega_sena.csv"),
            url: None,
            db: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Nombre de concours de la plage par défaut.
    pub window: u32,
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: 100,
            top_n: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub k: usize,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { k: 6, seed: None }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "pas de fichier de configuration");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Impossible de lire {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Configuration invalide dans {:?}", path))?;
        tracing::debug!(path = %path.display(), "configuration chargée");
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("Impossible d'écrire {:?}", path))?;
        Ok(())
    }
}
