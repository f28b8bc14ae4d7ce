//! Configuration loader - YAML settings + .env overrides

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::marker::HexColor;
use crate::selection::Slot;

/// Placeholder shown in both image panels until a point is selected
pub const DEFAULT_PLACEHOLDER_URL: &str = "https://via.placeholder.com/337x335.png?text=START";

/// Viewer configuration loaded from viewer.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base path that image filenames are resolved against (`<base>/img/<file>`)
    pub static_base: String,
    pub placeholder_url: String,
    /// One color per series, reused cyclically. Must not use a slot highlight color.
    pub palette: Vec<HexColor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            static_base: "public".to_string(),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            palette: vec![
                HexColor::rgb(0xFF, 0x00, 0x2B),
                HexColor::rgb(0x32, 0xCD, 0x32),
                HexColor::rgb(0xFF, 0xCB, 0x47),
            ],
        }
    }
}

/// Environment overrides loaded from .env
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub public_url: Option<String>,
    pub dataset: Option<PathBuf>,
    pub log_dir: String,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.check_palette()?;
        Ok(config)
    }

    /// A series colored like a slot highlight would hide its selected points
    fn check_palette(&self) -> Result<()> {
        for color in &self.palette {
            if let Some(slot) = Slot::ALL.into_iter().find(|s| s.highlight_color() == *color) {
                anyhow::bail!("Palette color {} is reserved for the {} slot highlight", color, slot);
            }
        }
        Ok(())
    }

    /// Apply environment overrides on top of the file settings
    pub fn with_env(mut self, env: &Env) -> Self {
        if let Some(url) = &env.public_url {
            self.static_base = url.clone();
        }
        self
    }

    /// Color for the series at `index`, cycling through the palette
    pub fn series_color(&self, index: usize) -> HexColor {
        if self.palette.is_empty() {
            return HexColor::rgb(0x80, 0x80, 0x80);
        }
        self.palette[index % self.palette.len()]
    }
}

impl Env {
    /// Load overrides from the process environment and .env file
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Env {
            public_url: std::env::var("PUBLIC_URL").ok(),
            dataset: std::env::var("DATASET").ok().map(PathBuf::from),
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        }
    }
}
