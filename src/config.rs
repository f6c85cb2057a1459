// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Runtime configuration
//!
//! One TOML document with a table per subsystem. Missing tables and fields
//! fall back to the defaults of the subsystem configs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cut::CutConfig;
use crate::physics::PhysicsConfig;
use crate::scene::SceneConfig;

/// File picked up by [`KatanaConfig::load`] from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "katana.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KatanaConfig {
    pub cut: CutConfig,
    pub physics: PhysicsConfig,
    pub scene: SceneConfig,
}

impl KatanaConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: KatanaConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `katana.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `KATANA_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(seed) = lookup("KATANA_SEED") {
            let seed = seed
                .trim()
                .parse()
                .with_context(|| format!("KATANA_SEED is not an integer: {:?}", seed))?;
            self.scene.seed = Some(seed);
        }

        if let Some(kill_y) = lookup("KATANA_KILL_Y") {
            self.scene.kill_y = kill_y
                .trim()
                .parse()
                .with_context(|| format!("KATANA_KILL_Y is not a number: {:?}", kill_y))?;
        }

        if let Some(assets) = lookup("KATANA_ASSETS") {
            self.scene.assets = assets
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("katana.toml");
        std::fs::write(&path, "[scene]\nkill_y = -20.0\n\n[cut]\ncap = false\n").unwrap();

        let config = KatanaConfig::from_file(&path).unwrap();
        assert_eq!(config.scene.kill_y, -20.0);
        assert!(!config.cut.cap);
        assert_eq!(config.scene.spawn_y, SceneConfig::default().spawn_y);
        assert_eq!(config.physics.max_substeps, 10);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.toml");

        let mut config = KatanaConfig::default();
        config.scene.seed = Some(99);
        config.scene.assets = vec!["plank".into()];
        config.save(&path).unwrap();

        let loaded = KatanaConfig::from_file(&path).unwrap();
        assert_eq!(loaded.scene.seed, Some(99));
        assert_eq!(loaded.scene.assets, vec!["plank".to_string()]);
        assert_eq!(loaded.scene.camera.viewport, [1280, 720]);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = KatanaConfig::default();
        config
            .apply_env(|key| match key {
                "KATANA_SEED" => Some("7".into()),
                "KATANA_KILL_Y" => Some(" -3.5".into()),
                "KATANA_ASSETS" => Some("cube, sphere,,".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.scene.seed, Some(7));
        assert_eq!(config.scene.kill_y, -3.5);
        assert_eq!(config.scene.assets, vec!["cube".to_string(), "sphere".to_string()]);
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let mut config = KatanaConfig::default();
        let result = config.apply_env(|key| (key == "KATANA_SEED").then(|| "abc".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(KatanaConfig::from_file("/nonexistent/katana.toml").is_err());
    }
}
