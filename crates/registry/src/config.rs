//! Registry configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! cache_registries = true
//!
//! [compendium]
//! home_pack_prefix = "world"
//! revalidate_on_pack_version = true
//! packs = []
//!
//! [insinuation]
//! copy_metadata = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use hangar_collections::CompendiumConfig;
use hangar_core::{HangarError, HangarResult};

/// Top-level registry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Memoize built registries by name
    pub cache_registries: bool,
    /// Content-pack backend settings
    pub compendium: CompendiumConfig,
    /// Insinuation settings
    pub insinuation: InsinuationConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cache_registries: true,
            compendium: CompendiumConfig::default(),
            insinuation: InsinuationConfig::default(),
        }
    }
}

/// Insinuation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsinuationConfig {
    /// Copy name, image and token from the source document onto the copy
    pub copy_metadata: bool,
}

impl Default for InsinuationConfig {
    fn default() -> Self {
        Self {
            copy_metadata: true,
        }
    }
}

impl RegistryConfig {
    /// Parse from a TOML string
    pub fn from_toml_str(s: &str) -> HangarResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> HangarResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HangarError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(
            RegistryConfig::from_toml_str("").unwrap(),
            RegistryConfig::default()
        );
        let config = RegistryConfig::default();
        assert!(config.cache_registries);
        assert!(config.insinuation.copy_metadata);
        assert_eq!(config.compendium.home_pack_prefix, "world");
    }

    #[test]
    fn test_partial_config() {
        let config = RegistryConfig::from_toml_str(
            r#"
            cache_registries = false

            [compendium]
            packs = ["core.frames"]
            "#,
        )
        .unwrap();
        assert!(!config.cache_registries);
        assert_eq!(config.compendium.packs, vec!["core.frames"]);
        assert!(config.compendium.revalidate_on_pack_version);
        assert!(config.insinuation.copy_metadata);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = RegistryConfig::from_toml_str("cache_registries = \"yes\"").unwrap_err();
        assert!(matches!(err, HangarError::Config { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[insinuation]\ncopy_metadata = false").unwrap();
        let config = RegistryConfig::load(file.path()).unwrap();
        assert!(!config.insinuation.copy_metadata);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegistryConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, HangarError::Config { .. }));
    }
}
