//! Estimator configuration
//!
//! Everything is optional in the TOML form. Unset fields fall back to the
//! defaults (`max_depth = 16`, `lp64` model), and a `[model]` table
//! overrides individual constants of the preset it names.
//!
//! ```toml
//! max_depth = 32
//!
//! [model]
//! preset = "lp64"
//! map_header = 232
//! ```

use crate::size_model::SizeModel;
use serde::Deserialize;

/// Depth budget used when the caller does not pick one
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Depth budget plus size model for one estimator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting descents before traversal fails
    pub max_depth: usize,
    /// Byte constants used to price containers
    pub model: SizeModel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            model: SizeModel::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    max_depth: Option<usize>,
    #[serde(default)]
    model: ModelOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelOverrides {
    preset: Option<String>,
    name: Option<String>,
    version: Option<u32>,
    map_header: Option<usize>,
    map_entry: Option<usize>,
    sequence_header: Option<usize>,
    tuple_header: Option<usize>,
    pointer: Option<usize>,
}

impl ModelOverrides {
    fn resolve(self) -> Result<SizeModel, String> {
        let preset = self.preset.as_deref().unwrap_or("lp64");
        let mut model = SizeModel::preset(preset)
            .ok_or_else(|| format!("Unknown size model preset '{}'", preset))?;

        if let Some(name) = self.name {
            model.name = name;
        }
        if let Some(version) = self.version {
            model.version = version;
        }
        if let Some(v) = self.map_header {
            model.map_header = v;
        }
        if let Some(v) = self.map_entry {
            model.map_entry = v;
        }
        if let Some(v) = self.sequence_header {
            model.sequence_header = v;
        }
        if let Some(v) = self.tuple_header {
            model.tuple_header = v;
        }
        if let Some(v) = self.pointer {
            model.pointer = v;
        }
        model.validate()?;
        Ok(model)
    }
}

impl Config {
    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let file: ConfigFile =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse config: {}", e))?;

        let max_depth = file.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            return Err("max_depth must be a positive integer".to_string());
        }

        Ok(Config {
            max_depth,
            model: file.model.resolve()?,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_model(mut self, model: SizeModel) -> Self {
        self.model = model;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_overrides_apply_over_preset() {
        let config = Config::from_toml(
            r#"
max_depth = 32

[model]
preset = "ilp32"
map_header = 100
"#,
        )
        .unwrap();

        assert_eq!(config.max_depth, 32);
        assert_eq!(config.model.name, "ilp32");
        assert_eq!(config.model.map_header, 100);
        assert_eq!(config.model.pointer, 4);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Config::from_toml("max_depth = 0").is_err());
        assert!(Config::from_toml("[model]\npreset = \"pdp11\"").is_err());
        assert!(Config::from_toml("depth = 3").is_err());
        assert!(Config::from_toml("max_depth = \"deep\"").is_err());
    }

    #[test]
    fn test_rejects_oversized_constants() {
        let err = Config::from_toml("[model]\npointer = 9223372036854775807\n").unwrap_err();
        assert!(err.contains("pointer"), "{}", err);

        let config = Config::from_toml("[model]\nmap_header = 1048576\n").unwrap();
        assert_eq!(config.model.map_header, crate::size_model::MAX_CONSTANT);
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_max_depth(4)
            .with_model(SizeModel::ilp32());
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.model.name, "ilp32");
    }
}
