//! Declarative renderer configuration.
//!
//! A [`RendererConfig`] mirrors [`RendererBuilder`] and loads from YAML:
//!
//! ```rust
//! use tintlog::{Level, Record, RendererConfig};
//!
//! let config = RendererConfig::from_yaml(r#"
//! templates:
//!   default: "{levelname:<7} {enter}{name}[{process}]{exit} {message}"
//!   error: "!! {levelname} {name}: {message}"
//! backup_templates: "{levelname}: {message}"
//! defaults:
//!   service: api
//! palettes:
//!   levelname:
//!     error: "31;1"
//!     default: "34"
//!   name: [1, 35]
//! "#).unwrap();
//!
//! let renderer = config.build().unwrap();
//! renderer.set_supports_color(false);
//! let line = renderer.render(&Record::new(Level::Info, "svc", "up")).unwrap();
//! assert_eq!(line, "INFO: up");
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tintlog_template::Value;

use crate::error::{ConfigError, SetupError};
use crate::level_map::LevelMap;
use crate::palette::ColorSpec;
use crate::renderer::{Renderer, RendererBuilder};

/// A static default value as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl From<DefaultValue> for Value {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Int(n) => Value::Int(n),
            DefaultValue::Float(f) => Value::Float(f),
            DefaultValue::Text(s) => Value::Str(s),
            DefaultValue::Null => Value::None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Renderer settings loadable from YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RendererConfig {
    pub templates: LevelMap<String>,

    #[serde(default)]
    pub backup_templates: Option<LevelMap<String>>,

    #[serde(default = "default_true")]
    pub derive_backup: bool,

    #[serde(default)]
    pub datefmt: Option<String>,

    #[serde(default)]
    pub defaults: BTreeMap<String, DefaultValue>,

    #[serde(default)]
    pub force_color: bool,

    #[serde(default)]
    pub palettes: BTreeMap<String, LevelMap<ColorSpec>>,
}

impl RendererConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn into_builder(self) -> RendererBuilder {
        let mut builder = Renderer::builder()
            .templates(self.templates)
            .derive_backup(self.derive_backup)
            .force_color(self.force_color);
        if let Some(backups) = self.backup_templates {
            builder = builder.backup_templates(backups);
        }
        if let Some(datefmt) = self.datefmt {
            builder = builder.datefmt(datefmt);
        }
        for (key, value) in self.defaults {
            builder = builder.default_value(key, value);
        }
        for (field, colors) in self.palettes {
            builder = builder.palette(field, colors);
        }
        builder
    }

    pub fn build(self) -> Result<Renderer, SetupError> {
        self.into_builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::Record;

    #[test]
    fn minimal() {
        let config = RendererConfig::from_yaml("templates: \"{message}\"").unwrap();
        assert!(config.derive_backup);
        assert!(!config.force_color);
        assert!(config.palettes.is_empty());
        assert!(config.build().is_ok());
    }

    #[test]
    fn defaults_are_typed() {
        let config = RendererConfig::from_yaml(
            "templates: \"{message} {n:03d} {ratio:.1f} {tag}\"\ndefaults:\n  n: 7\n  ratio: 0.5\n  tag: blue\n",
        )
        .unwrap();
        assert_eq!(config.defaults.get("n"), Some(&DefaultValue::Int(7)));
        let renderer = config.build().unwrap();
        renderer.set_supports_color(false);
        assert_eq!(
            renderer.render(&Record::new(Level::Info, "svc", "m")).unwrap(),
            "m 007 0.5 blue"
        );
    }

    #[test]
    fn palettes_apply_in_color_mode() {
        let config = RendererConfig::from_yaml(
            "templates: \"{levelname} {message}\"\npalettes:\n  levelname:\n    error: \"31;1\"\n",
        )
        .unwrap();
        let renderer = config.build().unwrap();
        renderer.set_supports_color(true);
        assert_eq!(
            renderer.render(&Record::new(Level::Error, "svc", "m")).unwrap(),
            "\x1b[31;1mERROR\x1b[0m m"
        );
        assert_eq!(
            renderer.render(&Record::new(Level::Info, "svc", "m")).unwrap(),
            "INFO m"
        );
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(matches!(
            RendererConfig::from_yaml("templates: \"{message}\"\ncolour: true"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn templates_required() {
        assert!(RendererConfig::from_yaml("force_color: true").is_err());
    }

    #[test]
    fn invalid_template_surfaces_at_build() {
        let config = RendererConfig::from_yaml("templates: \"{nope}\"").unwrap();
        assert!(matches!(config.build(), Err(SetupError::Validation { .. })));
    }

    #[test]
    fn missing_file() {
        let err = RendererConfig::from_file("/nonexistent/tintlog.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
