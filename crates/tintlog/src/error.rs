//! Error types for level parsing, palettes, setup and rendering.

use std::path::PathBuf;

use thiserror::Error;
use tintlog_template::{
    CompileError, FormatError, ParseError, SyntaxError, ValidationError,
};

use crate::level_map::Slot;

/// An unknown severity rank or name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("unknown level: {0}")]
    UnknownRank(u32),

    #[error("unknown level: {0}")]
    UnknownName(String),
}

/// A color value that cannot become an escape sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("color code is empty")]
    EmptyCode,

    /// Codes are SGR parameters: digits separated by `;`.
    #[error("invalid color code '{0}': expected digits separated by ';'")]
    InvalidCode(String),

    #[error("color code sequence is empty")]
    EmptySequence,
}

/// Failure loading a declarative renderer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid renderer configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can go wrong before the first record is rendered.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No default template and at least one level without its own.
    #[error("every level needs a template (set a default or provide all five levels); missing: {0}")]
    IncompleteTemplates(Slot),

    #[error("{slot} template {template:?}: {source}")]
    Validation {
        slot: Slot,
        template: String,
        #[source]
        source: ValidationError,
    },

    #[error("{slot} template {template:?}: {source}")]
    Compile {
        slot: Slot,
        template: String,
        #[source]
        source: CompileError,
    },

    #[error("{slot} template {template:?}: {source}")]
    Template {
        slot: Slot,
        template: String,
        #[source]
        source: ParseError,
    },

    #[error("palette for '{field}': {source}")]
    Palette {
        field: String,
        #[source]
        source: PaletteError,
    },

    /// A palette registered for a name no template can reference.
    #[error("palette for unknown field '{0}' (no record attribute or default)")]
    UnknownPaletteField(String),

    #[error("invalid date format: {0:?}")]
    DateFormat(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to install logger: {0}")]
    Install(#[from] log::SetLoggerError),
}

/// Failure rendering a single record.
///
/// A failed render produces no output at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The renderer was used before the stream's color support was decided.
    #[error("color support for the output stream is unresolved; set it before rendering")]
    Configuration,

    #[error("formatting field not found in record: '{0}'")]
    MissingField(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl From<tintlog_template::RenderError> for RenderError {
    fn from(err: tintlog_template::RenderError) -> Self {
        match err {
            tintlog_template::RenderError::MissingField(name) => RenderError::MissingField(name),
            tintlog_template::RenderError::Format(e) => RenderError::Format(e),
            tintlog_template::RenderError::Syntax(e) => RenderError::Syntax(e),
        }
    }
}
