//! Per-level ANSI color sequences for one field.

use serde::Deserialize;

use crate::error::PaletteError;
use crate::level::Level;
use crate::level_map::LevelMap;

/// The reset sequence closing every colored span.
pub const RESET: &str = "\x1b[0m";

/// An un-escaped SGR color: `"35"`, `"32;1"`, or several codes in a row.
///
/// Configuration files may give a string, an integer, or a list of either.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawColor")]
pub enum ColorSpec {
    Code(String),
    Codes(Vec<String>),
}

impl From<&str> for ColorSpec {
    fn from(code: &str) -> Self {
        ColorSpec::Code(code.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(code: String) -> Self {
        ColorSpec::Code(code)
    }
}

impl From<u8> for ColorSpec {
    fn from(code: u8) -> Self {
        ColorSpec::Code(code.to_string())
    }
}

impl From<Vec<String>> for ColorSpec {
    fn from(codes: Vec<String>) -> Self {
        ColorSpec::Codes(codes)
    }
}

impl<const N: usize> From<[&str; N]> for ColorSpec {
    fn from(codes: [&str; N]) -> Self {
        ColorSpec::Codes(codes.iter().map(|c| c.to_string()).collect())
    }
}

impl From<ColorSpec> for LevelMap<ColorSpec> {
    fn from(color: ColorSpec) -> Self {
        LevelMap::uniform(color)
    }
}

impl From<&str> for LevelMap<ColorSpec> {
    fn from(code: &str) -> Self {
        LevelMap::uniform(code.into())
    }
}

impl ColorSpec {
    /// The escape sequence introducing this color.
    pub fn to_escape(&self) -> Result<String, PaletteError> {
        match self {
            ColorSpec::Code(code) => escape(code),
            ColorSpec::Codes(codes) if codes.is_empty() => Err(PaletteError::EmptySequence),
            ColorSpec::Codes(codes) => codes.iter().map(|c| escape(c)).collect(),
        }
    }
}

fn escape(code: &str) -> Result<String, PaletteError> {
    if code.is_empty() {
        return Err(PaletteError::EmptyCode);
    }
    if !code.chars().all(|c| c.is_ascii_digit() || c == ';') {
        return Err(PaletteError::InvalidCode(code.to_string()));
    }
    Ok(format!("\x1b[{}m", code))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u32),
    Text(String),
}

impl From<RawCode> for String {
    fn from(raw: RawCode) -> Self {
        match raw {
            RawCode::Number(n) => n.to_string(),
            RawCode::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColor {
    One(RawCode),
    Many(Vec<RawCode>),
}

impl From<RawColor> for ColorSpec {
    fn from(raw: RawColor) -> Self {
        match raw {
            RawColor::One(code) => ColorSpec::Code(code.into()),
            RawColor::Many(codes) => ColorSpec::Codes(codes.into_iter().map(String::from).collect()),
        }
    }
}

/// Resolved enter sequences for one field at every level.
///
/// Levels without a color get an empty enter sequence, and
/// [`exit`](Palette::exit) is only non-empty when `enter` is.
///
/// ```rust
/// use tintlog::{Level, LevelMap, Palette};
///
/// let palette = Palette::new(&LevelMap::new().with(Level::Error, "31;1".into())).unwrap();
/// assert_eq!(palette.enter(Level::Error), "\x1b[31;1m");
/// assert_eq!(palette.exit(Level::Error), "\x1b[0m");
/// assert_eq!(palette.enter(Level::Info), "");
/// assert_eq!(palette.exit(Level::Info), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    enter: [String; 5],
}

impl Palette {
    pub fn new(colors: &LevelMap<ColorSpec>) -> Result<Self, PaletteError> {
        let mut enter: [String; 5] = Default::default();
        for (level, color) in colors.iter_all() {
            if let Some(color) = color {
                enter[level.index()] = color.to_escape()?;
            }
        }
        Ok(Self { enter })
    }

    /// The same color at every level.
    pub fn uniform(color: impl Into<ColorSpec>) -> Result<Self, PaletteError> {
        Self::new(&LevelMap::uniform(color.into()))
    }

    pub fn enter(&self, level: Level) -> &str {
        &self.enter[level.index()]
    }

    pub fn exit(&self, level: Level) -> &str {
        if self.enter(level).is_empty() {
            ""
        } else {
            RESET
        }
    }

    /// Wraps `text` in this level's color, or returns it untouched.
    pub fn paint(&self, level: Level, text: &str) -> String {
        format!("{}{}{}", self.enter(level), text, self.exit(level))
    }
}
