//! The five severity levels and their aliases.

use std::fmt;
use std::str::FromStr;

use crate::error::LevelError;

/// A severity level, ordered from least to most severe.
///
/// Ranks are 10 through 50. `TRACE` is an alias of [`Level::Debug`] so
/// that every `log` level has a home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// All levels in rank order.
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    pub fn rank(self) -> u32 {
        (self.index() as u32 + 1) * 10
    }

    /// Canonical upper-case name, as rendered by `{levelname}`.
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Lower-case key used in configuration files.
    pub fn key(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }

    pub fn from_rank(rank: u32) -> Result<Self, LevelError> {
        match rank {
            10 => Ok(Level::Debug),
            20 => Ok(Level::Info),
            30 => Ok(Level::Warning),
            40 => Ok(Level::Error),
            50 => Ok(Level::Critical),
            other => Err(LevelError::UnknownRank(other)),
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// The `log` filter that lets this level and everything above through.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Level::Debug => log::LevelFilter::Trace,
            Level::Info => log::LevelFilter::Info,
            Level::Warning => log::LevelFilter::Warn,
            Level::Error | Level::Critical => log::LevelFilter::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = LevelError;

    /// Parses a level name, ignoring ASCII case.
    ///
    /// ```rust
    /// use tintlog::Level;
    ///
    /// assert_eq!("warn".parse::<Level>().unwrap(), Level::Warning);
    /// assert_eq!("FATAL".parse::<Level>().unwrap(), Level::Critical);
    /// assert!("verbose".parse::<Level>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            "ERROR" => Ok(Level::Error),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "INFO" => Ok(Level::Info),
            "DEBUG" | "TRACE" => Ok(Level::Debug),
            _ => Err(LevelError::UnknownName(s.to_string())),
        }
    }
}

impl TryFrom<u32> for Level {
    type Error = LevelError;

    fn try_from(rank: u32) -> Result<Self, LevelError> {
        Level::from_rank(rank)
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}
