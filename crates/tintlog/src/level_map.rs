//! Per-level values with a shared default.
//!
//! [`LevelMap`] backs both template sets and palettes. A lookup for a level
//! returns that level's own value, else the default, else nothing.
//!
//! In configuration files a level map is either a single value (used for
//! every level) or a mapping with any of the keys `debug`, `info`,
//! `warning`, `error`, `critical` and `default`:
//!
//! ```yaml
//! templates: "{levelname} {message}"
//! palettes:
//!   levelname:
//!     error: "31;1"
//!     default: "34"
//! ```

use std::fmt;

use serde::Deserialize;

use crate::level::Level;

/// Where a value in a [`LevelMap`] lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Level(Level),
    Default,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Level(level) => f.write_str(level.key()),
            Slot::Default => f.write_str("default"),
        }
    }
}

/// A value for each severity level, with an optional fallback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "LevelMapRaw<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct LevelMap<T> {
    levels: [Option<T>; 5],
    default: Option<T>,
}

impl<T> Default for LevelMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LevelMap<T> {
    /// An empty map: no level has a value.
    pub fn new() -> Self {
        Self {
            levels: [None, None, None, None, None],
            default: None,
        }
    }

    /// A map whose default covers every level.
    pub fn uniform(value: T) -> Self {
        Self::new().with_default(value)
    }

    /// One value per level, debug through critical.
    pub fn from_levels(values: [T; 5]) -> Self {
        Self {
            levels: values.map(Some),
            default: None,
        }
    }

    pub fn with(mut self, level: Level, value: T) -> Self {
        self.set(level, value);
        self
    }

    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    pub fn set(&mut self, level: Level, value: T) {
        self.levels[level.index()] = Some(value);
    }

    pub fn set_default(&mut self, value: T) {
        self.default = Some(value);
    }

    /// The level's own value, ignoring the default.
    pub fn explicit(&self, level: Level) -> Option<&T> {
        self.levels[level.index()].as_ref()
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    /// The level's value, falling back to the default.
    pub fn get(&self, level: Level) -> Option<&T> {
        self.explicit(level).or(self.default.as_ref())
    }

    /// Like [`get`](Self::get), with a caller-supplied last resort.
    pub fn get_or<'a>(&'a self, level: Level, fallback: &'a T) -> &'a T {
        self.get(level).unwrap_or(fallback)
    }

    /// Effective values for every level, in rank order.
    pub fn iter_all(&self) -> impl Iterator<Item = (Level, Option<&T>)> + '_ {
        Level::ALL.into_iter().map(move |level| (level, self.get(level)))
    }

    /// Explicitly stored values: levels in rank order, then the default.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> + '_ {
        let levels = Level::ALL
            .into_iter()
            .filter_map(move |level| self.explicit(level).map(|v| (Slot::Level(level), v)));
        levels.chain(self.default.as_ref().map(|v| (Slot::Default, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.levels.iter().all(Option::is_none)
    }

    /// Whether every level resolves to a value.
    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }

    /// The lowest level with no effective value.
    pub fn first_missing(&self) -> Option<Level> {
        Level::ALL.into_iter().find(|level| self.get(*level).is_none())
    }

    /// Effective values for all five levels, or the first level lacking one.
    pub fn resolved(&self) -> Result<[&T; 5], Level> {
        let get = |level: Level| self.get(level).ok_or(level);
        Ok([
            get(Level::Debug)?,
            get(Level::Info)?,
            get(Level::Warning)?,
            get(Level::Error)?,
            get(Level::Critical)?,
        ])
    }

    /// Maps every stored value, stopping at the first failure.
    pub fn try_map<U, E, F>(&self, mut f: F) -> Result<LevelMap<U>, E>
    where
        F: FnMut(Slot, &T) -> Result<U, E>,
    {
        let mut out = LevelMap::new();
        for (slot, value) in self.iter() {
            let mapped = f(slot, value)?;
            match slot {
                Slot::Level(level) => out.set(level, mapped),
                Slot::Default => out.set_default(mapped),
            }
        }
        Ok(out)
    }
}

impl From<&str> for LevelMap<String> {
    fn from(value: &str) -> Self {
        LevelMap::uniform(value.to_string())
    }
}

impl From<String> for LevelMap<String> {
    fn from(value: String) -> Self {
        LevelMap::uniform(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelMapRaw<T> {
    Uniform(T),
    Levels(LevelFields<T>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelFields<T> {
    debug: Option<T>,
    info: Option<T>,
    warning: Option<T>,
    error: Option<T>,
    critical: Option<T>,
    default: Option<T>,
}

impl<T> From<LevelMapRaw<T>> for LevelMap<T> {
    fn from(raw: LevelMapRaw<T>) -> Self {
        match raw {
            LevelMapRaw::Uniform(value) => LevelMap::uniform(value),
            LevelMapRaw::Levels(f) => LevelMap {
                levels: [f.debug, f.info, f.warning, f.error, f.critical],
                default: f.default,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod lookup {
        use super::*;

        #[test]
        fn level_value_wins_over_default() {
            let map = LevelMap::uniform("d").with(Level::Error, "e");
            assert_eq!(map.get(Level::Error), Some(&"e"));
            assert_eq!(map.get(Level::Info), Some(&"d"));
        }

        #[test]
        fn fallback_only_when_nothing_else() {
            let map = LevelMap::new().with(Level::Info, 1);
            assert_eq!(*map.get_or(Level::Info, &9), 1);
            assert_eq!(*map.get_or(Level::Debug, &9), 9);
            assert_eq!(*LevelMap::uniform(3).get_or(Level::Debug, &9), 3);
        }

        #[test]
        fn empty_string_is_a_value() {
            let map = LevelMap::uniform("x").with(Level::Debug, "");
            assert_eq!(map.get(Level::Debug), Some(&""));
        }

        #[test]
        fn iter_all_in_rank_order() {
            let map = LevelMap::from_levels([1, 2, 3, 4, 5]);
            let levels: Vec<_> = map.iter_all().collect();
            assert_eq!(levels[0], (Level::Debug, Some(&1)));
            assert_eq!(levels[4], (Level::Critical, Some(&5)));
        }
    }

    mod completeness {
        use super::*;

        #[test]
        fn default_makes_complete() {
            assert!(LevelMap::uniform(0).is_complete());
            assert!(LevelMap::from_levels([0; 5]).is_complete());
        }

        #[test]
        fn reports_first_gap() {
            let map = LevelMap::new()
                .with(Level::Debug, 0)
                .with(Level::Info, 0)
                .with(Level::Critical, 0);
            assert!(!map.is_complete());
            assert_eq!(map.first_missing(), Some(Level::Warning));
            assert_eq!(map.resolved(), Err(Level::Warning));
        }

        #[test]
        fn resolved_applies_default() {
            let map = LevelMap::uniform(1).with(Level::Warning, 3);
            assert_eq!(map.resolved(), Ok([&1, &1, &3, &1, &1]));
        }

        #[test]
        fn empty() {
            assert!(LevelMap::<u8>::new().is_empty());
            assert!(!LevelMap::uniform(0).is_empty());
        }
    }

    mod mapping {
        use super::*;

        #[test]
        fn try_map_keeps_slots() {
            let map = LevelMap::uniform("1").with(Level::Info, "2");
            let parsed: LevelMap<u32> = map.try_map(|_, s| s.parse()).unwrap();
            assert_eq!(parsed.explicit(Level::Info), Some(&2));
            assert_eq!(parsed.explicit(Level::Debug), None);
            assert_eq!(parsed.default_value(), Some(&1));
        }

        #[test]
        fn try_map_reports_slot_of_failure() {
            let map = LevelMap::uniform("1").with(Level::Error, "x");
            let err = map
                .try_map(|slot, s| s.parse::<u32>().map_err(|_| slot))
                .unwrap_err();
            assert_eq!(err, Slot::Level(Level::Error));
        }
    }

    mod deserialize {
        use super::*;

        #[test]
        fn scalar_is_uniform() {
            let map: LevelMap<String> = serde_yaml::from_str("\"{message}\"").unwrap();
            assert_eq!(map, LevelMap::uniform("{message}".to_string()));
        }

        #[test]
        fn per_level_keys() {
            let map: LevelMap<String> =
                serde_yaml::from_str("error: \"E {message}\"\ndefault: \"{message}\"").unwrap();
            assert_eq!(map.get(Level::Error).map(String::as_str), Some("E {message}"));
            assert_eq!(map.get(Level::Debug).map(String::as_str), Some("{message}"));
        }

        #[test]
        fn partial_keys_without_default_impl() {
            use crate::palette::ColorSpec;

            let map: LevelMap<ColorSpec> =
                serde_yaml::from_str("warning: \"33\"\nerror: [1, 31]").unwrap();
            assert_eq!(map.get(Level::Warning), Some(&ColorSpec::from("33")));
            assert!(map.get(Level::Info).is_none());
            assert!(map.default_value().is_none());
        }

        #[test]
        fn unknown_key_rejected() {
            let result: Result<LevelMap<String>, _> = serde_yaml::from_str("verbose: x");
            assert!(result.is_err());
        }
    }
}
