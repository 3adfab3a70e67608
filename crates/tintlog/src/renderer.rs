//! Per-record rendering.
//!
//! A [`Renderer`] holds compiled templates for every level, the palettes for
//! each colorizable field, and static default values. For each record it
//!
//! 1. picks the template for the record's level and the stream's color mode,
//! 2. builds a substitution table in layers (no-op markers, palette
//!    markers, defaults, record attributes; later layers win),
//! 3. substitutes, then appends exception and stack text.
//!
//! Everything is fixed at [`RendererBuilder::build`] except the stream's
//! color support, which is decided once, later, by whoever owns the stream.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write as _};
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use once_cell::sync::OnceCell;
use tintlog_template::{compile, enter_marker, exit_marker, strip_color, validate, Template, Value};

use crate::defaults::INTRINSIC_FIELDS;
use crate::error::{RenderError, SetupError};
use crate::level::Level;
use crate::level_map::{LevelMap, Slot};
use crate::palette::{ColorSpec, Palette};
use crate::record::Record;

/// Turns a record's creation time into `asctime` text.
pub trait TimeFormatter: Send + Sync {
    fn format_time(&self, created: &DateTime<Local>, datefmt: Option<&str>) -> String;
}

impl<F> TimeFormatter for F
where
    F: Fn(&DateTime<Local>, Option<&str>) -> String + Send + Sync,
{
    fn format_time(&self, created: &DateTime<Local>, datefmt: Option<&str>) -> String {
        self(created, datefmt)
    }
}

/// strftime formatting through chrono.
///
/// Without a date format the output looks like `2024-01-02 03:04:05,678`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoFormatter;

impl TimeFormatter for ChronoFormatter {
    fn format_time(&self, created: &DateTime<Local>, datefmt: Option<&str>) -> String {
        let mut out = String::new();
        let written = match datefmt {
            Some(fmt) => write!(out, "{}", created.format(fmt)),
            None => write!(
                out,
                "{},{:03}",
                created.format("%Y-%m-%d %H:%M:%S"),
                created.timestamp_subsec_millis()
            ),
        };
        if written.is_err() {
            out.clear();
            out.push_str(&created.to_rfc3339());
        }
        out
    }
}

fn check_datefmt(fmt: &str) -> Result<(), SetupError> {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(SetupError::DateFormat(fmt.to_string()));
    }
    Ok(())
}

/// Builds a [`Renderer`], validating everything up front.
///
/// ```rust
/// use tintlog::{Level, Record, Renderer};
///
/// let renderer = Renderer::builder()
///     .template("{levelname} {name}: {message}")
///     .palette("name", "35")
///     .supports_color(true)
///     .build()
///     .unwrap();
///
/// let line = renderer.render(&Record::new(Level::Info, "svc", "started")).unwrap();
/// assert_eq!(line, "INFO \x1b[35msvc\x1b[0m: started");
/// ```
pub struct RendererBuilder {
    templates: LevelMap<String>,
    backups: Option<LevelMap<String>>,
    derive_backup: bool,
    datefmt: Option<String>,
    defaults: BTreeMap<String, Value>,
    force_color: bool,
    palettes: BTreeMap<String, LevelMap<ColorSpec>>,
    time_formatter: Option<Arc<dyn TimeFormatter>>,
    supports_color: Option<bool>,
}

impl Default for RendererBuilder {
    fn default() -> Self {
        Self {
            templates: LevelMap::new(),
            backups: None,
            derive_backup: true,
            datefmt: None,
            defaults: BTreeMap::new(),
            force_color: false,
            palettes: BTreeMap::new(),
            time_formatter: None,
            supports_color: None,
        }
    }
}

impl RendererBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One template for every level.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.templates = LevelMap::uniform(template.into());
        self
    }

    pub fn templates(mut self, templates: impl Into<LevelMap<String>>) -> Self {
        self.templates = templates.into();
        self
    }

    /// One backup template for every level.
    pub fn backup_template(mut self, template: impl Into<String>) -> Self {
        self.backups = Some(LevelMap::uniform(template.into()));
        self
    }

    /// Templates used when the stream has no color support.
    ///
    /// Levels without a backup fall back to the color template with its
    /// markers left empty.
    pub fn backup_templates(mut self, templates: impl Into<LevelMap<String>>) -> Self {
        self.backups = Some(templates.into());
        self
    }

    /// Whether to derive backups from the templates when none are given.
    ///
    /// On by default. When off, an uncolored stream renders the color
    /// templates with empty markers.
    pub fn derive_backup(mut self, derive: bool) -> Self {
        self.derive_backup = derive;
        self
    }

    /// strftime pattern for `asctime`.
    pub fn datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.datefmt = Some(datefmt.into());
        self
    }

    /// A static value for `key`, usable by templates as a field.
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Emit color whatever the stream supports.
    pub fn force_color(mut self, force: bool) -> Self {
        self.force_color = force;
        self
    }

    /// Colors for `field` (or for groups bound to it), per level.
    pub fn palette(mut self, field: impl Into<String>, colors: impl Into<LevelMap<ColorSpec>>) -> Self {
        self.palettes.insert(field.into(), colors.into());
        self
    }

    pub fn time_formatter(mut self, formatter: impl TimeFormatter + 'static) -> Self {
        self.time_formatter = Some(Arc::new(formatter));
        self
    }

    /// Decides color support now instead of leaving it to the sink owner.
    pub fn supports_color(mut self, supported: bool) -> Self {
        self.supports_color = Some(supported);
        self
    }

    pub fn build(self) -> Result<Renderer, SetupError> {
        if let Some(level) = self.templates.first_missing() {
            return Err(SetupError::IncompleteTemplates(Slot::Level(level)));
        }

        let default_keys: Vec<&str> = self.defaults.keys().map(String::as_str).collect();
        check_all(&self.templates, &default_keys)?;
        if let Some(backups) = &self.backups {
            check_all(backups, &default_keys)?;
        }

        let mut palettes = BTreeMap::new();
        for (field, colors) in &self.palettes {
            if !INTRINSIC_FIELDS.contains(&field.as_str()) && !self.defaults.contains_key(field) {
                return Err(SetupError::UnknownPaletteField(field.clone()));
            }
            let palette = Palette::new(colors).map_err(|source| SetupError::Palette {
                field: field.clone(),
                source,
            })?;
            palettes.insert(field.clone(), palette);
        }

        if let Some(datefmt) = &self.datefmt {
            check_datefmt(datefmt)?;
        }

        let compiled = self.templates.try_map(|slot, raw| {
            let colored = compile(raw).map_err(|source| SetupError::Compile {
                slot,
                template: raw.clone(),
                source,
            })?;
            parse(slot, raw, &colored)
        })?;
        let color = match compiled.resolved() {
            Ok(t) => t.map(Arc::clone),
            Err(level) => return Err(SetupError::IncompleteTemplates(Slot::Level(level))),
        };

        let plain_source = match (&self.backups, self.derive_backup) {
            (Some(backups), _) => Some(backups),
            (None, true) => Some(&self.templates),
            (None, false) => None,
        };
        let backup = match plain_source {
            Some(raws) => {
                let plain = raws.try_map(|slot, raw| {
                    let stripped = strip_color(raw).map_err(|e| SetupError::Compile {
                        slot,
                        template: raw.clone(),
                        source: e.into(),
                    })?;
                    parse(slot, raw, &stripped)
                })?;
                Some(Level::ALL.map(|level| plain.get(level).cloned()))
            }
            None => None,
        };

        let mut baseline = HashMap::new();
        for name in INTRINSIC_FIELDS.iter().copied().chain(default_keys.iter().copied()) {
            baseline.insert(enter_marker(name), Value::from(""));
            baseline.insert(exit_marker(name), Value::from(""));
        }
        for name in INTRINSIC_FIELDS {
            baseline.insert(name.to_string(), Value::None);
        }

        log::debug!(
            target: "tintlog",
            "renderer built: {} palette(s), backup templates: {}",
            palettes.len(),
            if backup.is_some() { "yes" } else { "no" }
        );

        let supports_color = OnceCell::new();
        if let Some(supported) = self.supports_color {
            let _ = supports_color.set(supported);
        }

        Ok(Renderer {
            color,
            backup,
            palettes,
            defaults: self.defaults,
            baseline,
            datefmt: self.datefmt,
            force_color: self.force_color,
            supports_color,
            time_formatter: self
                .time_formatter
                .unwrap_or_else(|| Arc::new(ChronoFormatter)),
        })
    }
}

fn check_all(templates: &LevelMap<String>, extra: &[&str]) -> Result<(), SetupError> {
    for (slot, raw) in templates.iter() {
        validate(raw, &INTRINSIC_FIELDS, extra).map_err(|source| SetupError::Validation {
            slot,
            template: raw.clone(),
            source,
        })?;
    }
    Ok(())
}

fn parse(slot: Slot, raw: &str, compiled: &str) -> Result<Arc<Template>, SetupError> {
    Template::parse(compiled)
        .map(Arc::new)
        .map_err(|source| SetupError::Template {
            slot,
            template: raw.to_string(),
            source,
        })
}

/// Renders records against compiled per-level templates.
///
/// Shareable across threads; all state is fixed after construction apart
/// from the one-time color support decision.
pub struct Renderer {
    color: [Arc<Template>; 5],
    backup: Option<[Option<Arc<Template>>; 5]>,
    palettes: BTreeMap<String, Palette>,
    defaults: BTreeMap<String, Value>,
    baseline: HashMap<String, Value>,
    datefmt: Option<String>,
    force_color: bool,
    supports_color: OnceCell<bool>,
    time_formatter: Arc<dyn TimeFormatter>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("templates", &self.color.iter().map(|t| t.source()).collect::<Vec<_>>())
            .field("palettes", &self.palettes.keys().collect::<Vec<_>>())
            .field("defaults", &self.defaults)
            .field("datefmt", &self.datefmt)
            .field("force_color", &self.force_color)
            .field("supports_color", &self.supports_color.get())
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn builder() -> RendererBuilder {
        RendererBuilder::new()
    }

    /// Records whether the output stream supports color.
    ///
    /// Only the first call has an effect; returns `false` if the value was
    /// already decided.
    pub fn set_supports_color(&self, supported: bool) -> bool {
        self.supports_color.set(supported).is_ok()
    }

    pub fn supports_color(&self) -> Option<bool> {
        self.supports_color.get().copied()
    }

    pub fn force_color(&self) -> bool {
        self.force_color
    }

    pub fn datefmt(&self) -> Option<&str> {
        self.datefmt.as_deref()
    }

    pub fn palette(&self, field: &str) -> Option<&Palette> {
        self.palettes.get(field)
    }

    /// Whether output carries color escapes.
    pub fn color_mode(&self) -> Result<bool, RenderError> {
        let supported = *self.supports_color.get().ok_or(RenderError::Configuration)?;
        Ok(self.force_color || supported)
    }

    /// The compiled template records at `level` render with.
    pub fn select_template(&self, level: Level) -> Result<&Template, RenderError> {
        let color: &Template = &self.color[level.index()];
        if self.color_mode()? {
            return Ok(color);
        }
        match &self.backup {
            None => Ok(color),
            Some(backup) => Ok(backup[level.index()].as_deref().unwrap_or(color)),
        }
    }

    /// The table `record`'s template is substituted from.
    pub fn build_substitutions(
        &self,
        level: Level,
        record: &Record,
    ) -> Result<HashMap<String, Value>, RenderError> {
        Ok(self.substitutions(level, record, self.color_mode()?))
    }

    fn substitutions(&self, level: Level, record: &Record, color: bool) -> HashMap<String, Value> {
        let mut table = self.baseline.clone();
        if color {
            for (field, palette) in &self.palettes {
                table.insert(enter_marker(field), Value::from(palette.enter(level)));
                table.insert(exit_marker(field), Value::from(palette.exit(level)));
            }
        }
        for (key, value) in &self.defaults {
            table.insert(key.clone(), value.clone());
        }
        record.fill(&mut table, &INTRINSIC_FIELDS);
        table
    }

    /// Renders one record: the template line, then any exception and stack
    /// text, each on its own line.
    pub fn render(&self, record: &Record) -> Result<String, RenderError> {
        let level = record.level();
        let color = self.color_mode()?;
        let template = self.select_template(level)?;

        if template.references("asctime") {
            record.asctime_with(|created| {
                self.time_formatter
                    .format_time(created, self.datefmt.as_deref())
            });
        }

        let table = self.substitutions(level, record, color);
        let mut out = template.render(&table)?;

        let exc_text = record.exception_text_with(|raw| match self.palettes.get("exc_text") {
            Some(palette) if color => palette.paint(level, raw),
            _ => raw.to_string(),
        });
        if let Some(text) = exc_text.filter(|t| !t.is_empty()) {
            push_block(&mut out, text);
        }
        if let Some(stack) = record.stack_info().filter(|s| !s.is_empty()) {
            push_block(&mut out, stack);
        }

        Ok(out)
    }
}

fn push_block(out: &mut String, block: &str) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(block);
}
