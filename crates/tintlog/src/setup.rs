//! Wiring a renderer onto the `log` facade.
//!
//! ```rust,no_run
//! use tintlog::{Level, Setup};
//!
//! Setup::new("myapp").level(Level::Info).install().unwrap();
//! log::info!(target: "myapp::db", "connected");
//! ```
//!
//! Color support for the sink is decided once, at build time, by the color
//! detector. Use [`set_color_detector`] to override detection in tests.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use console::Term;
use log::kv::{self, VisitSource};
use log::{LevelFilter, Log, Metadata};
use once_cell::sync::Lazy;
use tintlog_template::Value;

use crate::defaults::default_renderer;
use crate::error::SetupError;
use crate::level::Level;
use crate::record::{mark_start, Record};
use crate::renderer::Renderer;

const OWN_TARGET: &str = "tintlog";

/// Where rendered lines go.
pub enum Sink {
    Stdout,
    Stderr,
    Writer(Mutex<Box<dyn Write + Send>>),
}

impl Sink {
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        Sink::Writer(Mutex::new(Box::new(writer)))
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        match self {
            Sink::Stdout => writeln!(io::stdout().lock(), "{}", line),
            Sink::Stderr => writeln!(io::stderr().lock(), "{}", line),
            Sink::Writer(writer) => {
                let mut writer = writer.lock().unwrap_or_else(|e| e.into_inner());
                writeln!(writer, "{}", line)
            }
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            Sink::Writer(writer) => writer.lock().unwrap_or_else(|e| e.into_inner()).flush(),
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Sink::Stderr
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Stdout => f.write_str("Stdout"),
            Sink::Stderr => f.write_str("Stderr"),
            Sink::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

type ColorDetector = fn(&Sink) -> bool;

static COLOR_DETECTOR: Lazy<Mutex<ColorDetector>> =
    Lazy::new(|| Mutex::new(default_color_detector));

/// Overrides how color support is detected for a sink.
///
/// ```rust
/// use tintlog::{set_color_detector, supports_color, Sink};
///
/// set_color_detector(|_| true);
/// assert!(supports_color(&Sink::Stderr));
/// ```
pub fn set_color_detector(detector: ColorDetector) {
    let mut guard = COLOR_DETECTOR.lock().unwrap_or_else(|e| e.into_inner());
    *guard = detector;
}

/// Restores terminal-based detection.
pub fn reset_color_detector() {
    set_color_detector(default_color_detector);
}

/// Whether `sink` accepts ANSI color sequences.
pub fn supports_color(sink: &Sink) -> bool {
    let detector = COLOR_DETECTOR.lock().unwrap_or_else(|e| e.into_inner());
    (*detector)(sink)
}

fn default_color_detector(sink: &Sink) -> bool {
    let term = match sink {
        Sink::Stdout => Term::stdout(),
        Sink::Stderr => Term::stderr(),
        Sink::Writer(_) => return false,
    };
    term.is_term() && term.features().colors_supported()
}

/// Builder for a [`TintLogger`].
#[derive(Debug)]
pub struct Setup {
    name: String,
    package: Option<String>,
    level: Option<Level>,
    sink: Option<Sink>,
    renderer: Option<Renderer>,
    supports_color: Option<bool>,
}

impl Setup {
    /// Logger for records targeted at `name` or below it.
    ///
    /// An empty name accepts every target.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            level: None,
            sink: None,
            renderer: None,
            supports_color: None,
        }
    }

    /// Prefixes the name: `package::name`.
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Minimum level let through. Defaults to [`Level::Warning`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Defaults to stderr.
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Defaults to [`default_renderer`].
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Skips detection and uses this answer for the sink.
    pub fn supports_color(mut self, supported: bool) -> Self {
        self.supports_color = Some(supported);
        self
    }

    /// The full target prefix this logger accepts.
    pub fn target(&self) -> String {
        match &self.package {
            Some(package) if !self.name.is_empty() => format!("{}::{}", package, self.name),
            Some(package) => package.clone(),
            None => self.name.clone(),
        }
    }

    pub fn build(self) -> TintLogger {
        mark_start();
        let target = self.target();
        let sink = self.sink.unwrap_or_default();
        let renderer = self.renderer.unwrap_or_else(default_renderer);

        if renderer.supports_color().is_none() {
            let supported = self.supports_color.unwrap_or_else(|| supports_color(&sink));
            renderer.set_supports_color(supported);
        }
        let level = self.level.unwrap_or(Level::Warning);

        log::debug!(
            target: OWN_TARGET,
            "logger '{}' ready: level {}, sink {:?}, color {:?}",
            target,
            level,
            sink,
            renderer.supports_color()
        );

        TintLogger {
            target,
            min_level: level,
            filter: level.to_level_filter(),
            renderer,
            sink,
        }
    }

    /// Builds the logger and makes it the global `log` logger.
    pub fn install(self) -> Result<(), SetupError> {
        let logger = self.build();
        let filter = logger.filter;
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(filter);
        Ok(())
    }
}

/// A `log` backend rendering every accepted record through a [`Renderer`].
#[derive(Debug)]
pub struct TintLogger {
    target: String,
    min_level: Level,
    filter: LevelFilter,
    renderer: Renderer,
    sink: Sink,
}

impl TintLogger {
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn level(&self) -> Level {
        self.min_level
    }

    /// Coarsest `log` filter covering [`level`](Self::level); `log` has
    /// nothing above `Error`, so a critical logger still reports `Error`.
    pub fn level_filter(&self) -> LevelFilter {
        self.filter
    }

    fn accepts_target(&self, target: &str) -> bool {
        if target == OWN_TARGET || target.starts_with("tintlog::") {
            return false;
        }
        if self.target.is_empty() || target == self.target {
            return true;
        }
        match target.strip_prefix(self.target.as_str()) {
            Some(rest) => rest.starts_with("::") || rest.starts_with('.'),
            None => false,
        }
    }
}

impl Log for TintLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        Level::from(metadata.level()) >= self.min_level && self.accepts_target(metadata.target())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let record = Record::from(record);
        match self.renderer.render(&record) {
            Ok(line) => {
                if let Err(err) = self.sink.write_line(&line) {
                    eprintln!("tintlog: failed to write record: {}", err);
                }
            }
            Err(err) => eprintln!("tintlog: failed to render record: {}", err),
        }
    }

    fn flush(&self) {
        let _ = self.sink.flush();
    }
}

struct Extras<'a>(&'a mut Record);

impl<'kvs> VisitSource<'kvs> for Extras<'_> {
    fn visit_pair(&mut self, key: kv::Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        let value = if let Some(n) = value.to_i64() {
            Value::Int(n)
        } else if let Some(f) = value.to_f64() {
            Value::Float(f)
        } else if let Some(s) = value.to_borrowed_str() {
            Value::from(s)
        } else {
            Value::Str(value.to_string())
        };
        self.0.insert_extra(key.as_str(), value);
        Ok(())
    }
}

impl From<&log::Record<'_>> for Record {
    fn from(source: &log::Record<'_>) -> Self {
        let mut record = Record::new(
            Level::from(source.level()),
            source.target(),
            source.args().to_string(),
        );
        if let Some(file) = source.file() {
            record = record.with_pathname(file);
        }
        if let Some(module) = source.module_path() {
            record = record.with_module(module);
        }
        if let Some(line) = source.line() {
            record = record.with_lineno(line);
        }
        let _ = source.key_values().visit(&mut Extras(&mut record));
        record
    }
}
