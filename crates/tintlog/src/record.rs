//! Log records: well-known attributes plus open-ended extras.
//!
//! A [`Record`] carries the attributes a template can reference by their
//! intrinsic names (`name`, `levelname`, `lineno`, ...) and any number of
//! extra named values. Extras are only consulted for names that are not
//! well-known attributes.
//!
//! Two values are computed lazily and cached on the record: the formatted
//! `asctime` and the exception text. Rendering the same record twice reuses
//! both.

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use tintlog_template::Value;

use crate::level::Level;

static START: Lazy<DateTime<Local>> = Lazy::new(Local::now);

static PROCESS_NAME: Lazy<Option<String>> = Lazy::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
});

/// Pins the reference point for `relativeCreated`.
pub(crate) fn mark_start() {
    Lazy::force(&START);
}

/// Produces the traceback text for a record's exception.
///
/// Consulted at most once per record.
pub trait ExceptionSource {
    /// Full multi-line exception text.
    fn traceback(&self) -> String;

    /// One-line description, rendered by `{exc_info}`.
    fn summary(&self) -> Option<String> {
        None
    }
}

impl ExceptionSource for String {
    fn traceback(&self) -> String {
        self.clone()
    }
}

impl ExceptionSource for &'static str {
    fn traceback(&self) -> String {
        self.to_string()
    }
}

/// An error and its chain of sources as exception text.
pub struct ErrorReport(Box<dyn Error + Send + Sync>);

impl ErrorReport {
    pub fn new(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

impl ExceptionSource for ErrorReport {
    fn traceback(&self) -> String {
        let mut text = format!("Error: {}", self.0);
        let mut source = self.0.source();
        while let Some(err) = source {
            text.push_str(&format!("\nCaused by: {}", err));
            source = err.source();
        }
        text
    }

    fn summary(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}

/// A single log event.
pub struct Record {
    name: String,
    level: Level,
    message: String,
    pathname: Option<String>,
    module: Option<String>,
    lineno: Option<u32>,
    func_name: Option<String>,
    created: DateTime<Local>,
    thread: Option<u64>,
    thread_name: Option<String>,
    process: u32,
    process_name: Option<String>,
    stack_info: Option<String>,
    exception: Option<Box<dyn ExceptionSource + Send>>,
    extras: BTreeMap<String, Value>,
    asctime: OnceCell<String>,
    exc_text: OnceCell<String>,
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("message", &self.message)
            .field("created", &self.created)
            .field("has_exception", &self.exception.is_some())
            .field("extras", &self.extras)
            .finish_non_exhaustive()
    }
}

impl Record {
    /// A record created now, on the current thread.
    pub fn new(level: Level, name: impl Into<String>, message: impl Into<String>) -> Self {
        mark_start();
        Self {
            name: name.into(),
            level,
            message: message.into(),
            pathname: None,
            module: None,
            lineno: None,
            func_name: None,
            created: Local::now(),
            thread: None,
            thread_name: std::thread::current().name().map(str::to_string),
            process: std::process::id(),
            process_name: PROCESS_NAME.clone(),
            stack_info: None,
            exception: None,
            extras: BTreeMap::new(),
            asctime: OnceCell::new(),
            exc_text: OnceCell::new(),
        }
    }

    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = Some(pathname.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_lineno(mut self, lineno: u32) -> Self {
        self.lineno = Some(lineno);
        self
    }

    pub fn with_func_name(mut self, func_name: impl Into<String>) -> Self {
        self.func_name = Some(func_name.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Local>) -> Self {
        self.created = created;
        self
    }

    pub fn with_thread(mut self, id: u64, name: Option<String>) -> Self {
        self.thread = Some(id);
        self.thread_name = name;
        self
    }

    pub fn with_stack_info(mut self, stack: impl Into<String>) -> Self {
        self.stack_info = Some(stack.into());
        self
    }

    pub fn with_exception(mut self, source: impl ExceptionSource + Send + 'static) -> Self {
        self.exception = Some(Box::new(source));
        self
    }

    /// Attaches an error (and its source chain) as the record's exception.
    pub fn with_error(self, err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        self.with_exception(ErrorReport::new(err))
    }

    /// Adds an extra attribute. Well-known attribute names take precedence.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn insert_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extras.insert(key.into(), value.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created(&self) -> &DateTime<Local> {
        &self.created
    }

    pub fn stack_info(&self) -> Option<&str> {
        self.stack_info.as_deref()
    }

    pub fn has_exception(&self) -> bool {
        self.exception.is_some()
    }

    pub fn extras(&self) -> &BTreeMap<String, Value> {
        &self.extras
    }

    /// Final component of `pathname`.
    pub fn filename(&self) -> Option<&str> {
        let path = self.pathname.as_deref()?;
        Path::new(path).file_name().and_then(|f| f.to_str())
    }

    /// The explicit module, else the file name without its extension.
    pub fn module(&self) -> Option<&str> {
        if let Some(module) = &self.module {
            return Some(module);
        }
        let path = self.pathname.as_deref()?;
        Path::new(path).file_stem().and_then(|f| f.to_str())
    }

    /// Formats and caches `asctime` on first call.
    pub fn asctime_with<F>(&self, format: F) -> &str
    where
        F: FnOnce(&DateTime<Local>) -> String,
    {
        self.asctime.get_or_init(|| format(&self.created))
    }

    /// Renders and caches the exception text on first call.
    ///
    /// The source's trailing newline is dropped before `decorate` sees it.
    /// Returns `None` when the record carries no exception.
    pub fn exception_text_with<F>(&self, decorate: F) -> Option<&str>
    where
        F: FnOnce(&str) -> String,
    {
        let source = self.exception.as_ref()?;
        let text = self.exc_text.get_or_init(|| {
            let mut raw = source.traceback();
            if raw.ends_with('\n') {
                raw.pop();
            }
            decorate(&raw)
        });
        Some(text)
    }

    /// Value of a well-known attribute, or of an extra for any other name.
    ///
    /// `asctime` and `exc_text` are only present once computed.
    pub fn field(&self, name: &str) -> Option<Value> {
        let opt_str = |v: &Option<String>| v.clone().map(Value::Str);
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "message" => Some(Value::from(self.message.as_str())),
            "levelname" => Some(Value::from(self.level.name())),
            "levelno" => Some(Value::from(self.level.rank())),
            "pathname" => opt_str(&self.pathname),
            "filename" => self.filename().map(Value::from),
            "module" => self.module().map(Value::from),
            "lineno" => self.lineno.map(Value::from),
            "funcName" => opt_str(&self.func_name),
            "created" => Some(Value::Float(self.created.timestamp_micros() as f64 / 1e6)),
            "msecs" => Some(Value::Float(
                f64::from(self.created.timestamp_subsec_micros()) / 1000.0,
            )),
            "relativeCreated" => {
                let elapsed = self.created.signed_duration_since(*START);
                Some(Value::Float(elapsed.num_microseconds().unwrap_or(0) as f64 / 1000.0))
            }
            "thread" => self.thread.map(Value::from),
            "threadName" => opt_str(&self.thread_name),
            "process" => Some(Value::from(self.process)),
            "processName" => opt_str(&self.process_name),
            "stack_info" => opt_str(&self.stack_info),
            "exc_info" => self.exception.as_ref().and_then(|e| e.summary()).map(Value::Str),
            "exc_text" => self.exc_text.get().map(|t| Value::from(t.as_str())),
            "asctime" => self.asctime.get().map(|t| Value::from(t.as_str())),
            "args" => None,
            other => self.extras.get(other).cloned(),
        }
    }

    /// Writes this record's attributes into a substitution table.
    ///
    /// Absent attributes are skipped so lower layers of the table show
    /// through.
    pub(crate) fn fill(&self, table: &mut HashMap<String, Value>, intrinsic: &[&str]) {
        for (key, value) in &self.extras {
            table.insert(key.clone(), value.clone());
        }
        for name in intrinsic {
            if let Some(value) = self.field(name) {
                table.insert((*name).to_string(), value);
            }
        }
    }
}
