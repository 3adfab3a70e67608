//! Per-level colored log templates.
//!
//! `tintlog` renders log records through bracket-field templates such as
//! `"{asctime} {levelname:<8} {name} {message}"`. Each field can carry its
//! own per-level color, and `{enter}...{exit}` spans color several fields
//! and literals under one field's palette. When the output stream has no
//! color support the same templates render plain, or a separate set of
//! backup templates is used.
//!
//! # Quick start
//!
//! ```rust,no_run
//! tintlog::Setup::new("myapp")
//!     .level(tintlog::Level::Debug)
//!     .install()
//!     .unwrap();
//!
//! log::warn!(target: "myapp", "disk almost full");
//! ```
//!
//! # Custom renderers
//!
//! ```rust
//! use tintlog::{Level, LevelMap, Record, Renderer};
//!
//! let renderer = Renderer::builder()
//!     .template("{enter}{levelname}:{name}{exit} {message}")
//!     .palette("levelname", LevelMap::new().with(Level::Error, "31".into()))
//!     .supports_color(true)
//!     .build()
//!     .unwrap();
//!
//! let line = renderer.render(&Record::new(Level::Error, "db", "lost")).unwrap();
//! assert_eq!(line, "\x1b[31mERROR:db\x1b[0m lost");
//! ```
//!
//! Renderers can also be loaded from YAML with [`RendererConfig`].

mod config;
mod defaults;
mod error;
mod level;
mod level_map;
mod palette;
mod record;
mod renderer;
mod setup;

pub use config::{DefaultValue, RendererConfig};
pub use defaults::{
    default_builder, default_renderer, DEFAULT_BACKUP_TEMPLATE, DEFAULT_DATEFMT, DEFAULT_TEMPLATE,
    INTRINSIC_FIELDS,
};
pub use error::{ConfigError, LevelError, PaletteError, RenderError, SetupError};
pub use level::Level;
pub use level_map::{LevelMap, Slot};
pub use palette::{ColorSpec, Palette, RESET};
pub use record::{ErrorReport, ExceptionSource, Record};
pub use renderer::{ChronoFormatter, Renderer, RendererBuilder, TimeFormatter};
pub use setup::{reset_color_detector, set_color_detector, supports_color, Setup, Sink, TintLogger};

pub use tintlog_template as template;
pub use tintlog_template::Value;
