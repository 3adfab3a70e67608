//! Intrinsic field names and the built-in renderer configuration.

use crate::level_map::LevelMap;
use crate::palette::ColorSpec;
use crate::renderer::{Renderer, RendererBuilder};

/// Names every record can supply, plus the `enter`/`exit` pseudo-fields.
pub const INTRINSIC_FIELDS: [&str; 23] = [
    "name",
    "message",
    "args",
    "levelname",
    "levelno",
    "pathname",
    "filename",
    "module",
    "exc_info",
    "exc_text",
    "stack_info",
    "lineno",
    "funcName",
    "created",
    "msecs",
    "relativeCreated",
    "thread",
    "threadName",
    "processName",
    "process",
    "asctime",
    "enter",
    "exit",
];

pub const DEFAULT_TEMPLATE: &str = "{asctime} {levelname:<8} {name} {message}";
pub const DEFAULT_BACKUP_TEMPLATE: &str = "[{asctime}] [{levelname:<8}] {name}: {message}";
pub const DEFAULT_DATEFMT: &str = "%Y-%m-%d %H:%M:%S";

/// The built-in configuration, open for further changes.
pub fn default_builder() -> RendererBuilder {
    Renderer::builder()
        .template(DEFAULT_TEMPLATE)
        .backup_template(DEFAULT_BACKUP_TEMPLATE)
        .datefmt(DEFAULT_DATEFMT)
        .palette("asctime", "30;1")
        .palette(
            "levelname",
            LevelMap::from_levels([
                ColorSpec::from("32;1"),
                ColorSpec::from("34;1"),
                ColorSpec::from("33;1"),
                ColorSpec::from("31;1"),
                ColorSpec::from("41"),
            ]),
        )
        .palette("name", "35")
        .palette("exc_text", "31")
}

/// A renderer with the built-in templates and palettes.
///
/// Its color support is unresolved; [`Setup`](crate::Setup) decides it from
/// the sink, or call [`Renderer::set_supports_color`].
pub fn default_renderer() -> Renderer {
    default_builder()
        .build()
        .expect("built-in renderer configuration is valid")
}
