//! Bracket-field templates with color group markers.
//!
//! This crate compiles human-readable log templates such as
//!
//! ```text
//! {asctime} {levelname:<8} {enter}{name}[{process}]{exit}: {message}
//! ```
//!
//! into a form where every colorizable span is wrapped in hidden marker
//! fields. A renderer then binds the markers to ANSI sequences (or to empty
//! strings on a plain stream) and substitutes record values.
//!
//! # Pipeline
//!
//! 1. [`validate`] checks a raw template once at setup: grammar, conversions,
//!    format specs, and that every field is a known name.
//! 2. [`compile`] rewrites the template with marker fields; [`strip_color`]
//!    derives a plain fallback template from the same source.
//! 3. [`Template::parse`] pre-parses the compiled text, and
//!    [`Template::render`] substitutes values from any [`FieldLookup`].
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use tintlog_template::{compile, enter_marker, exit_marker, Template, Value};
//!
//! let compiled = compile("{levelname:<5}| {name}").unwrap();
//! let template = Template::parse(&compiled).unwrap();
//!
//! let mut fields: HashMap<String, Value> = HashMap::new();
//! fields.insert("levelname".into(), "INFO".into());
//! fields.insert("name".into(), "svc".into());
//! for key in ["levelname", "name"] {
//!     fields.insert(enter_marker(key), Value::from(""));
//!     fields.insert(exit_marker(key), Value::from(""));
//! }
//! fields.insert(enter_marker("name"), "\x1b[35m".into());
//! fields.insert(exit_marker("name"), "\x1b[0m".into());
//!
//! assert_eq!(template.render(&fields).unwrap(), "INFO | \x1b[35msvc\x1b[0m");
//! ```

mod converter;
mod error;
mod format;
mod parser;
mod template;
mod validate;
mod value;

pub use converter::{
    compile, enter_marker, exit_marker, is_marker, strip_color, ENTER, ENTER_SUFFIX, EXIT,
    EXIT_SUFFIX,
};
pub use error::{CompileError, FormatError, RenderError, SyntaxError, ValidationError};
pub use format::{Align, FormatSpec, Sign};
pub use parser::{tokenize, FieldRef, Token, Tokenizer};
pub use template::{Conversion, FieldLookup, ParseError, Template};
pub use validate::{validate, CONVERSIONS};
pub use value::Value;
