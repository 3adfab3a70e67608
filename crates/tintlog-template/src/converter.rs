//! Color-marker compilation for bracket templates.
//!
//! [`compile`] rewrites a template so that every field which should carry
//! color is wrapped in two zero-width marker fields, `{name\x02}` (enter) and
//! `{name\x03}` (exit). At render time the markers resolve to a palette's ANSI
//! sequences, or to empty strings when color is off.
//!
//! # Pseudo-fields
//!
//! - `{field}`: an ordinary field outside a group is colored on its own:
//!   `{field\x02}{field}{field\x03}`.
//! - `{enter}...{exit}`: a group. The first field inside names the group; the
//!   whole span between `{enter}` and `{exit}` takes that field's color and
//!   the contained fields get no markers of their own. Groups do not nest.
//! - `{_field}`: renders `field` with no markers, even outside a group.
//! - `{}`: a positional field, passed through unchanged.
//!
//! [`strip_color`] goes the other way, producing a plain template with the
//! pseudo-fields removed.

use crate::error::{CompileError, SyntaxError};
use crate::parser::{write_field, FieldRef, Token, Tokenizer};

/// Suffix of enter-marker field names (STX).
pub const ENTER_SUFFIX: char = '\u{2}';
/// Suffix of exit-marker field names (ETX).
pub const EXIT_SUFFIX: char = '\u{3}';

/// Name of the pseudo-field opening a group.
pub const ENTER: &str = "enter";
/// Name of the pseudo-field closing a group.
pub const EXIT: &str = "exit";

/// Key of the enter marker for `field`.
pub fn enter_marker(field: &str) -> String {
    let mut key = String::with_capacity(field.len() + 1);
    key.push_str(field);
    key.push(ENTER_SUFFIX);
    key
}

/// Key of the exit marker for `field`.
pub fn exit_marker(field: &str) -> String {
    let mut key = String::with_capacity(field.len() + 1);
    key.push_str(field);
    key.push(EXIT_SUFFIX);
    key
}

/// Whether `name` is a marker key rather than a user field.
pub fn is_marker(name: &str) -> bool {
    name.ends_with([ENTER_SUFFIX, EXIT_SUFFIX])
}

/// Group state while walking a template.
#[derive(Debug, Clone, Copy)]
enum GroupState<'a> {
    Closed,
    /// `{enter}` seen, no field yet. `slot` indexes the placeholder piece.
    OpenUnbound {
        slot: usize,
        enter: FieldRef<'a>,
    },
    OpenBound(&'a str),
}

/// Compiles a raw template into its marker-annotated form.
///
/// # Example
///
/// ```rust
/// use tintlog_template::compile;
///
/// assert_eq!(
///     compile("{levelname}: {message}").unwrap(),
///     "{levelname\u{2}}{levelname}{levelname\u{3}}: {message\u{2}}{message}{message\u{3}}"
/// );
/// ```
pub fn compile(raw: &str) -> Result<String, CompileError> {
    let mut pieces: Vec<String> = Vec::new();
    let mut state = GroupState::Closed;

    for token in Tokenizer::new(raw) {
        let field = match token? {
            Token::Literal(text) => {
                let mut piece = String::with_capacity(text.len());
                push_literal(&mut piece, text);
                pieces.push(piece);
                continue;
            }
            Token::Field(field) => field,
        };

        let mut piece = String::new();

        if field.name.is_empty() {
            field.write_renamed(&mut piece, "");
        } else if let Some(bare) = field.name.strip_prefix('_') {
            field.write_renamed(&mut piece, bare);
        } else if field.name == ENTER {
            if !matches!(state, GroupState::Closed) {
                return Err(CompileError::NestedGroup);
            }
            state = GroupState::OpenUnbound {
                slot: pieces.len(),
                enter: field,
            };
            // placeholder, filled in once the group is named
        } else if field.name == EXIT {
            match state {
                GroupState::Closed => return Err(CompileError::UnmatchedExit),
                GroupState::OpenUnbound { .. } => return Err(CompileError::EmptyGroup),
                GroupState::OpenBound(group) => {
                    field.write_renamed(&mut piece, &exit_marker(group));
                    state = GroupState::Closed;
                }
            }
        } else {
            match state {
                GroupState::OpenBound(_) => field.write_renamed(&mut piece, field.name),
                GroupState::OpenUnbound { slot, enter } => {
                    let mut marker = String::new();
                    enter.write_renamed(&mut marker, &enter_marker(field.name));
                    pieces[slot] = marker;
                    state = GroupState::OpenBound(field.name);
                    field.write_renamed(&mut piece, field.name);
                }
                GroupState::Closed => {
                    write_field(&mut piece, &enter_marker(field.name), None, None);
                    field.write_renamed(&mut piece, field.name);
                    write_field(&mut piece, &exit_marker(field.name), None, None);
                }
            }
        }

        pieces.push(piece);
    }

    if !matches!(state, GroupState::Closed) {
        return Err(CompileError::UnterminatedGroup);
    }

    Ok(pieces.concat())
}

/// Strips color markup from a template.
///
/// `{enter}`/`{exit}` and marker fields are dropped, `{_field}` becomes
/// `{field}`, and every other field passes through with its conversion and
/// spec intact.
///
/// ```rust
/// use tintlog_template::{compile, strip_color};
///
/// let raw = "{enter}{name}[{process}]{exit} {_asctime}";
/// assert_eq!(strip_color(raw).unwrap(), "{name}[{process}] {asctime}");
/// assert_eq!(strip_color(&compile(raw).unwrap()).unwrap(), "{name}[{process}] {asctime}");
/// ```
pub fn strip_color(raw: &str) -> Result<String, SyntaxError> {
    let mut out = String::with_capacity(raw.len());

    for token in Tokenizer::new(raw) {
        match token? {
            Token::Literal(text) => push_literal(&mut out, text),
            Token::Field(field) => {
                if field.name == ENTER || field.name == EXIT || is_marker(field.name) {
                    continue;
                }
                let name = field.name.strip_prefix('_').unwrap_or(field.name);
                field.write_renamed(&mut out, name);
            }
        }
    }

    Ok(out)
}

/// Pushes literal text, re-escaping braces so the output stays a template.
fn push_literal(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '{' => out.push_str("{{"),
            '}' => out.push_str("}}"),
            c => out.push(c),
        }
    }
}
