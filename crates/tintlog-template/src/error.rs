//! Error types for template parsing, compilation, validation and rendering.

use thiserror::Error;

/// A violation of the bracket-field grammar.
///
/// Offsets are byte positions into the template source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A `}` outside of a field that is not part of a `}}` escape.
    #[error("single '}}' encountered in template at byte {0}")]
    UnmatchedClose(usize),

    /// A `{` whose field never closes.
    #[error("expected '}}' before end of template (field opened at byte {0})")]
    UnclosedField(usize),

    /// A `!` with nothing after it.
    #[error("end of field while looking for conversion specifier at byte {0}")]
    MissingConversion(usize),

    /// A conversion character followed by something other than `:` or `}`.
    #[error("expected ':' after conversion specifier at byte {0}")]
    ConversionNotLast(usize),
}

/// Malformed `{enter}`/`{exit}` group markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The template is not valid bracket syntax.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// `{enter}` seen while another group is still open.
    #[error("new {{enter}} found before previous {{enter}} was closed")]
    NestedGroup,

    /// `{exit}` seen with no open group.
    #[error("{{exit}} used before {{enter}}")]
    UnmatchedExit,

    /// `{enter}{exit}` with no field in between.
    #[error("{{exit}} used without a contained field; put at least one field between {{enter}} and {{exit}}")]
    EmptyGroup,

    /// End of template reached with a group still open.
    #[error("unterminated {{enter}}/{{exit}} group")]
    UnterminatedGroup,
}

/// Reasons a raw template is rejected at setup time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The template is not valid bracket syntax.
    #[error("invalid template: {0}")]
    Syntax(#[from] SyntaxError),

    /// A field name outside the identifier/index/attribute grammar.
    #[error("invalid template: invalid field name/expression: {0}")]
    InvalidFieldName(String),

    /// A conversion other than `r`, `s` or `a`.
    #[error("invalid template: invalid conversion: {0}")]
    InvalidConversion(char),

    /// A format spec outside the supported mini-language.
    #[error("invalid template: bad specifier: {0}")]
    InvalidFormatSpec(String),

    /// The template references no fields at all.
    #[error("invalid template: no fields")]
    NoFields,

    /// Field names that are neither intrinsic nor declared defaults.
    #[error("unknown fields (no record attribute or default): {}", .0.join(", "))]
    UnknownFields(Vec<String>),
}

/// Failure applying a format spec to a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The format spec itself does not parse.
    #[error("invalid format specifier '{0}'")]
    InvalidSpec(String),

    /// The type character does not apply to the value's kind.
    #[error("unknown format code '{code}' for value of type {kind}")]
    UnknownCode { code: char, kind: &'static str },

    /// A sign, `#`, `=` alignment or grouping used with a string value.
    #[error("{what} not allowed in string format specifier")]
    NotAllowedForString { what: &'static str },

    /// Grouping requested with a type that does not support it.
    #[error("cannot specify '{0}' with '{1}'")]
    GroupingWithType(char, char),

    /// Integer conversion `c` outside the valid code point range.
    #[error("%c arg not in range(0x110000)")]
    CharOutOfRange,
}

/// Failure substituting values into a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The substitution table has no entry for a referenced field.
    #[error("formatting field not found in record: '{0}'")]
    MissingField(String),

    /// A value could not be formatted with its spec.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A nested field inside a format spec produced an invalid spec.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}
