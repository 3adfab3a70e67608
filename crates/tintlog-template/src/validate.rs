//! Setup-time template validation.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::parser::{Token, Tokenizer};

static FIELD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+|\w+)(\.\w+|\[[^\]]+\])*$").expect("field name pattern is valid")
});

static FORMAT_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(.?[<>=^])?[+ -]?#?0?(\d+|\{\w+\})?[,_]?(\.(\d+|\{\w+\}))?[bcdefgnosx%]?$",
    )
    .expect("format spec pattern is valid")
});

/// Conversions accepted after `!`.
pub const CONVERSIONS: [char; 3] = ['r', 's', 'a'];

/// Checks a raw template against the grammar and the set of known names.
///
/// Every field name must match the identifier/index/attribute grammar, every
/// conversion must be one of `r`, `s`, `a`, and every format spec must fit the
/// spec mini-language. The template must reference at least one named field,
/// and every name (after dropping a leading `_`) must appear in `allowed` or
/// `extra`. Unknown names are reported together, sorted.
///
/// ```rust
/// use tintlog_template::{validate, ValidationError};
///
/// let allowed = ["name", "message", "levelname"];
/// assert!(validate("{levelname} {name}: {message}", &allowed, &[] as &[&str]).is_ok());
/// assert_eq!(
///     validate("{name} {tag}", &allowed, &[] as &[&str]),
///     Err(ValidationError::UnknownFields(vec!["tag".to_string()]))
/// );
/// assert!(validate("{name} {tag}", &allowed, &["tag"]).is_ok());
/// ```
pub fn validate<A, E>(raw: &str, allowed: &[A], extra: &[E]) -> Result<(), ValidationError>
where
    A: AsRef<str>,
    E: AsRef<str>,
{
    let mut fields: BTreeSet<&str> = BTreeSet::new();

    for token in Tokenizer::new(raw) {
        let Token::Field(field) = token? else {
            continue;
        };

        if !field.name.is_empty() {
            if !FIELD_NAME.is_match(field.name) {
                return Err(ValidationError::InvalidFieldName(field.name.to_string()));
            }
            fields.insert(field.name);
        }
        if let Some(c) = field.conversion {
            if !CONVERSIONS.contains(&c) {
                return Err(ValidationError::InvalidConversion(c));
            }
        }
        if let Some(spec) = field.non_empty_spec() {
            if !FORMAT_SPEC.is_match(spec) {
                return Err(ValidationError::InvalidFormatSpec(spec.to_string()));
            }
        }
    }

    if fields.is_empty() {
        return Err(ValidationError::NoFields);
    }

    let known = |name: &str| {
        allowed.iter().any(|a| a.as_ref() == name) || extra.iter().any(|e| e.as_ref() == name)
    };
    let missing: BTreeSet<&str> = fields
        .into_iter()
        .map(|f| f.strip_prefix('_').unwrap_or(f))
        .filter(|f| !known(f))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::UnknownFields(
            missing.into_iter().map(str::to_string).collect(),
        ))
    }
}
