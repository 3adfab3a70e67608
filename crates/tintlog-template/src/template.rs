//! Parsed templates ready for repeated substitution.
//!
//! [`Template::parse`] tokenizes a template once and pre-parses every static
//! format spec, so rendering a record only walks the segment list and looks
//! values up.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::error::{FormatError, RenderError, SyntaxError};
use crate::format::FormatSpec;
use crate::parser::{Token, Tokenizer};
use crate::value::Value;

/// Source of values for field names.
pub trait FieldLookup {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl<S: BuildHasher> FieldLookup for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl FieldLookup for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Conversion applied before the format spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `!s`: display text.
    Str,
    /// `!r`: quoted representation.
    Repr,
    /// `!a`: quoted representation with non-ASCII escaped.
    Ascii,
}

impl Conversion {
    fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(Conversion::Str),
            'r' => Some(Conversion::Repr),
            'a' => Some(Conversion::Ascii),
            _ => None,
        }
    }

    fn apply(self, value: &Value) -> Value {
        match self {
            Conversion::Str => Value::Str(value.to_string()),
            Conversion::Repr => Value::Str(value.repr()),
            Conversion::Ascii => Value::Str(value.ascii()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Spec {
    None,
    Static(FormatSpec),
    /// Contains nested `{name}` fields resolved per render.
    Dynamic(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    name: String,
    conversion: Option<Conversion>,
    spec: Spec,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Error raised while parsing a template for rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("invalid conversion: {0}")]
    Conversion(char),
}

/// A template parsed into literal and field segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `source`, merging adjacent literal pieces.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut segments: Vec<Segment> = Vec::new();

        for token in Tokenizer::new(source) {
            match token? {
                Token::Literal(text) => match segments.last_mut() {
                    Some(Segment::Literal(prev)) => prev.push_str(text),
                    _ => segments.push(Segment::Literal(text.to_string())),
                },
                Token::Field(field) => {
                    let conversion = match field.conversion {
                        Some(c) => Some(Conversion::from_char(c).ok_or(ParseError::Conversion(c))?),
                        None => None,
                    };
                    let spec = match field.non_empty_spec() {
                        None => Spec::None,
                        Some(s) if s.contains('{') => Spec::Dynamic(s.to_string()),
                        Some(s) => Spec::Static(FormatSpec::parse(s)?),
                    };
                    segments.push(Segment::Field(Field {
                        name: field.name.to_string(),
                        conversion,
                        spec,
                    }));
                }
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text this was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Field names in order of appearance (duplicates included).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(f) => Some(f.name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether any field is named exactly `name`.
    pub fn references(&self, name: &str) -> bool {
        self.field_names().any(|n| n == name)
    }

    /// Substitutes values from `fields` into the template.
    ///
    /// Fails with [`RenderError::MissingField`] on the first name `fields`
    /// cannot resolve; no partial output is returned.
    pub fn render<L: FieldLookup + ?Sized>(&self, fields: &L) -> Result<String, RenderError> {
        let mut out = String::with_capacity(self.source.len() * 2);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => {
                    let value = fields
                        .lookup(&field.name)
                        .ok_or_else(|| RenderError::MissingField(field.name.clone()))?;
                    let converted;
                    let value = match field.conversion {
                        Some(conversion) => {
                            converted = conversion.apply(value);
                            &converted
                        }
                        None => value,
                    };
                    match &field.spec {
                        Spec::None => out.push_str(&value.to_string()),
                        Spec::Static(spec) => out.push_str(&spec.apply(value)?),
                        Spec::Dynamic(raw) => {
                            let resolved = Template::parse(raw)
                                .map_err(|err| match err {
                                    ParseError::Syntax(e) => RenderError::Syntax(e),
                                    ParseError::Format(e) => RenderError::Format(e),
                                    ParseError::Conversion(c) => RenderError::Format(
                                        FormatError::InvalidSpec(format!("!{}", c)),
                                    ),
                                })?
                                .render(fields)?;
                            out.push_str(&FormatSpec::parse(&resolved)?.apply(value)?);
                        }
                    }
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn literal_only() {
        let t = Template::parse("plain {{text}}").unwrap();
        assert_eq!(t.render(&HashMap::<String, Value>::new()).unwrap(), "plain {text}");
    }

    #[test]
    fn substitutes_fields() {
        let t = Template::parse("{levelname:<6}|{name}").unwrap();
        let fields = table(&[("levelname", "INFO".into()), ("name", "svc".into())]);
        assert_eq!(t.render(&fields).unwrap(), "INFO  |svc");
    }

    #[test]
    fn missing_field_is_reported() {
        let t = Template::parse("{a} {b}").unwrap();
        let fields = table(&[("a", "x".into())]);
        assert_eq!(
            t.render(&fields),
            Err(RenderError::MissingField("b".to_string()))
        );
    }

    #[test]
    fn conversions() {
        let t = Template::parse("{m!r} {m!s} {m!a}").unwrap();
        let fields = table(&[("m", "é".into())]);
        assert_eq!(t.render(&fields).unwrap(), "'é' é '\\xe9'");
    }

    #[test]
    fn conversion_then_spec() {
        let t = Template::parse("[{n!r:>6}]").unwrap();
        let fields = table(&[("n", "ab".into())]);
        assert_eq!(t.render(&fields).unwrap(), "[  'ab']");
    }

    #[test]
    fn nested_width() {
        let t = Template::parse("{msg:>{width}}").unwrap();
        let fields = table(&[("msg", "hi".into()), ("width", Value::Int(5))]);
        assert_eq!(t.render(&fields).unwrap(), "   hi");
    }

    #[test]
    fn oversized_nested_width() {
        let t = Template::parse("{msg:>{width}}").unwrap();
        let fields = table(&[("msg", "hi".into()), ("width", Value::Int(99_999_999_999))]);
        assert!(matches!(
            t.render(&fields),
            Err(RenderError::Format(FormatError::InvalidSpec(_)))
        ));
    }

    #[test]
    fn marker_named_fields() {
        let t = Template::parse("{name\u{2}}{name}{name\u{3}}").unwrap();
        let fields = table(&[
            ("name\u{2}", "<".into()),
            ("name", "svc".into()),
            ("name\u{3}", ">".into()),
        ]);
        assert_eq!(t.render(&fields).unwrap(), "<svc>");
    }

    #[test]
    fn references_exact_names() {
        let t = Template::parse("{asctime} {asctime\u{2}}").unwrap();
        assert!(t.references("asctime"));
        assert!(!t.references("asc"));
        assert_eq!(t.field_names().count(), 2);
    }

    #[test]
    fn bad_static_spec_fails_at_parse() {
        assert!(matches!(
            Template::parse("{a:.x}"),
            Err(ParseError::Format(_))
        ));
    }

    #[test]
    fn bad_conversion_fails_at_parse() {
        assert_eq!(Template::parse("{a!q}"), Err(ParseError::Conversion('q')));
    }

    #[test]
    fn positional_field_is_missing() {
        let t = Template::parse("{}").unwrap();
        assert_eq!(
            t.render(&HashMap::<String, Value>::new()),
            Err(RenderError::MissingField(String::new()))
        );
    }
}
