//! Tokenizer for the bracket-field template grammar.
//!
//! A template is literal text interspersed with fields:
//!
//! ```text
//! template = *( literal / field )
//! field    = "{" [ fieldname ] [ "!" conversion ] [ ":" formatspec ] "}"
//! ```
//!
//! `{{` and `}}` are escaped braces. A format spec may itself contain nested
//! `{name}` fields (for a dynamic width or precision), so the closing brace of
//! a field is found by counting brace depth.

use std::fmt;

use crate::error::SyntaxError;

/// One field reference, borrowed from the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    /// Field name; empty for a positional `{}` field.
    pub name: &'a str,
    /// Conversion character after `!`, if any.
    pub conversion: Option<char>,
    /// Format spec after `:`, if any. `{x:}` yields `Some("")`.
    pub spec: Option<&'a str>,
    /// Byte offset of the opening `{`.
    pub offset: usize,
}

impl<'a> FieldRef<'a> {
    /// Returns the format spec if present and non-empty.
    pub fn non_empty_spec(&self) -> Option<&'a str> {
        self.spec.filter(|s| !s.is_empty())
    }

    /// Writes this field back out under a different name, keeping its
    /// conversion and format spec.
    pub fn write_renamed(&self, out: &mut String, name: &str) {
        write_field(out, name, self.conversion, self.non_empty_spec());
    }
}

impl fmt::Display for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_renamed(&mut out, self.name);
        f.write_str(&out)
    }
}

/// Appends `{name!conversion:spec}` to `out`, omitting absent parts.
pub fn write_field(out: &mut String, name: &str, conversion: Option<char>, spec: Option<&str>) {
    out.push('{');
    out.push_str(name);
    if let Some(c) = conversion {
        out.push('!');
        out.push(c);
    }
    if let Some(s) = spec.filter(|s| !s.is_empty()) {
        out.push(':');
        out.push_str(s);
    }
    out.push('}');
}

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text, with brace escapes already resolved.
    Literal(&'a str),
    /// A field reference.
    Field(FieldRef<'a>),
}

/// Iterator over the tokens of a template.
///
/// Yields at most one error, after which iteration ends.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            failed: false,
        }
    }

    fn fail(&mut self, err: SyntaxError) -> Option<Result<Token<'a>, SyntaxError>> {
        self.failed = true;
        Some(Err(err))
    }

    /// Finds the byte index of the `}` closing the field opened at `open`.
    fn find_field_end(&self, open: usize) -> Option<usize> {
        let mut depth = 1usize;
        for (i, ch) in self.input[open + 1..].char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + 1 + i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Splits a field body into name, conversion and spec.
    fn split_field(body: &'a str, offset: usize) -> Result<FieldRef<'a>, SyntaxError> {
        let bytes = body.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                // `[index]` may legitimately contain `!` or `:`
                b'[' => {
                    while i < bytes.len() && bytes[i] != b']' {
                        i += 1;
                    }
                }
                b'!' | b':' => break,
                _ => {}
            }
            i += 1;
        }

        let name = &body[..i.min(body.len())];
        if i >= body.len() {
            return Ok(FieldRef {
                name,
                conversion: None,
                spec: None,
                offset,
            });
        }

        if bytes[i] == b':' {
            return Ok(FieldRef {
                name,
                conversion: None,
                spec: Some(&body[i + 1..]),
                offset,
            });
        }

        // `!conversion` optionally followed by `:spec`
        let rest = &body[i + 1..];
        let mut chars = rest.chars();
        let conversion = chars
            .next()
            .ok_or(SyntaxError::MissingConversion(offset + 1 + i))?;
        let after = &rest[conversion.len_utf8()..];
        if after.is_empty() {
            return Ok(FieldRef {
                name,
                conversion: Some(conversion),
                spec: None,
                offset,
            });
        }
        match after.strip_prefix(':') {
            Some(spec) => Ok(FieldRef {
                name,
                conversion: Some(conversion),
                spec: Some(spec),
                offset,
            }),
            None => Err(SyntaxError::ConversionNotLast(
                offset + 2 + i + conversion.len_utf8(),
            )),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.input.len() {
            return None;
        }

        let start = self.pos;
        let remaining = &self.input[start..];

        let Some(brace) = remaining.find(['{', '}']) else {
            self.pos = self.input.len();
            return Some(Ok(Token::Literal(remaining)));
        };

        if brace > 0 {
            self.pos += brace;
            return Some(Ok(Token::Literal(&remaining[..brace])));
        }

        let doubled = remaining.as_bytes().get(1) == remaining.as_bytes().first();
        if doubled {
            // `{{` or `}}`: emit one brace, skip the other
            self.pos += 2;
            return Some(Ok(Token::Literal(&remaining[..1])));
        }

        if remaining.starts_with('}') {
            return self.fail(SyntaxError::UnmatchedClose(start));
        }

        let Some(end) = self.find_field_end(start) else {
            return self.fail(SyntaxError::UnclosedField(start));
        };
        self.pos = end + 1;

        match Self::split_field(&self.input[start + 1..end], start) {
            Ok(field) => Some(Ok(Token::Field(field))),
            Err(err) => self.fail(err),
        }
    }
}

/// Tokenizes a whole template, stopping at the first syntax error.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    Tokenizer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(
        name: &'a str,
        conversion: Option<char>,
        spec: Option<&'a str>,
        offset: usize,
    ) -> Token<'a> {
        Token::Field(FieldRef {
            name,
            conversion,
            spec,
            offset,
        })
    }

    mod literals {
        use super::*;

        #[test]
        fn plain_text() {
            assert_eq!(tokenize("hello").unwrap(), vec![Token::Literal("hello")]);
        }

        #[test]
        fn empty_input() {
            assert!(tokenize("").unwrap().is_empty());
        }

        #[test]
        fn escaped_braces() {
            assert_eq!(
                tokenize("a{{b}}c").unwrap(),
                vec![
                    Token::Literal("a"),
                    Token::Literal("{"),
                    Token::Literal("b"),
                    Token::Literal("}"),
                    Token::Literal("c"),
                ]
            );
        }
    }

    mod fields {
        use super::*;

        #[test]
        fn simple_field() {
            assert_eq!(
                tokenize("x{name}y").unwrap(),
                vec![
                    Token::Literal("x"),
                    field("name", None, None, 1),
                    Token::Literal("y"),
                ]
            );
        }

        #[test]
        fn conversion_and_spec() {
            assert_eq!(
                tokenize("{levelname!r:<8}").unwrap(),
                vec![field("levelname", Some('r'), Some("<8"), 0)]
            );
        }

        #[test]
        fn empty_spec_is_kept_distinct() {
            assert_eq!(tokenize("{x:}").unwrap(), vec![field("x", None, Some(""), 0)]);
        }

        #[test]
        fn positional_field() {
            assert_eq!(tokenize("{}").unwrap(), vec![field("", None, None, 0)]);
        }

        #[test]
        fn nested_width_in_spec() {
            assert_eq!(
                tokenize("{msg:>{width}}").unwrap(),
                vec![field("msg", None, Some(">{width}"), 0)]
            );
        }

        #[test]
        fn colon_inside_index() {
            assert_eq!(
                tokenize("{map[a:b]}").unwrap(),
                vec![field("map[a:b]", None, None, 0)]
            );
        }

        #[test]
        fn marker_suffixes_are_ordinary_name_chars() {
            assert_eq!(
                tokenize("{name\u{2}}").unwrap(),
                vec![field("name\u{2}", None, None, 0)]
            );
        }

        #[test]
        fn display_roundtrips_field() {
            let tokens = tokenize("{a!s:^9}").unwrap();
            match tokens[0] {
                Token::Field(f) => assert_eq!(f.to_string(), "{a!s:^9}"),
                _ => panic!("Expected field"),
            }
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn single_close_brace() {
            assert_eq!(tokenize("a}b"), Err(SyntaxError::UnmatchedClose(1)));
        }

        #[test]
        fn unclosed_field() {
            assert_eq!(tokenize("ab{name"), Err(SyntaxError::UnclosedField(2)));
        }

        #[test]
        fn trailing_open_brace() {
            assert_eq!(tokenize("ab{"), Err(SyntaxError::UnclosedField(2)));
        }

        #[test]
        fn missing_conversion() {
            assert!(matches!(
                tokenize("{a!}"),
                Err(SyntaxError::MissingConversion(_))
            ));
        }

        #[test]
        fn conversion_not_last() {
            assert!(matches!(
                tokenize("{a!rx}"),
                Err(SyntaxError::ConversionNotLast(_))
            ));
        }

        #[test]
        fn iteration_stops_after_error() {
            let mut tokens = Tokenizer::new("}{a}");
            assert!(tokens.next().unwrap().is_err());
            assert!(tokens.next().is_none());
        }
    }
}
