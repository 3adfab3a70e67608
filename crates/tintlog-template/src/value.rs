//! Field values substituted into templates.

use std::fmt;

/// A value bound to a field name at render time.
///
/// Records carry strings, integers and floats; `None` stands in for absent
/// optional attributes (no exception, no stack info) and renders as `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    None,
}

impl Value {
    /// Type name used in format error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "str",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::None => "NoneType",
        }
    }

    /// Returns the string value, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Quoted, escaped representation (the `!r` conversion).
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => quote(s, false),
            other => other.to_string(),
        }
    }

    /// Like [`repr`](Self::repr) with every non-ASCII character escaped
    /// (the `!a` conversion).
    pub fn ascii(&self) -> String {
        match self {
            Value::Str(s) => quote(s, true),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => f.write_str(&float_repr(*x)),
            Value::None => f.write_str("None"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(n as f64),
        }
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::from(n as u64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

/// Shortest round-trip float text, with a trailing `.0` for integral values
/// and exponent notation outside `1e-4 <= |x| < 1e16`.
pub(crate) fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    let abs = x.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        return normalize_exponent(&format!("{:e}", x));
    }
    let s = format!("{}", x);
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Rewrites Rust's `1.5e20` / `1e-7` exponent form as `1.5e+20` / `1e-07`.
pub(crate) fn normalize_exponent(s: &str) -> String {
    let Some(pos) = s.find(['e', 'E']) else {
        return s.to_string();
    };
    let (mantissa, exp) = s.split_at(pos);
    let marker = &exp[..1];
    let digits = &exp[1..];
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', digits.strip_prefix('+').unwrap_or(digits)),
    };
    format!("{}{}{}{:0>2}", mantissa, marker, sign, digits)
}

fn quote(s: &str, ascii_only: bool) -> String {
    let delim = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if ascii_only && !c.is_ascii() => {
                let cp = c as u32;
                if cp <= 0xff {
                    out.push_str(&format!("\\x{:02x}", cp));
                } else if cp <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", cp));
                } else {
                    out.push_str(&format!("\\U{:08x}", cp));
                }
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}
