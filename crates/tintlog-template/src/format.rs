//! Format-spec mini-language applied to field values.
//!
//! ```text
//! spec = [[fill]align][sign][#][0][width][grouping][.precision][type]
//! ```
//!
//! Strings accept `s` (or no type), integers accept `b c d n o x X` plus the
//! float types, and floats accept `e E f F g G n %`.

use crate::error::FormatError;
use crate::value::{normalize_exponent, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign/prefix and the digits.
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    /// Only negative numbers get a sign.
    #[default]
    Minus,
    Plus,
    Space,
}

/// A parsed format spec.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatSpec {
    pub fill: Option<char>,
    pub align: Option<Align>,
    pub sign: Option<Sign>,
    pub alternate: bool,
    pub zero: bool,
    pub width: Option<usize>,
    pub grouping: Option<char>,
    pub precision: Option<usize>,
    pub ty: Option<char>,
}

impl FormatSpec {
    /// Parses a spec string (without the leading `:`).
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        let invalid = || FormatError::InvalidSpec(spec.to_string());
        let chars: Vec<char> = spec.chars().collect();
        let mut out = FormatSpec::default();
        let mut i = 0;

        if chars.len() >= 2 {
            if let Some(align) = Align::from_char(chars[1]) {
                out.fill = Some(chars[0]);
                out.align = Some(align);
                i = 2;
            }
        }
        if out.align.is_none() {
            if let Some(align) = chars.first().copied().and_then(Align::from_char) {
                out.align = Some(align);
                i = 1;
            }
        }

        match chars.get(i) {
            Some('+') => out.sign = Some(Sign::Plus),
            Some('-') => out.sign = Some(Sign::Minus),
            Some(' ') => out.sign = Some(Sign::Space),
            _ => {}
        }
        if out.sign.is_some() {
            i += 1;
        }

        if chars.get(i) == Some(&'#') {
            out.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            out.zero = true;
            i += 1;
        }

        let (width, next) = take_digits(&chars, i).ok_or_else(invalid)?;
        out.width = width;
        i = next;

        if let Some(&c @ (',' | '_')) = chars.get(i) {
            out.grouping = Some(c);
            i += 1;
        }

        if chars.get(i) == Some(&'.') {
            let (precision, next) = take_digits(&chars, i + 1).ok_or_else(invalid)?;
            out.precision = Some(precision.ok_or_else(invalid)?);
            i = next;
        }

        match chars.len() - i {
            0 => {}
            1 => out.ty = Some(chars[i]),
            _ => return Err(invalid()),
        }

        Ok(out)
    }

    /// Formats `value` according to this spec.
    pub fn apply(&self, value: &Value) -> Result<String, FormatError> {
        match value {
            Value::Str(s) => self.format_str(s),
            Value::None => self.format_str("None"),
            Value::Int(n) => self.format_int(*n),
            Value::Float(x) => self.format_float(*x),
        }
    }

    fn format_str(&self, s: &str) -> Result<String, FormatError> {
        match self.ty {
            None | Some('s') => {}
            Some(code) => return Err(FormatError::UnknownCode { code, kind: "str" }),
        }
        if self.sign.is_some() {
            return Err(FormatError::NotAllowedForString { what: "sign" });
        }
        if self.alternate {
            return Err(FormatError::NotAllowedForString {
                what: "alternate form (#)",
            });
        }
        if self.align == Some(Align::AfterSign) {
            return Err(FormatError::NotAllowedForString {
                what: "'=' alignment",
            });
        }
        if let Some(g) = self.grouping {
            return Err(FormatError::GroupingWithType(g, 's'));
        }

        let body: String = match self.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.to_string(),
        };
        Ok(self.pad("", &body, Align::Left))
    }

    fn format_int(&self, n: i64) -> Result<String, FormatError> {
        let ty = self.ty.unwrap_or('d');
        if matches!(ty, 'e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%') {
            return self.format_float(n as f64);
        }
        if self.precision.is_some() {
            return Err(FormatError::InvalidSpec(
                "precision not allowed in integer format specifier".to_string(),
            ));
        }

        let magnitude = n.unsigned_abs();
        let (prefix, digits) = match ty {
            'd' | 'n' => ("", magnitude.to_string()),
            'b' => ("0b", format!("{:b}", magnitude)),
            'o' => ("0o", format!("{:o}", magnitude)),
            'x' => ("0x", format!("{:x}", magnitude)),
            'X' => ("0X", format!("{:X}", magnitude)),
            'c' => {
                let ch = u32::try_from(n)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(FormatError::CharOutOfRange)?;
                if self.sign.is_some() {
                    return Err(FormatError::InvalidSpec(
                        "sign not allowed with integer format specifier 'c'".to_string(),
                    ));
                }
                return Ok(self.pad("", &ch.to_string(), Align::Left));
            }
            code => return Err(FormatError::UnknownCode { code, kind: "int" }),
        };

        let digits = match self.grouping {
            None => digits,
            Some(',') if matches!(ty, 'd') => group_digits(&digits, ',', 3),
            Some('_') if matches!(ty, 'd') => group_digits(&digits, '_', 3),
            Some('_') if matches!(ty, 'b' | 'o' | 'x' | 'X') => group_digits(&digits, '_', 4),
            Some(g) => return Err(FormatError::GroupingWithType(g, ty)),
        };

        let mut lead = self.sign_str(n < 0).to_string();
        if self.alternate {
            lead.push_str(prefix);
        }
        Ok(self.pad(&lead, &digits, Align::Right))
    }

    fn format_float(&self, x: f64) -> Result<String, FormatError> {
        let ty = self.ty;
        let upper = matches!(ty, Some('E' | 'F' | 'G'));
        let negative = x.is_sign_negative() && !x.is_nan();
        let abs = x.abs();

        let body = if !abs.is_finite() {
            let text = if abs.is_nan() { "nan" } else { "inf" };
            let text = if upper {
                text.to_uppercase()
            } else {
                text.to_string()
            };
            if ty == Some('%') {
                format!("{}%", text)
            } else {
                text
            }
        } else {
            match ty {
                Some('f' | 'F') => fixed(abs, self.precision.unwrap_or(6), self.alternate),
                Some('e' | 'E') => scientific(abs, self.precision.unwrap_or(6), self.alternate),
                Some('g' | 'G' | 'n') => general(abs, self.precision.unwrap_or(6), self.alternate),
                Some('%') => format!(
                    "{}%",
                    fixed(abs * 100.0, self.precision.unwrap_or(6), self.alternate)
                ),
                None => match self.precision {
                    Some(p) => {
                        let g = general(abs, p, self.alternate);
                        if g.contains(['.', 'e']) {
                            g
                        } else {
                            format!("{}.0", g)
                        }
                    }
                    None => crate::value::float_repr(abs),
                },
                Some(code) => return Err(FormatError::UnknownCode { code, kind: "float" }),
            }
        };
        let body = if upper { body.to_uppercase() } else { body };

        let body = match self.grouping {
            None => body,
            Some(g) if ty == Some('n') => return Err(FormatError::GroupingWithType(g, 'n')),
            Some(g) => group_float(&body, g),
        };

        Ok(self.pad(self.sign_str(negative), &body, Align::Right))
    }

    fn sign_str(&self, negative: bool) -> &'static str {
        match (negative, self.sign.unwrap_or_default()) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Minus) => "",
        }
    }

    /// Pads `lead` + `body` to the requested width.
    fn pad(&self, lead: &str, body: &str, default_align: Align) -> String {
        let numeric = default_align == Align::Right;
        let fill = self
            .fill
            .unwrap_or(if self.zero { '0' } else { ' ' });
        let align = self.align.unwrap_or(if self.zero && numeric {
            Align::AfterSign
        } else {
            default_align
        });

        let len = lead.chars().count() + body.chars().count();
        let total = self.width.unwrap_or(0);
        if total <= len {
            return format!("{}{}", lead, body);
        }

        let missing = total - len;
        let fill_n = |n: usize| std::iter::repeat(fill).take(n).collect::<String>();
        match align {
            Align::Left => format!("{}{}{}", lead, body, fill_n(missing)),
            Align::Right => format!("{}{}{}", fill_n(missing), lead, body),
            Align::Center => {
                let left = missing / 2;
                format!(
                    "{}{}{}{}",
                    fill_n(left),
                    lead,
                    body,
                    fill_n(missing - left)
                )
            }
            Align::AfterSign => format!("{}{}{}", lead, fill_n(missing), body),
        }
    }
}

/// Largest width or precision accepted in a spec.
const MAX_COUNT: usize = i32::MAX as usize;

/// Reads a run of digits; `None` when the count exceeds [`MAX_COUNT`].
fn take_digits(chars: &[char], start: usize) -> Option<(Option<usize>, usize)> {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return Some((None, start));
    }
    let text: String = chars[start..end].iter().collect();
    let count = text.parse::<usize>().ok().filter(|&n| n <= MAX_COUNT)?;
    Some((Some(count), end))
}

fn group_digits(digits: &str, sep: char, every: usize) -> String {
    let count = digits.chars().count();
    let mut out = String::with_capacity(digits.len() + count / every);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (count - i) % every == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

/// Groups the integer part of a formatted float, leaving any fraction,
/// exponent or `%` suffix untouched.
fn group_float(body: &str, sep: char) -> String {
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (int_part, rest) = body.split_at(split);
    format!("{}{}", group_digits(int_part, sep, 3), rest)
}

fn fixed(x: f64, precision: usize, alternate: bool) -> String {
    let s = format!("{:.*}", precision, x);
    if alternate && precision == 0 {
        format!("{}.", s)
    } else {
        s
    }
}

fn scientific(x: f64, precision: usize, alternate: bool) -> String {
    let s = format!("{:.*e}", precision, x);
    let s = if alternate && precision == 0 {
        s.replacen('e', ".e", 1)
    } else {
        s
    };
    normalize_exponent(&s)
}

fn general(x: f64, precision: usize, alternate: bool) -> String {
    let p = precision.max(1);
    if x == 0.0 {
        return if alternate {
            format!("{:.*}", p - 1, 0.0)
        } else {
            "0".to_string()
        };
    }

    // exponent after rounding to `p` significant digits
    let sci = format!("{:.*e}", p - 1, x);
    let exp: i32 = sci
        .rsplit('e')
        .next()
        .and_then(|e| e.parse().ok())
        .unwrap_or(0);

    let p_i = p as i32;
    let text = if (-4..p_i).contains(&exp) {
        format!("{:.*}", (p_i - 1 - exp) as usize, x)
    } else {
        sci
    };
    let text = if alternate {
        text
    } else {
        strip_trailing_zeros(&text)
    };
    normalize_exponent(&text)
}

fn strip_trailing_zeros(s: &str) -> String {
    let (mantissa, exp) = match s.find('e') {
        Some(pos) => s.split_at(pos),
        None => (s, ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{}{}", mantissa, exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, value: impl Into<Value>) -> String {
        FormatSpec::parse(spec).unwrap().apply(&value.into()).unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn fill_and_align() {
            let spec = FormatSpec::parse("*^10").unwrap();
            assert_eq!(spec.fill, Some('*'));
            assert_eq!(spec.align, Some(Align::Center));
            assert_eq!(spec.width, Some(10));
        }

        #[test]
        fn full_spec() {
            let spec = FormatSpec::parse("+#012,.3f").unwrap();
            assert_eq!(spec.sign, Some(Sign::Plus));
            assert!(spec.alternate);
            assert!(spec.zero);
            assert_eq!(spec.width, Some(12));
            assert_eq!(spec.grouping, Some(','));
            assert_eq!(spec.precision, Some(3));
            assert_eq!(spec.ty, Some('f'));
        }

        #[test]
        fn align_char_as_fill() {
            let spec = FormatSpec::parse("<<5").unwrap();
            assert_eq!(spec.fill, Some('<'));
            assert_eq!(spec.align, Some(Align::Left));
        }

        #[test]
        fn missing_precision_digits() {
            assert!(FormatSpec::parse(".f").is_err());
        }

        #[test]
        fn oversized_counts_rejected() {
            assert!(matches!(
                FormatSpec::parse("99999999999"),
                Err(FormatError::InvalidSpec(_))
            ));
            assert!(FormatSpec::parse(".4294967296g").is_err());
            assert!(FormatSpec::parse("99999999999999999999999").is_err());
            assert_eq!(
                FormatSpec::parse("2147483647").unwrap().width,
                Some(2147483647)
            );
        }

        #[test]
        fn trailing_garbage() {
            assert!(FormatSpec::parse("8xy").is_err());
        }

        #[test]
        fn empty_spec() {
            assert_eq!(FormatSpec::parse("").unwrap(), FormatSpec::default());
        }
    }

    mod strings {
        use super::*;

        #[test]
        fn left_aligned_by_default() {
            assert_eq!(fmt("<8", "INFO"), "INFO    ");
            assert_eq!(fmt("8", "INFO"), "INFO    ");
        }

        #[test]
        fn right_and_center() {
            assert_eq!(fmt(">6", "ab"), "    ab");
            assert_eq!(fmt("^6", "ab"), "  ab  ");
            assert_eq!(fmt("-^7", "ab"), "--ab---");
        }

        #[test]
        fn precision_truncates() {
            assert_eq!(fmt(".3", "warning"), "war");
        }

        #[test]
        fn zero_fills_on_the_right() {
            assert_eq!(fmt("05", "ab"), "ab000");
        }

        #[test]
        fn wider_value_is_not_truncated() {
            assert_eq!(fmt("<3", "CRITICAL"), "CRITICAL");
        }

        #[test]
        fn numeric_code_rejected() {
            let err = FormatSpec::parse("d")
                .unwrap()
                .apply(&Value::from("x"))
                .unwrap_err();
            assert_eq!(err, FormatError::UnknownCode { code: 'd', kind: "str" });
        }

        #[test]
        fn sign_rejected() {
            assert!(FormatSpec::parse("+")
                .unwrap()
                .apply(&Value::from("x"))
                .is_err());
        }

        #[test]
        fn none_formats_as_text() {
            assert_eq!(fmt(">6", Value::None), "  None");
        }
    }

    mod integers {
        use super::*;

        #[test]
        fn right_aligned_by_default() {
            assert_eq!(fmt("5", 42), "   42");
        }

        #[test]
        fn zero_padding_after_sign() {
            assert_eq!(fmt("05", -42), "-0042");
            assert_eq!(fmt("+05d", 42), "+0042");
        }

        #[test]
        fn space_sign() {
            assert_eq!(fmt(" d", 7), " 7");
        }

        #[test]
        fn bases_with_prefix() {
            assert_eq!(fmt("#x", 255), "0xff");
            assert_eq!(fmt("#X", 255), "0XFF");
            assert_eq!(fmt("b", 5), "101");
            assert_eq!(fmt("#o", 8), "0o10");
        }

        #[test]
        fn grouping() {
            assert_eq!(fmt(",", 1234567), "1,234,567");
            assert_eq!(fmt("_x", 0xffffff), "ff_ffff");
        }

        #[test]
        fn char_code() {
            assert_eq!(fmt("c", 65), "A");
        }

        #[test]
        fn float_types_convert() {
            assert_eq!(fmt(".2f", 3), "3.00");
        }

        #[test]
        fn precision_rejected() {
            assert!(FormatSpec::parse(".2").unwrap().apply(&Value::Int(1)).is_err());
        }

        #[test]
        fn string_code_rejected() {
            assert!(FormatSpec::parse("s").unwrap().apply(&Value::Int(1)).is_err());
        }
    }

    mod floats {
        use super::*;

        #[test]
        fn fixed_point() {
            assert_eq!(fmt(".3f", 1.23456), "1.235");
            assert_eq!(fmt("f", 2.5), "2.500000");
            assert_eq!(fmt("8.2f", -1.5), "   -1.50");
        }

        #[test]
        fn scientific() {
            assert_eq!(fmt(".2e", 12345.678), "1.23e+04");
            assert_eq!(fmt("E", 0.00012), "1.200000E-04");
        }

        #[test]
        fn general() {
            assert_eq!(fmt("g", 0.0001), "0.0001");
            assert_eq!(fmt("g", 1234567.0), "1.23457e+06");
            assert_eq!(fmt(".3g", 2.0), "2");
            assert_eq!(fmt("g", 0.0), "0");
        }

        #[test]
        fn precision_without_type() {
            assert_eq!(fmt(".3", 1.0), "1.0");
            assert_eq!(fmt(".3", 1234.0), "1.23e+03");
        }

        #[test]
        fn percent() {
            assert_eq!(fmt(".1%", 0.256), "25.6%");
        }

        #[test]
        fn repr_without_spec_details() {
            assert_eq!(fmt(">6", 1.5), "   1.5");
        }

        #[test]
        fn grouped_fixed() {
            assert_eq!(fmt(",.2f", 1234567.891), "1,234,567.89");
        }

        #[test]
        fn infinity() {
            assert_eq!(fmt("f", f64::INFINITY), "inf");
            assert_eq!(fmt("F", f64::NEG_INFINITY), "-INF");
        }

        #[test]
        fn integer_code_rejected() {
            assert!(FormatSpec::parse("d").unwrap().apply(&Value::Float(1.0)).is_err());
        }
    }
}
