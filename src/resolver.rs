//! Scalar type resolution.
//!
//! Implements a YAML 1.1 flavoured core schema for plain scalars:
//!
//! | Type  | Accepted text |
//! |-------|---------------|
//! | null  | empty, `~`, `null`, `Null`, `NULL` |
//! | bool  | `true`/`false`, `yes`/`no`, `on`/`off` in lower, Title and UPPER case |
//! | int   | decimal, `0x` hex, `0o` or legacy `0` octal, `0b` binary, `_` separators |
//! | float | digits with `.` and/or exponent, `.inf`, `-.inf`, `.nan` |
//!
//! Everything else, including timestamps and sexagesimal numbers, is a string.
//! Quoted and block scalars are always strings unless explicitly tagged.
//!
//! The emitter uses the same rules in reverse: a string may only be written
//! plain if resolving its text gives back a string.

use crate::parser::CORE_TAG_PREFIX;
use crate::token::ScalarStyle;
use crate::value::Value;

/// Resolve a scalar event to a value.
///
/// Returns `None` when an explicit core-schema tag does not accept the text
/// (for example `!!int abc`).
pub fn resolve(value: &str, style: ScalarStyle, tag: Option<&str>) -> Option<Value> {
    match tag {
        Some(tag) => resolve_tagged(tag, value),
        None if style == ScalarStyle::Plain => Some(resolve_plain(value)),
        None => Some(Value::String(value.to_string())),
    }
}

/// Infer the type of an untagged plain scalar.
pub fn resolve_plain(text: &str) -> Value {
    if is_null(text) {
        return Value::Null;
    }
    if let Some(b) = parse_bool(text) {
        return Value::Bool(b);
    }
    if let Some(n) = parse_int(text) {
        return Value::Int(n);
    }
    if let Some(f) = parse_float(text) {
        return Value::Float(f);
    }
    Value::String(text.to_string())
}

/// Resolve a scalar carrying an explicit tag.
///
/// `!!str`, `!!int`, `!!float`, `!!bool` and `!!null` force their type;
/// the non-specific tag `!` and unknown tags produce strings.
pub fn resolve_tagged(tag: &str, text: &str) -> Option<Value> {
    match tag.strip_prefix(CORE_TAG_PREFIX) {
        Some("str") => Some(Value::String(text.to_string())),
        Some("int") => parse_int(text).map(Value::Int),
        Some("float") => parse_float(text)
            .or_else(|| parse_int(text).map(|n| n as f64))
            .map(Value::Float),
        Some("bool") => parse_bool(text).map(Value::Bool),
        Some("null") => is_null(text).then_some(Value::Null),
        _ => Some(Value::String(text.to_string())),
    }
}

/// Check whether a plain scalar with this text would read back as a string.
pub fn is_plain_string(text: &str) -> bool {
    matches!(resolve_plain(text), Value::String(_))
}

/// Check for the null forms.
pub fn is_null(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

/// Parse the boolean forms.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => Some(true),
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => Some(false),
        _ => None,
    }
}

/// Check that `digits` is a non-empty run of radix digits and underscores
/// starting with a digit.
fn valid_digit_run(digits: &str, radix: u32) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(c) if c.is_digit(radix) => chars.all(|c| c == '_' || c.is_digit(radix)),
        _ => false,
    }
}

/// Parse the integer forms. Values outside `i64` are rejected.
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (digits, radix) = if let Some(hex) = body.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(oct) = body.strip_prefix("0o") {
        (oct, 8)
    } else if let Some(bin) = body.strip_prefix("0b") {
        (bin, 2)
    } else if body.len() > 1 && body.starts_with('0') {
        // Legacy octal: 0755
        (&body[1..], 8)
    } else {
        (body, 10)
    };

    if !valid_digit_run(digits, radix) {
        return None;
    }

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    let magnitude = i128::from_str_radix(&cleaned, radix).ok()?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

/// Parse the float forms.
pub fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }

    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    if matches!(body, ".inf" | ".Inf" | ".INF") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let bytes = body.as_bytes();
    let mut i = 0;
    let mut mantissa_digits = 0;

    let digit_run = |i: &mut usize, count: &mut usize| {
        if *i < bytes.len() && bytes[*i].is_ascii_digit() {
            while *i < bytes.len() && (bytes[*i].is_ascii_digit() || bytes[*i] == b'_') {
                if bytes[*i] != b'_' {
                    *count += 1;
                }
                *i += 1;
            }
        }
    };

    digit_run(&mut i, &mut mantissa_digits);
    let mut has_dot = false;
    if i < bytes.len() && bytes[i] == b'.' {
        has_dot = true;
        i += 1;
        digit_run(&mut i, &mut mantissa_digits);
    }
    if mantissa_digits == 0 {
        return None;
    }

    let mut has_exponent = false;
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        has_exponent = true;
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return None;
        }
    }

    if i != bytes.len() || !(has_dot || has_exponent) {
        return None;
    }

    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_forms() {
        for text in ["", "~", "null", "Null", "NULL"] {
            assert_eq!(resolve_plain(text), Value::Null, "{:?}", text);
        }
        assert_eq!(resolve_plain("nULL"), Value::String("nULL".into()));
    }

    #[test]
    fn test_bool_forms() {
        assert_eq!(resolve_plain("true"), Value::Bool(true));
        assert_eq!(resolve_plain("Yes"), Value::Bool(true));
        assert_eq!(resolve_plain("ON"), Value::Bool(true));
        assert_eq!(resolve_plain("off"), Value::Bool(false));
        assert_eq!(resolve_plain("tRUE"), Value::String("tRUE".into()));
        assert_eq!(resolve_plain("y"), Value::String("y".into()));
    }

    #[test]
    fn test_int_forms() {
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("123"), Some(123));
        assert_eq!(parse_int("-42"), Some(-42));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("017"), Some(15));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("-9223372036854775808"), Some(i64::MIN));
    }

    #[test]
    fn test_int_rejects() {
        assert_eq!(parse_int("09"), None);
        assert_eq!(parse_int("_1"), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("1.0"), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("12abc"), None);
    }

    #[test]
    fn test_int_overflow_degrades_to_string() {
        let text = "99999999999999999999";
        assert_eq!(parse_int(text), None);
        assert_eq!(resolve_plain(text), Value::String(text.into()));
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float("-0.25"), Some(-0.25));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("1."), Some(1.0));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("2.5E-1"), Some(0.25));
        assert_eq!(parse_float("1_000.5"), Some(1000.5));
        assert_eq!(parse_float(".inf"), Some(f64::INFINITY));
        assert_eq!(parse_float("-.Inf"), Some(f64::NEG_INFINITY));
        assert!(parse_float(".nan").unwrap().is_nan());
    }

    #[test]
    fn test_float_rejects() {
        assert_eq!(parse_float("1"), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("1e"), None);
        assert_eq!(parse_float("1.2.3"), None);
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("-.nan"), None);
        assert_eq!(parse_float("e5"), None);
    }

    #[test]
    fn test_other_text_is_string() {
        for text in ["hello", "2001-12-14", "1:20", "<<", "0x1G"] {
            assert_eq!(resolve_plain(text), Value::String(text.into()), "{:?}", text);
        }
    }

    #[test]
    fn test_quoted_styles_are_strings() {
        assert_eq!(
            resolve("123", ScalarStyle::DoubleQuoted, None),
            Some(Value::String("123".into()))
        );
        assert_eq!(
            resolve("null", ScalarStyle::Literal, None),
            Some(Value::String("null".into()))
        );
    }

    #[test]
    fn test_tagged_scalars() {
        let tag = |t: &str| format!("{}{}", CORE_TAG_PREFIX, t);
        assert_eq!(
            resolve_tagged(&tag("str"), "123"),
            Some(Value::String("123".into()))
        );
        assert_eq!(resolve_tagged(&tag("int"), "0x10"), Some(Value::Int(16)));
        assert_eq!(resolve_tagged(&tag("int"), "abc"), None);
        assert_eq!(resolve_tagged(&tag("float"), "3"), Some(Value::Float(3.0)));
        assert_eq!(resolve_tagged(&tag("bool"), "no"), Some(Value::Bool(false)));
        assert_eq!(resolve_tagged(&tag("null"), ""), Some(Value::Null));
        assert_eq!(resolve_tagged(&tag("null"), "x"), None);
        assert_eq!(resolve_tagged("!", "12"), Some(Value::String("12".into())));
        assert_eq!(
            resolve_tagged("!custom", "true"),
            Some(Value::String("true".into()))
        );
    }

    #[test]
    fn test_is_plain_string() {
        assert!(is_plain_string("hello"));
        assert!(!is_plain_string("123"));
        assert!(!is_plain_string("yes"));
        assert!(!is_plain_string(""));
    }
}
