//! Number semantics.
//!
//! Numbers are `f64` and follow JavaScript rules: text conversion, the
//! `String(n)` formatting and ToInt32 truncation for bitwise operators.

use crate::ast::BinaryOp;

use super::{Value, ValueError};

/// Formats a number the way JavaScript's `String(n)` does.
///
/// # Example
///
/// ```
/// use hydrui_script::value::number::format_number;
///
/// assert_eq!(format_number(1.0), "1");
/// assert_eq!(format_number(0.5), "0.5");
/// assert_eq!(format_number(1e21), "1e+21");
/// ```
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{n:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        };
    }
    format!("{n}")
}

/// Converts text to a number the way JavaScript's `Number(s)` does.
///
/// Surrounding whitespace is ignored, empty text is 0, `0x` prefixes are
/// hexadecimal and anything unparseable is NaN.
pub fn parse_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return parse_radix(hex, 16);
    }
    if let Some(octal) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        return parse_radix(octal, 8);
    }
    if let Some(binary) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        return parse_radix(binary, 2);
    }

    let well_formed = text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !well_formed {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    value
}

/// Truncates to a signed 32-bit integer with wraparound (ToInt32).
pub fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4294967296.0) as u32 as i32
}

/// Applies a binary operator to two numbers.
///
/// Returns `None` for operators numbers do not support.
pub(super) fn binary(a: f64, op: BinaryOp, b: f64) -> Option<Value> {
    let value = match op {
        BinaryOp::Equal => Value::Boolean(a == b),
        BinaryOp::NotEqual => Value::Boolean(a != b),
        BinaryOp::Lesser => Value::Boolean(a < b),
        BinaryOp::LesserEqual => Value::Boolean(a <= b),
        BinaryOp::Greater => Value::Boolean(a > b),
        BinaryOp::GreaterEqual => Value::Boolean(a >= b),
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div => Value::Number(a / b),
        BinaryOp::Rem => Value::Number(a % b),
        BinaryOp::Or => int32(to_int32(a) | to_int32(b)),
        BinaryOp::Xor => int32(to_int32(a) ^ to_int32(b)),
        BinaryOp::And => int32(to_int32(a) & to_int32(b)),
        BinaryOp::AndNot => int32(to_int32(a) & !to_int32(b)),
        // Shift counts use the low five bits, like JavaScript.
        BinaryOp::Lsh => int32(to_int32(a).wrapping_shl(to_int32(b) as u32)),
        BinaryOp::Rsh => int32(to_int32(a).wrapping_shr(to_int32(b) as u32)),
        _ => return None,
    };
    Some(value)
}

/// True for the operators [`binary`] accepts.
pub(super) fn supports(op: BinaryOp) -> bool {
    !matches!(
        op,
        BinaryOp::LogicalOr
            | BinaryOp::LogicalAnd
            | BinaryOp::Member
            | BinaryOp::Call
            | BinaryOp::Subscript
            | BinaryOp::Group
    )
}

fn int32(n: i32) -> Value {
    Value::Number(n as f64)
}

/// Members of a number.
pub(super) fn dot(n: f64, member: &str) -> Result<Value, ValueError> {
    match member {
        "string" => Ok(Value::from(format_number(n))),
        _ => Err(ValueError::no_such_member("Number", member)),
    }
}

pub(super) const MEMBERS: &[&str] = &["string"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_integers_and_fractions() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_format_exponents() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_format_special_values() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_parse_number_forms() {
        assert_eq!(parse_number("3"), 3.0);
        assert_eq!(parse_number("  -2.5 "), -2.5);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("0xff"), 255.0);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("1.2.3").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("0x").is_nan());
        assert!(parse_number("0xfg").is_nan());
    }

    #[test]
    fn test_to_int32_wraps() {
        assert_eq!(to_int32(1.9), 1);
        assert_eq!(to_int32(-1.9), -1);
        assert_eq!(to_int32(4294967296.0), 0);
        assert_eq!(to_int32(2147483648.0), i32::MIN);
        assert_eq!(to_int32(f64::NAN), 0);
    }

    #[test]
    fn test_bitwise_operators() {
        assert_eq!(binary(6.0, BinaryOp::And, 3.0), Some(Value::Number(2.0)));
        assert_eq!(binary(6.0, BinaryOp::AndNot, 3.0), Some(Value::Number(4.0)));
        assert_eq!(binary(1.0, BinaryOp::Lsh, 33.0), Some(Value::Number(2.0)));
        assert_eq!(binary(-8.0, BinaryOp::Rsh, 1.0), Some(Value::Number(-4.0)));
        assert_eq!(binary(1.0, BinaryOp::Member, 1.0), None);
    }

    #[test]
    fn test_remainder_keeps_dividend_sign() {
        assert_eq!(binary(-7.0, BinaryOp::Rem, 3.0), Some(Value::Number(-1.0)));
    }
}
