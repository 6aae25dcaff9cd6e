//! String members.
//!
//! Lengths and positions count characters.

use std::rc::Rc;

use regex::Regex;

use crate::error::ScriptError;

use super::list::required;
use super::{FunctionValue, Value, ValueError};

pub(super) const MEMBERS: &[&str] = &[
    "length",
    "padStart",
    "startsWith",
    "endsWith",
    "contains",
    "substring",
    "match",
];

pub(super) fn dot(s: &Rc<str>, member: &str) -> Result<Value, ValueError> {
    if member == "length" {
        return Ok(Value::Number(s.chars().count() as f64));
    }
    let s = Rc::clone(s);
    let f: fn(&str, &[Value]) -> Result<Value, ScriptError> = match member {
        "padStart" => pad_start,
        "startsWith" => |s, args| {
            let prefix = required(args, 0)?.as_string()?;
            Ok(Value::Boolean(s.starts_with(&*prefix)))
        },
        "endsWith" => |s, args| {
            let suffix = required(args, 0)?.as_string()?;
            Ok(Value::Boolean(s.ends_with(&*suffix)))
        },
        "contains" => |s, args| {
            let needle = required(args, 0)?.as_string()?;
            Ok(Value::Boolean(s.contains(&*needle)))
        },
        "substring" => substring,
        "match" => matches_pattern,
        _ => return Err(ValueError::no_such_member("String", member)),
    };
    Ok(Value::Function(FunctionValue::from_pure_sync(move |args| {
        f(&s, &args)
    })))
}

/// Longest string `padStart` will build.
const MAX_STRING_LENGTH: usize = 1 << 29;

/// `padStart(length, fill = " ")`
fn pad_start(s: &str, args: &[Value]) -> Result<Value, ScriptError> {
    let target = required(args, 0)?.as_number()?;
    let fill = match args.get(1) {
        Some(fill) => fill.as_string()?,
        None => Rc::from(" "),
    };
    let len = s.chars().count();
    if target.is_nan() || target <= len as f64 || fill.is_empty() {
        return Ok(Value::from(s));
    }
    if target > MAX_STRING_LENGTH as f64 {
        return Err(ScriptError::InvalidStringLength);
    }
    let missing = target as usize - len;
    let mut padded: String = fill.chars().cycle().take(missing).collect();
    padded.push_str(s);
    Ok(Value::from(padded))
}

/// `substring(start, end = length)`: bounds are clamped and swapped if
/// reversed.
fn substring(s: &str, args: &[Value]) -> Result<Value, ScriptError> {
    let len = s.chars().count();
    let clamp = |n: f64| -> usize {
        if n.is_nan() || n <= 0.0 {
            0
        } else {
            (n as usize).min(len)
        }
    };
    let start = clamp(required(args, 0)?.as_number()?);
    let end = match args.get(1) {
        Some(end) => clamp(end.as_number()?),
        None => len,
    };
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(Value::from(
        s.chars().skip(from).take(to - from).collect::<String>(),
    ))
}

/// `match(pattern)`: true if the regular expression matches anywhere.
fn matches_pattern(s: &str, args: &[Value]) -> Result<Value, ScriptError> {
    let pattern = required(args, 0)?.as_string()?;
    let regex = Regex::new(&pattern).map_err(|err| ScriptError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })?;
    Ok(Value::Boolean(regex.is_match(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(s: &str, member: &str, args: Vec<Value>) -> Result<Value, ScriptError> {
        let f = dot(&Rc::from(s), member)?;
        match f.call_placeholder(args) {
            Ok(value) => Ok(value),
            Err(crate::unwind::Unwind::Error(err)) => Err(err),
            Err(other) => panic!("unexpected signal {other:?}"),
        }
    }

    #[test]
    fn test_length_counts_characters() {
        assert_eq!(dot(&Rc::from("héllo"), "length").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn test_pad_start() {
        assert_eq!(
            call("7", "padStart", vec![Value::Number(3.0), Value::from("0")]).unwrap(),
            Value::from("007")
        );
        assert_eq!(
            call("ab", "padStart", vec![Value::Number(5.0)]).unwrap(),
            Value::from("   ab")
        );
        assert_eq!(
            call("abc", "padStart", vec![Value::Number(6.0), Value::from("xy")]).unwrap(),
            Value::from("xyxabc")
        );
        assert_eq!(
            call("long", "padStart", vec![Value::Number(2.0)]).unwrap(),
            Value::from("long")
        );
    }

    #[test]
    fn test_pad_start_rejects_huge_lengths() {
        let err = call("a", "padStart", vec![Value::Number(f64::INFINITY)]).unwrap_err();
        assert_eq!(err, ScriptError::InvalidStringLength);
        let err = call("a", "padStart", vec![Value::Number(1e12)]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid string length");
        assert_eq!(
            call("a", "padStart", vec![Value::Number(f64::NEG_INFINITY)]).unwrap(),
            Value::from("a")
        );
    }

    #[test]
    fn test_substring_clamps_and_swaps() {
        let hello = "hello";
        assert_eq!(
            call(hello, "substring", vec![Value::Number(1.0), Value::Number(3.0)]).unwrap(),
            Value::from("el")
        );
        assert_eq!(
            call(hello, "substring", vec![Value::Number(3.0), Value::Number(1.0)]).unwrap(),
            Value::from("el")
        );
        assert_eq!(
            call(hello, "substring", vec![Value::Number(-2.0)]).unwrap(),
            Value::from("hello")
        );
        assert_eq!(
            call(hello, "substring", vec![Value::Number(2.0), Value::Number(99.0)]).unwrap(),
            Value::from("llo")
        );
    }

    #[test]
    fn test_prefix_suffix_contains() {
        assert_eq!(
            call("sky:blue", "startsWith", vec![Value::from("sky:")]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            call("sky:blue", "endsWith", vec![Value::from("sky")]).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            call("sky:blue", "contains", vec![Value::from(":")]).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_match() {
        assert_eq!(
            call("creator:someone", "match", vec![Value::from("^creator:")]).unwrap(),
            Value::Boolean(true)
        );
        let err = call("x", "match", vec![Value::from("(")]).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidPattern { .. }));
    }

    #[test]
    fn test_required_argument() {
        let err = call("x", "startsWith", vec![]).unwrap_err();
        assert_eq!(err.to_string(), "Required argument 0 missing");
    }

    #[test]
    fn test_argument_type_is_exact() {
        let err = call("x", "startsWith", vec![Value::Number(1.0)]).unwrap_err();
        assert_eq!(err.to_string(), "Expected type String, but found Number.");
    }
}
