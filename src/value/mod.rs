//! Runtime values.
//!
//! Every value answers the same closed set of operators. Each operator is a
//! single `match` over [`Value`] whose fall-through arm reports an invalid
//! operation naming the value's type, so adding a variant means visiting
//! every operator.
//!
//! # Coercions
//!
//! - `as_*` requires the exact type (after looking through variables) and
//!   fails with a type mismatch otherwise. Binary operators take their right
//!   operand this way.
//! - `coerce_*` converts among Boolean, Number and String with JavaScript
//!   rules and fails with an invalid conversion for anything else.

mod error;
pub mod file;
mod function;
mod list;
pub mod number;
mod string;
mod variable;

pub use error::ValueError;
pub use file::{FileLookup, FileMetadata, FileValue, MemoryFileStore};
pub use function::{Constructor, FunctionValue};
pub use list::StringList;
pub use variable::Variable;

use std::fmt;
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::ScriptError;
use crate::unwind::Flow;

use number::{format_number, parse_number, to_int32};

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Null,
    List(Rc<Vec<Value>>),
    StringList(StringList),
    File(FileValue),
    Function(FunctionValue),
    Constructor(Constructor),
    Variable(Variable),
}

/// The operator name used in invalid-operation errors.
fn operation_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::LogicalOr => "logicalOr",
        BinaryOp::LogicalAnd => "logicalAnd",
        BinaryOp::Equal => "equal",
        BinaryOp::NotEqual => "notEqual",
        BinaryOp::Lesser => "lesser",
        BinaryOp::LesserEqual => "lesserEqual",
        BinaryOp::Greater => "greater",
        BinaryOp::GreaterEqual => "greaterEqual",
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Or => "or",
        BinaryOp::Xor => "xor",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "div",
        BinaryOp::Rem => "rem",
        BinaryOp::Lsh => "lsh",
        BinaryOp::Rsh => "rsh",
        BinaryOp::And => "and",
        BinaryOp::AndNot => "andNot",
        BinaryOp::Member => "dot",
        BinaryOp::Call => "call",
        BinaryOp::Subscript => "index",
        BinaryOp::Group => "group",
    }
}

impl Value {
    /// The type name used in error messages.
    ///
    /// A variable reports the type of what it currently holds.
    pub fn name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Null => "Null",
            Value::List(_) => "List",
            Value::StringList(list) => list.name(),
            Value::File(_) => "File",
            Value::Function(_) => "Function",
            Value::Constructor(constructor) => constructor.name(),
            Value::Variable(var) => var.get().name(),
        }
    }

    /// The current value, looking through any variable.
    pub fn snapshot(&self) -> Value {
        match self {
            Value::Variable(var) => var.get(),
            other => other.clone(),
        }
    }

    /// Converts the value to JSON for hosts and tests.
    ///
    /// Callables have no data and render as `null`, as do non-finite
    /// numbers.
    pub fn raw(&self) -> serde_json::Value {
        match self.snapshot() {
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::List(items) => items.iter().map(Value::raw).collect(),
            Value::StringList(list) => list.items().iter().cloned().collect(),
            Value::File(file) => {
                serde_json::to_value(file.metadata()).unwrap_or(serde_json::Value::Null)
            }
            Value::Null
            | Value::Function(_)
            | Value::Constructor(_)
            | Value::Variable(_) => serde_json::Value::Null,
        }
    }

    /// Converts JSON from a host into a value.
    ///
    /// Arrays of strings become string lists; objects are not representable
    /// and become `null`.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null | serde_json::Value::Object(_) => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => {
                let strings: Option<Vec<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect();
                match strings {
                    Some(strings) if !items.is_empty() => {
                        Value::StringList(StringList::new(strings))
                    }
                    _ => Value::List(Rc::new(items.iter().map(Value::from_json).collect())),
                }
            }
        }
    }

    // ==================== Coercions ====================

    pub fn as_boolean(&self) -> Result<bool, ValueError> {
        match self.snapshot() {
            Value::Boolean(b) => Ok(b),
            other => Err(ValueError::type_mismatch("Boolean", other.name())),
        }
    }

    pub fn as_number(&self) -> Result<f64, ValueError> {
        match self.snapshot() {
            Value::Number(n) => Ok(n),
            other => Err(ValueError::type_mismatch("Number", other.name())),
        }
    }

    pub fn as_string(&self) -> Result<Rc<str>, ValueError> {
        match self.snapshot() {
            Value::String(s) => Ok(s),
            other => Err(ValueError::type_mismatch("String", other.name())),
        }
    }

    pub fn as_function(&self) -> Result<FunctionValue, ValueError> {
        match self.snapshot() {
            Value::Function(f) => Ok(f),
            other => Err(ValueError::type_mismatch("Function", other.name())),
        }
    }

    pub fn as_file(&self) -> Result<FileValue, ValueError> {
        match self.snapshot() {
            Value::File(f) => Ok(f),
            other => Err(ValueError::type_mismatch("File", other.name())),
        }
    }

    /// Truthiness: nonzero numbers and non-empty strings are true.
    pub fn coerce_boolean(&self) -> Result<bool, ValueError> {
        match self.snapshot() {
            Value::Boolean(b) => Ok(b),
            Value::Number(n) => Ok(n != 0.0 && !n.is_nan()),
            Value::String(s) => Ok(!s.is_empty()),
            other => Err(ValueError::invalid_conversion(other.name(), "Boolean")),
        }
    }

    pub fn coerce_number(&self) -> Result<f64, ValueError> {
        match self.snapshot() {
            Value::Number(n) => Ok(n),
            Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
            Value::String(s) => Ok(parse_number(&s)),
            other => Err(ValueError::invalid_conversion(other.name(), "Number")),
        }
    }

    pub fn coerce_string(&self) -> Result<Rc<str>, ValueError> {
        match self.snapshot() {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(Rc::from(format_number(n))),
            Value::Boolean(b) => Ok(Rc::from(b.to_string())),
            other => Err(ValueError::invalid_conversion(other.name(), "String")),
        }
    }

    // ==================== Operators ====================

    pub fn negate(&self) -> Result<Value, ValueError> {
        match self.snapshot() {
            Value::Number(n) => Ok(Value::Number(-n)),
            Value::String(s) => Ok(Value::Number(-parse_number(&s))),
            other => Err(ValueError::invalid_operation(other.name(), "negate")),
        }
    }

    pub fn not(&self) -> Result<Value, ValueError> {
        match self.snapshot() {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            Value::Number(n) => Ok(Value::Boolean(n == 0.0 || n.is_nan())),
            Value::String(s) => Ok(Value::Boolean(s.is_empty())),
            other => Err(ValueError::invalid_operation(other.name(), "not")),
        }
    }

    pub fn bit_not(&self) -> Result<Value, ValueError> {
        match self.snapshot() {
            Value::Number(n) => Ok(Value::Number(!to_int32(n) as f64)),
            Value::String(s) => Ok(Value::Number(!to_int32(parse_number(&s)) as f64)),
            other => Err(ValueError::invalid_operation(other.name(), "bitNot")),
        }
    }

    pub fn unary(&self, op: UnaryOp) -> Result<Value, ValueError> {
        match op {
            UnaryOp::Plus => Ok(self.clone()),
            UnaryOp::Negate => self.negate(),
            UnaryOp::Not => self.not(),
            UnaryOp::BitNot => self.bit_not(),
        }
    }

    /// Applies an arithmetic, comparison, logical or bitwise operator, or a
    /// subscript.
    ///
    /// Member access, calls and groups need the unevaluated right operand
    /// and are handled by the evaluators.
    pub fn binary(&self, op: BinaryOp, rhs: &Value) -> Result<Value, ScriptError> {
        let lhs = self.snapshot();
        if op == BinaryOp::Subscript {
            return lhs.index(rhs);
        }
        let invalid = || ValueError::invalid_operation(lhs.name(), operation_name(op));
        let value = match &lhs {
            Value::Boolean(a) => {
                let b = match op {
                    BinaryOp::LogicalOr
                    | BinaryOp::LogicalAnd
                    | BinaryOp::Equal
                    | BinaryOp::NotEqual => rhs.as_boolean()?,
                    _ => return Err(invalid().into()),
                };
                Value::Boolean(match op {
                    BinaryOp::LogicalOr => *a || b,
                    BinaryOp::LogicalAnd => *a && b,
                    BinaryOp::Equal => *a == b,
                    _ => *a != b,
                })
            }
            Value::Number(a) => {
                if !number::supports(op) {
                    return Err(invalid().into());
                }
                number::binary(*a, op, rhs.as_number()?).ok_or_else(invalid)?
            }
            Value::String(a) => {
                let b = match op {
                    BinaryOp::Equal
                    | BinaryOp::NotEqual
                    | BinaryOp::Lesser
                    | BinaryOp::LesserEqual
                    | BinaryOp::Greater
                    | BinaryOp::GreaterEqual
                    | BinaryOp::Add => rhs.as_string()?,
                    _ => return Err(invalid().into()),
                };
                match op {
                    BinaryOp::Add => Value::from(format!("{a}{b}")),
                    BinaryOp::Equal => Value::Boolean(*a == b),
                    BinaryOp::NotEqual => Value::Boolean(*a != b),
                    BinaryOp::Lesser => Value::Boolean(*a < b),
                    BinaryOp::LesserEqual => Value::Boolean(*a <= b),
                    BinaryOp::Greater => Value::Boolean(*a > b),
                    _ => Value::Boolean(*a >= b),
                }
            }
            Value::File(a) => match op {
                BinaryOp::Equal => {
                    Value::Boolean(a.metadata().hash == rhs.as_file()?.metadata().hash)
                }
                BinaryOp::NotEqual => {
                    Value::Boolean(a.metadata().hash != rhs.as_file()?.metadata().hash)
                }
                _ => return Err(invalid().into()),
            },
            _ => return Err(invalid().into()),
        };
        Ok(value)
    }

    pub fn index(&self, rhs: &Value) -> Result<Value, ScriptError> {
        match self.snapshot() {
            Value::List(items) => list::index(&items, rhs.as_number()?),
            Value::StringList(list) => list::string_index(&list, rhs.as_number()?),
            other => Err(ValueError::invalid_operation(other.name(), "index").into()),
        }
    }

    /// Member access: `value.member`.
    pub fn dot(&self, member: &str) -> Result<Value, ValueError> {
        match self.snapshot() {
            Value::Number(n) => number::dot(n, member),
            Value::String(s) => string::dot(&s, member),
            Value::List(items) => list::dot("List", &items, member),
            Value::StringList(list) => list.dot(member),
            Value::File(file) => file.dot(member),
            other => Err(ValueError::no_such_member(other.name(), member)),
        }
    }

    /// The member names `dot` accepts, in presentation order.
    pub fn dot_suggest(&self) -> Vec<String> {
        let members: &[&str] = match self.snapshot() {
            Value::Number(_) => number::MEMBERS,
            Value::String(_) => string::MEMBERS,
            Value::List(_) => list::MEMBERS,
            Value::StringList(_) => list::STRING_LIST_MEMBERS,
            Value::File(_) => file::MEMBERS,
            _ => &[],
        };
        members.iter().map(|m| m.to_string()).collect()
    }

    /// Calls the value for real. May suspend for host I/O.
    pub fn call(&self, args: Vec<Value>) -> LocalBoxFuture<'static, Result<Value, ScriptError>> {
        match self.snapshot() {
            Value::Function(f) => f.call(args),
            Value::Constructor(c) => c.call(args),
            other => {
                let err = ValueError::invalid_operation(other.name(), "call");
                async move { Err(err.into()) }.boxed_local()
            }
        }
    }

    /// Calls the value speculatively: synchronous and free of I/O.
    pub fn call_placeholder(&self, args: Vec<Value>) -> Flow<Value> {
        match self.snapshot() {
            Value::Function(f) => f.call_placeholder(args),
            Value::Constructor(c) => c.call_placeholder(args),
            other => Err(ValueError::invalid_operation(other.name(), "call").into()),
        }
    }

    /// Stores into a variable; every other value is read-only.
    pub fn assign(&self, value: Value) -> Result<(), ValueError> {
        match self {
            Value::Variable(var) => {
                var.set(value);
                Ok(())
            }
            other => Err(ValueError::invalid_operation(other.name(), "assign")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::String(s)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Number(n) => write!(f, "Number({})", format_number(*n)),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Null => f.write_str("Null"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::StringList(list) => write!(f, "{}({:?})", list.name(), list.items()),
            Value::File(file) => write!(f, "File({})", file.metadata().hash),
            Value::Function(_) => f.write_str("Function"),
            Value::Constructor(c) => write!(f, "{c:?}"),
            Value::Variable(var) => write!(f, "{var:?}"),
        }
    }
}

/// Structural equality for data; identity for callables and variables.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::StringList(a), Value::StringList(b)) => a == b,
            (Value::File(a), Value::File(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Constructor(a), Value::Constructor(b)) => a.name() == b.name(),
            (Value::Variable(a), Value::Variable(b)) => a.same_slot(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Value {
        Value::StringList(StringList::new(items.iter().map(|s| s.to_string()).collect()))
    }

    #[test]
    fn test_boolean_operators_require_boolean_rhs() {
        let t = Value::Boolean(true);
        assert_eq!(
            t.binary(BinaryOp::LogicalAnd, &Value::Boolean(false)).unwrap(),
            Value::Boolean(false)
        );
        let err = t.binary(BinaryOp::LogicalOr, &Value::Number(1.0)).unwrap_err();
        assert_eq!(err.to_string(), "Expected type Boolean, but found Number.");
        let err = t.binary(BinaryOp::Add, &Value::Boolean(true)).unwrap_err();
        assert_eq!(err.to_string(), "Operation add is invalid for type Boolean");
    }

    #[test]
    fn test_number_operators() {
        let n = Value::Number(7.0);
        assert_eq!(n.binary(BinaryOp::Div, &Value::Number(2.0)).unwrap(), Value::Number(3.5));
        assert_eq!(
            n.binary(BinaryOp::GreaterEqual, &Value::Number(7.0)).unwrap(),
            Value::Boolean(true)
        );
        let err = n.binary(BinaryOp::Add, &Value::from("1")).unwrap_err();
        assert_eq!(err.to_string(), "Expected type Number, but found String.");
        let err = n.binary(BinaryOp::LogicalOr, &Value::Number(1.0)).unwrap_err();
        assert_eq!(err.to_string(), "Operation logicalOr is invalid for type Number");
    }

    #[test]
    fn test_string_operators() {
        let s = Value::from("abc");
        assert_eq!(
            s.binary(BinaryOp::Add, &Value::from("def")).unwrap(),
            Value::from("abcdef")
        );
        assert_eq!(
            s.binary(BinaryOp::Lesser, &Value::from("abd")).unwrap(),
            Value::Boolean(true)
        );
        let err = s.binary(BinaryOp::Sub, &Value::from("a")).unwrap_err();
        assert_eq!(err.to_string(), "Operation sub is invalid for type String");
    }

    #[test]
    fn test_string_unary_operators_go_through_numbers() {
        assert_eq!(Value::from("3").negate().unwrap(), Value::Number(-3.0));
        assert_eq!(Value::from("").not().unwrap(), Value::Boolean(true));
        assert_eq!(Value::from("5").bit_not().unwrap(), Value::Number(-6.0));
        assert!(matches!(Value::from("x").negate().unwrap(), Value::Number(n) if n.is_nan()));
    }

    #[test]
    fn test_number_not_is_true_for_zero_and_nan() {
        assert_eq!(Value::Number(0.0).not().unwrap(), Value::Boolean(true));
        assert_eq!(Value::Number(f64::NAN).not().unwrap(), Value::Boolean(true));
        assert_eq!(Value::Number(2.0).not().unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_null_supports_nothing() {
        let null = Value::Null;
        assert_eq!(
            null.negate().unwrap_err().to_string(),
            "Operation negate is invalid for type Null"
        );
        assert_eq!(
            null.binary(BinaryOp::Equal, &Value::Null).unwrap_err().to_string(),
            "Operation equal is invalid for type Null"
        );
        assert_eq!(
            null.index(&Value::Number(0.0)).unwrap_err().to_string(),
            "Operation index is invalid for type Null"
        );
        assert_eq!(
            null.dot("x").unwrap_err().to_string(),
            "Type Null has no member x"
        );
        assert_eq!(
            null.call_placeholder(vec![]).unwrap_err_message(),
            "Operation call is invalid for type Null"
        );
        assert_eq!(
            null.assign(Value::Number(1.0)).unwrap_err().to_string(),
            "Operation assign is invalid for type Null"
        );
    }

    #[test]
    fn test_function_supports_only_calls() {
        let f = Value::Function(FunctionValue::from_pure_sync(|_| Ok(Value::Null)));
        assert_eq!(
            f.not().unwrap_err().to_string(),
            "Operation not is invalid for type Function"
        );
        assert_eq!(
            f.binary(BinaryOp::Mul, &Value::Number(1.0)).unwrap_err().to_string(),
            "Operation mul is invalid for type Function"
        );
    }

    #[test]
    fn test_coercions() {
        assert_eq!(Value::from("3").coerce_number().unwrap(), 3.0);
        assert!(!Value::Number(0.0).coerce_boolean().unwrap());
        assert!(Value::from("x").coerce_boolean().unwrap());
        assert_eq!(&*Value::Number(1.5).coerce_string().unwrap(), "1.5");
        assert_eq!(&*Value::Boolean(true).coerce_string().unwrap(), "true");
        assert_eq!(
            list(&["a"]).coerce_number().unwrap_err().to_string(),
            "Can not convert from type List to Number."
        );
    }

    #[test]
    fn test_variable_forwards_and_mirrors_name() {
        let var = Value::Variable(Variable::new(Value::Number(2.0)));
        assert_eq!(var.name(), "Number");
        assert_eq!(var.binary(BinaryOp::Mul, &Value::Number(3.0)).unwrap(), Value::Number(6.0));
        var.assign(Value::from("now a string")).unwrap();
        assert_eq!(var.name(), "String");
        assert_eq!(var.dot("length").unwrap(), Value::Number(12.0));
    }

    #[test]
    fn test_rhs_variable_is_looked_through() {
        let rhs = Value::Variable(Variable::new(Value::Number(2.0)));
        assert_eq!(
            Value::Number(1.0).binary(BinaryOp::Add, &rhs).unwrap(),
            Value::Number(3.0)
        );
    }

    #[test]
    fn test_number_string_member() {
        assert_eq!(Value::Number(2.5).dot("string").unwrap(), Value::from("2.5"));
        assert_eq!(Value::Number(1.0).dot_suggest(), vec!["string"]);
    }

    #[test]
    fn test_string_list_suggestions_include_contains() {
        assert_eq!(
            list(&[]).dot_suggest(),
            vec!["length", "some", "every", "contains"]
        );
    }

    #[test]
    fn test_file_equality_compares_hashes() {
        let a = Value::File(FileValue::new(FileMetadata {
            hash: "h".into(),
            file_id: 1,
            ..Default::default()
        }));
        let b = Value::File(FileValue::new(FileMetadata {
            hash: "h".into(),
            file_id: 2,
            ..Default::default()
        }));
        assert_eq!(a.binary(BinaryOp::Equal, &b).unwrap(), Value::Boolean(true));
        let err = a.binary(BinaryOp::Equal, &Value::from("h")).unwrap_err();
        assert_eq!(err.to_string(), "Expected type File, but found String.");
    }

    #[test]
    fn test_raw_rendering() {
        assert_eq!(Value::Number(2.0).raw(), serde_json::json!(2.0));
        assert_eq!(list(&["a", "b"]).raw(), serde_json::json!(["a", "b"]));
        assert_eq!(Value::Number(f64::NAN).raw(), serde_json::Value::Null);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(
            Value::from_json(&serde_json::json!(["x"])),
            list(&["x"])
        );
        let Value::List(items) = Value::from_json(&serde_json::json!([1, "a"])) else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
    }

    trait FlowExt {
        fn unwrap_err_message(self) -> String;
    }

    impl FlowExt for Flow<Value> {
        fn unwrap_err_message(self) -> String {
            match self {
                Err(crate::unwind::Unwind::Error(err)) => err.to_string(),
                other => panic!("expected an error, got {other:?}"),
            }
        }
    }
}
