//! Lists: the generic list and the named string list.
//!
//! Both share indexing and the `length`/`some`/`every` members. String
//! lists add `contains` and carry a type name, so a file's tags report
//! themselves as `TagsList`.

use std::rc::Rc;

use futures_util::FutureExt;

use crate::error::ScriptError;
use crate::unwind::Flow;

use super::{FunctionValue, Value, ValueError};

/// A list of strings with its own type name.
#[derive(Debug, Clone, PartialEq)]
pub struct StringList {
    name: &'static str,
    items: Rc<Vec<String>>,
}

impl StringList {
    pub fn new(items: Vec<String>) -> Self {
        Self::named("List", items)
    }

    pub fn named(name: &'static str, items: Vec<String>) -> Self {
        Self {
            name,
            items: Rc::new(items),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    fn values(&self) -> Rc<Vec<Value>> {
        Rc::new(self.items.iter().map(|s| Value::from(s.as_str())).collect())
    }

    pub(super) fn dot(&self, member: &str) -> Result<Value, ValueError> {
        if member != "contains" {
            return dot(self.name, &self.values(), member);
        }
        let items = Rc::clone(&self.items);
        Ok(Value::Function(FunctionValue::from_pure_sync(move |args| {
            let needle = required(&args, 0)?.as_string()?;
            Ok(Value::Boolean(items.iter().any(|item| **item == *needle)))
        })))
    }
}

pub(super) const MEMBERS: &[&str] = &["length", "some", "every"];
pub(super) const STRING_LIST_MEMBERS: &[&str] = &["length", "some", "every", "contains"];

/// Returns argument `n`, or fails naming its position.
pub(super) fn required(args: &[Value], n: usize) -> Result<&Value, ScriptError> {
    args.get(n).ok_or(ScriptError::MissingArgument(n))
}

/// Looks up an element; negative indices count from the end.
pub(super) fn index(items: &[Value], index: f64) -> Result<Value, ScriptError> {
    let index = if index < 0.0 {
        index + items.len() as f64
    } else {
        index
    };
    if index >= 0.0
        && index.fract() == 0.0
        && let Some(item) = items.get(index as usize)
    {
        return Ok(item.clone());
    }
    Err(ScriptError::IndexNotFound(index))
}

pub(super) fn string_index(list: &StringList, i: f64) -> Result<Value, ScriptError> {
    index(&list.values(), i)
}

/// Members shared by every list.
pub(super) fn dot(
    type_name: &'static str,
    items: &Rc<Vec<Value>>,
    member: &str,
) -> Result<Value, ValueError> {
    match member {
        "length" => Ok(Value::Number(items.len() as f64)),
        "some" => Ok(Value::Function(quantifier(Rc::clone(items), Quantifier::Some))),
        "every" => Ok(Value::Function(quantifier(Rc::clone(items), Quantifier::Every))),
        _ => Err(ValueError::no_such_member(type_name, member)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    Some,
    Every,
}

impl Quantifier {
    fn name(self) -> &'static str {
        match self {
            Quantifier::Some => "some",
            Quantifier::Every => "every",
        }
    }

    /// The answer when an element's predicate result equals this.
    fn decisive(self) -> bool {
        matches!(self, Quantifier::Some)
    }
}

/// Builds `list.some` / `list.every`.
///
/// Both paths stop at the first decisive element and reject predicates
/// that return anything but a Boolean.
fn quantifier(items: Rc<Vec<Value>>, kind: Quantifier) -> FunctionValue {
    let placeholder_items = Rc::clone(&items);
    FunctionValue::new(
        move |args| {
            let items = Rc::clone(&items);
            async move {
                let predicate = expect_predicate(&args, kind)?;
                for item in items.iter() {
                    let result = predicate.call(vec![item.clone()]).await?;
                    if predicate_result(&result)? == kind.decisive() {
                        return Ok(Value::Boolean(kind.decisive()));
                    }
                }
                Ok::<_, ScriptError>(Value::Boolean(!kind.decisive()))
            }
            .boxed_local()
        },
        move |args| -> Flow<Value> {
            let predicate = expect_predicate(&args, kind)?;
            for item in placeholder_items.iter() {
                let result = predicate.call_placeholder(vec![item.clone()])?;
                if predicate_result(&result)? == kind.decisive() {
                    return Ok(Value::Boolean(kind.decisive()));
                }
            }
            Ok(Value::Boolean(!kind.decisive()))
        },
    )
}

fn expect_predicate(args: &[Value], kind: Quantifier) -> Result<FunctionValue, ScriptError> {
    let arg = args
        .first()
        .ok_or(ScriptError::MissingPredicate(kind.name()))?;
    Ok(arg.as_function()?)
}

fn predicate_result(value: &Value) -> Result<bool, ScriptError> {
    match value.snapshot() {
        Value::Boolean(b) => Ok(b),
        other => Err(ScriptError::PredicateResult(other.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unwind::Unwind;

    fn numbers(ns: &[f64]) -> Rc<Vec<Value>> {
        Rc::new(ns.iter().map(|n| Value::Number(*n)).collect())
    }

    fn greater_than(limit: f64) -> Value {
        Value::Function(FunctionValue::from_pure_sync(move |args| {
            Ok(Value::Boolean(required(&args, 0)?.as_number()? > limit))
        }))
    }

    #[test]
    fn test_negative_index_counts_from_end() {
        let items = numbers(&[1.0, 2.0, 3.0]);
        assert_eq!(index(&items, -1.0).unwrap(), Value::Number(3.0));
        assert_eq!(index(&items, 0.0).unwrap(), Value::Number(1.0));
        assert_eq!(
            index(&items, 3.0).unwrap_err().to_string(),
            "Index 3 not found in List"
        );
        assert!(index(&items, 0.5).is_err());
    }

    #[tokio::test]
    async fn test_some_and_every_real_path() {
        let items = numbers(&[1.0, 5.0]);
        let some = dot("List", &items, "some").unwrap();
        let every = dot("List", &items, "every").unwrap();
        assert_eq!(
            some.call(vec![greater_than(4.0)]).await.unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            every.call(vec![greater_than(4.0)]).await.unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_some_and_every_placeholder_path() {
        let items = numbers(&[1.0, 5.0]);
        let some = dot("List", &items, "some").unwrap();
        let every = dot("List", &items, "every").unwrap();
        assert_eq!(
            some.call_placeholder(vec![greater_than(9.0)]).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            every.call_placeholder(vec![greater_than(0.0)]).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_empty_list_quantifiers() {
        let items = numbers(&[]);
        let some = dot("List", &items, "some").unwrap();
        let every = dot("List", &items, "every").unwrap();
        assert_eq!(
            some.call_placeholder(vec![greater_than(0.0)]).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            every.call_placeholder(vec![greater_than(0.0)]).unwrap(),
            Value::Boolean(true)
        );
    }

    #[tokio::test]
    async fn test_predicate_must_return_boolean() {
        let items = numbers(&[1.0]);
        let some = dot("List", &items, "some").unwrap();
        let identity = Value::Function(FunctionValue::from_pure_sync(|args| {
            Ok(required(&args, 0)?.clone())
        }));
        let err = some.call(vec![identity]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected boolean value from predicate, got Number"
        );
    }

    #[test]
    fn test_missing_predicate() {
        let every = dot("List", &numbers(&[1.0]), "every").unwrap();
        let Err(Unwind::Error(err)) = every.call_placeholder(vec![]) else {
            panic!("expected an error");
        };
        assert_eq!(err.to_string(), "List.every requires an argument");
    }

    #[test]
    fn test_string_list_contains() {
        let tags = StringList::named("TagsList", vec!["blue".into(), "sky".into()]);
        let contains = tags.dot("contains").unwrap();
        assert_eq!(
            contains.call_placeholder(vec![Value::from("sky")]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            string_index(&tags, -2.0).unwrap(),
            Value::from("blue")
        );
    }
}
