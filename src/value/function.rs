//! Callable values: functions and type constructors.

use std::fmt;
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;

use crate::error::ScriptError;
use crate::unwind::{Flow, Unwind};

use super::Value;
use super::file::{FileLookup, FileValue};

type RealFn = dyn Fn(Vec<Value>) -> LocalBoxFuture<'static, Result<Value, ScriptError>>;
type PlaceholderFn = dyn Fn(Vec<Value>) -> Flow<Value>;

/// A function with two implementations.
///
/// `call` is the real, possibly asynchronous one. `call_placeholder` is the
/// synchronous one used during inference; it must not perform I/O. The two
/// agree for pure functions.
#[derive(Clone)]
pub struct FunctionValue {
    real: Rc<RealFn>,
    placeholder: Rc<PlaceholderFn>,
}

impl FunctionValue {
    pub fn new<R, P>(real: R, placeholder: P) -> Self
    where
        R: Fn(Vec<Value>) -> LocalBoxFuture<'static, Result<Value, ScriptError>> + 'static,
        P: Fn(Vec<Value>) -> Flow<Value> + 'static,
    {
        Self {
            real: Rc::new(real),
            placeholder: Rc::new(placeholder),
        }
    }

    /// Builds both paths from one synchronous, side-effect free function.
    pub fn from_pure_sync<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, ScriptError> + 'static,
    {
        let f = Rc::new(f);
        let g = Rc::clone(&f);
        Self::new(
            move |args| {
                let result = f(args);
                async move { result }.boxed_local()
            },
            move |args| g(args).map_err(Unwind::from),
        )
    }

    pub fn call(&self, args: Vec<Value>) -> LocalBoxFuture<'static, Result<Value, ScriptError>> {
        (self.real)(args)
    }

    pub fn call_placeholder(&self, args: Vec<Value>) -> Flow<Value> {
        (self.placeholder)(args)
    }

    pub fn ptr_eq(&self, other: &FunctionValue) -> bool {
        Rc::ptr_eq(&self.real, &other.real)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FunctionValue")
    }
}

/// The built-in type constructors.
#[derive(Clone)]
pub enum Constructor {
    Boolean,
    Number,
    String,
    /// `File(id)` / `File(hash)`, backed by the host lookup if there is one.
    File(Option<Rc<dyn FileLookup>>),
}

impl Constructor {
    pub fn name(&self) -> &'static str {
        match self {
            Constructor::Boolean => "Boolean",
            Constructor::Number => "Number",
            Constructor::String => "String",
            Constructor::File(_) => "File",
        }
    }

    /// Converts the first argument with the matching `into` rule.
    fn convert(&self, args: &[Value]) -> Result<Value, ScriptError> {
        let arg = args
            .first()
            .ok_or(ScriptError::MissingConstructorArgument(self.name()))?;
        let value = match self {
            Constructor::Boolean => Value::Boolean(arg.coerce_boolean()?),
            Constructor::Number => Value::Number(arg.coerce_number()?),
            Constructor::String => Value::from(arg.coerce_string()?),
            Constructor::File(_) => return Err(ScriptError::FileArgument(arg.name())),
        };
        Ok(value)
    }

    pub fn call(&self, args: Vec<Value>) -> LocalBoxFuture<'static, Result<Value, ScriptError>> {
        let Constructor::File(lookup) = self else {
            let result = self.convert(&args);
            return async move { result }.boxed_local();
        };
        let lookup = lookup.clone();
        async move {
            let arg = args
                .first()
                .map(Value::snapshot)
                .ok_or(ScriptError::MissingConstructorArgument("File"))?;
            let lookup = lookup.ok_or(ScriptError::NoFileLookup)?;
            let metadata = match &arg {
                Value::Number(id) => {
                    let found = match file_id(*id) {
                        Some(id) => lookup.file_by_id(id).await?,
                        None => None,
                    };
                    found.ok_or(ScriptError::FileIdNotFound(*id))?
                }
                Value::String(hash) => lookup
                    .file_by_hash(hash)
                    .await?
                    .ok_or_else(|| ScriptError::FileHashNotFound(hash.to_string()))?,
                other => return Err(ScriptError::FileArgument(other.name())),
            };
            log::debug!("File() resolved {}", metadata.hash);
            Ok::<_, ScriptError>(Value::File(FileValue::new(metadata)))
        }
        .boxed_local()
    }

    /// The inference path: validates like `call` but never touches the host.
    pub fn call_placeholder(&self, args: Vec<Value>) -> Flow<Value> {
        if !matches!(self, Constructor::File(_)) {
            return Ok(self.convert(&args)?);
        }
        match args.first().map(Value::snapshot) {
            None => Err(ScriptError::MissingConstructorArgument("File").into()),
            Some(Value::Number(_) | Value::String(_)) => Ok(Value::File(FileValue::placeholder())),
            Some(other) => Err(ScriptError::FileArgument(other.name()).into()),
        }
    }
}

/// File ids are non-negative integers; anything else cannot match.
fn file_id(n: f64) -> Option<u64> {
    (n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64).then_some(n as u64)
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pure_function_paths_agree() {
        let double = FunctionValue::from_pure_sync(|args| {
            let n = args.first().ok_or(ScriptError::MissingArgument(0))?;
            Ok(Value::Number(n.as_number()? * 2.0))
        });
        let real = double.call(vec![Value::Number(4.0)]).await.unwrap();
        let placeholder = double.call_placeholder(vec![Value::Number(4.0)]).unwrap();
        assert_eq!(real, Value::Number(8.0));
        assert_eq!(placeholder, Value::Number(8.0));
    }

    #[tokio::test]
    async fn test_constructors_convert() {
        let n = Constructor::Number
            .call(vec![Value::from("3")])
            .await
            .unwrap();
        assert_eq!(n, Value::Number(3.0));
        let b = Constructor::Boolean
            .call_placeholder(vec![Value::Number(0.0)])
            .unwrap();
        assert_eq!(b, Value::Boolean(false));
    }

    #[tokio::test]
    async fn test_constructor_missing_argument() {
        let err = Constructor::String.call(vec![]).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing argument in String() call");
    }

    #[test]
    fn test_file_placeholder_validates_argument() {
        let file = Constructor::File(None)
            .call_placeholder(vec![Value::Number(1.0)])
            .unwrap();
        assert_eq!(file.name(), "File");

        let Err(Unwind::Error(err)) =
            Constructor::File(None).call_placeholder(vec![Value::Boolean(true)])
        else {
            panic!("expected an error");
        };
        assert_eq!(err, ScriptError::FileArgument("Boolean"));
    }

    #[test]
    fn test_file_id_must_be_whole() {
        assert_eq!(file_id(3.0), Some(3));
        assert_eq!(file_id(3.5), None);
        assert_eq!(file_id(-1.0), None);
    }
}
