//! Filter and sort drivers.
//!
//! The host's search page runs one user expression per file: as a filter it
//! must produce a Boolean, as a sort key a Number or a String. The
//! expression is parsed once; each file gets its own resolver with `file`
//! bound to it.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::ast::{Expr, Node};
use crate::error::ScriptError;
use crate::eval::evaluate;
use crate::parser::Parser;
use crate::resolver::{Resolver, StandardResolver};
use crate::value::{FileLookup, FileMetadata, FileValue, Value};

/// The name a filter or sort expression uses for the current file.
pub const FILE_BINDING: &str = "file";

fn file_resolver(file: FileValue, lookup: Option<&Rc<dyn FileLookup>>) -> Rc<dyn Resolver> {
    let mut globals = BTreeMap::new();
    globals.insert(FILE_BINDING.to_string(), Value::File(file));
    let resolver = StandardResolver::new(globals);
    match lookup {
        Some(lookup) => Rc::new(resolver.with_file_lookup(Rc::clone(lookup))),
        None => Rc::new(resolver),
    }
}

/// The resolver completion runs against: `file` is a representative
/// placeholder record and `File(...)` never reaches the host.
pub fn placeholder_resolver() -> Rc<dyn Resolver> {
    file_resolver(FileValue::placeholder(), None)
}

async fn evaluate_for(
    expr: &Expr,
    file: &FileMetadata,
    lookup: Option<&Rc<dyn FileLookup>>,
) -> Result<Value, ScriptError> {
    let resolver = file_resolver(FileValue::new(file.clone()), lookup);
    evaluate(resolver, Node::Expr(expr)).await
}

/// Keeps the files for which `source` evaluates to `true`.
///
/// Files keep their order. Any error, including a non-Boolean result,
/// aborts the whole filter.
pub async fn filter_files(
    source: &str,
    files: &[FileMetadata],
    lookup: Option<Rc<dyn FileLookup>>,
) -> Result<Vec<FileMetadata>, ScriptError> {
    let expr = Parser::new(source, false)?.parse_expression()?;
    let mut kept = Vec::new();
    for file in files {
        if evaluate_for(&expr, file, lookup.as_ref()).await?.as_boolean()? {
            kept.push(file.clone());
        }
    }
    log::debug!("filter kept {} of {} files", kept.len(), files.len());
    Ok(kept)
}

#[derive(Debug, Clone)]
enum SortKey {
    Number(f64),
    String(Rc<str>),
}

impl SortKey {
    fn from_value(value: Value) -> Result<Self, ScriptError> {
        match value.snapshot() {
            Value::Number(n) => Ok(SortKey::Number(n)),
            Value::String(s) => Ok(SortKey::String(s)),
            other => Err(ScriptError::SortKey(other.name())),
        }
    }

    /// Numbers order before strings; NaN ties with every number.
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::String(a), SortKey::String(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::String(_)) => Ordering::Less,
            (SortKey::String(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// Orders files ascending by the key `source` computes for each.
///
/// The sort is stable, so files with equal keys keep their order.
pub async fn sort_files(
    source: &str,
    files: &[FileMetadata],
    lookup: Option<Rc<dyn FileLookup>>,
) -> Result<Vec<FileMetadata>, ScriptError> {
    let expr = Parser::new(source, false)?.parse_expression()?;
    let mut keyed = Vec::with_capacity(files.len());
    for file in files {
        let key = SortKey::from_value(evaluate_for(&expr, file, lookup.as_ref()).await?)?;
        keyed.push((key, file));
    }
    keyed.sort_by(|(a, _), (b, _)| a.compare(b));
    Ok(keyed.into_iter().map(|(_, file)| file.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::get_suggestions;
    use crate::value::MemoryFileStore;

    fn file(id: u64, hash: &str, size: u64) -> FileMetadata {
        FileMetadata {
            file_id: id,
            hash: hash.into(),
            size: Some(size),
            ..Default::default()
        }
    }

    fn ids(files: &[FileMetadata]) -> Vec<u64> {
        files.iter().map(|f| f.file_id).collect()
    }

    #[tokio::test]
    async fn test_filter_keeps_matching_files_in_order() {
        let files = vec![file(1, "a", 10), file(2, "b", 500), file(3, "c", 200)];
        let kept = filter_files("file.size > 100", &files, None).await.unwrap();
        assert_eq!(ids(&kept), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_filter_requires_boolean() {
        let files = vec![file(1, "a", 10)];
        let err = filter_files("file.size", &files, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Expected type Boolean, but found Number.");
    }

    #[tokio::test]
    async fn test_filter_rejects_partial_input() {
        let err = filter_files("file.size >", &[], None).await.unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[tokio::test]
    async fn test_filter_can_look_up_other_files() {
        let files = vec![file(1, "a", 10), file(2, "b", 20)];
        let lookup: Rc<dyn FileLookup> = Rc::new(MemoryFileStore::new(files.clone()));
        let kept = filter_files("file == File(2)", &files, Some(lookup))
            .await
            .unwrap();
        assert_eq!(ids(&kept), vec![2]);
    }

    #[tokio::test]
    async fn test_sort_by_number_is_stable() {
        let files = vec![file(1, "a", 30), file(2, "b", 10), file(3, "c", 30)];
        let sorted = sort_files("file.size", &files, None).await.unwrap();
        assert_eq!(ids(&sorted), vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_sort_by_string() {
        let files = vec![file(1, "zz", 0), file(2, "aa", 0)];
        let sorted = sort_files("file.hash", &files, None).await.unwrap();
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_sort_key_must_be_orderable() {
        let files = vec![file(1, "a", 0)];
        let err = sort_files("file.size > 1", &files, None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected comparator to return number or string (got Boolean)"
        );
    }

    #[test]
    fn test_mixed_keys_put_numbers_first() {
        let n = SortKey::Number(5.0);
        let s = SortKey::String(Rc::from("a"));
        assert_eq!(n.compare(&s), Ordering::Less);
        assert_eq!(SortKey::Number(f64::NAN).compare(&n), Ordering::Equal);
    }

    #[test]
    fn test_placeholder_resolver_completes_file_members() {
        let expr = Parser::new("file.wi", true).unwrap().parse_expression().unwrap();
        let found = get_suggestions(placeholder_resolver(), Node::Expr(&expr), 7)
            .unwrap()
            .unwrap();
        assert_eq!(found.identifiers, vec!["width"]);
    }
}
