//! The `File` domain type and the host lookup behind `File(...)`.
//!
//! File records are Hydrus file metadata as returned by the client API.
//! Scripts read them through a fixed set of attributes; they are never
//! modified.

use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::ScriptError;

use super::{StringList, Value, ValueError};

/// Display tags are keyed by content status; "0" is "current".
const CURRENT_TAGS: &str = "0";

/// Hydrus file metadata.
///
/// Only the fields scripts can observe are modelled; unknown fields are
/// ignored on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMetadata {
    pub file_id: u64,
    pub hash: String,
    pub size: Option<u64>,
    pub mime: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    /// Milliseconds.
    pub duration: Option<f64>,
    pub known_urls: Vec<String>,
    /// Tags per tag service key, in document order.
    #[serde(with = "ordered_map")]
    pub tags: Vec<(String, ServiceTags)>,
    /// Ratings per rating service key, in document order: a number, a
    /// like/dislike boolean, or null when unset.
    #[serde(with = "ordered_map")]
    pub ratings: Vec<(String, serde_json::Value)>,
}

/// (De)serializes a JSON object as its entries in document order.
mod ordered_map {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{Serialize, SerializeMap, Serializer};

    pub fn serialize<S, T>(entries: &[(String, T)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        struct Entries<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for Entries<T> {
            type Value = Vec<(String, T)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(Entries(PhantomData))
    }
}

/// The tags a single service holds for a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTags {
    pub storage_tags: BTreeMap<String, Vec<String>>,
    pub display_tags: BTreeMap<String, Vec<String>>,
}

/// A file record as a script value.
#[derive(Debug, Clone, PartialEq)]
pub struct FileValue(Rc<FileMetadata>);

impl FileValue {
    pub fn new(metadata: FileMetadata) -> Self {
        Self(Rc::new(metadata))
    }

    /// A representative record with every attribute populated, used when
    /// inferring completions without touching real files.
    pub fn placeholder() -> Self {
        let tags = ServiceTags {
            storage_tags: BTreeMap::from([(CURRENT_TAGS.to_string(), vec![String::new()])]),
            display_tags: BTreeMap::from([(CURRENT_TAGS.to_string(), vec![String::new()])]),
        };
        Self::new(FileMetadata {
            file_id: 0,
            hash: String::new(),
            size: Some(0),
            mime: Some(String::new()),
            width: Some(0),
            height: Some(0),
            duration: Some(0.0),
            known_urls: vec![String::new()],
            tags: vec![(String::new(), tags)],
            ratings: vec![(String::new(), serde_json::Value::from(1))],
        })
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.0
    }

    /// Current display tags across all services, without duplicates.
    pub fn tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.0
            .tags
            .iter()
            .filter_map(|(_, service)| service.display_tags.get(CURRENT_TAGS))
            .flatten()
            .filter(|tag| seen.insert(tag.as_str()))
            .cloned()
            .collect()
    }

    pub(super) fn dot(&self, member: &str) -> Result<Value, ValueError> {
        let file = &self.0;
        let value = match member {
            "id" => Value::Number(file.file_id as f64),
            "hash" => Value::from(file.hash.as_str()),
            "size" => Value::Number(file.size.unwrap_or(0) as f64),
            "width" => Value::Number(file.width.unwrap_or(0) as f64),
            "height" => Value::Number(file.height.unwrap_or(0) as f64),
            "duration" => Value::Number(file.duration.unwrap_or(0.0) / 1000.0),
            "urls" => Value::StringList(StringList::new(file.known_urls.clone())),
            "tags" => Value::StringList(StringList::named("TagsList", self.tags())),
            "numericRating" => file
                .ratings
                .iter()
                .find_map(|(_, rating)| rating.as_f64())
                .map(Value::Number)
                .unwrap_or(Value::Null),
            "hasLike" => Value::Boolean(self.has_rating(true)),
            "hasDislike" => Value::Boolean(self.has_rating(false)),
            _ => return Err(ValueError::no_such_member("File", member)),
        };
        Ok(value)
    }

    fn has_rating(&self, liked: bool) -> bool {
        self.0
            .ratings
            .iter()
            .any(|(_, rating)| rating.as_bool() == Some(liked))
    }
}

pub(super) const MEMBERS: &[&str] = &[
    "id",
    "hash",
    "size",
    "width",
    "height",
    "duration",
    "urls",
    "tags",
    "numericRating",
    "hasLike",
    "hasDislike",
];

/// Host-side file access for `File(id)` and `File(hash)`.
///
/// Lookups return `Ok(None)` when no such file exists.
pub trait FileLookup {
    fn file_by_id(&self, id: u64) -> LocalBoxFuture<'_, Result<Option<FileMetadata>, ScriptError>>;

    fn file_by_hash<'a>(
        &'a self,
        hash: &'a str,
    ) -> LocalBoxFuture<'a, Result<Option<FileMetadata>, ScriptError>>;
}

/// An in-memory [`FileLookup`], loaded from a JSON array of metadata.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: Vec<FileMetadata>,
}

impl MemoryFileStore {
    pub fn new(files: Vec<FileMetadata>) -> Self {
        Self { files }
    }

    /// Parses either a bare array or a `{"metadata": [...]}` API response.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            Bare(Vec<FileMetadata>),
            Response { metadata: Vec<FileMetadata> },
        }
        let files = match serde_json::from_str(json)? {
            Document::Bare(files) | Document::Response { metadata: files } => files,
        };
        Ok(Self::new(files))
    }

    pub fn files(&self) -> &[FileMetadata] {
        &self.files
    }
}

impl FileLookup for MemoryFileStore {
    fn file_by_id(&self, id: u64) -> LocalBoxFuture<'_, Result<Option<FileMetadata>, ScriptError>> {
        let found = self.files.iter().find(|f| f.file_id == id).cloned();
        async move { Ok(found) }.boxed_local()
    }

    fn file_by_hash<'a>(
        &'a self,
        hash: &'a str,
    ) -> LocalBoxFuture<'a, Result<Option<FileMetadata>, ScriptError>> {
        let found = self.files.iter().find(|f| f.hash == hash).cloned();
        async move { Ok(found) }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "metadata": [{
            "file_id": 7,
            "hash": "abc123",
            "size": 2048,
            "mime": "image/png",
            "width": 640,
            "height": null,
            "duration": 2500,
            "known_urls": ["https://example.com/a"],
            "tags": {
                "s1": { "display_tags": { "0": ["blue", "sky"], "1": ["pending"] } },
                "s2": { "display_tags": { "0": ["sky", "cloud"] } }
            },
            "ratings": { "r1": null, "r2": true, "r3": 3 },
            "is_inbox": true
        }]
    }"#;

    fn sample() -> FileValue {
        let store = MemoryFileStore::from_json(SAMPLE).unwrap();
        FileValue::new(store.files()[0].clone())
    }

    #[test]
    fn test_scalar_attributes() {
        let file = sample();
        assert_eq!(file.dot("id").unwrap(), Value::Number(7.0));
        assert_eq!(file.dot("hash").unwrap(), Value::from("abc123"));
        assert_eq!(file.dot("height").unwrap(), Value::Number(0.0));
        assert_eq!(file.dot("duration").unwrap(), Value::Number(2.5));
    }

    #[test]
    fn test_tags_are_current_and_unique() {
        assert_eq!(sample().tags(), vec!["blue", "sky", "cloud"]);
        let tags = sample().dot("tags").unwrap();
        assert_eq!(tags.name(), "TagsList");
    }

    #[test]
    fn test_ratings() {
        let file = sample();
        assert_eq!(file.dot("numericRating").unwrap(), Value::Number(3.0));
        assert_eq!(file.dot("hasLike").unwrap(), Value::Boolean(true));
        assert_eq!(file.dot("hasDislike").unwrap(), Value::Boolean(false));

        let unrated = FileValue::new(FileMetadata::default());
        assert_eq!(unrated.dot("numericRating").unwrap(), Value::Null);
    }

    #[test]
    fn test_services_keep_document_order() {
        let json = r#"[{
            "file_id": 1,
            "hash": "h",
            "tags": {
                "zz": { "display_tags": { "0": ["last-service"] } },
                "aa": { "display_tags": { "0": ["first-key"] } }
            },
            "ratings": { "zz": 5, "aa": 1 }
        }]"#;
        let store = MemoryFileStore::from_json(json).unwrap();
        let file = FileValue::new(store.files()[0].clone());
        assert_eq!(file.tags(), vec!["last-service", "first-key"]);
        assert_eq!(file.dot("numericRating").unwrap(), Value::Number(5.0));

        let written = serde_json::to_string(file.metadata()).unwrap();
        assert!(written.find("\"zz\"") < written.find("\"aa\""));
    }

    #[test]
    fn test_unknown_attribute() {
        let err = sample().dot("colour").unwrap_err();
        assert_eq!(err.to_string(), "Type File has no member colour");
    }

    #[test]
    fn test_placeholder_populates_every_attribute() {
        let file = FileValue::placeholder();
        for member in MEMBERS {
            assert!(file.dot(member).is_ok(), "{member}");
        }
        assert_eq!(file.tags(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_memory_store_lookup() {
        let store = MemoryFileStore::from_json(SAMPLE).unwrap();
        assert!(store.file_by_id(7).await.unwrap().is_some());
        assert!(store.file_by_id(8).await.unwrap().is_none());
        assert!(store.file_by_hash("abc123").await.unwrap().is_some());
    }

    #[test]
    fn test_bare_array_document() {
        let store = MemoryFileStore::from_json(r#"[{"file_id": 1, "hash": "h"}]"#).unwrap();
        assert_eq!(store.files().len(), 1);
    }
}
