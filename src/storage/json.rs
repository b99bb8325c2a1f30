//! JSON persistence for the checklist document.
//!
//! The on-disk format is the indented JSON rendering of
//! [`ChecklistDocument`]. Two legacy shapes are accepted on load and never
//! written back:
//!
//! - `Full`/`Diff` sub-buckets under an OS (pre-flattening): their item
//!   lists and automation maps are merged into the flat bucket, `Full`
//!   first.
//! - Bare `Windows`/`Linux` keys at the top level (pre-product documents):
//!   merged into the default product's buckets.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::{Bucket, ChecklistDocument, Os};

/// The checklist document store: a single JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    path: PathBuf,
}

/// How a loaded document came into memory.
#[derive(Debug)]
pub enum LoadSource {
    /// Parsed from the storage file.
    File,
    /// The storage file does not exist yet; the skeleton was returned.
    Missing,
    /// The storage file exists but is not valid JSON; the skeleton was
    /// returned and the parse error is carried for the caller to surface.
    Recovered(serde_json::Error),
}

/// The result of a load: always a usable document, plus its provenance.
#[derive(Debug)]
pub struct LoadOutcome {
    /// The loaded (or skeleton) document, migrated and repaired.
    pub document: ChecklistDocument,
    /// Where the document came from.
    pub source: LoadSource,
}

impl Store {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path of the storage file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document from storage.
    ///
    /// A missing file yields the empty skeleton (the default product with
    /// both OS buckets present and empty). Unparseable content also yields
    /// the skeleton, with the parse error reported through
    /// [`LoadSource::Recovered`] rather than as a failure. Legacy shapes are
    /// migrated and the document is repaired before it is returned.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures other than "file not found".
    pub fn load(&self, default_product: &str) -> io::Result<LoadOutcome> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no storage file at {}", self.path.display());
                return Ok(LoadOutcome {
                    document: ChecklistDocument::skeleton(default_product),
                    source: LoadSource::Missing,
                });
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<RawDocument>(&raw) {
            Ok(raw_document) => {
                let mut document = raw_document.migrate(default_product);
                document.repair(default_product);
                Ok(LoadOutcome {
                    document,
                    source: LoadSource::File,
                })
            }
            Err(e) => {
                tracing::debug!("failed to parse {}: {e}", self.path.display());
                Ok(LoadOutcome {
                    document: ChecklistDocument::skeleton(default_product),
                    source: LoadSource::Recovered(e),
                })
            }
        }
    }

    /// Writes the document as indented JSON, replacing the storage file in a
    /// single rename.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written. A write failure is
    /// fatal to the mutating action that triggered it.
    pub fn save(&self, document: &ChecklistDocument) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut serializer).map_err(io::Error::other)?;
        buf.push(b'\n');

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        fs::write(&tmp, &buf)?;
        fs::rename(&tmp, &self.path)
    }
}

/// The tolerant on-disk shape: product keys and legacy bare-OS keys mixed at
/// the top level.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct RawDocument(BTreeMap<String, serde_json::Value>);

/// An OS-level node, either flat or carrying legacy `Full`/`Diff`
/// sub-buckets (or, historically, both).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBucket {
    items: Vec<String>,
    automated: BTreeMap<String, bool>,
    task_ids: BTreeMap<String, String>,
    descriptions: BTreeMap<String, String>,
    #[serde(rename = "Full")]
    full: Option<RawSubBucket>,
    #[serde(rename = "Diff")]
    diff: Option<RawSubBucket>,
}

/// A legacy `Full`/`Diff` sub-bucket. These predate task IDs and
/// descriptions, so only items and automation flags exist.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSubBucket {
    items: Vec<String>,
    automated: BTreeMap<String, bool>,
}

impl RawDocument {
    /// Converts the raw shape into the typed document, folding legacy
    /// bare-OS entries into `default_product`.
    fn migrate(self, default_product: &str) -> ChecklistDocument {
        let mut document = ChecklistDocument::default();

        for (key, value) in self.0 {
            if let Ok(os) = key.parse::<Os>() {
                let bucket = bucket_from_value(&key, value);
                tracing::debug!("migrating top-level '{key}' bucket into '{default_product}'");
                merge_bucket(document.ensure_product(default_product).bucket_mut(os), bucket);
                continue;
            }

            let product = document.ensure_product(&key);
            let Some(os_nodes) = value.as_object() else {
                tracing::debug!("ignoring non-object product entry '{key}'");
                continue;
            };
            for (os_name, node) in os_nodes {
                let Ok(os) = os_name.parse::<Os>() else {
                    tracing::debug!("ignoring unknown OS '{os_name}' under product '{key}'");
                    continue;
                };
                let bucket = bucket_from_value(os_name, node.clone());
                merge_bucket(product.bucket_mut(os), bucket);
            }
        }

        document
    }
}

impl RawBucket {
    /// Flattens the node, concatenating legacy sub-buckets after any flat
    /// items, in `Full` then `Diff` order.
    fn flatten(self) -> Bucket {
        let mut bucket = Bucket {
            items: self.items,
            automated: self.automated,
            task_ids: self.task_ids,
            descriptions: self.descriptions,
        };

        for sub in [self.full, self.diff].into_iter().flatten() {
            bucket.items.extend(sub.items);
            bucket.automated.extend(sub.automated);
        }

        bucket
    }
}

fn bucket_from_value(key: &str, value: serde_json::Value) -> Bucket {
    match serde_json::from_value::<RawBucket>(value) {
        Ok(raw) => raw.flatten(),
        Err(e) => {
            tracing::debug!("ignoring malformed bucket under '{key}': {e}");
            Bucket::default()
        }
    }
}

fn merge_bucket(target: &mut Bucket, source: Bucket) {
    target.items.extend(source.items);
    target.automated.extend(source.automated);
    target.task_ids.extend(source.task_ids);
    target.descriptions.extend(source.descriptions);
}
