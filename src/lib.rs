//! A library for parsing Web of Science BibTeX exports into flat
//! bibliographic records.
//!
//! `wosbib` targets the specific BibTeX dialect exported by Web of
//! Science / Web of Knowledge. The dialect is only quasi-standard:
//! values are double-wrapped in braces, square brackets are protected
//! as `{[}`/`{]}`, free-text fields such as abstracts contain unescaped
//! braces and newlines, and every record opens with an `ISI:`/`WOS:`
//! database identifier. The parser tolerates these irregularities and
//! recovers, per record, a clean mapping of lower-cased field names to
//! values plus a canonicalized author list.
//!
//! # Key Features
//!
//! - **Record extraction**: splits an export into individual entry
//!   blocks, skipping any preamble and treating zero records as a
//!   valid outcome.
//! - **Field normalization**: a small line-oriented lexer instead of
//!   fragile textual substitution; brace unwrapping, bracket-escape
//!   decoding, and multi-line value joining.
//! - **Failure isolation**: a malformed record never aborts the batch;
//!   it is replaced by a clearly marked placeholder and reported via
//!   [`tracing`].
//! - **Semantic cleanup**: title casing, whitespace repair, open-access
//!   status classification, and `"Surname, Initials"` author rewriting.
//!
//! # Basic Usage
//!
//! ```rust
//! use wosbib::WosParser;
//!
//! let input = r#"@article{ ISI:000300000000001,
//! Author = {Smith, John and Doe, Jane Ann},
//! Title = {{An example of parsing}},
//! Year = {{2020}},
//! }"#;
//!
//! let records = WosParser::new().parse(input);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].get_tag("title"), "An Example Of Parsing");
//! assert_eq!(records[0].get_tag("author"), "Smith, J, and Doe, JA");
//! assert_eq!(records[0].get_tag("ref_id"), "1");
//! ```
//!
//! # Error Handling
//!
//! Two tiers. Per record: a structural parse failure substitutes a
//! placeholder record (see [`BibRecord::is_parse_failure`]) and emits a
//! `warn!` event, so one bad record costs at most its own slot. Per
//! file: [`WosParser::parse_path`] propagates I/O failure as
//! [`BibError::Io`], while [`Bibliography::load`] absorbs it into an
//! empty collection plus an `error!` event naming the source.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{error, warn};

mod utils;
pub mod wos;

// Reexports
pub use wos::WosParser;

/// A specialized Result type for bibliography operations.
pub type Result<T> = std::result::Result<T, BibError>;

/// Author value stored in placeholder records, so downstream consumers
/// (and readers of the final output) can spot failed slots.
const PARSE_FAILURE_MARKER: &str = "[record parse error]";

/// Represents errors that can occur while parsing an export.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown entry type: @{0}")]
    UnknownEntryType(String),

    #[error("malformed entry: {message} at line {line}")]
    MalformedEntry { message: String, line: usize },
}

/// One bibliographic record as a flat mapping of lower-cased field
/// names to values.
///
/// Field names follow the export dialect (`title`, `author`, `journal`,
/// `volume`, `number`, `pages`, `year`, `doi`, `oa`, ...) plus the
/// synthetic `ref_id` holding the record's 1-based position in its
/// source file. Lookups never fail: absent fields read as `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BibRecord {
    fields: HashMap<String, String>,
}

impl BibRecord {
    /// Creates a record from an existing field mapping.
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Creates the placeholder substituted for a record that failed
    /// structural parsing. The diagnostic lands in `title` so the
    /// failure is visible in rendered output.
    pub(crate) fn parse_failure(index: usize, err: &BibError) -> Self {
        let mut fields = HashMap::new();
        fields.insert(
            "title".to_string(),
            format!("parse error in record {index}: {err}"),
        );
        fields.insert("author".to_string(), PARSE_FAILURE_MARKER.to_string());
        fields.insert("ref_id".to_string(), index.to_string());
        Self { fields }
    }

    /// Returns true if this record is a placeholder for a parse failure.
    pub fn is_parse_failure(&self) -> bool {
        self.get_tag("author") == PARSE_FAILURE_MARKER
    }

    /// Returns the value of a field, or `""` if the field is absent.
    pub fn get_tag(&self, tag: &str) -> &str {
        self.fields.get(tag).map(String::as_str).unwrap_or("")
    }

    /// Sets a field, replacing any previous value.
    pub fn set_tag(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(tag.into(), value.into());
    }

    /// Returns the 1-based `index`th author, or `""` when the index is
    /// out of range.
    ///
    /// Splits the `author` value on `" and "`. On a canonicalized
    /// record the separator is `", and "`, so entries keep a trailing
    /// comma; this mismatch with [`BibRecord::fix_authors`] is
    /// long-standing behavior that downstream formatting relies on.
    pub fn get_author(&self, index: usize) -> &str {
        if index == 0 {
            return "";
        }
        self.get_tag("author")
            .split(" and ")
            .nth(index - 1)
            .unwrap_or("")
    }

    /// Merges another record into this one. On key collision the other
    /// record's value wins.
    pub fn append(&mut self, other: BibRecord) {
        self.fields.extend(other.fields);
    }

    /// Iterates over `(name, value)` pairs in arbitrary order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rewrites the `author` field so every author reads
    /// `"Surname, Initials"`, with the list joined by `", and "`.
    ///
    /// The list is split on `", and "`, falling back to `" and "` when
    /// the export did not use the comma convention. Given names reduce
    /// to initials with interior hyphens kept: `"Jane Ann"` becomes
    /// `"JA"` and `"Mary-Jane"` becomes `"M-J"`. Does nothing when the
    /// field is absent; entries without a `", "` separator (corporate
    /// authors, `others`) pass through unchanged.
    pub fn fix_authors(&mut self) {
        let Some(raw) = self.fields.get("author") else {
            return;
        };
        let mut authors: Vec<&str> = raw.split(", and ").collect();
        if authors.len() == 1 {
            authors = raw.split(" and ").collect();
        }
        let fixed = authors
            .iter()
            .map(|entry| match entry.split_once(", ") {
                Some((surname, given)) => {
                    format!("{}, {}", utils::title_case(surname), utils::initials(given))
                }
                None => entry.to_string(),
            })
            .join(", and ");
        self.fields.insert("author".to_string(), fixed);
    }
}

/// The ordered records of one export file.
///
/// Order equals input order; each record's `ref_id` is its 1-based
/// position here, which downstream rendering uses as the citation
/// index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bibliography {
    records: Vec<BibRecord>,
}

impl Bibliography {
    /// Reads and parses an export file, never failing.
    ///
    /// On any I/O failure this logs one `error!` naming the source and
    /// returns an empty collection; an empty result with no preceding
    /// diagnostic therefore means the file genuinely had no entries
    /// (which also logs a `warn!`). Callers that need the error itself
    /// should use [`WosParser::parse_path`].
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match WosParser::new().parse_path(path) {
            Ok(records) => {
                if records.is_empty() {
                    warn!(path = %path.display(), "no bibliographic entries found");
                }
                Self { records }
            }
            Err(err) => {
                error!(path = %path.display(), %err, "failed to read bibliography");
                Self::default()
            }
        }
    }

    /// Wraps an already-parsed record list.
    pub fn from_records(records: Vec<BibRecord>) -> Self {
        Self { records }
    }

    /// Returns the records in input order.
    pub fn records(&self) -> &[BibRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BibRecord> {
        self.records.iter()
    }
}

impl IntoIterator for Bibliography {
    type Item = BibRecord;
    type IntoIter = std::vec::IntoIter<BibRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Bibliography {
    type Item = &'a BibRecord;
    type IntoIter = std::slice::Iter<'a, BibRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
