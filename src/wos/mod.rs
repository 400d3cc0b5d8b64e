//! Web of Science BibTeX export parser implementation.
//!
//! Splits an export into raw entry blocks, then lexes each block into
//! a flat field record. One malformed record never aborts the batch:
//! its slot is filled with a marked placeholder and a diagnostic is
//! emitted, so the output always has one record per extracted block,
//! in input order.
//!
//! # Example
//!
//! ```
//! use wosbib::WosParser;
//!
//! let input = r#"@article{ ISI:000422959800003,
//! Author = {Smith, John},
//! Title = {{Parsing quasi-standard exports}},
//! Journal = {{NATURE}},
//! Year = {{2020}},
//! }"#;
//!
//! let records = WosParser::new().parse(input);
//! assert_eq!(records[0].get_tag("title"), "Parsing Quasi-Standard Exports");
//! assert_eq!(records[0].get_tag("journal"), "NATURE");
//! ```

mod parse;
mod split;
mod structure;
mod tags;

use std::path::Path;

use tracing::warn;

use crate::{BibRecord, Result};
use parse::parse_entry;
use split::EntrySplit;

/// Parser for Web of Science BibTeX exports.
///
/// Recognizes the `@article{`/`@incollection{` entry markers and the
/// `ISI:`/`WOS:` identifier schemes of the export dialect.
#[derive(Debug, Clone, Default)]
pub struct WosParser;

impl WosParser {
    /// Creates a new parser instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use wosbib::WosParser;
    /// let parser = WosParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses export text into records, one per entry block.
    ///
    /// Never fails: an input with no entry blocks yields an empty
    /// vector, and a block that cannot be parsed yields a placeholder
    /// record (see [`BibRecord::is_parse_failure`]) at its position
    /// while a `warn!` diagnostic reports the underlying error.
    pub fn parse(&self, input: &str) -> Vec<BibRecord> {
        EntrySplit::new(input)
            .enumerate()
            .map(|(i, (line, block))| {
                let index = i + 1;
                match parse_entry(block) {
                    Ok(entry) => entry.into_record(index),
                    Err(err) => {
                        warn!(index, line, %err, "substituting placeholder for unparsable entry");
                        BibRecord::parse_failure(index, &err)
                    }
                }
            })
            .collect()
    }

    /// Reads and parses an export file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BibError::Io`] if the file cannot be read.
    /// Parse problems inside the file are handled per record exactly
    /// as in [`WosParser::parse`].
    pub fn parse_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<BibRecord>> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.parse(&text))
    }
}
