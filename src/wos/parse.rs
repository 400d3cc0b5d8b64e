//! Lexing of one raw entry block into structured data.
//!
//! The export dialect is line-oriented: a header line carrying the
//! entry type and database identifier, one `Name = {value},` field per
//! line (values may wrap onto continuation lines), and a closing `}`.
//! This module walks those lines with a small state machine instead of
//! rewriting the block into another syntax first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::BibError;
use crate::wos::structure::RawWosEntry;
use crate::wos::tags::{self, EntryType};

static FIELD_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_ -]*?) = (.*)$").unwrap());

/// The two identifier schemes used by the export database, always
/// followed by the field separator.
static CITATION_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((?:ISI|WOS):[0-9A-Za-z]+),$").unwrap());

/// Parse one raw entry block into a [RawWosEntry].
///
/// Line numbers in errors are relative to the block.
pub(crate) fn parse_entry(block: &str) -> Result<RawWosEntry, BibError> {
    let lines: Vec<&str> = block.lines().map(|l| l.trim_end_matches('\r')).collect();
    let header = lines
        .first()
        .ok_or_else(|| malformed("empty entry block", 1))?;
    let (entry_type, citation_key) = parse_header(header)?;

    let mut fields = Vec::new();
    let mut i = 1;
    while i < lines.len() {
        let line = lines[i];
        if line.trim() == "}" {
            break;
        }

        let Some(caps) = FIELD_START_REGEX.captures(line) else {
            return Err(malformed(
                format!("expected a field assignment, found {line:?}"),
                i + 1,
            ));
        };
        let name = caps[1].trim_end().to_lowercase();
        let first = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        if tags::is_discarded_field(&name) {
            // Free text with unescaped braces inside; skip everything
            // up to the bare `},` terminator, ignoring brace balance.
            let mut j = i;
            while j < lines.len() && !lines[j].trim_end().ends_with("},") {
                j += 1;
            }
            if j == lines.len() {
                return Err(malformed(format!("unterminated {name} field"), i + 1));
            }
            i = j + 1;
            continue;
        }

        // Accumulate the value until its braces balance out and the
        // line ends with the field separator.
        let mut value = String::from(first.trim_end());
        let mut balance = brace_balance(first);
        let mut j = i;
        while !(balance <= 0 && value.ends_with(',')) {
            j += 1;
            if j >= lines.len() {
                return Err(malformed(
                    format!("unterminated value for field {name:?}"),
                    i + 1,
                ));
            }
            let continuation = lines[j].trim();
            balance += brace_balance(continuation);
            value.push(' ');
            value.push_str(continuation);
        }
        fields.push((name, clean_value(&value)));
        i = j + 1;
    }

    Ok(RawWosEntry {
        entry_type,
        citation_key,
        fields,
    })
}

/// Parse the `@<keyword>{ <KEY>,` header line.
fn parse_header(line: &str) -> Result<(EntryType, String), BibError> {
    let rest = line
        .strip_prefix('@')
        .ok_or_else(|| malformed(format!("entry does not start with '@': {line:?}"), 1))?;
    let (keyword, tail) = rest
        .split_once('{')
        .ok_or_else(|| malformed(format!("missing '{{' in entry marker: {line:?}"), 1))?;
    let keyword = keyword.trim();
    let entry_type = EntryType::from_keyword(keyword)
        .ok_or_else(|| BibError::UnknownEntryType(keyword.to_string()))?;
    let caps = CITATION_KEY_REGEX.captures(tail.trim()).ok_or_else(|| {
        malformed(format!("unrecognized citation key: {:?}", tail.trim()), 1)
    })?;
    Ok((entry_type, caps[1].to_string()))
}

/// Net brace nesting change contributed by a chunk of text.
fn brace_balance(s: &str) -> i32 {
    s.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// Decodes a raw accumulated value into its plain text.
fn clean_value(raw: &str) -> String {
    let raw = raw.trim_end().trim_end_matches(',').trim_end();
    // The export double-wraps most values.
    let s = raw.replace("{{", "{").replace("}}", "}");
    // `{[}` and `{]}` protect literal square brackets.
    let s = s.replace("{[}", "[").replace("{]}", "]");
    let s = s.trim();
    let s = match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(inner) => inner,
        None => s,
    };
    // Residual braces are out-of-dialect nesting; keep the text.
    s.chars().filter(|c| *c != '{' && *c != '}').collect()
}

fn malformed(message: impl Into<String>, line: usize) -> BibError {
    BibError::MalformedEntry {
        message: message.into(),
        line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get<'a>(entry: &'a RawWosEntry, name: &str) -> Option<&'a str> {
        entry
            .fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[rstest]
    #[case("{{2020}},", "2020")]
    #[case("{Nature},", "Nature")]
    #[case("{{Nature Reviews {[}Methods{]}}},", "Nature Reviews [Methods]")]
    #[case("{10.1038/s41586-020-1234-5},", "10.1038/s41586-020-1234-5")]
    #[case("2015,", "2015")]
    #[case("{A \\& B},", "A \\& B")]
    fn test_clean_value(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(clean_value(raw), expected);
    }

    #[rstest]
    #[case("@article{ ISI:000422959800003,", EntryType::Article, "ISI:000422959800003")]
    #[case("@incollection{ WOS:000300000000001,", EntryType::InCollection, "WOS:000300000000001")]
    #[case("@article{ISI:0001,", EntryType::Article, "ISI:0001")]
    fn test_parse_header_valid(
        #[case] line: &str,
        #[case] expected_type: EntryType,
        #[case] expected_key: &str,
    ) {
        let (entry_type, key) = parse_header(line).unwrap();
        assert_eq!(entry_type, expected_type);
        assert_eq!(key, expected_key);
    }

    #[rstest]
    #[case("@book{ ISI:0001,")]
    #[case("@article{ somekey,")]
    #[case("@article{ ISI:0001")]
    #[case("article{ ISI:0001,")]
    fn test_parse_header_invalid(#[case] line: &str) {
        assert!(parse_header(line).is_err());
    }

    #[test]
    fn test_parse_simple_entry() {
        let block = "@article{ ISI:000422959800003,\n\
                     Author = {Smith, John and Doe, Jane},\n\
                     Title = {{A study of things}},\n\
                     Journal = {{NATURE}},\n\
                     Volume = {{578}},\n\
                     Pages = {{100-110}},\n\
                     Year = {{2020}},\n\
                     }";
        let entry = parse_entry(block).unwrap();
        assert_eq!(entry.entry_type, EntryType::Article);
        assert_eq!(entry.citation_key, "ISI:000422959800003");
        assert_eq!(get(&entry, "author"), Some("Smith, John and Doe, Jane"));
        assert_eq!(get(&entry, "title"), Some("A study of things"));
        assert_eq!(get(&entry, "journal"), Some("NATURE"));
        assert_eq!(get(&entry, "pages"), Some("100-110"));
        assert_eq!(get(&entry, "year"), Some("2020"));
    }

    #[test]
    fn test_multiline_value_is_joined() {
        let block = "@article{ ISI:0001,\n\
                     Title = {{A very long title that the export\n   \
                     wrapped onto two lines}},\n\
                     Year = {{2020}},\n\
                     }";
        let entry = parse_entry(block).unwrap();
        assert_eq!(
            get(&entry, "title"),
            Some("A very long title that the export wrapped onto two lines")
        );
    }

    #[test]
    fn test_abstract_with_stray_braces_is_stripped() {
        // The stray `}` inside the abstract must not corrupt the
        // fields on either side of it.
        let block = "@article{ ISI:0001,\n\
                     Journal = {{NATURE}},\n\
                     Abstract = {This mentions a stray } brace and\n   \
                     spans multiple lines before it ends.},\n\
                     Year = {{2020}},\n\
                     }";
        let entry = parse_entry(block).unwrap();
        assert_eq!(get(&entry, "journal"), Some("NATURE"));
        assert_eq!(get(&entry, "year"), Some("2020"));
        assert_eq!(get(&entry, "abstract"), None);
    }

    #[test]
    fn test_funding_fields_are_stripped() {
        let block = "@article{ ISI:0001,\n\
                     Funding-Acknowledgement = {NSF {[}Grant 123{]}},\n\
                     Funding-Text = {{The authors thank everyone.}},\n\
                     Year = {{2020}},\n\
                     }";
        let entry = parse_entry(block).unwrap();
        assert_eq!(entry.fields.len(), 1);
        assert_eq!(get(&entry, "year"), Some("2020"));
    }

    #[test]
    fn test_hyphenated_field_names_are_lowercased() {
        let block = "@article{ ISI:0001,\n\
                     Book-Group-Author = {{IEEE}},\n\
                     Usage-Count-Last-180-days = {{4}},\n\
                     Year = {{2020}},\n\
                     }";
        let entry = parse_entry(block).unwrap();
        assert_eq!(get(&entry, "book-group-author"), Some("IEEE"));
        assert_eq!(get(&entry, "usage-count-last-180-days"), Some("4"));
    }

    #[test]
    fn test_unterminated_value_is_an_error() {
        let block = "@article{ ISI:0001,\n\
                     Title = {{An unclosed title,\n\
                     }";
        let err = parse_entry(block).unwrap_err();
        assert!(matches!(err, BibError::MalformedEntry { line: 2, .. }));
    }

    #[test]
    fn test_garbage_line_is_an_error() {
        let block = "@article{ ISI:0001,\n\
                     this is not a field\n\
                     }";
        assert!(parse_entry(block).is_err());
    }
}
