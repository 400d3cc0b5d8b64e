/// Entry types found in Web of Science exports.
///
/// The export dialect only ever emits these two; anything else in the
/// marker position means the block is not one of ours.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub(crate) enum EntryType {
    /// `@article{` - journal articles.
    Article,
    /// `@incollection{` - conference papers and book chapters.
    InCollection,
}

impl EntryType {
    pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "article" => Some(Self::Article),
            "incollection" => Some(Self::InCollection),
            _ => None,
        }
    }

    #[allow(unused)]
    pub(crate) fn as_keyword(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::InCollection => "incollection",
        }
    }
}

/// Returns true for field names whose values are large free-text
/// blocks (abstracts, funding acknowledgements).
///
/// These contain unescaped braces and newlines that break the
/// brace-balance assumptions of value lexing, so the lexer discards
/// them wholesale. `name` must already be lower-cased.
pub(crate) fn is_discarded_field(name: &str) -> bool {
    name.starts_with("abstract") || name.starts_with("funding-")
}
