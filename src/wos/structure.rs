use std::collections::HashMap;

use crate::BibRecord;
use crate::utils::{classify_oa, collapse_spaces, title_case};
use crate::wos::tags::EntryType;

/// Structured raw data lexed from one entry block.
#[derive(Debug)]
pub(crate) struct RawWosEntry {
    /// Which of the dialect's entry types opened the block.
    #[allow(unused)]
    pub(crate) entry_type: EntryType,
    /// The `ISI:`/`WOS:` database identifier. Dropped on conversion in
    /// favor of the positional `ref_id`.
    pub(crate) citation_key: String,
    /// Lower-cased field names and decoded values, in block order.
    pub(crate) fields: Vec<(String, String)>,
}

impl RawWosEntry {
    /// Converts the raw entry into a [BibRecord], applying semantic
    /// cleanup.
    ///
    /// `index` is the record's 1-based position in its source file and
    /// becomes the `ref_id` field, replacing the database identifier.
    pub(crate) fn into_record(self, index: usize) -> BibRecord {
        let mut fields: HashMap<String, String> = self.fields.into_iter().collect();
        fields.insert("ref_id".to_string(), index.to_string());

        // Joining wrapped lines leaves doubled spaces in long values;
        // titles additionally arrive in arbitrary casing.
        if let Some(title) = fields.get_mut("title") {
            *title = title_case(&collapse_spaces(title));
        }
        if let Some(author) = fields.get_mut("author") {
            *author = collapse_spaces(author);
        }
        let oa = fields.get("oa").map(|s| classify_oa(s)).unwrap_or("");
        fields.insert("oa".to_string(), oa.to_string());

        let mut record = BibRecord::from_fields(fields);
        record.fix_authors();
        record
    }
}
