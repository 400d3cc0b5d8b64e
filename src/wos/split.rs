/// An [Iterator] which splits an export into raw entry blocks.
///
/// [Iterator::next] returns one block per bibliographic entry, along
/// with its starting line number. A block begins at a line starting
/// with `@` and ends at the dialect's record terminator: a line
/// consisting of `}` whose preceding line ends with `,`. A plain `}`
/// is not enough: field values may themselves contain closing braces.
pub(crate) struct EntrySplit<'a> {
    line_number: usize,
    text: &'a str,
}

impl<'a> EntrySplit<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            line_number: 1,
            // Exports sometimes carry a stray leading byte.
            text: text.trim_start_matches('\u{feff}'),
        }
    }
}

impl<'a> Iterator for EntrySplit<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        // Discard everything up to the next entry marker.
        let mut start = 0;
        for line in self.text.split_inclusive('\n') {
            if line.starts_with('@') {
                break;
            }
            start += line.len();
            self.line_number += 1;
        }
        if start >= self.text.len() {
            self.text = "";
            return None;
        }
        let body = &self.text[start..];
        let start_line = self.line_number;

        // Scan for the record terminator. The block ends at the `}`
        // itself; the rest of that line is dropped.
        let mut consumed = 0;
        let mut lines = 0;
        let mut prev_ends_with_comma = false;
        let mut end = None;
        for line in body.split_inclusive('\n') {
            lines += 1;
            let content = line.trim_end();
            if prev_ends_with_comma && content == "}" {
                end = Some((consumed + content.len(), consumed + line.len()));
                break;
            }
            prev_ends_with_comma = content.ends_with(',');
            consumed += line.len();
        }

        match end {
            Some((block_end, line_end)) => {
                self.text = &body[line_end..];
                self.line_number = start_line + lines;
                Some((start_line, &body[..block_end]))
            }
            None => {
                // An unterminated trailing block is not a record.
                self.text = "";
                None
            }
        }
    }
}
