/// One `NAME [id] {` header match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlockMatch {
    pub block_type: String,
    pub id: Option<String>,
    /// Offset of the block-name token.
    pub header_offset: usize,
    /// Offset of the opening `{`.
    pub brace_offset: usize,
}

/// Forward-only block header scanner with an explicit cursor.
///
/// Each validation pass owns its scanner, so concurrent passes can never
/// corrupt each other's position the way a shared stateful matcher would.
#[derive(Debug)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Identifier tokens are freer than block names: dots, dashes and non-ASCII
/// are all legal, structural characters are not.
fn is_id_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'{' | b'}' | b'=' | b'"' | b',')
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Move the cursor. Used to resume scanning after a matched block so
    /// nested blocks are never double-counted at the same level.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Next header whose name token starts before `limit`. Advances the
    /// cursor just past the opening `{` on a match.
    pub fn next_header(&mut self, limit: usize) -> Option<RawBlockMatch> {
        let bytes = self.text.as_bytes();
        let limit = limit.min(bytes.len());
        let mut i = self.pos;

        while i < limit {
            if !is_ident_start(bytes[i]) {
                i += 1;
                continue;
            }
            let name_start = i;
            let mut name_end = i + 1;
            while name_end < bytes.len() && is_ident(bytes[name_end]) {
                name_end += 1;
            }

            let mut cursor = name_end;
            while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                cursor += 1;
            }

            // `NAME {`
            if cursor < bytes.len() && bytes[cursor] == b'{' {
                self.pos = cursor + 1;
                return Some(RawBlockMatch {
                    block_type: self.text[name_start..name_end].to_string(),
                    id: None,
                    header_offset: name_start,
                    brace_offset: cursor,
                });
            }

            // `NAME id {`
            if cursor > name_end && cursor < bytes.len() && is_id_char(bytes[cursor]) {
                let id_start = cursor;
                let mut id_end = cursor + 1;
                while id_end < bytes.len() && is_id_char(bytes[id_end]) {
                    id_end += 1;
                }
                let mut after = id_end;
                while after < bytes.len() && bytes[after].is_ascii_whitespace() {
                    after += 1;
                }
                if after < bytes.len() && bytes[after] == b'{' {
                    self.pos = after + 1;
                    return Some(RawBlockMatch {
                        block_type: self.text[name_start..name_end].to_string(),
                        id: Some(self.text[id_start..id_end].to_string()),
                        header_offset: name_start,
                        brace_offset: after,
                    });
                }
            }

            // No header here; resume right after the name token.
            i = name_end;
        }

        None
    }
}

/// Match the `{` at `brace_offset` against its closing brace.
///
/// Depth starts at 1 immediately after the brace; returns the offset of the
/// `}` that brings it to 0, or `None` when the block is unterminated.
pub fn match_brace(text: &str, brace_offset: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut i = brace_offset + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_header_with_id() {
        let text = "module Base {";
        let mut scanner = Scanner::new(text);
        let m = scanner.next_header(text.len()).unwrap();
        assert_eq!(m.block_type, "module");
        assert_eq!(m.id.as_deref(), Some("Base"));
        assert_eq!(m.header_offset, 0);
        assert_eq!(m.brace_offset, 12);
        assert_eq!(scanner.pos(), 13);
    }

    #[test]
    fn matches_header_without_id() {
        let text = "  options {";
        let m = Scanner::new(text).next_header(text.len()).unwrap();
        assert_eq!(m.block_type, "options");
        assert_eq!(m.id, None);
    }

    #[test]
    fn header_may_span_lines_before_brace() {
        let text = "item Apple\n{";
        let m = Scanner::new(text).next_header(text.len()).unwrap();
        assert_eq!(m.block_type, "item");
        assert_eq!(m.id.as_deref(), Some("Apple"));
        assert_eq!(m.brace_offset, 11);
    }

    #[test]
    fn parameter_lines_are_not_headers() {
        let text = "DisplayName = Apple,\nWeight = 0.2,\n";
        assert!(Scanner::new(text).next_header(text.len()).is_none());
    }

    #[test]
    fn limit_cuts_off_late_headers() {
        let text = "x = 1,\nitem Apple {";
        assert!(Scanner::new(text).next_header(5).is_none());
    }

    #[test]
    fn brace_matching_handles_nesting() {
        let text = "a { b { } c { } }";
        assert_eq!(match_brace(text, 2), Some(16));
        assert_eq!(match_brace(text, 6), Some(8));
    }

    #[test]
    fn unterminated_brace_reports_none() {
        assert_eq!(match_brace("a { b {", 2), None);
    }
}
