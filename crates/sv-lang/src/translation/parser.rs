use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostic::Span;

use super::TranslationEntry;

/// `key (=) ("?)(value)("?)(,?)` — quote and comma capture as possibly
/// empty tokens so the validator can reason about their presence.
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?P<key>[A-Za-z0-9_.%-]+)\s*=\s*(?P<quote>"?)(?P<value>[^"\r\n]*?)"?\s*(?P<comma>,?)\s*$"#)
        .expect("translation entry pattern is valid")
});

/// Extract the key/value entries of a translation file.
///
/// The first line is the file-starter token and is never scanned. Lines
/// that do not match the entry grammar are structural noise (braces,
/// comments, continuations) and are skipped without a diagnostic. The
/// duplicate flag is left unset; the validator owns duplicate detection.
pub(super) fn extract_entries(text: &str) -> Vec<TranslationEntry> {
    let mut entries = Vec::new();

    let mut line_start = 0usize;
    for (line_no, line) in text.split_inclusive('\n').enumerate() {
        let start = line_start;
        line_start += line.len();
        if line_no == 0 {
            continue;
        }

        let content = line.trim_end_matches(['\r', '\n']);
        let Some(caps) = ENTRY_RE.captures(content) else {
            continue;
        };
        let (key_m, value_m) = match (caps.name("key"), caps.name("value")) {
            (Some(k), Some(v)) => (k, v),
            _ => continue,
        };
        let quote_m = caps.name("quote");
        let comma_m = caps.name("comma");

        let span_of = |m: &regex::Match<'_>| Span::new(start + m.start(), start + m.end());

        entries.push(TranslationEntry {
            key: key_m.as_str().to_string(),
            value: value_m.as_str().to_string(),
            quote: quote_m.map_or(String::new(), |m| m.as_str().to_string()),
            comma: comma_m.map_or(String::new(), |m| m.as_str().to_string()),
            key_span: span_of(&key_m),
            value_span: span_of(&value_m),
            quote_span: quote_m.map_or(Span::point(start + value_m.start()), |m| span_of(&m)),
            comma_span: comma_m.map_or(Span::point(start + value_m.end()), |m| span_of(&m)),
            duplicate: false,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_never_an_entry() {
        let entries = extract_entries("UI_EN = {\n");
        assert!(entries.is_empty());
    }

    #[test]
    fn extracts_quoted_entry_with_comma() {
        let text = "UI_EN = {\n    UI_Yes = \"Yes\",\n";
        let entries = extract_entries(text);
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.key, "UI_Yes");
        assert_eq!(e.value, "Yes");
        assert_eq!(e.quote, "\"");
        assert_eq!(e.comma, ",");
        assert_eq!(&text[e.key_span.start..e.key_span.end], "UI_Yes");
        assert_eq!(&text[e.value_span.start..e.value_span.end], "Yes");
    }

    #[test]
    fn value_may_contain_commas_inside_quotes() {
        let entries = extract_entries("x = {\nUI_Hi = \"Hello, world\"\n");
        assert_eq!(entries[0].value, "Hello, world");
        assert_eq!(entries[0].comma, "");
    }

    #[test]
    fn unquoted_value_is_extracted_with_empty_quote_token() {
        let entries = extract_entries("x = {\nUI_Hi = Hello,\n");
        assert_eq!(entries[0].value, "Hello");
        assert_eq!(entries[0].quote, "");
        assert_eq!(entries[0].comma, ",");
    }

    #[test]
    fn structural_noise_is_skipped_silently() {
        let entries = extract_entries("x = {\n}\n-- comment\n   \n");
        assert!(entries.is_empty());
    }
}
