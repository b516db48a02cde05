mod parser;
mod validate;


use std::collections::HashMap;

use crate::diagnostic::{Diagnostic, Span};
use crate::schema::SchemaSnapshot;

/// One `key = "value",` line of a translation file.
#[derive(Debug, Clone)]
pub struct TranslationEntry {
    pub key: String,
    pub value: String,
    /// Opening quote token: empty or `"`.
    pub quote: String,
    /// Trailing comma token: empty or `,`.
    pub comma: String,
    pub key_span: Span,
    pub value_span: Span,
    pub quote_span: Span,
    pub comma_span: Span,
    pub duplicate: bool,
}

impl TranslationEntry {
    /// Span from the key through the last present trailing token.
    pub fn full_span(&self) -> Span {
        let end = self
            .value_span
            .end
            .max(self.quote_span.end)
            .max(self.comma_span.end);
        Span::new(self.key_span.start, end)
    }
}

/// Metadata and entries of one parsed translation file.
#[derive(Debug)]
pub struct TranslationFile {
    /// Language code from the `Translate/<code>/` folder.
    pub folder_code: String,
    /// Language code from the file name.
    pub file_code: String,
    pub file_prefix: String,
    /// Canonical filename rebuilt from prefix and file code.
    pub filename: String,
    pub entries: Vec<TranslationEntry>,
    /// Key to first-entry index, for O(1) duplicate detection and lookups.
    index: HashMap<String, usize>,
}

impl TranslationFile {
    /// First entry with the given key.
    pub fn entry(&self, key: &str) -> Option<&TranslationEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }
}

/// Validate a full translation document snapshot.
///
/// `path` supplies the folder code, file prefix and file code via the
/// `.../Translate/<folderCode>/<prefix><fileCode>.txt` convention.
pub fn validate_translation_document(
    text: &str,
    path: &str,
    schema: &SchemaSnapshot,
) -> Vec<Diagnostic> {
    validate::run(text, path, schema).1
}

/// As [`validate_translation_document`], but also hands back the parsed
/// file for downstream consumers. `None` when the path does not follow the
/// translation convention at all.
pub fn parse_translation_document(
    text: &str,
    path: &str,
    schema: &SchemaSnapshot,
) -> (Option<TranslationFile>, Vec<Diagnostic>) {
    validate::run(text, path, schema)
}
