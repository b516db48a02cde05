use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostic::{push, push_with, Diagnostic, DiagnosticKind, Severity, Span};
use crate::schema::SchemaSnapshot;

use super::parser::extract_entries;
use super::{TranslationEntry, TranslationFile};

/// `.../Translate/<folderCode>/<filename>.txt`
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[/\\]Translate[/\\](?P<folder>\w+)[/\\](?P<stem>[^/\\]+)\.txt$")
        .expect("translation path pattern is valid")
});

struct FileMeta {
    folder_code: String,
    file_prefix: String,
    file_code: String,
}

/// Split a translation path into folder code, file prefix, and file code.
///
/// The prefix is recognized greedily against the schema's known prefixes;
/// for unknown prefixes the folder code is used to split the stem so the
/// file-level checks can still run.
fn derive_file_meta(path: &str, schema: &SchemaSnapshot) -> Option<FileMeta> {
    let caps = PATH_RE.captures(path)?;
    let folder = caps["folder"].to_string();
    let stem = &caps["stem"];

    for prefix in schema.file_prefixes() {
        if let Some(code) = stem.strip_prefix(prefix) {
            return Some(FileMeta {
                folder_code: folder,
                file_prefix: prefix.to_string(),
                file_code: code.to_string(),
            });
        }
    }
    if let Some(prefix) = stem.strip_suffix(folder.as_str()) {
        return Some(FileMeta {
            folder_code: folder.clone(),
            file_prefix: prefix.to_string(),
            file_code: folder,
        });
    }
    Some(FileMeta {
        folder_code: folder,
        file_prefix: stem.to_string(),
        file_code: String::new(),
    })
}

pub(super) fn run(
    text: &str,
    path: &str,
    schema: &SchemaSnapshot,
) -> (Option<TranslationFile>, Vec<Diagnostic>) {
    let mut diags = Vec::new();

    let Some(meta) = derive_file_meta(path, schema) else {
        tracing::debug!(path, "path does not follow the Translate convention; skipped");
        return (None, diags);
    };

    let filename = format!("{}{}", meta.file_prefix, meta.file_code);
    let mut file = TranslationFile {
        folder_code: meta.folder_code,
        file_code: meta.file_code,
        file_prefix: meta.file_prefix,
        filename,
        entries: Vec::new(),
        index: HashMap::new(),
    };

    // File-level checks; any failure means the file is too malformed to
    // trust, so entry extraction is skipped entirely.
    if !check_file(&file, text.len(), schema, &mut diags) {
        return (Some(file), diags);
    }

    extract_and_validate(&mut file, text, &mut diags);
    (Some(file), diags)
}

fn check_file(
    file: &TranslationFile,
    text_len: usize,
    schema: &SchemaSnapshot,
    diags: &mut Vec<Diagnostic>,
) -> bool {
    let whole_file = Span::new(0, text_len);

    if file.folder_code != file.file_code {
        push(
            diags,
            DiagnosticKind::UnmatchedCode,
            &[
                ("folderCode", &file.folder_code),
                ("fileCode", &file.file_code),
            ],
            whole_file,
        );
        return false;
    }

    if schema.language(&file.folder_code).is_none() {
        let codes: Vec<String> = schema
            .language_codes()
            .iter()
            .map(|c| format!("'{c}'"))
            .collect();
        push(
            diags,
            DiagnosticKind::NonExistentCode,
            &[
                ("code", &file.folder_code),
                ("validCodes", &codes.join(", ")),
            ],
            whole_file,
        );
        return false;
    }

    if schema.translation_for_prefix(&file.file_prefix).is_none() {
        let prefixes: Vec<String> = schema
            .file_prefixes()
            .iter()
            .map(|p| format!("'{p}'"))
            .collect();
        push(
            diags,
            DiagnosticKind::InvalidFilePrefix,
            &[
                ("prefix", &file.file_prefix),
                ("validPrefixes", &prefixes.join(", ")),
            ],
            whole_file,
        );
        return false;
    }

    true
}

fn extract_and_validate(file: &mut TranslationFile, text: &str, diags: &mut Vec<Diagnostic>) {
    for mut entry in extract_entries(text) {
        // Duplicate keys flag both ends: the earlier occurrence is
        // upgraded retroactively when the later one is discovered.
        if let Some(&first_idx) = file.index.get(&entry.key) {
            entry.duplicate = true;
            let first = &mut file.entries[first_idx];
            if !first.duplicate {
                first.duplicate = true;
                let diag_entry = first.clone();
                emit_duplicate(&diag_entry, &file.filename, diags);
            }
        } else {
            file.index.insert(entry.key.clone(), file.entries.len());
        }

        validate_entry(&entry, &file.filename, diags);
        file.entries.push(entry);
    }
}

/// Per-entry rule checks. A duplicate short-circuits the other checks.
fn validate_entry(entry: &TranslationEntry, filename: &str, diags: &mut Vec<Diagnostic>) {
    if entry.duplicate {
        emit_duplicate(entry, filename, diags);
        return;
    }

    // The grammar tolerates a trailing comma; style favors omission.
    if !entry.comma.is_empty() {
        push_with(
            diags,
            DiagnosticKind::UnnecessaryComma,
            &[],
            entry.comma_span,
            Severity::Hint,
        );
    }

    if entry.quote.is_empty() {
        push(
            diags,
            DiagnosticKind::MissingQuotes,
            &[],
            entry.value_span,
        );
    }
}

fn emit_duplicate(entry: &TranslationEntry, filename: &str, diags: &mut Vec<Diagnostic>) {
    push_with(
        diags,
        DiagnosticKind::DuplicateParameter,
        &[("parameter", &entry.key), ("scriptBlock", filename)],
        entry.full_span(),
        Severity::Warning,
    );
}
