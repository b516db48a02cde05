use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A half-open byte-offset range into the validated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span anchoring a diagnostic at a single offset.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Severity level for validation diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Hint,
    Info,
}

/// Every diagnostic the validators can emit.
///
/// The discriminants group into structural, parent/child, identity,
/// parameter/value, and translation-specific checks. None of them abort a
/// validation pass; malformed input always yields a best-effort diagnostic
/// list for the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    // structural
    UnmatchedBrace,
    NotValidBlock,
    // parent/child relationship
    MissingParentBlock,
    HasParentBlock,
    WrongParentBlock,
    MissingChildBlock,
    // identity
    MissingId,
    HasId,
    InvalidId,
    HasIdInParent,
    // parameter/value
    UnknownParameter,
    DuplicateParameter,
    MissingValue,
    MissingComma,
    InvalidComma,
    // translation files
    UnmatchedCode,
    NonExistentCode,
    InvalidFilePrefix,
    MissingQuotes,
    UnnecessaryComma,
}

impl DiagnosticKind {
    /// Message template with `{placeholder}` slots.
    pub fn template(self) -> &'static str {
        match self {
            Self::UnmatchedBrace => "Missing closing bracket '}' for '{scriptBlock}' block",
            Self::NotValidBlock => "'{scriptBlock}' is an unknown script block",
            Self::MissingParentBlock => {
                "'{scriptBlock}' block must be inside a valid parent block: {parentBlocks}"
            }
            Self::HasParentBlock => "'{scriptBlock}' block cannot be inside any parent block",
            Self::WrongParentBlock => {
                "'{scriptBlock}' block cannot be inside parent block '{parentBlock}'. Valid parent blocks are: {parentBlocks}"
            }
            Self::MissingChildBlock => "'{scriptBlock}' block must have child blocks: {childBlocks}",
            Self::MissingId => "'{scriptBlock}' block is missing an ID",
            Self::HasId => "'{scriptBlock}' block cannot have an ID",
            Self::InvalidId => {
                "'{scriptBlock}' block has an invalid ID '{id}'. Valid IDs are: {validIDs}"
            }
            Self::HasIdInParent => {
                "'{scriptBlock}' block cannot have an ID when inside parent block '{parentBlock}', only for: {validParentBlocks}"
            }
            Self::UnknownParameter => {
                "'{parameter}' is not a known parameter of '{scriptBlock}' block"
            }
            Self::DuplicateParameter => "'{parameter}' is already defined in '{scriptBlock}'",
            Self::MissingValue => "'{parameter}' parameter is missing a value",
            Self::MissingComma => "Missing ',' at the end of the line",
            Self::InvalidComma => "Invalid trailing separator, expected ','",
            Self::UnmatchedCode => {
                "Translation folder '{folderCode}' does not match the file language code '{fileCode}'"
            }
            Self::NonExistentCode => {
                "'{code}' is not a known language code. Valid codes are: {validCodes}"
            }
            Self::InvalidFilePrefix => {
                "'{prefix}' is not a valid translation file prefix. Valid prefixes are: {validPrefixes}"
            }
            Self::MissingQuotes => "Translation value must be wrapped in double quotes",
            Self::UnnecessaryComma => "Trailing ',' is not required in translation files",
        }
    }
}

/// A position-anchored, severity-tagged report of a rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub severity: Severity,
    pub span: Span,
}

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Substitute named placeholders into a message template.
///
/// Placeholders with no matching entry in `params` render as the empty
/// string rather than failing.
pub fn format_message(template: &str, params: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            params
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

/// Append an error-severity diagnostic built from `kind`'s template.
pub fn push(
    diags: &mut Vec<Diagnostic>,
    kind: DiagnosticKind,
    params: &[(&str, &str)],
    span: Span,
) {
    push_with(diags, kind, params, span, Severity::Error);
}

/// Append a diagnostic with an explicit severity.
pub fn push_with(
    diags: &mut Vec<Diagnostic>,
    kind: DiagnosticKind,
    params: &[(&str, &str)],
    span: Span,
    severity: Severity,
) {
    let message = format_message(kind.template(), params);
    diags.push(Diagnostic {
        kind,
        message,
        severity,
        span,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_named_placeholders() {
        let msg = format_message(
            "'{scriptBlock}' inside '{parentBlock}'",
            &[("scriptBlock", "item"), ("parentBlock", "module")],
        );
        assert_eq!(msg, "'item' inside 'module'");
    }

    #[test]
    fn unknown_placeholders_render_blank() {
        let msg = format_message("before {nope} after", &[]);
        assert_eq!(msg, "before  after");
    }

    #[test]
    fn span_containment_is_half_open() {
        let span = Span::new(2, 5);
        assert!(span.contains(2));
        assert!(span.contains(4));
        assert!(!span.contains(5));
    }
}
