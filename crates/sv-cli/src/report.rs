use std::path::Path;

use sv_lang::{
    validate_script_document, validate_translation_document, LineIndex, SchemaSnapshot, Severity,
};

/// Validate one file and print its diagnostics at or above `floor`.
/// Returns the number of error-severity diagnostics.
pub fn check_file(path: &Path, schema: &SchemaSnapshot, floor: Severity) -> anyhow::Result<usize> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let path_str = path.to_string_lossy();

    let diags = if is_translation_path(path) {
        validate_translation_document(&text, &path_str, schema)
    } else {
        validate_script_document(&text, schema).0
    };

    let index = LineIndex::new(&text);
    let mut errors = 0usize;
    for d in &diags {
        if d.severity == Severity::Error {
            errors += 1;
        }
        if severity_rank(d.severity) < severity_rank(floor) {
            continue;
        }
        let (line, col) = index.line_col(d.span.start);
        println!(
            "{}:{line}:{col}: {}: {}",
            path.display(),
            severity_label(d.severity),
            d.message
        );
    }

    tracing::debug!(path = %path.display(), diagnostics = diags.len(), "file checked");
    Ok(errors)
}

/// Translation files live under a `Translate/` path component; everything
/// else goes through the script pipeline.
fn is_translation_path(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "Translate")
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 3,
        Severity::Warning => 2,
        Severity::Hint => 1,
        Severity::Info => 0,
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Hint => "hint",
        Severity::Info => "info",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn severity_ranks_are_strictly_ordered() {
        assert!(severity_rank(Severity::Error) > severity_rank(Severity::Warning));
        assert!(severity_rank(Severity::Warning) > severity_rank(Severity::Hint));
        assert!(severity_rank(Severity::Hint) > severity_rank(Severity::Info));
    }

    #[test]
    fn translate_component_routes_to_the_translation_pipeline() {
        assert!(is_translation_path(&PathBuf::from(
            "mods/x/media/lua/shared/Translate/EN/UI_EN.txt"
        )));
        assert!(!is_translation_path(&PathBuf::from(
            "mods/x/media/scripts/items.txt"
        )));
    }
}
