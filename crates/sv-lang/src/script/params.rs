use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostic::{push, Diagnostic, DiagnosticKind, Span};
use crate::schema::BlockSchema;

use super::{BlockId, BlockTree};

/// One `name = value,` line inside a block body.
#[derive(Debug, Clone)]
pub struct ScriptParameter {
    pub name: String,
    pub value: String,
    /// Trailing separator token: empty, `,`, or something else entirely.
    pub separator: String,
    pub name_span: Span,
    pub value_span: Span,
    pub duplicate: bool,
}

static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<name>[A-Za-z_][A-Za-z0-9_.]*)\s*=\s*(?P<value>.*?)\s*(?P<sep>[,;:]+)?\s*$")
        .expect("parameter pattern is valid")
});

/// Extract and validate the parameter lines of one block.
///
/// Lines belonging to child blocks (header through closing brace) are the
/// children's business and are skipped here.
pub(super) fn extract_and_validate(
    text: &str,
    tree: &mut BlockTree,
    block: BlockId,
    bs: &BlockSchema,
    diags: &mut Vec<Diagnostic>,
) {
    let (body, child_regions, display_type) = {
        let node = tree.get(block);
        let regions: Vec<(usize, usize)> = node
            .children
            .iter()
            .map(|&c| {
                let child = tree.get(c);
                (child.header_offset, child.span.end)
            })
            .collect();
        (node.span, regions, node.effective_type.clone())
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut parameters = Vec::new();

    let mut line_start = body.start;
    for line in text[body.start..body.end].split_inclusive('\n') {
        let start = line_start;
        line_start += line.len();
        let end = start + line.len();

        if child_regions.iter().any(|&(cs, ce)| start < ce && end > cs) {
            continue;
        }
        if line.contains('{') || line.contains('}') {
            continue;
        }
        let Some(caps) = PARAM_RE.captures(line.trim_end_matches(['\r', '\n'])) else {
            continue;
        };

        let (name_m, value_m) = match (caps.name("name"), caps.name("value")) {
            (Some(n), Some(v)) => (n, v),
            _ => continue,
        };
        let separator = caps.name("sep").map_or("", |m| m.as_str()).to_string();

        let name = name_m.as_str().to_string();
        let lower = name.to_lowercase();
        let allowed_duplicate = bs
            .parameters
            .get(&lower)
            .is_some_and(|p| p.allowed_duplicate);
        let duplicate = !seen.insert(lower) && !allowed_duplicate;

        let parameter = ScriptParameter {
            value: value_m.as_str().to_string(),
            separator,
            name_span: Span::new(start + name_m.start(), start + name_m.end()),
            value_span: Span::new(start + value_m.start(), start + value_m.end()),
            duplicate,
            name,
        };
        validate_parameter(&parameter, bs, &display_type, diags);
        parameters.push(parameter);
    }

    tree.get_mut(block).parameters = parameters;
}

/// Per-parameter rule checks. The first failing rule short-circuits the
/// rest for this occurrence.
fn validate_parameter(
    parameter: &ScriptParameter,
    bs: &BlockSchema,
    block_type: &str,
    diags: &mut Vec<Diagnostic>,
) {
    let name = parameter.name.as_str();
    let name_span = parameter.name_span;
    let name_to_value = Span::new(name_span.start, parameter.value_span.end);

    let Some(ps) = bs.parameters.get(&name.to_lowercase()) else {
        push(
            diags,
            DiagnosticKind::UnknownParameter,
            &[("parameter", name), ("scriptBlock", block_type)],
            name_span,
        );
        return;
    };

    if parameter.duplicate {
        push(
            diags,
            DiagnosticKind::DuplicateParameter,
            &[("parameter", name), ("scriptBlock", block_type)],
            name_span,
        );
        return;
    }

    if parameter.value.is_empty() && !ps.can_be_empty {
        push(
            diags,
            DiagnosticKind::MissingValue,
            &[("parameter", name)],
            name_to_value,
        );
        return;
    }

    if parameter.separator.is_empty() {
        push(diags, DiagnosticKind::MissingComma, &[], name_to_value);
    } else if parameter.separator != "," {
        push(
            diags,
            DiagnosticKind::InvalidComma,
            &[],
            Span::new(
                name_span.start,
                parameter.value_span.end + parameter.separator.len(),
            ),
        );
    }
}
