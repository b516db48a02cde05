use crate::diagnostic::{push, Diagnostic, DiagnosticKind, Span};
use crate::schema::{BlockSchema, IdSpec, SchemaSnapshot};

use super::scanner::{match_brace, Scanner};
use super::{params, BlockId, BlockTree, ScriptBlock};

pub(super) fn run(text: &str, schema: &SchemaSnapshot) -> (Vec<Diagnostic>, BlockTree) {
    let mut tree = BlockTree::new(text.len());
    let mut diags = Vec::new();
    let root = tree.root();
    validate_block(text, schema, &mut tree, root, &mut diags);
    (diags, tree)
}

/// Depth-first validation of one block.
///
/// Own rules run before children are discovered; a rule failure prunes the
/// remaining own rules of this block but never the traversal, so the whole
/// document always yields a complete diagnostic set in one pass.
fn validate_block(
    text: &str,
    schema: &SchemaSnapshot,
    tree: &mut BlockTree,
    block: BlockId,
    diags: &mut Vec<Diagnostic>,
) {
    // The synthetic root is always valid; everything else is checked.
    let own_ok = if tree.get(block).is_root() {
        true
    } else {
        check_own_rules(schema, tree, block, diags)
    };

    scan_children(text, tree, block, diags);

    let children = tree.get(block).children.clone();
    for child in children {
        validate_block(text, schema, tree, child, diags);
    }

    // Required-children check needs the children's final (possibly
    // promoted) types, so it runs after the recursion.
    if own_ok {
        check_needs_children(schema, tree, block, diags);
    }

    if !tree.get(block).is_root() {
        if let Some(bs) = effective_schema(schema, tree, block) {
            params::extract_and_validate(text, tree, block, bs, diags);
        }
    }
}

/// Schema entry for a block's effective type, falling back to the declared
/// type when the promoted subtype has no entry of its own.
fn effective_schema<'s>(
    schema: &'s SchemaSnapshot,
    tree: &BlockTree,
    block: BlockId,
) -> Option<&'s BlockSchema> {
    let node = tree.get(block);
    schema
        .block(&node.effective_type)
        .or_else(|| schema.block(&node.block_type))
}

// ---------------------------------------------------------------------------
// Own rules: type, parent, ID
// ---------------------------------------------------------------------------

fn check_own_rules(
    schema: &SchemaSnapshot,
    tree: &mut BlockTree,
    block: BlockId,
    diags: &mut Vec<Diagnostic>,
) -> bool {
    let (header, block_type) = {
        let node = tree.get(block);
        (Span::point(node.header_offset), node.block_type.clone())
    };

    let Some(bs) = schema.block(&block_type) else {
        push(
            diags,
            DiagnosticKind::NotValidBlock,
            &[("scriptBlock", &block_type)],
            header,
        );
        return false;
    };

    if !check_parent(bs, tree, block, diags) {
        return false;
    }
    check_id(bs, tree, block, diags)
}

fn check_parent(
    bs: &BlockSchema,
    tree: &BlockTree,
    block: BlockId,
    diags: &mut Vec<Diagnostic>,
) -> bool {
    let node = tree.get(block);
    let header = Span::point(node.header_offset);
    let ty = node.block_type.as_str();
    let real_parent = node
        .parent
        .map(|p| tree.get(p))
        .filter(|p| !p.is_root());

    if !bs.should_have_parent {
        if real_parent.is_some() {
            push(
                diags,
                DiagnosticKind::HasParentBlock,
                &[("scriptBlock", ty)],
                header,
            );
            return false;
        }
        return true;
    }

    let Some(parent) = real_parent else {
        push(
            diags,
            DiagnosticKind::MissingParentBlock,
            &[("scriptBlock", ty), ("parentBlocks", &bs.parents.join(", "))],
            header,
        );
        return false;
    };

    if !bs.parents.is_empty()
        && !bs
            .parents
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&parent.effective_type))
    {
        push(
            diags,
            DiagnosticKind::WrongParentBlock,
            &[
                ("scriptBlock", ty),
                ("parentBlock", &parent.effective_type),
                ("parentBlocks", &bs.parents.join(", ")),
            ],
            header,
        );
        return false;
    }

    true
}

/// Resolve a block's final type once its ID passed validation.
///
/// When the schema marks the ID as type-defining, the ID folds into the
/// type (`"item fruit"`) and the standalone ID disappears; downstream
/// schema lookups all use the returned type.
fn resolve_effective_type(
    raw_type: &str,
    id: Option<String>,
    spec: &IdSpec,
) -> (String, Option<String>) {
    match id {
        Some(id) if spec.as_type => (format!("{raw_type} {id}"), None),
        other => (raw_type.to_string(), other),
    }
}

fn check_id(
    bs: &BlockSchema,
    tree: &mut BlockTree,
    block: BlockId,
    diags: &mut Vec<Diagnostic>,
) -> bool {
    let (header, ty, id, parent_type) = {
        let node = tree.get(block);
        let parent_type = node
            .parent
            .map(|p| tree.get(p).effective_type.clone())
            .unwrap_or_default();
        (
            Span::point(node.header_offset),
            node.block_type.clone(),
            node.id.clone(),
            parent_type,
        )
    };

    let Some(spec) = &bs.id else {
        if id.is_some() {
            push(
                diags,
                DiagnosticKind::HasId,
                &[("scriptBlock", &ty)],
                header,
            );
            return false;
        }
        return true;
    };

    let requires_id = !spec
        .parents_exempt
        .iter()
        .any(|p| p.eq_ignore_ascii_case(&parent_type));

    let Some(id) = id else {
        if requires_id {
            push(
                diags,
                DiagnosticKind::MissingId,
                &[("scriptBlock", &ty)],
                header,
            );
            return false;
        }
        return true;
    };

    if !requires_id {
        let allowed: Vec<&str> = bs
            .parents
            .iter()
            .filter(|p| !spec.parents_exempt.iter().any(|e| e.eq_ignore_ascii_case(p)))
            .map(String::as_str)
            .collect();
        push(
            diags,
            DiagnosticKind::HasIdInParent,
            &[
                ("scriptBlock", &ty),
                ("parentBlock", &parent_type),
                ("validParentBlocks", &allowed.join(", ")),
            ],
            header,
        );
        return false;
    }

    if let Some(values) = &spec.values
        && !values.is_empty()
        && !values.iter().any(|v| v == &id)
    {
        push(
            diags,
            DiagnosticKind::InvalidId,
            &[
                ("scriptBlock", &ty),
                ("id", &id),
                ("validIDs", &values.join(", ")),
            ],
            header,
        );
        return false;
    }

    // Validation passed; promote exactly once, before children are
    // validated against any subtype-specific schema.
    let (effective, remaining) = resolve_effective_type(&ty, Some(id), spec);
    let node = tree.get_mut(block);
    node.effective_type = effective;
    node.id = remaining;
    true
}

// ---------------------------------------------------------------------------
// Child discovery
// ---------------------------------------------------------------------------

/// Scan a block's body for direct children and attach them to the tree.
///
/// An unmatched brace aborts the remaining sibling search at this level
/// only; the parent's own traversal continues.
fn scan_children(text: &str, tree: &mut BlockTree, parent: BlockId, diags: &mut Vec<Diagnostic>) {
    let (search_start, parent_end) = {
        let p = tree.get(parent);
        (p.span.start, p.span.end)
    };

    let mut scanner = Scanner::new(text);
    scanner.seek(search_start);

    while let Some(m) = scanner.next_header(parent_end) {
        let Some(close) = match_brace(text, m.brace_offset) else {
            push(
                diags,
                DiagnosticKind::UnmatchedBrace,
                &[("scriptBlock", &m.block_type)],
                Span::point(m.header_offset),
            );
            break;
        };

        let end = close + 1;
        tree.push_child(
            parent,
            ScriptBlock {
                effective_type: m.block_type.clone(),
                block_type: m.block_type,
                id: m.id,
                span: Span::new(m.brace_offset + 1, end),
                header_offset: m.header_offset,
                parent: Some(parent),
                children: Vec::new(),
                parameters: Vec::new(),
            },
        );

        // Resume after the matched span; nesting is found by recursing
        // into the child, not by re-scanning its body here.
        scanner.seek(end);
        if end >= parent_end {
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// Required children
// ---------------------------------------------------------------------------

fn check_needs_children(
    schema: &SchemaSnapshot,
    tree: &BlockTree,
    block: BlockId,
    diags: &mut Vec<Diagnostic>,
) {
    let node = tree.get(block);
    if node.is_root() {
        return;
    }
    let Some(bs) = effective_schema(schema, tree, block) else {
        return;
    };
    if bs.needs_children.is_empty() {
        return;
    }

    let header = Span::point(node.header_offset);
    let child_types: Vec<&str> = node
        .children
        .iter()
        .map(|&c| tree.get(c).effective_type.as_str())
        .collect();
    let required = bs.needs_children.join(", ");

    for needed in &bs.needs_children {
        if !child_types.iter().any(|t| t.eq_ignore_ascii_case(needed)) {
            push(
                diags,
                DiagnosticKind::MissingChildBlock,
                &[("scriptBlock", &node.block_type), ("childBlocks", &required)],
                header,
            );
        }
    }
}
