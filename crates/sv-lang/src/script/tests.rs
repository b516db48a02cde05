use std::collections::HashMap;

use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::schema::{BlockSchema, IdSpec, ParameterSchema, SchemaSnapshot};

use super::validate_script_document;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn param(allowed_duplicate: bool, can_be_empty: bool) -> ParameterSchema {
    ParameterSchema {
        allowed_duplicate,
        can_be_empty,
        ..Default::default()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Standard schema for script tests: a `module` container holding `item`,
/// `recipe`, `feed`, and `part` blocks with assorted ID and parameter rules.
fn test_schema() -> SchemaSnapshot {
    let mut blocks = HashMap::new();

    blocks.insert(
        "module".to_string(),
        BlockSchema {
            id: Some(IdSpec::default()),
            ..Default::default()
        },
    );

    let mut item_params = HashMap::new();
    item_params.insert("displayname".to_string(), param(false, false));
    item_params.insert("color".to_string(), param(false, false));
    item_params.insert("tags".to_string(), param(true, false));
    item_params.insert("icon".to_string(), param(false, true));
    blocks.insert(
        "item".to_string(),
        BlockSchema {
            should_have_parent: true,
            parents: strings(&["module"]),
            id: Some(IdSpec::default()),
            parameters: item_params,
            ..Default::default()
        },
    );

    blocks.insert(
        "component".to_string(),
        BlockSchema {
            should_have_parent: true,
            parents: strings(&["item", "recipe"]),
            ..Default::default()
        },
    );

    blocks.insert(
        "recipe".to_string(),
        BlockSchema {
            should_have_parent: true,
            parents: strings(&["module"]),
            needs_children: strings(&["component"]),
            id: Some(IdSpec::default()),
            ..Default::default()
        },
    );

    // ID folds into the type: `feed fruit { ... }` becomes type "feed fruit".
    blocks.insert(
        "feed".to_string(),
        BlockSchema {
            should_have_parent: true,
            parents: strings(&["module"]),
            id: Some(IdSpec {
                values: Some(strings(&["fruit", "meat"])),
                as_type: true,
                ..Default::default()
            }),
            ..Default::default()
        },
    );
    blocks.insert(
        "feed fruit".to_string(),
        BlockSchema {
            should_have_parent: true,
            parents: strings(&["module"]),
            ..Default::default()
        },
    );
    blocks.insert(
        "portion".to_string(),
        BlockSchema {
            should_have_parent: true,
            parents: strings(&["feed fruit"]),
            ..Default::default()
        },
    );

    // ID required inside `item`, forbidden inside `recipe`.
    blocks.insert(
        "part".to_string(),
        BlockSchema {
            should_have_parent: true,
            parents: strings(&["item", "recipe"]),
            id: Some(IdSpec {
                parents_exempt: strings(&["recipe"]),
                ..Default::default()
            }),
            ..Default::default()
        },
    );

    SchemaSnapshot::build(blocks, HashMap::new(), HashMap::new()).unwrap()
}

fn check(text: &str) -> Vec<Diagnostic> {
    validate_script_document(text, &test_schema()).0
}

fn kinds(diags: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diags.iter().map(|d| d.kind).collect()
}

fn assert_clean(text: &str) {
    let diags = check(text);
    assert!(diags.is_empty(), "expected no diagnostics, got: {diags:?}");
}

// ---------------------------------------------------------------------------
// Tree shape
// ---------------------------------------------------------------------------

#[test]
fn children_are_contained_and_in_source_order() {
    let text = "module Base {\n    item Apple {\n    }\n    item Pear {\n    }\n}\n";
    let (diags, tree) = validate_script_document(text, &test_schema());
    assert!(diags.is_empty(), "unexpected: {diags:?}");

    let root = tree.get(tree.root());
    assert_eq!(root.children.len(), 1);
    let module = tree.get(root.children[0]);
    assert_eq!(module.block_type, "module");
    assert_eq!(module.id.as_deref(), Some("Base"));
    assert_eq!(module.children.len(), 2);

    let mut last_start = 0;
    for &child_id in &module.children {
        let child = tree.get(child_id);
        assert!(child.span.start >= module.span.start);
        assert!(child.span.end <= module.span.end);
        assert!(child.span.start >= last_start, "children out of order");
        assert!(child.header_offset <= child.span.start);
        last_start = child.span.start;
    }

    let ids: Vec<&str> = module
        .children
        .iter()
        .map(|&c| tree.get(c).id.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(ids, vec!["Apple", "Pear"]);
}

#[test]
fn empty_document_is_just_the_root() {
    let (diags, tree) = validate_script_document("", &test_schema());
    assert!(diags.is_empty());
    assert_eq!(tree.len(), 1);
    assert!(tree.get(tree.root()).is_root());
}

#[test]
fn block_containing_returns_the_deepest_block() {
    let text = "module Base {\n    item Apple {\n        Color = red,\n    }\n}\n";
    let (_, tree) = validate_script_document(text, &test_schema());
    let offset = text.find("Color").unwrap();
    let hit = tree.get(tree.block_containing(offset));
    assert_eq!(hit.block_type, "item");
    assert_eq!(tree.get(tree.block_containing(0)).block_type, "_DOCUMENT");
}

// ---------------------------------------------------------------------------
// Structural diagnostics
// ---------------------------------------------------------------------------

#[test]
fn unterminated_block_yields_one_unmatched_brace() {
    let text = "item x {";
    let (diags, tree) = validate_script_document(text, &test_schema());
    assert_eq!(kinds(&diags), vec![DiagnosticKind::UnmatchedBrace]);
    assert_eq!(diags[0].span.start, 0);
    assert_eq!(diags[0].span.end, 0);
    // The malformed block is never attached to the tree.
    assert_eq!(tree.len(), 1);
}

#[test]
fn unterminated_nesting_reports_the_outermost_block() {
    // The lone `}` closes `item`, leaving `module` itself unterminated;
    // the diagnostic is anchored at the outermost header.
    let text = "module Base {\n    item Apple {\n}\n";
    let diags = check(text);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::UnmatchedBrace]);
    assert_eq!(diags[0].span.start, text.find("module").unwrap());
    assert!(diags[0].message.contains("'module'"));
}

#[test]
fn unknown_block_is_reported_but_children_are_still_validated() {
    let text = "pantry P {\n    item Apple {\n    }\n}\n";
    let diags = check(text);
    let ks = kinds(&diags);
    assert!(ks.contains(&DiagnosticKind::NotValidBlock));
    // `item` still gets its own parent check, against the literal parent.
    assert!(ks.contains(&DiagnosticKind::WrongParentBlock));
}

#[test]
fn block_name_matching_is_case_insensitive() {
    assert_clean("MODULE Base {\n    ITEM Apple {\n    }\n}\n");
}

// ---------------------------------------------------------------------------
// Parent rules
// ---------------------------------------------------------------------------

#[test]
fn top_level_block_requiring_a_parent_is_flagged() {
    let diags = check("item Apple {\n}\n");
    assert_eq!(kinds(&diags), vec![DiagnosticKind::MissingParentBlock]);
    assert!(diags[0].message.contains("module"));
}

#[test]
fn nested_block_forbidding_a_parent_is_flagged() {
    let text = "module Base {\n    module Inner {\n    }\n}\n";
    let diags = check(text);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::HasParentBlock]);
    assert_eq!(diags[0].span.start, text.find("module Inner").unwrap());
}

#[test]
fn wrong_parent_lists_the_legal_parents() {
    let text = "module Base {\n    item Apple {\n        recipe Salad {\n            component {\n            }\n        }\n    }\n}\n";
    let diags = check(text);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::WrongParentBlock]);
    assert!(diags[0].message.contains("'recipe' block cannot be inside parent block 'item'"));
    assert!(diags[0].message.contains("module"));
}

#[test]
fn missing_required_child_is_flagged_once_per_missing_type() {
    let text = "module Base {\n    recipe Salad {\n    }\n}\n";
    let diags = check(text);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::MissingChildBlock]);
    assert!(diags[0].message.contains("component"));
    assert_eq!(diags[0].span.start, text.find("recipe").unwrap());

    assert_clean("module Base {\n    recipe Salad {\n        component {\n        }\n    }\n}\n");
}

// ---------------------------------------------------------------------------
// ID rules
// ---------------------------------------------------------------------------

#[test]
fn id_on_a_block_without_id_spec_is_flagged() {
    let text = "module Base {\n    item Apple {\n        component extra {\n        }\n    }\n}\n";
    let diags = check(text);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::HasId]);
}

#[test]
fn missing_id_is_flagged() {
    let diags = check("module {\n}\n");
    assert_eq!(kinds(&diags), vec![DiagnosticKind::MissingId]);
}

#[test]
fn id_requirement_depends_on_the_parent() {
    // `part` requires an ID inside `item` but forbids one inside `recipe`.
    assert_clean("module Base {\n    item Apple {\n        part stem {\n        }\n    }\n}\n");

    let missing = check("module Base {\n    item Apple {\n        part {\n        }\n    }\n}\n");
    assert_eq!(kinds(&missing), vec![DiagnosticKind::MissingId]);

    let text = "module Base {\n    recipe Salad {\n        component {\n        }\n        part stem {\n        }\n    }\n}\n";
    let diags = check(text);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::HasIdInParent]);
    assert!(diags[0].message.contains("'recipe'"));
    assert!(diags[0].message.contains("item"));
}

#[test]
fn invalid_id_lists_the_valid_values() {
    let diags = check("module Base {\n    feed beans {\n    }\n}\n");
    assert_eq!(kinds(&diags), vec![DiagnosticKind::InvalidId]);
    assert!(diags[0].message.contains("'beans'"));
    assert!(diags[0].message.contains("fruit, meat"));
}

#[test]
fn valid_subtype_id_promotes_the_effective_type() {
    let text = "module Base {\n    feed fruit {\n    }\n}\n";
    let (diags, tree) = validate_script_document(text, &test_schema());
    assert!(diags.is_empty(), "unexpected: {diags:?}");

    let module = tree.get(tree.root());
    let module = tree.get(module.children[0]);
    let feed = tree.get(module.children[0]);
    assert_eq!(feed.block_type, "feed");
    assert_eq!(feed.effective_type, "feed fruit");
    assert_eq!(feed.id, None);
}

#[test]
fn children_validate_against_the_promoted_subtype() {
    // `portion` is only legal inside "feed fruit", which exists solely as
    // a promoted type.
    assert_clean(
        "module Base {\n    feed fruit {\n        portion {\n        }\n    }\n}\n",
    );

    let diags = check("module Base {\n    feed meat {\n        portion {\n        }\n    }\n}\n");
    assert_eq!(kinds(&diags), vec![DiagnosticKind::WrongParentBlock]);
    assert!(diags[0].message.contains("'feed meat'"));
}

// ---------------------------------------------------------------------------
// Parameter rules
// ---------------------------------------------------------------------------

#[test]
fn duplicate_parameter_is_flagged_once_at_the_second_occurrence() {
    let text = "module Base {\n    item Apple {\n        Color = red,\n        Color = blue,\n    }\n}\n";
    let diags = check(text);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::DuplicateParameter]);
    assert_eq!(diags[0].severity, Severity::Error);
    assert_eq!(diags[0].span.start, text.rfind("Color").unwrap());
}

#[test]
fn allowed_duplicates_are_not_flagged() {
    assert_clean(
        "module Base {\n    item Apple {\n        Tags = fresh,\n        Tags = sweet,\n    }\n}\n",
    );
}

#[test]
fn unknown_parameter_is_flagged_against_the_block() {
    let text = "module Base {\n    item Apple {\n        Weight = 0.2,\n    }\n}\n";
    let diags = check(text);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::UnknownParameter]);
    assert!(diags[0].message.contains("'Weight'"));
    assert!(diags[0].message.contains("'item'"));
}

#[test]
fn empty_value_is_flagged_unless_permitted() {
    let diags = check("module Base {\n    item Apple {\n        Color = ,\n    }\n}\n");
    assert_eq!(kinds(&diags), vec![DiagnosticKind::MissingValue]);

    // `icon` may be empty.
    assert_clean("module Base {\n    item Apple {\n        Icon = ,\n    }\n}\n");
}

#[test]
fn trailing_separator_taxonomy() {
    let missing = check("module Base {\n    item Apple {\n        Color = red\n    }\n}\n");
    assert_eq!(kinds(&missing), vec![DiagnosticKind::MissingComma]);

    let invalid = check("module Base {\n    item Apple {\n        Color = red;\n    }\n}\n");
    assert_eq!(kinds(&invalid), vec![DiagnosticKind::InvalidComma]);
}

#[test]
fn parameters_of_child_blocks_are_not_rescanned_by_the_parent() {
    // The `part` child's lines are excluded from `item`'s parameter scan,
    // so `item` sees only its own `Color`.
    let text = "module Base {\n    item Apple {\n        Color = red,\n        part stem {\n        }\n    }\n}\n";
    let (diags, tree) = validate_script_document(text, &test_schema());
    assert!(diags.is_empty(), "unexpected: {diags:?}");
    let module = tree.get(tree.root()).children[0];
    let item = tree.get(module).children[0];
    assert_eq!(tree.get(item).parameters.len(), 1);
}

#[test]
fn parameters_are_stored_on_the_owning_block() {
    let text = "module Base {\n    item Apple {\n        Color = red,\n        Tags = fresh,\n    }\n}\n";
    let (_, tree) = validate_script_document(text, &test_schema());
    let module = tree.get(tree.root()).children[0];
    let item = tree.get(module).children[0];
    let params = &tree.get(item).parameters;
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name, "Color");
    assert_eq!(params[0].value, "red");
    assert_eq!(params[0].separator, ",");
    assert!(!params[0].duplicate);
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[test]
fn repeated_validation_is_byte_identical() {
    let text = "module Base {\n    item {\n        Color = red\n        Color = blue,\n    }\n    pantry P {\n    }\n}\n";
    let first = check(text);
    let second = check(text);
    assert_eq!(first, second);
}
