mod params;
mod scanner;
mod validate;

#[cfg(test)]
mod tests;

pub use params::ScriptParameter;
pub use scanner::{RawBlockMatch, Scanner};

use crate::diagnostic::{Diagnostic, Span};
use crate::schema::SchemaSnapshot;

/// Type tag of the synthetic root block spanning the whole document.
pub const DOCUMENT_TYPE: &str = "_DOCUMENT";

/// Handle into a [`BlockTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockId(usize);

/// One parsed `NAME [id] { ... }` region.
#[derive(Debug)]
pub struct ScriptBlock {
    /// Block name as written in the source.
    pub block_type: String,
    /// Type used for every schema lookup after subtype promotion; equals
    /// `block_type` when no promotion fired.
    pub effective_type: String,
    /// Identifier token, if present. Cleared by subtype promotion.
    pub id: Option<String>,
    /// Body span: first character after `{` through the matching `}`.
    pub span: Span,
    /// Offset of the block-name token; anchors this block's diagnostics.
    pub header_offset: usize,
    pub parent: Option<BlockId>,
    pub children: Vec<BlockId>,
    pub parameters: Vec<ScriptParameter>,
}

impl ScriptBlock {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena-allocated parse tree. Nodes hold parent/child handles instead of
/// references, so upward rule lookups stay O(1) without ownership cycles.
#[derive(Debug)]
pub struct BlockTree {
    nodes: Vec<ScriptBlock>,
}

impl BlockTree {
    fn new(text_len: usize) -> Self {
        Self {
            nodes: vec![ScriptBlock {
                block_type: DOCUMENT_TYPE.to_string(),
                effective_type: DOCUMENT_TYPE.to_string(),
                id: None,
                span: Span::new(0, text_len),
                header_offset: 0,
                parent: None,
                children: Vec::new(),
                parameters: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> BlockId {
        BlockId(0)
    }

    pub fn get(&self, id: BlockId) -> &ScriptBlock {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: BlockId) -> &mut ScriptBlock {
        &mut self.nodes[id.0]
    }

    fn push_child(&mut self, parent: BlockId, node: ScriptBlock) -> BlockId {
        let id = BlockId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All blocks in creation order, root first.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &ScriptBlock)> {
        self.nodes.iter().enumerate().map(|(i, n)| (BlockId(i), n))
    }

    /// Deepest block whose body contains `offset`. Falls back to the root.
    pub fn block_containing(&self, offset: usize) -> BlockId {
        let mut current = self.root();
        loop {
            let next = self
                .get(current)
                .children
                .iter()
                .copied()
                .find(|&c| self.get(c).span.contains(offset));
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }
}

/// Parse and validate a full script document snapshot.
///
/// Returns the diagnostic list and the parse tree; the tree is handed back
/// for reuse by downstream consumers such as completion or hover.
pub fn validate_script_document(
    text: &str,
    schema: &SchemaSnapshot,
) -> (Vec<Diagnostic>, BlockTree) {
    validate::run(text, schema)
}
