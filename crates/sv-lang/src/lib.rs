pub mod diagnostic;
pub mod position;
mod registry;
pub mod schema;
pub mod script;
pub mod translation;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity, Span};
pub use position::LineIndex;
pub use registry::SchemaRegistry;
pub use schema::{
    BlockSchema, IdSpec, LanguageInfo, ParameterSchema, SchemaError, SchemaSnapshot,
    TranslationSchema,
};
pub use script::{validate_script_document, BlockId, BlockTree, ScriptBlock, ScriptParameter};
pub use translation::{
    parse_translation_document, validate_translation_document, TranslationEntry, TranslationFile,
};
