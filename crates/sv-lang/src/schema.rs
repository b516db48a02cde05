use std::collections::HashMap;

use serde::Deserialize;

/// Errors raised while assembling a schema snapshot from its three
/// deserialized documents.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("translation file prefix '{prefix}' is declared by both '{first}' and '{second}'")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },
    #[error("translation type '{key}' declares an empty file prefix")]
    EmptyPrefix { key: String },
}

// ---------------------------------------------------------------------------
// Script block schema
// ---------------------------------------------------------------------------

/// Rules for one parameter of a script block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Repeated occurrences of this parameter are legal.
    #[serde(default)]
    pub allowed_duplicate: bool,
    /// An empty value is legal.
    #[serde(default)]
    pub can_be_empty: bool,
}

/// ID rules for a script block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdSpec {
    /// Parent block types under which the ID must be omitted.
    #[serde(default, rename = "parentsWithout")]
    pub parents_exempt: Vec<String>,
    /// Legal ID values. `None` or empty means any value is accepted.
    #[serde(default)]
    pub values: Option<Vec<String>>,
    /// When set, a validated ID folds into the block's effective type
    /// (`"ITEM fruit"`), letting the schema define subtype-specific entries.
    #[serde(default, rename = "asType")]
    pub as_type: bool,
}

/// Rules for one script block type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub should_have_parent: bool,
    /// Legal parent block types. Meaningful only when `should_have_parent`.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Child block types that must each appear at least once.
    #[serde(default)]
    pub needs_children: Vec<String>,
    #[serde(default, rename = "ID")]
    pub id: Option<IdSpec>,
    /// Parameter rules keyed by lowercase parameter name.
    #[serde(default)]
    pub parameters: HashMap<String, ParameterSchema>,
}

// ---------------------------------------------------------------------------
// Translation schema
// ---------------------------------------------------------------------------

/// Metadata for one translation file family.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub file_prefix: String,
    /// Token expected on the first line of the file; that line is never
    /// scanned for entries.
    #[serde(default)]
    pub file_starter: String,
}

/// Metadata for one language code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub language_name: String,
    #[serde(default)]
    pub encoding: String,
}

// ---------------------------------------------------------------------------
// SchemaSnapshot
// ---------------------------------------------------------------------------

/// An immutable, fully-indexed view of the three schema documents.
///
/// Built once and shared by reference for the duration of a validation
/// pass; never mutated after [`SchemaSnapshot::build`] returns. Replacement
/// goes through [`crate::SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaSnapshot {
    /// Block schemas keyed by lowercase block name.
    blocks: HashMap<String, BlockSchema>,
    /// Translation schemas keyed by their document key.
    translations: HashMap<String, TranslationSchema>,
    /// File prefix to translation document key.
    prefixes: HashMap<String, String>,
    /// Language metadata keyed by language code.
    languages: HashMap<String, LanguageInfo>,
}

impl SchemaSnapshot {
    /// Assemble a snapshot from the deserialized schema documents.
    ///
    /// Block lookup keys are lowercased here so every later lookup is
    /// case-insensitive without re-normalizing.
    pub fn build(
        blocks: HashMap<String, BlockSchema>,
        translations: HashMap<String, TranslationSchema>,
        languages: HashMap<String, LanguageInfo>,
    ) -> Result<Self, SchemaError> {
        let blocks = blocks
            .into_iter()
            .map(|(name, mut schema)| {
                if schema.name.is_empty() {
                    schema.name = name.clone();
                }
                (name.to_lowercase(), schema)
            })
            .collect();

        let mut prefixes: HashMap<String, String> = HashMap::new();
        for (key, schema) in &translations {
            if schema.file_prefix.is_empty() {
                return Err(SchemaError::EmptyPrefix { key: key.clone() });
            }
            if let Some(existing) = prefixes.get(&schema.file_prefix) {
                let (first, second) = if existing < key {
                    (existing.clone(), key.clone())
                } else {
                    (key.clone(), existing.clone())
                };
                return Err(SchemaError::DuplicatePrefix {
                    prefix: schema.file_prefix.clone(),
                    first,
                    second,
                });
            }
            prefixes.insert(schema.file_prefix.clone(), key.clone());
        }

        Ok(Self {
            blocks,
            translations,
            prefixes,
            languages,
        })
    }

    /// Case-insensitive block schema lookup.
    pub fn block(&self, block_type: &str) -> Option<&BlockSchema> {
        self.blocks.get(&block_type.to_lowercase())
    }

    pub fn is_block(&self, block_type: &str) -> bool {
        self.blocks.contains_key(&block_type.to_lowercase())
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Translation schema for a file prefix (`"UI_"`).
    pub fn translation_for_prefix(&self, prefix: &str) -> Option<&TranslationSchema> {
        self.prefixes
            .get(prefix)
            .and_then(|key| self.translations.get(key))
    }

    /// Known file prefixes, longest first so that greedy filename matching
    /// is deterministic.
    pub fn file_prefixes(&self) -> Vec<&str> {
        let mut prefixes: Vec<&str> = self.prefixes.keys().map(String::as_str).collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        prefixes
    }

    pub fn language(&self, code: &str) -> Option<&LanguageInfo> {
        self.languages.get(code)
    }

    /// Sorted language codes for diagnostic messages.
    pub fn language_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}
