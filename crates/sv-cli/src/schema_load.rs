use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use sv_lang::{BlockSchema, LanguageInfo, SchemaSnapshot, TranslationSchema};

/// Load and index the three schema documents from a directory.
///
/// The file names follow the published schema layout: `scriptBlocks.json`,
/// `translationFiles.json`, `languageCodes.json`.
pub fn load_schema_dir(dir: &Path) -> anyhow::Result<SchemaSnapshot> {
    let blocks: HashMap<String, BlockSchema> = read_doc(&dir.join("scriptBlocks.json"))?;
    let translations: HashMap<String, TranslationSchema> =
        read_doc(&dir.join("translationFiles.json"))?;
    let languages: HashMap<String, LanguageInfo> = read_doc(&dir.join("languageCodes.json"))?;

    let snapshot = SchemaSnapshot::build(blocks, translations, languages)?;
    tracing::info!(
        blocks = snapshot.block_count(),
        dir = %dir.display(),
        "schema documents loaded"
    );
    Ok(snapshot)
}

fn read_doc<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}
