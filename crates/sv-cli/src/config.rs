use std::path::{Path, PathBuf};

use serde::Deserialize;
use sv_lang::Severity;

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CheckConfigRaw {
    schema: SchemaSection,
    output: OutputSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SchemaSection {
    /// Directory holding the schema documents. Relative paths resolve
    /// against the config file's parent directory.
    dir: PathBuf,
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("schemas"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct OutputSection {
    /// Lowest severity worth reporting: error, warning, hint, or info.
    min_severity: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            min_severity: "info".to_string(),
        }
    }
}

pub fn parse_severity(value: &str) -> anyhow::Result<Severity> {
    match value.to_lowercase().as_str() {
        "error" => Ok(Severity::Error),
        "warning" => Ok(Severity::Warning),
        "hint" => Ok(Severity::Hint),
        "info" => Ok(Severity::Info),
        other => anyhow::bail!("unknown severity '{other}' (expected error, warning, hint, info)"),
    }
}

// ---------------------------------------------------------------------------
// CheckConfig (resolved)
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CheckConfig {
    pub schema_dir: PathBuf,
    pub min_severity: Severity,
}

impl CheckConfig {
    /// Resolve the configuration from an optional `scriptvet.toml` and the
    /// command-line overrides, which win.
    pub fn load(
        config_path: Option<&Path>,
        schema_dir: Option<PathBuf>,
        min_severity: Option<&str>,
    ) -> anyhow::Result<Self> {
        let raw = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
                let mut raw: CheckConfigRaw = toml::from_str(&content)?;
                if raw.schema.dir.is_relative()
                    && let Some(base) = path.parent()
                {
                    raw.schema.dir = base.join(&raw.schema.dir);
                }
                raw
            }
            None => CheckConfigRaw::default(),
        };

        let min_severity = match min_severity {
            Some(value) => parse_severity(value)?,
            None => parse_severity(&raw.output.min_severity)?,
        };

        Ok(Self {
            schema_dir: schema_dir.unwrap_or(raw.schema.dir),
            min_severity,
        })
    }
}
