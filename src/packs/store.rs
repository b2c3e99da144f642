use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::warn;

use super::checksum::bundle_checksum;
use super::schema::{self, ParsedDocuments};
use super::Pack;

const MANIFEST_DOCUMENT: &str = "manifest.yaml";
const TAXONOMY_DOCUMENT: &str = "taxonomy.yaml";
const SCORING_DOCUMENT: &str = "scoring.yaml";
const POLICY_DOCUMENT: &str = "esl_policy.yaml";
const PLAYBOOK_DIR: &str = "playbooks";

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// Unsafe pack identifier or version. Rejected before any filesystem
    /// access; never auto-corrected.
    #[error("invalid pack identifier '{0}'")]
    InvalidIdentifier(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("manifest declares version '{found}' but '{expected}' was requested")]
    ConfigMismatch { expected: String, found: String },
    #[error("pack failed schema validation with {} violation(s)", .violations.len())]
    ValidationFailure { violations: Vec<String> },
    #[error("failed to read {document}")]
    Io {
        document: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {document}")]
    Parse {
        document: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Loads pack bundles from a per-pack directory layout under a single root.
///
/// The store performs no caching: callers load a pack once per
/// `(pack_id, version)`, share the immutable result, and compare
/// `config_checksum` against a fresh load to detect drift.
pub struct PackStore {
    root: PathBuf,
}

impl PackStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Pack directories present under the root, sorted by id. Entries whose
    /// names would fail identifier validation are skipped.
    pub fn list_pack_ids(&self) -> Result<Vec<String>, PackError> {
        let entries = fs::read_dir(&self.root).map_err(|source| PackError::Io {
            document: self.root.display().to_string(),
            source,
        })?;

        let mut pack_ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PackError::Io {
                document: self.root.display().to_string(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_identifier(name).is_ok() {
                    pack_ids.push(name.to_string());
                }
            }
        }
        pack_ids.sort();
        Ok(pack_ids)
    }

    /// Version string declared by a pack's manifest, without loading the
    /// full bundle. Used by operators to discover what a directory serves.
    pub fn manifest_version(&self, pack_id: &str) -> Result<String, PackError> {
        validate_identifier(pack_id)?;
        let dir = self.pack_dir(pack_id)?;
        let manifest = self.read_document(&dir, pack_id, MANIFEST_DOCUMENT)?;
        Ok(declared_version(&manifest))
    }

    pub fn load(&self, pack_id: &str, version: &str) -> Result<Pack, PackError> {
        validate_identifier(pack_id)?;
        validate_identifier(version)?;

        let dir = self.pack_dir(pack_id)?;

        let manifest = self.read_document(&dir, pack_id, MANIFEST_DOCUMENT)?;
        let declared = declared_version(&manifest);
        if declared != version {
            return Err(PackError::ConfigMismatch {
                expected: version.to_string(),
                found: declared,
            });
        }

        let taxonomy = self.read_document(&dir, pack_id, TAXONOMY_DOCUMENT)?;
        let scoring = self.read_document(&dir, pack_id, SCORING_DOCUMENT)?;
        let policy = self.read_document(&dir, pack_id, POLICY_DOCUMENT)?;
        let playbooks = self.read_playbooks(&dir)?;

        let mut checksum_inputs: Vec<(String, &Value)> = vec![
            ("manifest".to_string(), &manifest),
            ("taxonomy".to_string(), &taxonomy),
            ("scoring".to_string(), &scoring),
            ("policy".to_string(), &policy),
        ];
        for (name, document, _) in &playbooks {
            checksum_inputs.push((format!("playbook:{name}"), document));
        }
        let config_checksum = bundle_checksum(
            checksum_inputs
                .iter()
                .map(|(label, document)| (label.as_str(), *document)),
        );

        let parsed_playbooks: Vec<(String, Value)> = playbooks
            .iter()
            .map(|(name, document, _)| (name.clone(), document.clone()))
            .collect();
        let documents = ParsedDocuments {
            manifest: &manifest,
            taxonomy: &taxonomy,
            scoring: &scoring,
            policy: &policy,
            playbooks: &parsed_playbooks,
        };

        let bundle = match schema::validate(&documents) {
            Ok(bundle) => bundle,
            Err(violations) => {
                warn!(
                    pack_id,
                    version,
                    violation_count = violations.len(),
                    "pack failed schema validation"
                );
                return Err(PackError::ValidationFailure { violations });
            }
        };

        Ok(Pack {
            pack_id: pack_id.to_string(),
            version: version.to_string(),
            schema_version: bundle.manifest.schema_version,
            taxonomy: bundle.taxonomy,
            scoring: bundle.scoring,
            policy: bundle.policy,
            playbooks: playbooks
                .into_iter()
                .map(|(name, _, raw)| (name, raw))
                .collect(),
            config_checksum,
        })
    }

    fn pack_dir(&self, pack_id: &str) -> Result<PathBuf, PackError> {
        let dir = self.root.join(pack_id);
        if !dir.is_dir() {
            return Err(PackError::NotFound(format!("pack '{pack_id}'")));
        }
        Ok(dir)
    }

    fn read_document(&self, dir: &Path, pack_id: &str, name: &str) -> Result<Value, PackError> {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(PackError::NotFound(format!(
                "document '{name}' for pack '{pack_id}'"
            )));
        }
        let raw = fs::read_to_string(&path).map_err(|source| PackError::Io {
            document: name.to_string(),
            source,
        })?;
        let value = serde_yaml::from_str(&raw).map_err(|source| PackError::Parse {
            document: name.to_string(),
            source,
        })?;
        Ok(value)
    }

    fn read_playbooks(&self, dir: &Path) -> Result<Vec<(String, Value, String)>, PackError> {
        let playbook_dir = dir.join(PLAYBOOK_DIR);
        if !playbook_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&playbook_dir).map_err(|source| PackError::Io {
            document: PLAYBOOK_DIR.to_string(),
            source,
        })?;

        let mut playbooks = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PackError::Io {
                document: PLAYBOOK_DIR.to_string(),
                source,
            })?;
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
                .unwrap_or(false);
            if !path.is_file() || !is_yaml {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let document_label = format!("{PLAYBOOK_DIR}/{name}");
            let raw = fs::read_to_string(&path).map_err(|source| PackError::Io {
                document: document_label.clone(),
                source,
            })?;
            let value = serde_yaml::from_str(&raw).map_err(|source| PackError::Parse {
                document: document_label,
                source,
            })?;
            playbooks.push((name.to_string(), value, raw));
        }

        // Fixed iteration order keeps the checksum stable across platforms.
        playbooks.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(playbooks)
    }
}

fn declared_version(manifest: &Value) -> String {
    manifest
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or("<unset>")
        .to_string()
}

/// Whitelist check for pack ids and versions. The character class subsumes
/// the null-byte, dot-dot, and path-separator rejections, and runs before
/// any filesystem access.
fn validate_identifier(raw: &str) -> Result<(), PackError> {
    let safe = !raw.is_empty()
        && raw
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-');
    if safe {
        Ok(())
    } else {
        Err(PackError::InvalidIdentifier(raw.to_string()))
    }
}
