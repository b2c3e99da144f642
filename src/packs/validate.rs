//! Bulk validation over every pack under a store's root.
//!
//! Backs the `validate-packs` command: the binary only formats and reports
//! what this module computes, so the skip list and pass/fail accounting stay
//! testable without a process boundary.

use super::{PackError, PackStore};

/// Result of validating one pack directory.
#[derive(Debug)]
pub enum PackOutcome {
    /// Named on the skip list; not counted toward the checked total.
    Skipped,
    Passed { version: String, checksum: String },
    Failed(PackError),
}

/// Per-pack outcomes for one sweep of a packs root, in pack-id order.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub outcomes: Vec<(String, PackOutcome)>,
}

impl ValidationReport {
    /// Packs actually validated (skipped entries excluded).
    pub fn checked(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !matches!(outcome, PackOutcome::Skipped))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, PackOutcome::Failed(_)))
            .count()
    }

    pub fn all_valid(&self) -> bool {
        self.failed() == 0
    }
}

/// Validate every pack under the store's root against the version its own
/// manifest declares, skipping ids on `skip`. Fails outright only when the
/// root itself cannot be listed; per-pack failures land in the report.
pub fn validate_root(store: &PackStore, skip: &[&str]) -> Result<ValidationReport, PackError> {
    let mut outcomes = Vec::new();
    for pack_id in store.list_pack_ids()? {
        if skip.contains(&pack_id.as_str()) {
            outcomes.push((pack_id, PackOutcome::Skipped));
            continue;
        }
        let outcome = match store
            .manifest_version(&pack_id)
            .and_then(|version| store.load(&pack_id, &version))
        {
            Ok(pack) => PackOutcome::Passed {
                version: pack.version,
                checksum: pack.config_checksum,
            },
            Err(err) => PackOutcome::Failed(err),
        };
        outcomes.push((pack_id, outcome));
    }
    Ok(ValidationReport { outcomes })
}
