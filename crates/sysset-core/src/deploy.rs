//! Copying virtual files onto their real locations

use std::fs;

use serde::Serialize;
use sysset_fs::NormalizedPath;

use crate::pair::TrackedPair;

/// A file copied (or, in a dry run, that would have been copied).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedFile {
    pub virtual_path: NormalizedPath,
    pub real_path: NormalizedPath,
    pub bytes: u64,
}

/// A pair that could not be deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployFailure {
    pub virtual_path: NormalizedPath,
    pub real_path: NormalizedPath,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    pub written: Vec<DeployedFile>,
    /// Dry-run entries
    pub skipped: Vec<DeployedFile>,
    pub failures: Vec<DeployFailure>,
}

impl DeployReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Forcibly writes virtual content to the real side.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deployer {
    dry_run: bool,
}

impl Deployer {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Deploy every pair; one failure does not stop the batch.
    pub fn deploy(&self, pairs: &[TrackedPair]) -> DeployReport {
        let mut report = DeployReport::default();
        for pair in pairs {
            self.deploy_one(pair.virtual_path(), pair.real_path(), &mut report);
        }
        tracing::info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            dry_run = self.dry_run,
            "deploy finished"
        );
        report
    }

    /// Deploy a single file into `report`.
    pub fn deploy_one(
        &self,
        virtual_path: &NormalizedPath,
        real_path: &NormalizedPath,
        report: &mut DeployReport,
    ) {
        match self.copy(virtual_path, real_path) {
            Ok(bytes) => {
                let file = DeployedFile {
                    virtual_path: virtual_path.clone(),
                    real_path: real_path.clone(),
                    bytes,
                };
                if self.dry_run {
                    report.skipped.push(file);
                } else {
                    tracing::debug!(from = %virtual_path, to = %real_path, bytes, "deployed");
                    report.written.push(file);
                }
            }
            Err(reason) => {
                tracing::warn!(from = %virtual_path, to = %real_path, %reason, "deploy failed");
                report.failures.push(DeployFailure {
                    virtual_path: virtual_path.clone(),
                    real_path: real_path.clone(),
                    reason,
                });
            }
        }
    }

    fn copy(&self, from: &NormalizedPath, to: &NormalizedPath) -> Result<u64, String> {
        let content = fs::read(from.to_native()).map_err(|e| format!("cannot read {from}: {e}"))?;
        if self.dry_run {
            return Ok(content.len() as u64);
        }
        let target = to.to_native();
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
        }
        fs::write(&target, &content).map_err(|e| format!("cannot write {to}: {e}"))?;
        Ok(content.len() as u64)
    }
}
