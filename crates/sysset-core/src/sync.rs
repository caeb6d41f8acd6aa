//! Lock-guarded deployment
//!
//! `sync` deploys only what the lockfile proves safe: a pair whose virtual
//! side moved on since `lock` while the real side stayed put. Real-side
//! edits and two-sided edits are reported and left alone; resolving them is
//! the user's call.

use serde::Serialize;
use sysset_fs::NormalizedPath;

use crate::deploy::{DeployReport, Deployer};
use crate::fingerprint::FileProbe;
use crate::lockfile::{Lockfile, Side, Verification};
use crate::pair::{TrackedPair, expected_entries};
use crate::reconcile::{DriftCounts, DriftReconciler, PairReport, SideChange, Verdict};
use crate::{Error, Result};

/// What sync did with one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncActionKind {
    /// Both sides already match
    Unchanged,
    /// Virtual content copied to the real side
    Deployed,
    /// Dry run: would have been deployed
    WouldDeploy,
    /// Only the real side changed since lock; kept as is
    RealDrifted,
    /// Both sides changed, or the lock cannot tell which did
    Conflict,
    /// The pair could not be evaluated or written
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncAction {
    pub virtual_path: NormalizedPath,
    pub real_path: NormalizedPath,
    pub kind: SyncActionKind,
    pub detail: String,
}

/// Report from a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub actions: Vec<SyncAction>,
    /// Non-blocking findings from the lockfile check
    pub warnings: Vec<String>,
    pub drift: DriftCounts,
}

impl SyncReport {
    pub fn count(&self, kind: SyncActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind == kind).count()
    }

    /// Pairs that need the user's attention.
    pub fn problems(&self) -> usize {
        self.count(SyncActionKind::Conflict)
            + self.count(SyncActionKind::RealDrifted)
            + self.count(SyncActionKind::Failed)
    }
}

/// Engine for lock-guarded synchronization.
pub struct SyncEngine<P> {
    reconciler: DriftReconciler<P>,
    deployer: Deployer,
}

impl<P: FileProbe> SyncEngine<P> {
    pub fn new(probe: P, dry_run: bool) -> Self {
        Self {
            reconciler: DriftReconciler::new(probe),
            deployer: Deployer::new(dry_run),
        }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.reconciler = self.reconciler.with_threads(threads);
        self
    }

    /// Check that `lockfile` can vouch for every pair.
    ///
    /// Returns the non-blocking warnings.
    ///
    /// # Errors
    ///
    /// [`Error::SyncBlocked`] when a virtual file has no usable entry, any
    /// tracked entry still carries a sentinel, or no virtual entry carries
    /// a revision id.
    pub fn preflight(&self, pairs: &[TrackedPair], lockfile: &mut Lockfile) -> Result<Vec<String>> {
        let verification = lockfile.verify(&expected_entries(pairs, false));
        let (mut reasons, mut warnings) = split_findings(&verification);

        let mut with_revision = 0usize;
        let mut without_revision = Vec::new();
        for pair in pairs {
            match lockfile.get(pair.virtual_path()) {
                Some(locked) if locked.has_revision() => with_revision += 1,
                Some(_) => without_revision.push(pair.virtual_path()),
                None => {}
            }
        }
        if !pairs.is_empty() && with_revision == 0 {
            reasons.push("no virtual file is locked against a git revision; commit and re-run lock".into());
        } else {
            warnings.extend(
                without_revision
                    .into_iter()
                    .map(|path| format!("{path} is locked without a git revision")),
            );
        }

        if !reasons.is_empty() {
            tracing::warn!(reasons = reasons.len(), "sync blocked");
            return Err(Error::SyncBlocked { reasons });
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        Ok(warnings)
    }

    /// Preflight, reconcile, then deploy what is safe to deploy.
    ///
    /// The lockfile is only read; re-run `lock` afterwards to record the
    /// new state.
    pub fn sync(&self, pairs: &mut [TrackedPair], lockfile: &mut Lockfile) -> Result<SyncReport> {
        let warnings = self.preflight(pairs, lockfile)?;
        let drift = self.reconciler.reconcile(pairs, lockfile)?;

        let mut deployed = DeployReport::default();
        let actions = drift
            .pairs
            .iter()
            .map(|pair| self.act(pair, &mut deployed))
            .collect();

        let report = SyncReport {
            actions,
            warnings,
            drift: drift.counts,
        };
        tracing::info!(
            deployed = report.count(SyncActionKind::Deployed),
            would_deploy = report.count(SyncActionKind::WouldDeploy),
            conflicts = report.count(SyncActionKind::Conflict),
            drifted = report.count(SyncActionKind::RealDrifted),
            failed = report.count(SyncActionKind::Failed),
            "sync finished"
        );
        Ok(report)
    }

    fn act(&self, pair: &PairReport, deployed: &mut DeployReport) -> SyncAction {
        let (kind, detail) = match pair.verdict {
            Verdict::Same => (SyncActionKind::Unchanged, String::new()),
            Verdict::Error => (SyncActionKind::Failed, pair.detail.clone()),
            Verdict::Missing => self.deploy(pair, deployed),
            Verdict::Different => match (pair.virtual_change, pair.real_change) {
                (SideChange::Changed, SideChange::Unchanged) => self.deploy(pair, deployed),
                (SideChange::Unchanged, SideChange::Changed) => {
                    (SyncActionKind::RealDrifted, pair.detail.clone())
                }
                _ => (SyncActionKind::Conflict, pair.detail.clone()),
            },
        };
        SyncAction {
            virtual_path: pair.virtual_path.clone(),
            real_path: pair.real_path.clone(),
            kind,
            detail,
        }
    }

    fn deploy(&self, pair: &PairReport, deployed: &mut DeployReport) -> (SyncActionKind, String) {
        let failures_before = deployed.failures.len();
        self.deployer
            .deploy_one(&pair.virtual_path, &pair.real_path, deployed);
        if let Some(failure) = deployed.failures.get(failures_before) {
            return (SyncActionKind::Failed, failure.reason.clone());
        }
        if self.deployer.is_dry_run() {
            (SyncActionKind::WouldDeploy, pair.detail.clone())
        } else {
            (SyncActionKind::Deployed, pair.detail.clone())
        }
    }
}

/// Sort verification findings into blocking reasons and warnings.
fn split_findings(verification: &Verification) -> (Vec<String>, Vec<String>) {
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();
    for issue in verification.dangling.iter().chain(&verification.missing) {
        match issue.side {
            Some(Side::Virtual) => reasons.push(issue.message.clone()),
            Some(Side::Real) => warnings.push(format!("{}, will be redeployed", issue.message)),
            None => warnings.push(issue.message.clone()),
        }
    }
    reasons.extend(verification.unresolved.iter().map(|i| i.message.clone()));
    (reasons, warnings)
}
