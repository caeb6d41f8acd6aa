//! Drift detection between virtual files and their deployed copies
//!
//! Each pair is judged independently. The mtime recorded in the lockfile is
//! trusted whenever the entry is complete, so an untouched tree is checked
//! with stat calls alone; content is hashed only on the sides where the
//! cheap signal is inconclusive.

use rayon::prelude::*;
use serde::Serialize;
use sysset_fs::NormalizedPath;

use crate::Result;
use crate::fingerprint::{FileFingerprint, FileProbe, FingerprintError};
use crate::lockfile::{LockedFingerprint, Lockfile};
use crate::pair::TrackedPair;
use crate::pool::create_thread_pool;

/// Outcome for one pair; exactly one per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Both sides hold the same content
    Same,
    /// Content differs
    Different,
    /// The real file does not exist
    Missing,
    /// A side could not be stat'd or read
    Error,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Same => "same",
            Self::Different => "different",
            Self::Missing => "missing",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// How one side compares with its locked fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideChange {
    Unchanged,
    Changed,
    /// No complete lock entry to compare against, or the side failed
    Unknown,
}

/// Verdict for one pair plus what is known about each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairReport {
    pub virtual_path: NormalizedPath,
    pub real_path: NormalizedPath,
    pub verdict: Verdict,
    /// Human-readable cause; empty for `same`
    pub detail: String,
    pub virtual_change: SideChange,
    pub real_change: SideChange,
}

/// Verdict totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriftCounts {
    pub same: usize,
    pub different: usize,
    pub missing: usize,
    pub errors: usize,
}

impl DriftCounts {
    fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Same => self.same += 1,
            Verdict::Different => self.different += 1,
            Verdict::Missing => self.missing += 1,
            Verdict::Error => self.errors += 1,
        }
    }

    /// Pairs that are not `same`.
    pub fn problems(&self) -> usize {
        self.different + self.missing + self.errors
    }

    pub fn total(&self) -> usize {
        self.same + self.problems()
    }
}

/// Report from a reconciliation pass, pairs in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub counts: DriftCounts,
    pub pairs: Vec<PairReport>,
}

impl DriftReport {
    pub fn from_pairs(pairs: Vec<PairReport>) -> Self {
        let mut counts = DriftCounts::default();
        for pair in &pairs {
            counts.record(pair.verdict);
        }
        Self { counts, pairs }
    }

    pub fn is_clean(&self) -> bool {
        self.counts.problems() == 0
    }

    pub fn with_verdict(&self, verdict: Verdict) -> impl Iterator<Item = &PairReport> {
        self.pairs.iter().filter(move |p| p.verdict == verdict)
    }
}

/// Judges tracked pairs against a lockfile.
pub struct DriftReconciler<P> {
    probe: P,
    threads: Option<usize>,
}

impl<P: FileProbe> DriftReconciler<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            threads: None,
        }
    }

    /// Limit the worker pool; `None` uses one thread per CPU.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Attach locked fingerprints from `lockfile` and judge every pair.
    ///
    /// Never writes; interrupting it leaves nothing behind.
    pub fn reconcile(&self, pairs: &mut [TrackedPair], lockfile: &Lockfile) -> Result<DriftReport> {
        for pair in pairs.iter_mut() {
            pair.attach_locks(lockfile);
        }

        let pool = create_thread_pool(self.threads)?;
        let reports: Vec<PairReport> =
            pool.install(|| pairs.par_iter_mut().map(|pair| self.evaluate(pair)).collect());

        let report = DriftReport::from_pairs(reports);
        tracing::info!(
            same = report.counts.same,
            different = report.counts.different,
            missing = report.counts.missing,
            errors = report.counts.errors,
            "reconciled {} pair(s)",
            report.pairs.len()
        );
        Ok(report)
    }

    /// Judge a single pair whose locks are already attached.
    pub fn evaluate(&self, pair: &mut TrackedPair) -> PairReport {
        let probe = &self.probe;
        let TrackedPair {
            virtual_file,
            real_file,
            locked_virtual,
            locked_real,
        } = pair;

        let mut report = PairReport {
            virtual_path: virtual_file.path().clone(),
            real_path: real_file.path().clone(),
            verdict: Verdict::Same,
            detail: String::new(),
            virtual_change: SideChange::Unknown,
            real_change: SideChange::Unknown,
        };

        if !probe.exists(real_file.path()) {
            // the virtual side is still stat'd so callers see its state
            let virtual_mtime = virtual_file.resolve_mtime(probe);
            report.verdict = Verdict::Missing;
            report.detail = match virtual_mtime {
                Ok(mtime) => {
                    report.virtual_change = mtime_change(locked_virtual, mtime);
                    "real file does not exist".to_string()
                }
                Err(err) => format!("real file does not exist; {err}"),
            };
            return report;
        }

        let virtual_mtime = virtual_file.resolve_mtime(probe);
        let real_mtime = real_file.resolve_mtime(probe);
        let (virtual_mtime, real_mtime) = match (virtual_mtime, real_mtime) {
            (Ok(v), Ok(r)) => (v, r),
            (v, r) => {
                report.verdict = Verdict::Error;
                report.detail = join_errors([v.err(), r.err()]);
                return report;
            }
        };

        let virtual_fast = fast_path(locked_virtual, virtual_mtime);
        let real_fast = fast_path(locked_real, real_mtime);
        tracing::debug!(
            virtual_path = %report.virtual_path,
            virtual_fast,
            real_fast,
            "mtime check"
        );

        let virtual_hash = side_hash(virtual_file, locked_virtual, virtual_fast, probe);
        let real_hash = side_hash(real_file, locked_real, real_fast, probe);
        let (virtual_hash, real_hash) = match (virtual_hash, real_hash) {
            (Ok(v), Ok(r)) => (v, r),
            (v, r) => {
                report.verdict = Verdict::Error;
                report.detail = join_errors([v.err(), r.err()]);
                return report;
            }
        };

        report.virtual_change = hash_change(locked_virtual, virtual_fast, &virtual_hash);
        report.real_change = hash_change(locked_real, real_fast, &real_hash);

        if virtual_hash == real_hash {
            report.verdict = Verdict::Same;
        } else {
            report.verdict = Verdict::Different;
            report.detail = describe_difference(report.virtual_change, report.real_change);
        }
        report
    }
}

fn fast_path(locked: &LockedFingerprint, observed_mtime: f64) -> bool {
    locked.is_complete() && locked.mtime == observed_mtime
}

/// The side's hash, trusted from the lock on the fast path, computed otherwise.
fn side_hash<P: FileProbe + ?Sized>(
    file: &mut FileFingerprint,
    locked: &LockedFingerprint,
    fast: bool,
    probe: &P,
) -> std::result::Result<String, FingerprintError> {
    if fast {
        return Ok(locked.content_hash.clone());
    }
    file.resolve_hash(probe)
}

fn mtime_change(locked: &LockedFingerprint, observed_mtime: f64) -> SideChange {
    if fast_path(locked, observed_mtime) {
        SideChange::Unchanged
    } else if locked.is_complete() {
        SideChange::Changed
    } else {
        SideChange::Unknown
    }
}

fn hash_change(locked: &LockedFingerprint, fast: bool, hash: &str) -> SideChange {
    if fast {
        SideChange::Unchanged
    } else if !locked.is_complete() {
        SideChange::Unknown
    } else if locked.content_hash == hash {
        // touched but same bytes
        SideChange::Unchanged
    } else {
        SideChange::Changed
    }
}

fn describe_difference(virtual_change: SideChange, real_change: SideChange) -> String {
    match (virtual_change, real_change) {
        (SideChange::Changed, SideChange::Unchanged) => "virtual file changed since lock",
        (SideChange::Unchanged, SideChange::Changed) => "real file changed since lock",
        (SideChange::Changed, SideChange::Changed) => "both sides changed since lock",
        (SideChange::Unchanged, SideChange::Unchanged) => "sides already differed at lock",
        _ => "content differs",
    }
    .to_string()
}

fn join_errors(errors: [Option<FingerprintError>; 2]) -> String {
    errors
        .into_iter()
        .flatten()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
