//! The repository as a whole: settings, pairs and lockfile location

use serde::Serialize;
use sysset_fs::{NormalizedPath, RepoPath};
use sysset_git::VcsSnapshot;

use crate::Result;
use crate::builder::{LockOutcome, LockfileBuilder};
use crate::config::{ConfigResolver, Settings, SettingsLayer};
use crate::deploy::{DeployReport, Deployer};
use crate::enumerate::enumerate_virtual_files;
use crate::fingerprint::LocalProbe;
use crate::lockfile::{DanglingEntry, Lockfile, Verification};
use crate::mapping::PathMapper;
use crate::pair::{TrackedPair, expected_entries};
use crate::reconcile::{DriftReconciler, DriftReport};
use crate::sync::{SyncEngine, SyncReport};

/// Result of `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutcome {
    #[serde(flatten)]
    pub report: DriftReport,
    /// Lockfile entries removed because their file is gone
    pub pruned: Vec<DanglingEntry>,
    /// Whether the pruned lockfile was written back
    pub persisted: bool,
}

/// A sysset repository with resolved settings.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: NormalizedPath,
    settings: Settings,
}

impl Workspace {
    pub fn new(root: NormalizedPath, settings: Settings) -> Self {
        Self { root, settings }
    }

    /// Resolve settings for `root` and open it.
    pub fn open(root: NormalizedPath, overrides: &SettingsLayer) -> Result<Self> {
        let settings = ConfigResolver::new(root.clone()).resolve(overrides)?;
        Ok(Self::new(root, settings))
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `<root>/.sysset/lock.json`
    pub fn lockfile_path(&self) -> NormalizedPath {
        self.root
            .join(RepoPath::StateDir.as_str())
            .join(RepoPath::LockFile.as_str())
    }

    pub fn mapper(&self) -> PathMapper {
        PathMapper::new(
            self.root.clone(),
            self.settings.prefix.clone(),
            self.settings.user.clone(),
            self.settings.platform,
        )
    }

    pub fn probe(&self) -> LocalProbe {
        match self.settings.read_timeout {
            Some(timeout) => LocalProbe::with_read_timeout(timeout),
            None => LocalProbe::new(),
        }
    }

    /// Enumerate virtual files and pair each with its real location.
    pub fn discover_pairs(&self) -> Result<Vec<TrackedPair>> {
        let files = enumerate_virtual_files(&self.root.to_native(), self.settings.platform)?;
        self.mapper().pairs(&files)
    }

    /// Load and prune the lockfile; empty when none exists yet.
    pub fn load_lockfile(&self) -> Result<Lockfile> {
        Lockfile::load_or_default(&self.lockfile_path())
    }

    /// Reconcile every pair against the lockfile.
    ///
    /// With `persist_prune`, a lockfile that lost dangling entries on load
    /// is written back.
    pub fn status(&self, persist_prune: bool) -> Result<StatusOutcome> {
        let mut pairs = self.discover_pairs()?;
        let lockfile = self.load_lockfile()?;
        let pruned = lockfile.removed().to_vec();

        let report = DriftReconciler::new(self.probe())
            .with_threads(self.settings.threads)
            .reconcile(&mut pairs, &lockfile)?;

        let persisted = persist_prune && lockfile.has_pruned();
        if persisted {
            lockfile.persist(&self.lockfile_path())?;
        }

        Ok(StatusOutcome {
            report,
            pruned,
            persisted,
        })
    }

    /// Fingerprint everything and rewrite the lockfile.
    ///
    /// Outside a git repository every entry is locked without a revision.
    pub fn lock(&self) -> Result<LockOutcome> {
        let vcs = match VcsSnapshot::capture(&self.root.to_native()) {
            Ok(vcs) => vcs,
            Err(sysset_git::Error::NotARepository { .. }) => {
                tracing::warn!(root = %self.root, "not a git repository, locking without revisions");
                VcsSnapshot::new(self.root.clone(), "")
            }
            Err(e) => return Err(e.into()),
        };

        let mut pairs = self.discover_pairs()?;
        let probe = self.probe();
        LockfileBuilder::new(&probe, &vcs)
            .with_threads(self.settings.threads)
            .write(&mut pairs, &self.lockfile_path())
    }

    /// Check the lockfile covers every pair, revisions included.
    pub fn verify(&self) -> Result<Verification> {
        let pairs = self.discover_pairs()?;
        let mut lockfile = self.load_lockfile()?;
        Ok(lockfile.verify(&expected_entries(&pairs, true)))
    }

    /// Copy every virtual file to its real location.
    pub fn set(&self, dry_run: bool) -> Result<DeployReport> {
        let pairs = self.discover_pairs()?;
        Ok(Deployer::new(dry_run).deploy(&pairs))
    }

    /// Deploy what the lockfile proves safe.
    pub fn sync(&self, dry_run: bool) -> Result<SyncReport> {
        let mut pairs = self.discover_pairs()?;
        let mut lockfile = self.load_lockfile()?;
        SyncEngine::new(self.probe(), dry_run)
            .with_threads(self.settings.threads)
            .sync(&mut pairs, &mut lockfile)
    }
}
