//! Cross-crate scenarios: a real git repository deployed into a scratch
//! target, locked, edited on either side and synced.
//!
//! Each scenario drives the public `Workspace` API the way the CLI does.

use std::fs;
use std::path::Path;
use sysset_core::{Error, Platform, Settings, SyncActionKind, Verdict, Workspace};
use sysset_fs::NormalizedPath;
use sysset_test_utils::git::{commit_all, real_git_repo_with_commit};
use sysset_test_utils::tree::{TestTree, set_mtime};

// =============================================================================
// Test Infrastructure
// =============================================================================

const DOTFILES: &[(&str, &str)] = &[
    ("README.md", "# dotfiles\n"),
    ("etc/hosts", "127.0.0.1 localhost\n"),
    ("etc/ssh/sshd_config", "PermitRootLogin no\n"),
    ("home/.gitconfig", "[user]\n\tname = alice\n"),
    ("@darwin/etc/paths", "/opt/homebrew/bin\n"),
];

/// A committed dotfile repository plus the workspace that deploys it.
struct Scenario {
    tree: TestTree,
    repo: git2::Repository,
    workspace: Workspace,
}

impl Scenario {
    fn new(platform: Platform) -> Self {
        let tree = TestTree::new();
        let (repo, _) = real_git_repo_with_commit(tree.repo(), DOTFILES);
        let workspace = Workspace::new(
            NormalizedPath::new(tree.repo()),
            Settings {
                user: "alice".into(),
                prefix: NormalizedPath::new(tree.target()),
                platform,
                read_timeout: None,
                threads: Some(2),
            },
        );
        Self {
            tree,
            repo,
            workspace,
        }
    }

    /// Deploy everything and lock, the usual first run.
    fn deployed(platform: Platform) -> Self {
        let scenario = Self::new(platform);
        let report = scenario.workspace.set(false).unwrap();
        assert!(report.is_success(), "{:?}", report.failures);
        scenario.workspace.lock().unwrap();
        scenario
    }

    fn edit(&self, path: &Path, content: &str, mtime: u64) {
        fs::write(path, content).unwrap();
        set_mtime(path, mtime);
    }

    fn verdicts(&self) -> Vec<(String, Verdict)> {
        let target = NormalizedPath::new(self.tree.target());
        self.workspace
            .status(false)
            .unwrap()
            .report
            .pairs
            .into_iter()
            .map(|p| {
                let rel = p.real_path.strip_prefix(&target).unwrap();
                (rel.as_str().to_string(), p.verdict)
            })
            .collect()
    }
}

fn verdict(rel: &str, verdict: Verdict) -> (String, Verdict) {
    (rel.to_string(), verdict)
}

// =============================================================================
// Scenario 1: First deployment
// =============================================================================

mod s1_first_deploy {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn s1_1_linux_skips_darwin_overlay() {
        let s = Scenario::deployed(Platform::Linux);

        assert_eq!(
            s.verdicts(),
            vec![
                verdict("etc/hosts", Verdict::Same),
                verdict("etc/ssh/sshd_config", Verdict::Same),
                verdict("home/alice/.gitconfig", Verdict::Same),
            ]
        );
        s.tree.assert_real_missing("etc/paths");
        s.tree.assert_real_missing("README.md");
    }

    #[test]
    fn s1_2_darwin_uses_overlay_and_users_home() {
        let s = Scenario::deployed(Platform::Darwin);

        assert_eq!(
            s.verdicts(),
            vec![
                verdict("etc/paths", Verdict::Same),
                verdict("Users/alice/.gitconfig", Verdict::Same),
            ]
        );
        s.tree.assert_real_missing("etc/hosts");
    }

    #[test]
    fn s1_3_lockfile_records_both_sides_and_head_revision() {
        let s = Scenario::deployed(Platform::Linux);
        let head = s.repo.head().unwrap().peel_to_commit().unwrap().id().to_string();

        let raw = fs::read_to_string(s.tree.repo().join(".sysset/lock.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entries = json.as_object().unwrap();
        assert_eq!(entries.len(), 6);

        let hosts_virtual = NormalizedPath::new(s.tree.repo().join("etc/hosts"));
        let hosts_real = NormalizedPath::new(s.tree.target().join("etc/hosts"));
        assert_eq!(
            entries[hosts_virtual.as_str()]["corresponding_git_hash"],
            head.as_str()
        );
        assert_eq!(entries[hosts_real.as_str()]["corresponding_git_hash"], "");
        assert_eq!(
            entries[hosts_virtual.as_str()]["content_hash"],
            entries[hosts_real.as_str()]["content_hash"]
        );
        assert!(s.workspace.verify().unwrap().is_clean());
    }

    #[test]
    fn s1_4_lockfile_state_is_ignored_by_git() {
        let s = Scenario::deployed(Platform::Linux);

        let statuses = s.repo.statuses(None).unwrap();
        let dirty: Vec<String> = statuses
            .iter()
            .filter(|e| !e.status().contains(git2::Status::IGNORED))
            .filter_map(|e| e.path().map(str::to_string))
            .collect();
        assert!(dirty.is_empty(), "unexpected changes: {dirty:?}");
    }
}

// =============================================================================
// Scenario 2: Drift detection
// =============================================================================

mod s2_drift {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn s2_1_local_edit_on_target_is_reported() {
        let s = Scenario::deployed(Platform::Linux);
        s.edit(
            &s.tree.real_path("etc/ssh/sshd_config"),
            "PermitRootLogin yes\n",
            90_000,
        );

        let outcome = s.workspace.status(false).unwrap();
        let sshd = &outcome.report.pairs[1];
        assert_eq!(sshd.verdict, Verdict::Different);
        assert_eq!(sshd.detail, "real file changed since lock");
        assert_eq!(outcome.report.counts.problems(), 1);
    }

    #[test]
    fn s2_2_restored_content_reads_as_same() {
        let s = Scenario::deployed(Platform::Linux);
        let hosts = s.tree.real_path("etc/hosts");
        s.edit(&hosts, "tampered\n", 90_000);
        s.edit(&hosts, "127.0.0.1 localhost\n", 91_000);

        assert_eq!(s.verdicts()[0], verdict("etc/hosts", Verdict::Same));
    }

    #[test]
    fn s2_3_deleted_target_is_missing_and_pruned_once_persisted() {
        let s = Scenario::deployed(Platform::Linux);
        fs::remove_file(s.tree.real_path("home/alice/.gitconfig")).unwrap();

        let outcome = s.workspace.status(true).unwrap();
        assert_eq!(outcome.report.counts.missing, 1);
        assert_eq!(outcome.pruned.len(), 1);
        assert!(outcome.persisted);

        let verification = s.workspace.verify().unwrap();
        assert_eq!(verification.missing.len(), 1);
        assert!(verification.dangling.is_empty());
    }
}

// =============================================================================
// Scenario 3: Sync
// =============================================================================

mod s3_sync {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn s3_1_committed_repository_change_is_deployed() {
        let s = Scenario::deployed(Platform::Linux);
        s.edit(
            &s.tree.virtual_path("etc/hosts"),
            "127.0.0.1 localhost\n::1 localhost\n",
            90_000,
        );
        commit_all(&s.repo, "Add IPv6 loopback");

        let report = s.workspace.sync(false).unwrap();
        assert_eq!(report.actions[0].kind, SyncActionKind::Deployed);
        assert_eq!(report.count(SyncActionKind::Unchanged), 2);
        assert_eq!(report.problems(), 0);
        s.tree.assert_real_contains("etc/hosts", "::1 localhost");
    }

    #[test]
    fn s3_2_edits_on_both_sides_conflict_and_keep_target() {
        let s = Scenario::deployed(Platform::Linux);
        s.edit(&s.tree.virtual_path("home/.gitconfig"), "[user]\n\tname = a\n", 90_000);
        s.edit(&s.tree.real_path("home/alice/.gitconfig"), "[user]\n\tname = b\n", 90_000);

        let report = s.workspace.sync(false).unwrap();
        assert_eq!(report.actions[2].kind, SyncActionKind::Conflict);
        assert_eq!(report.problems(), 1);
        s.tree.assert_real_contains("home/alice/.gitconfig", "name = b");
    }

    #[test]
    fn s3_3_relock_after_resolving_clears_drift() {
        let s = Scenario::deployed(Platform::Linux);
        s.edit(&s.tree.real_path("etc/hosts"), "10.0.0.1 router\n", 90_000);
        assert_eq!(s.workspace.sync(false).unwrap().problems(), 1);

        s.edit(&s.tree.virtual_path("etc/hosts"), "10.0.0.1 router\n", 91_000);
        commit_all(&s.repo, "Adopt router entry");
        s.workspace.lock().unwrap();

        let report = s.workspace.sync(false).unwrap();
        assert_eq!(report.count(SyncActionKind::Unchanged), 3);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn s3_4_new_untracked_file_blocks_until_locked() {
        let s = Scenario::deployed(Platform::Linux);
        s.tree.write_virtual("etc/motd", "welcome\n");

        match s.workspace.sync(false).unwrap_err() {
            Error::SyncBlocked { reasons } => {
                assert!(reasons.iter().any(|r| r.contains("etc/motd")), "{reasons:?}");
            }
            other => panic!("expected SyncBlocked, got {other:?}"),
        }
        s.tree.assert_real_missing("etc/motd");
    }
}

// =============================================================================
// Scenario 4: Revision provenance
// =============================================================================

mod s4_revisions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn s4_1_uncommitted_edit_is_locked_without_revision() {
        let s = Scenario::new(Platform::Linux);
        s.workspace.set(false).unwrap();
        s.edit(&s.tree.virtual_path("etc/hosts"), "0.0.0.0 blocked\n", 90_000);
        s.workspace.set(false).unwrap();

        let outcome = s.workspace.lock().unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].path.as_str().ends_with("etc/hosts"));

        let verification = s.workspace.verify().unwrap();
        assert_eq!(verification.unresolved.len(), 1);

        let report = s.workspace.sync(true).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("without a git revision"));
    }

    #[test]
    fn s4_2_head_commit_describes_locked_revision() {
        let s = Scenario::deployed(Platform::Linux);
        let head = sysset_git::head_commit(s.tree.repo()).unwrap().unwrap();
        assert_eq!(head.message, "Initial commit");

        let lockfile = s.workspace.load_lockfile().unwrap();
        let revision = lockfile
            .entries()
            .map(|(_, locked)| locked.revision_id.clone())
            .find(|id| !id.is_empty())
            .unwrap();
        let described = sysset_git::find_commit(s.tree.repo(), &revision)
            .unwrap()
            .unwrap();
        assert_eq!(described.hash, head.hash);
    }
}
