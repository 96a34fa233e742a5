//! Tests for the singleton task coordinator.

use super::*;
use crate::store::{FsLeaseStore, LeaseStore, MemoryLeaseStore};
use std::time::Duration;
use tempfile::TempDir;

/// Coordinator over an in-memory store with background sweeping disabled.
fn memory_coordinator() -> SingletonCoordinator {
    let mut config = SingletonConfig::new("/unused");
    config.auto_sweep = false;
    SingletonCoordinator::with_store(Box::new(MemoryLeaseStore::new()), config).unwrap()
}

/// Coordinator persisting into the given directory, no background sweeping.
fn fs_coordinator(dir: &TempDir) -> SingletonCoordinator {
    let mut config = SingletonConfig::new(dir.path());
    config.auto_sweep = false;
    SingletonCoordinator::new(config).unwrap()
}

#[test]
fn one_lease_per_kind() {
    let coordinator = memory_coordinator();

    let first = coordinator
        .acquire(SingletonKind::Build, "agent-a", "npm run build", None)
        .unwrap();
    assert!(first.is_granted());

    let second = coordinator
        .acquire(SingletonKind::Build, "agent-b", "rebuild", None)
        .unwrap();
    match second {
        SingletonDecision::Denied {
            owner,
            running,
            remaining,
            reason,
        } => {
            assert_eq!(owner, "agent-a");
            assert_eq!(running, "npm run build");
            assert!(remaining > Duration::ZERO);
            assert!(reason.contains("build"));
        }
        SingletonDecision::Granted => panic!("second build must be denied"),
    }

    // A different kind is unaffected.
    assert!(
        coordinator
            .acquire(SingletonKind::Test, "agent-b", "npm test", None)
            .unwrap()
            .is_granted()
    );
}

#[test]
fn release_requires_ownership() {
    let coordinator = memory_coordinator();

    coordinator
        .acquire(SingletonKind::Deploy, "agent-a", "deploy to staging", None)
        .unwrap();

    assert!(!coordinator.release(SingletonKind::Deploy, "agent-b").unwrap());
    assert!(coordinator.is_running(SingletonKind::Deploy));

    assert!(coordinator.release(SingletonKind::Deploy, "agent-a").unwrap());
    assert!(!coordinator.is_running(SingletonKind::Deploy));
}

#[test]
fn release_of_idle_kind_returns_false() {
    let coordinator = memory_coordinator();
    assert!(!coordinator.release(SingletonKind::Lint, "agent-a").unwrap());
}

#[test]
fn expired_lease_is_reclaimable() {
    let coordinator = memory_coordinator();

    coordinator
        .acquire(
            SingletonKind::Build,
            "agent-a",
            "npm run build",
            Some(Duration::from_millis(20)),
        )
        .unwrap();

    std::thread::sleep(Duration::from_millis(60));

    assert!(!coordinator.is_running(SingletonKind::Build));
    assert_eq!(coordinator.owner_of(SingletonKind::Build), None);
    assert!(
        coordinator
            .acquire(SingletonKind::Build, "agent-b", "rebuild", None)
            .unwrap()
            .is_granted()
    );
}

#[test]
fn leases_survive_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let coordinator = fs_coordinator(&temp_dir);
        coordinator
            .acquire(SingletonKind::Install, "agent-a", "npm install", None)
            .unwrap();
    }

    let restarted = fs_coordinator(&temp_dir);
    assert!(restarted.is_running(SingletonKind::Install));
    assert_eq!(
        restarted.owner_of(SingletonKind::Install).as_deref(),
        Some("agent-a")
    );
}

#[test]
fn records_are_keyed_by_kind_name() {
    let temp_dir = TempDir::new().unwrap();
    let coordinator = fs_coordinator(&temp_dir);

    coordinator
        .acquire(SingletonKind::Typecheck, "agent-a", "tsc --noEmit", None)
        .unwrap();

    // The durable record is named by the literal kind.
    assert!(temp_dir.path().join("typecheck.lease").exists());
}

#[test]
fn corrupt_record_is_discarded_at_load() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = FsLeaseStore::open(temp_dir.path()).unwrap();
        store.put("build", "{ truncated").unwrap();
    }
    {
        let coordinator = fs_coordinator(&temp_dir);
        coordinator
            .acquire(SingletonKind::Test, "agent-a", "npm test", None)
            .unwrap();
    }

    let restarted = fs_coordinator(&temp_dir);
    assert!(restarted.is_running(SingletonKind::Test));
    assert!(!restarted.is_running(SingletonKind::Build));
}

#[test]
fn release_all_frees_only_that_owner() {
    let coordinator = memory_coordinator();

    coordinator
        .acquire(SingletonKind::Build, "agent-a", "build", None)
        .unwrap();
    coordinator
        .acquire(SingletonKind::Lint, "agent-a", "lint", None)
        .unwrap();
    coordinator
        .acquire(SingletonKind::Test, "agent-b", "test", None)
        .unwrap();

    assert_eq!(coordinator.release_all("agent-a"), 2);
    assert!(!coordinator.is_running(SingletonKind::Build));
    assert!(!coordinator.is_running(SingletonKind::Lint));
    assert!(coordinator.is_running(SingletonKind::Test));
}

#[test]
fn active_tasks_is_ordered_and_live() {
    let coordinator = memory_coordinator();

    coordinator
        .acquire(SingletonKind::Test, "agent-b", "npm test", None)
        .unwrap();
    coordinator
        .acquire(SingletonKind::Build, "agent-a", "npm run build", None)
        .unwrap();
    coordinator
        .acquire(
            SingletonKind::Lint,
            "agent-c",
            "eslint .",
            Some(Duration::from_millis(10)),
        )
        .unwrap();

    std::thread::sleep(Duration::from_millis(40));

    let active = coordinator.active_tasks();
    let kinds: Vec<SingletonKind> = active.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, vec![SingletonKind::Build, SingletonKind::Test]);
}

#[test]
fn sweep_reclaims_expired_leases() {
    let temp_dir = TempDir::new().unwrap();
    let coordinator = fs_coordinator(&temp_dir);

    coordinator
        .acquire(
            SingletonKind::Build,
            "agent-a",
            "build",
            Some(Duration::from_millis(10)),
        )
        .unwrap();
    coordinator
        .acquire(SingletonKind::Test, "agent-b", "test", None)
        .unwrap();

    std::thread::sleep(Duration::from_millis(40));

    assert_eq!(coordinator.sweep_expired(), 1);
    assert!(coordinator.is_running(SingletonKind::Test));
    assert!(!temp_dir.path().join("build.lease").exists());
}

#[test]
fn classify_matches_package_manager_invocations() {
    assert_eq!(classify("run npm run build"), Some(SingletonKind::Build));
    assert_eq!(classify("Yarn Build the frontend"), Some(SingletonKind::Build));
    assert_eq!(classify("build the project from scratch"), Some(SingletonKind::Build));

    assert_eq!(classify("run eslint across packages"), Some(SingletonKind::Lint));
    assert_eq!(classify("lint the code before merging"), Some(SingletonKind::Lint));

    assert_eq!(classify("npm test"), Some(SingletonKind::Test));
    assert_eq!(classify("run vitest in watch mode"), Some(SingletonKind::Test));
    assert_eq!(classify("execute the test suite"), Some(SingletonKind::Test));

    assert_eq!(classify("typecheck everything"), Some(SingletonKind::Typecheck));
    assert_eq!(classify("run tsc --noEmit"), Some(SingletonKind::Typecheck));

    assert_eq!(classify("pnpm install"), Some(SingletonKind::Install));
    assert_eq!(
        classify("install the new dependencies"),
        Some(SingletonKind::Install)
    );

    assert_eq!(classify("deploy to production"), Some(SingletonKind::Deploy));
    assert_eq!(classify("prepare the deployment"), Some(SingletonKind::Deploy));
}

#[test]
fn classify_returns_none_without_a_match() {
    assert_eq!(classify("format src/x.ts"), None);
    assert_eq!(classify("refactor the parser module"), None);
    assert_eq!(classify(""), None);
}

#[test]
fn classify_first_match_wins() {
    // Mentions both build and test; the build rule comes first.
    assert_eq!(
        classify("npm run build then npm test"),
        Some(SingletonKind::Build)
    );
}
