use std::path::{Path, PathBuf};

use super::*;
use crate::config::Settings;
use crate::manifest::DECLARATION_FILE;
use crate::package::error::ErrorKind;
use crate::package::layout::install_dir_name;
use crate::package::testing::{package_url, FakeVcs};

/// Scratch workspace: projects under `<tmp>/<name>`, fetcher state under
/// `<tmp>/ws` and `<tmp>/home`.
struct Fixture {
    tmp: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            tmp: tempfile::tempdir().unwrap(),
        }
    }

    fn project(&self, name: &str, decls: &str) -> PathBuf {
        let root = self.tmp.path().join(name);
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join(DECLARATION_FILE), decls).unwrap();
        root
    }

    fn settings(&self) -> Settings {
        Settings::new(&self.tmp.path().join("ws"), &self.tmp.path().join("home"))
    }

    fn session(&self, vcs: FakeVcs) -> Session<FakeVcs> {
        Session::new(self.settings(), vcs)
    }

    fn install_dir(&self, name: &str) -> PathBuf {
        self.settings().deps_dir.join(install_dir_name(name))
    }

    fn cache_file_exists(&self) -> bool {
        self.settings().cache_path().exists()
    }
}

fn install_of(name: &str, version: &str) -> String {
    format!("{}@{}", package_url(name), version)
}

// ── basic runs ─────────────────────────────────────────────

#[test]
fn test_project_without_declarations() {
    let fx = Fixture::new();
    let root = fx.tmp.path().join("app");
    std::fs::create_dir_all(&root).unwrap();
    let mut session = fx.session(FakeVcs::new());

    let res = fetch_dependencies(&mut session, &[root]).unwrap();
    assert!(res.cache.is_empty());
    assert_eq!(res.graph.edges("app"), Some(&[][..]));
    assert_eq!(res.stats.passes, 1);
    assert_eq!(res.stats.expansions, 0);
    assert!(session.vcs().calls.borrow().is_empty());
    assert!(fx.cache_file_exists());
}

#[test]
fn test_single_dependency_is_installed() {
    let fx = Fixture::new();
    let root = fx.project("app", "http==1.2.0\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("http", &[("1.0.0", ""), ("1.2.0", "")]);
    let mut session = fx.session(vcs);

    let res = fetch_dependencies(&mut session, &[root]).unwrap();
    assert_eq!(res.cache.get("http"), Some("1.2.0"));
    assert!(fx.install_dir("http").is_dir());
    assert_eq!(session.vcs().installs(), vec![install_of("http", "1.2.0")]);
    assert_eq!(
        *session.vcs().calls.borrow(),
        vec![
            "clone-index".to_string(),
            format!("install {}", install_of("http", "1.2.0"))
        ]
    );
    let sidecar = fx.install_dir("http").with_extension("name");
    assert_eq!(std::fs::read_to_string(sidecar).unwrap(), "http");
    assert_eq!(res.search_paths(), vec![fx.install_dir("http")]);
}

#[test]
fn test_transitive_closure() {
    let fx = Fixture::new();
    let root = fx.project("app", "a==1.0\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("a", &[("1.0", "b==2.0\n")]);
    vcs.publish("b", &[("2.0", "")]);
    let mut session = fx.session(vcs);

    let res = fetch_dependencies(&mut session, &[root]).unwrap();
    assert_eq!(res.cache.get("a"), Some("1.0"));
    assert_eq!(res.cache.get("b"), Some("2.0"));
    assert!(res.graph.has_edge("app", "a"));
    assert!(res.graph.has_edge("a", "b"));
    assert_eq!(res.graph.edges("b"), Some(&[][..]));
    assert_eq!(
        session.vcs().installs(),
        vec![install_of("a", "1.0"), install_of("b", "2.0")]
    );
    assert_eq!(res.stats.expansions, 2);
    assert_eq!(res.stats.installed, 2);
}

#[test]
fn test_shared_dependency_installed_once() {
    let fx = Fixture::new();
    let root = fx.project("app", "a==1\nb==1\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("a", &[("1", "c==3\n")]);
    vcs.publish("b", &[("1", "c==3\n")]);
    vcs.publish("c", &[("3", "")]);
    let mut session = fx.session(vcs);

    let res = fetch_dependencies(&mut session, &[root]).unwrap();
    assert_eq!(res.cache.len(), 3);
    assert_eq!(res.stats.installed, 3);
    let c_installs = session
        .vcs()
        .installs()
        .iter()
        .filter(|i| i.starts_with(&package_url("c")))
        .count();
    assert_eq!(c_installs, 1);
    assert!(res.graph.has_edge("a", "c"));
    assert!(res.graph.has_edge("b", "c"));
}

#[test]
fn test_chain_converges_within_bound() {
    let fx = Fixture::new();
    let root = fx.project("app", "p1==1\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("p1", &[("1", "p2==1\n")]);
    vcs.publish("p2", &[("1", "p3==1\n")]);
    vcs.publish("p3", &[("1", "p4==1\n")]);
    vcs.publish("p4", &[("1", "")]);
    let mut session = fx.session(vcs);

    let res = fetch_dependencies(&mut session, &[root]).unwrap();
    let n = res.cache.len();
    assert_eq!(n, 4);
    assert!(res.stats.expansions <= n);
    assert!(res.stats.passes <= n + 1);
    assert_eq!(res.stats.installed, n);
    assert_eq!(session.vcs().installs().len(), n);
}

#[test]
fn test_multiple_roots_share_resolution() {
    let fx = Fixture::new();
    let app = fx.project("app", "http==1\n");
    let tool = fx.project("tool", "http==1\njson==2\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("http", &[("1", "")]);
    vcs.publish("json", &[("2", "")]);
    let mut session = fx.session(vcs);

    let res = fetch_dependencies(&mut session, &[app, tool]).unwrap();
    assert_eq!(res.cache.len(), 2);
    assert!(res.graph.has_edge("app", "http"));
    assert!(res.graph.has_edge("tool", "json"));
    assert_eq!(session.vcs().installs().len(), 2);
}

// ── conflicts ──────────────────────────────────────────────

#[test]
fn test_conflict_between_dependencies() {
    let fx = Fixture::new();
    let root = fx.project("app", "a==1.0\nb==1.0\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("a", &[("1.0", "x==1.0\n")]);
    vcs.publish("b", &[("1.0", "x==2.0\n")]);
    vcs.publish("x", &[("1.0", ""), ("2.0", "")]);
    let mut session = fx.session(vcs);

    let err = fetch_dependencies(&mut session, &[root]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    match &err {
        ResolveError::Conflict {
            name,
            cached,
            requested,
            requirer,
        } => {
            assert_eq!(name, "x");
            assert_eq!(cached, "1.0");
            assert_eq!(requested, "2.0");
            assert_eq!(requirer, "b");
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("'x'") && message.contains("'1.0'") && message.contains("'2.0'"));
    assert!(!fx.cache_file_exists());
}

#[test]
fn test_conflict_between_roots() {
    let fx = Fixture::new();
    let app = fx.project("app", "http==1\n");
    let tool = fx.project("tool", "http==2\n");
    let mut session = fx.session(FakeVcs::new());

    let err = fetch_dependencies(&mut session, &[app, tool]).unwrap_err();
    assert!(matches!(err, ResolveError::Conflict { .. }));
    assert!(session.vcs().calls.borrow().is_empty());
}

#[test]
fn test_cached_version_conflicts_unless_fresh() {
    let fx = Fixture::new();
    let root = fx.project("app", "http==1.0\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("http", &[("1.0", ""), ("1.1", "")]);
    let mut session = fx.session(vcs);
    fetch_dependencies(&mut session, &[root.clone()]).unwrap();

    std::fs::write(root.join(DECLARATION_FILE), "http==1.1\n").unwrap();
    let mut vcs = FakeVcs::new();
    vcs.publish("http", &[("1.0", ""), ("1.1", "")]);
    let mut session = fx.session(vcs);
    let err = fetch_dependencies(&mut session, &[root.clone()]).unwrap_err();
    assert!(matches!(err, ResolveError::Conflict { .. }));

    let mut settings = fx.settings();
    settings.fresh = true;
    let mut vcs = FakeVcs::new();
    vcs.publish("http", &[("1.0", ""), ("1.1", "")]);
    let mut session = Session::new(settings, vcs);
    let res = fetch_dependencies(&mut session, &[root]).unwrap();
    assert_eq!(res.cache.get("http"), Some("1.1"));
    // The directory from the first run counts as installed.
    assert!(session.vcs().installs().is_empty());
}

// ── index failures ─────────────────────────────────────────

#[test]
fn test_unknown_package_aborts() {
    let fx = Fixture::new();
    let root = fx.project("app", "ghost==1.0\n");
    let mut session = fx.session(FakeVcs::new());

    let err = fetch_dependencies(&mut session, &[root]).unwrap_err();
    assert!(matches!(err, ResolveError::PackageNotFound { ref name } if name == "ghost"));
    assert!(!fx.cache_file_exists());
}

#[test]
fn test_unpublished_version_aborts() {
    let fx = Fixture::new();
    let root = fx.project("app", "http==3.0\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("http", &[("1.0", "")]);
    let mut session = fx.session(vcs);

    let err = fetch_dependencies(&mut session, &[root]).unwrap_err();
    match err {
        ResolveError::VersionNotFound { name, version, .. } => {
            assert_eq!(name, "http");
            assert_eq!(version, "3.0");
        }
        other => panic!("expected VersionNotFound, got {:?}", other),
    }
}

#[test]
fn test_failed_clone_leaves_no_sidecar_or_cache() {
    let fx = Fixture::new();
    let root = fx.project("app", "http==1.0\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("http", &[("1.0", "")]);
    vcs.withdraw("http", "1.0");
    let mut session = fx.session(vcs);

    let err = fetch_dependencies(&mut session, &[root]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Subprocess);
    assert_eq!(session.vcs().installs(), vec![install_of("http", "1.0")]);
    assert!(!fx.install_dir("http").with_extension("name").exists());
    assert!(!fx.cache_file_exists());
}

#[test]
fn test_malformed_dependency_declarations() {
    let fx = Fixture::new();
    let root = fx.project("app", "a==1\n");
    let mut vcs = FakeVcs::new();
    vcs.publish("a", &[("1", "oops\nb==\n")]);
    let mut session = fx.session(vcs);

    match fetch_dependencies(&mut session, &[root]) {
        Err(ResolveError::Format { path, issues, .. }) => {
            assert_eq!(path, fx.install_dir("a").join(DECLARATION_FILE));
            assert_eq!(issues.len(), 2);
        }
        other => panic!("expected format error, got {:?}", other.map(|r| r.cache)),
    }
}

// ── reuse of a previous resolution ─────────────────────────

fn publish_ab(vcs: &mut FakeVcs) {
    vcs.publish("a", &[("1.0", "b==2.0\n")]);
    vcs.publish("b", &[("2.0", "")]);
}

#[test]
fn test_second_run_is_idempotent() {
    let fx = Fixture::new();
    let root = fx.project("app", "a==1.0\n");
    let mut vcs = FakeVcs::new();
    publish_ab(&mut vcs);
    let mut session = fx.session(vcs);
    let first = fetch_dependencies(&mut session, &[root.clone()]).unwrap();
    let table = std::fs::read_to_string(fx.settings().cache_path()).unwrap();

    let mut vcs = FakeVcs::new();
    publish_ab(&mut vcs);
    let mut session = fx.session(vcs);
    let second = fetch_dependencies(&mut session, &[root]).unwrap();

    assert_eq!(second.cache, first.cache);
    assert_eq!(second.graph, first.graph);
    assert_eq!(second.stats.installed, 0);
    assert_eq!(second.stats.expansions, 0);
    assert!(session.vcs().calls.borrow().is_empty());
    assert_eq!(
        std::fs::read_to_string(fx.settings().cache_path()).unwrap(),
        table
    );
}

#[test]
fn test_new_package_with_existing_dir_still_refreshes_index() {
    let fx = Fixture::new();
    let root = fx.project("app", "http==1.0\n");
    std::fs::create_dir_all(fx.install_dir("http")).unwrap();
    let mut vcs = FakeVcs::new();
    vcs.publish("http", &[("1.0", "")]);
    let mut session = fx.session(vcs);

    let res = fetch_dependencies(&mut session, &[root]).unwrap();
    assert_eq!(res.cache.get("http"), Some("1.0"));
    assert_eq!(res.stats.expansions, 1);
    assert_eq!(res.stats.installed, 0);
    assert_eq!(*session.vcs().calls.borrow(), vec!["clone-index".to_string()]);
    assert!(session.index().is_refreshed());
}

#[test]
fn test_missing_install_dir_is_reinstalled() {
    let fx = Fixture::new();
    let root = fx.project("app", "a==1.0\n");
    let mut vcs = FakeVcs::new();
    publish_ab(&mut vcs);
    let mut session = fx.session(vcs);
    fetch_dependencies(&mut session, &[root.clone()]).unwrap();

    std::fs::remove_dir_all(fx.install_dir("b")).unwrap();

    let mut vcs = FakeVcs::new();
    publish_ab(&mut vcs);
    let mut session = fx.session(vcs);
    let res = fetch_dependencies(&mut session, &[root]).unwrap();
    assert_eq!(session.vcs().installs(), vec![install_of("b", "2.0")]);
    assert!(fx.install_dir("b").is_dir());
    assert!(res.graph.has_edge("a", "b"));
    assert_eq!(res.graph.edges("b"), Some(&[][..]));
}

#[test]
fn test_names_are_recovered_from_persisted_index() {
    let fx = Fixture::new();
    let root = fx.project("app", "a==1.0\n");
    let mut vcs = FakeVcs::new();
    publish_ab(&mut vcs);
    let mut session = fx.session(vcs);
    fetch_dependencies(&mut session, &[root]).unwrap();

    let layout = InstallLayout::load(&fx.settings().deps_dir).unwrap();
    assert_eq!(layout.name_for_dir(&install_dir_name("a")), Some("a"));
    assert_eq!(layout.name_for_dir(&install_dir_name("b")), Some("b"));
}

// ── node naming ────────────────────────────────────────────

#[test]
fn test_project_name_uses_last_component() {
    assert_eq!(project_name(Path::new("/work/app")), "app");
    assert_eq!(project_name(Path::new("/work/app/")), "app");
}

#[test]
fn test_project_name_canonicalizes_dot_paths() {
    let fx = Fixture::new();
    let root = fx.project("proj", "");
    std::fs::create_dir_all(root.join("sub")).unwrap();
    assert_eq!(project_name(&root.join("sub").join("..")), "proj");
}
