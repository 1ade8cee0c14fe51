//! Session directories are removed on every exit path
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use solver_sessions::{SessionError, SolverConfig, SolverSession};

fn config(work: &Path, timeout: Duration) -> SolverConfig {
    SolverConfig {
        timeout,
        work_dir: Some(work.to_path_buf()),
        ..SolverConfig::default()
    }
}

fn shell_session(config: &SolverConfig, script: &[&str]) -> SolverSession {
    let mut session = SolverSession::new("sh", Path::new("sh"), config).unwrap();
    session.run_all(script.iter().copied());
    session
}

fn leftovers(work: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(work).unwrap().map(|e| e.unwrap().path()).collect()
}

#[test]
fn normal_exit_cleans_up() {
    let work = tempfile::tempdir().unwrap();
    let config = config(work.path(), Duration::from_secs(10));

    let session = shell_session(&config, &["echo 0.5 > result.txt", "exit 0"]);
    let dir = session.path().to_path_buf();
    assert!(dir.starts_with(work.path()));

    session.execute().unwrap();
    assert_eq!(session.read_file("result.txt").unwrap().trim(), "0.5");
    drop(session);

    assert!(!dir.exists());
    assert!(leftovers(work.path()).is_empty());
}

#[test]
fn failing_exit_cleans_up() {
    let work = tempfile::tempdir().unwrap();
    let config = config(work.path(), Duration::from_secs(10));

    let dir = {
        let session = shell_session(&config, &["echo 'no convergence' >&2", "exit 3"]);
        match session.execute() {
            Err(SessionError::Failed { status, detail, .. }) => {
                assert!(status.contains('3'));
                assert_eq!(detail, "no convergence");
            }
            other => panic!("expected a failed run, got {:?}", other),
        }
        session.path().to_path_buf()
    };

    assert!(!dir.exists());
    assert!(leftovers(work.path()).is_empty());
}

#[test]
fn timeout_kills_and_cleans_up() {
    let work = tempfile::tempdir().unwrap();
    let config = config(work.path(), Duration::from_millis(200));

    let session = shell_session(&config, &["sleep 5"]);
    let dir = session.path().to_path_buf();

    let started = Instant::now();
    let err = session.execute().unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(matches!(err, SessionError::Timeout { .. }));

    let blade_err: blade_loads::error::BladeError = err.into();
    assert!(blade_err.is_retryable());

    drop(session);
    assert!(!dir.exists());
    assert!(leftovers(work.path()).is_empty());
}

#[test]
fn sessions_do_not_share_directories() {
    let work = tempfile::tempdir().unwrap();
    let config = config(work.path(), Duration::from_secs(10));

    let a = shell_session(&config, &["exit 0"]);
    let b = shell_session(&config, &["exit 0"]);
    assert_ne!(a.path(), b.path());
    assert_ne!(a.id(), b.id());
    assert_eq!(leftovers(work.path()).len(), 2);
}
