//! Scoped run of an interactive Fortran solver
//!
//! A session owns a private temp directory. Commands are queued, written to
//! a file and piped into the solver's stdin; everything the solver writes
//! stays inside the directory, which is removed when the session drops,
//! whether the run succeeded, failed or timed out.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use uuid::Uuid;

use crate::config::SolverConfig;
use crate::error::{SessionError, SessionResult};

const COMMAND_FILE: &str = "commands.txt";
const STDOUT_FILE: &str = "stdout.log";
const STDERR_FILE: &str = "stderr.log";
const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct SolverSession {
    solver: String,
    executable: PathBuf,
    timeout: Duration,
    debug_export: Option<PathBuf>,
    id: Uuid,
    dir: TempDir,
    commands: Vec<String>,
}

impl SolverSession {
    pub fn new(solver: &str, executable: &Path, config: &SolverConfig) -> SessionResult<Self> {
        let id = Uuid::new_v4();
        let prefix = format!("{}_", solver);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match &config.work_dir {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };

        tracing::debug!("Starting {} session {} in {:?}", solver, id, dir.path());

        Ok(Self {
            solver: solver.to_string(),
            executable: executable.to_path_buf(),
            timeout: config.timeout,
            debug_export: config.debug_export.clone(),
            id,
            dir,
            commands: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Working directory of the solver
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Queue one input line
    pub fn run(&mut self, command: impl ToString) -> &mut Self {
        self.commands.push(command.to_string());
        self
    }

    /// Queue one line per value
    pub fn run_all<I>(&mut self, commands: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.commands.extend(commands.into_iter().map(|c| c.to_string()));
        self
    }

    pub fn write_file(&self, name: &str, contents: &str) -> SessionResult<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Read a file the solver wrote
    pub fn read_file(&self, name: &str) -> SessionResult<String> {
        let path = self.path().join(name);
        fs::read_to_string(&path).map_err(|e| {
            SessionError::Parse(format!("{} did not write {}: {}", self.solver, name, e))
        })
    }

    /// Feed the queued commands to the solver and wait for it to exit.
    ///
    /// A solver still running after the timeout is killed and reaped.
    pub fn execute(&self) -> SessionResult<()> {
        let mut input = self.commands.join("\n");
        input.push('\n');
        let command_path = self.write_file(COMMAND_FILE, &input)?;

        tracing::info!(
            "Running {} session {}: {} commands via {:?}",
            self.solver,
            self.id,
            self.commands.len(),
            self.executable
        );

        let mut child = Command::new(&self.executable)
            .current_dir(self.path())
            .stdin(Stdio::from(File::open(&command_path)?))
            .stdout(Stdio::from(File::create(self.path().join(STDOUT_FILE))?))
            .stderr(Stdio::from(File::create(self.path().join(STDERR_FILE))?))
            .spawn()
            .map_err(|source| SessionError::Spawn {
                solver: self.solver.clone(),
                source,
            })?;

        let status = self.wait(&mut child)?;
        if !status.success() {
            let detail = self.tail(STDERR_FILE).or_else(|| self.tail(STDOUT_FILE)).unwrap_or_default();
            tracing::error!("{} session {} exited with {}: {}", self.solver, self.id, status, detail);
            return Err(SessionError::Failed {
                solver: self.solver.clone(),
                status: status.to_string(),
                detail,
            });
        }
        tracing::debug!("{} session {} finished", self.solver, self.id);
        Ok(())
    }

    fn wait(&self, child: &mut Child) -> SessionResult<ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    "{} session {} exceeded {:?}, killing pid {}",
                    self.solver,
                    self.id,
                    self.timeout,
                    child.id()
                );
                // already exited between the poll and the kill is fine
                let _ = child.kill();
                child.wait()?;
                return Err(SessionError::Timeout {
                    solver: self.solver.clone(),
                    seconds: self.timeout.as_secs(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Last non-empty lines of a log file
    fn tail(&self, name: &str) -> Option<String> {
        let text = fs::read_to_string(self.path().join(name)).ok()?;
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return None;
        }
        Some(lines[lines.len().saturating_sub(5)..].join("\n"))
    }

    fn export_debug_files(&self, dest_dir: &Path) {
        if let Err(err) = fs::create_dir_all(dest_dir) {
            tracing::warn!("Failed to create debug export directory {:?}: {}", dest_dir, err);
            return;
        }
        let entries = match fs::read_dir(self.path()) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("Failed to list session directory {:?}: {}", self.path(), err);
                return;
            }
        };

        let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S");
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let dest_file = dest_dir.join(format!(
                "{}_{}_{}_{}",
                self.solver,
                stamp,
                self.id,
                file_name.to_string_lossy()
            ));
            if let Err(err) = fs::copy(entry.path(), &dest_file) {
                tracing::warn!("Failed to export debug file {:?}: {}", dest_file, err);
            } else {
                tracing::debug!("Exported debug file to {:?}", dest_file);
            }
        }
    }
}

impl Drop for SolverSession {
    fn drop(&mut self) {
        if let Some(dest_dir) = &self.debug_export {
            self.export_debug_files(dest_dir);
        }
        tracing::debug!("Cleaning up {} session {} at {:?}", self.solver, self.id, self.path());
    }
}
