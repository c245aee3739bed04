//! Abstractions over the external process and filesystem.
//!
//! The collection loop talks to the monitored process only through these
//! traits, so it can be driven by the real `gops` binary in production and by
//! in-memory doubles (see [`crate::collector::mock`]) in tests.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::trace;

/// The two diagnostic dumps taken every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `gops memstats` — heap and GC statistics.
    HeapGc,
    /// `gops stats` — goroutine and OS thread counts.
    Scheduler,
}

impl SourceKind {
    /// gops subcommand producing this dump.
    pub fn subcommand(self) -> &'static str {
        match self {
            SourceKind::HeapGc => "memstats",
            SourceKind::Scheduler => "stats",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::HeapGc => write!(f, "heap/GC"),
            SourceKind::Scheduler => write!(f, "scheduler-level"),
        }
    }
}

/// Error type for diagnostic command failures.
#[derive(Debug)]
pub enum SourceError {
    /// The command could not be started.
    Spawn(io::Error),
    /// The command ran but exited unsuccessfully.
    Exit { code: Option<i32>, output: String },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Spawn(e) => write!(f, "failed to run command: {}", e),
            SourceError::Exit { code, output } => {
                match code {
                    Some(code) => write!(f, "exit status {}", code)?,
                    None => write!(f, "terminated by signal")?,
                }
                let output = output.trim();
                if !output.is_empty() {
                    write!(f, ": {}", output)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Spawn(e) => Some(e),
            SourceError::Exit { .. } => None,
        }
    }
}

impl From<io::Error> for SourceError {
    fn from(e: io::Error) -> Self {
        SourceError::Spawn(e)
    }
}

/// Produces the raw diagnostic text of a process.
pub trait DiagnosticSource {
    /// Runs the dump for `kind` against `pid` and returns its output lines.
    fn dump(&self, kind: SourceKind, pid: u32) -> Result<Vec<String>, SourceError>;
}

/// Reports whether a process still exists.
pub trait Liveness {
    fn is_running(&self, pid: u32) -> bool;
}

/// Runs the `gops` CLI as a subprocess.
#[derive(Debug, Clone)]
pub struct GopsCli {
    bin: PathBuf,
}

impl GopsCli {
    /// Creates a runner for the given `gops` executable (name or path).
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Default for GopsCli {
    fn default() -> Self {
        Self::new("gops")
    }
}

impl DiagnosticSource for GopsCli {
    fn dump(&self, kind: SourceKind, pid: u32) -> Result<Vec<String>, SourceError> {
        trace!("running {} {} {}", self.bin.display(), kind.subcommand(), pid);
        let output = Command::new(&self.bin)
            .arg(kind.subcommand())
            .arg(pid.to_string())
            .output()?;

        // gops reports some errors on stdout, so both streams are kept.
        let text = combine_output(&output.stdout, &output.stderr);

        if !output.status.success() {
            return Err(SourceError::Exit {
                code: output.status.code(),
                output: text,
            });
        }

        Ok(text.lines().map(str::to_string).collect())
    }
}

/// Joins stdout and stderr, keeping the last stdout line separate.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&String::from_utf8_lossy(stderr));
    }
    text
}

/// Minimal filesystem view needed for liveness checks.
pub trait FileSystem: Send + Sync {
    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Liveness check through `/proc/[pid]`.
#[derive(Debug, Clone)]
pub struct ProcfsLiveness<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
}

impl<F: FileSystem> ProcfsLiveness<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }
}

impl<F: FileSystem> Liveness for ProcfsLiveness<F> {
    fn is_running(&self, pid: u32) -> bool {
        self.fs.exists(&self.proc_path.join(pid.to_string()))
    }
}

/// Liveness check through `ps -p <pid>`, for systems without procfs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PsLiveness;

impl Liveness for PsLiveness {
    fn is_running(&self, pid: u32) -> bool {
        Command::new("ps")
            .arg("-p")
            .arg(pid.to_string())
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_source_kind_names() {
        assert_eq!(SourceKind::HeapGc.subcommand(), "memstats");
        assert_eq!(SourceKind::Scheduler.subcommand(), "stats");
        assert_eq!(SourceKind::HeapGc.to_string(), "heap/GC");
        assert_eq!(SourceKind::Scheduler.to_string(), "scheduler-level");
    }

    #[test]
    fn test_combine_output_keeps_lines_apart() {
        let text = combine_output(b"alloc: 1024 bytes", b"warning: stale socket\n");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["alloc: 1024 bytes", "warning: stale socket"]);

        assert_eq!(combine_output(b"a: 1\n", b"b: 2\n"), "a: 1\nb: 2\n");
        assert_eq!(combine_output(b"a: 1", b""), "a: 1");
        assert_eq!(combine_output(b"", b"err\n"), "err\n");
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Exit {
            code: Some(1),
            output: "Couldn't connect to the agent\n".to_string(),
        };
        assert_eq!(err.to_string(), "exit status 1: Couldn't connect to the agent");

        let err = SourceError::Exit {
            code: None,
            output: String::new(),
        };
        assert_eq!(err.to_string(), "terminated by signal");
    }

    #[test]
    fn test_gops_cli_missing_binary() {
        let cli = GopsCli::new("/nonexistent/gops-binary-12345");
        let err = cli.dump(SourceKind::HeapGc, 1).unwrap_err();
        assert!(matches!(err, SourceError::Spawn(_)));
    }

    #[test]
    fn test_procfs_liveness_with_mock() {
        let mut fs = MockFs::new();
        fs.add_dir("/proc/4242");
        let liveness = ProcfsLiveness::new(fs, "/proc");

        assert!(liveness.is_running(4242));
        assert!(!liveness.is_running(4243));
    }

    #[test]
    fn test_procfs_liveness_with_real_fs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("77")).unwrap();
        let liveness = ProcfsLiveness::new(RealFs::new(), dir.path());

        assert!(liveness.is_running(77));
        assert!(!liveness.is_running(78));
    }
}
