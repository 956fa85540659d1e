//! Shared helpers for CLI commands: project path resolution and running a
//! command under a Ctrl-C listener.

use std::path::{Path, PathBuf};

use quay_cache::CancellationFlag;
use tracing::warn;

/// Boxed error returned by command implementations.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// Exit status after an interrupt.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Resolves the project directory: `path` when given, else the current directory.
pub fn resolve_project_path(path: Option<&Path>) -> Result<PathBuf, CommandError> {
    let dir = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !dir.is_dir() {
        return Err(format!("project directory {} does not exist", dir.display()).into());
    }
    Ok(dir)
}

/// Runs `command` on the blocking pool while listening for Ctrl-C.
///
/// On interrupt the cancellation flag handed to `command` is set, the
/// command is awaited so workers stop cleanly, and [`EXIT_INTERRUPTED`] is
/// returned. Otherwise returns the command's exit code, or 1 after printing
/// its error.
pub async fn run_interruptible<F>(command: F) -> i32
where
    F: FnOnce(CancellationFlag) -> Result<i32, CommandError> + Send + 'static,
{
    let cancellation = CancellationFlag::new();
    let worker_flag = cancellation.clone();
    let mut handle = tokio::task::spawn_blocking(move || command(worker_flag));

    let signal = tokio::select! {
        joined = &mut handle => return exit_code(joined, &cancellation),
        signal = tokio::signal::ctrl_c() => signal,
    };

    match signal {
        Ok(()) => {
            warn!("interrupted, stopping");
            cancellation.cancel();
            let _ = handle.await;
            EXIT_INTERRUPTED
        }
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C");
            exit_code(handle.await, &cancellation)
        }
    }
}

fn exit_code(
    joined: Result<Result<i32, CommandError>, tokio::task::JoinError>,
    cancellation: &CancellationFlag,
) -> i32 {
    match joined {
        Ok(Ok(code)) => code,
        Ok(Err(_)) if cancellation.is_cancelled() => EXIT_INTERRUPTED,
        Ok(Err(e)) => {
            eprintln!("error: {e}");
            1
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}
