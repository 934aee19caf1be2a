//! Process table access for post-launch verification.

use std::future::Future;
use std::pin::Pin;

use crate::error::LaunchError;

/// One row of a `ps -ef` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub ppid: u32,
    pub command: String,
}

/// Parses `ps -ef` output.
///
/// Columns are `UID PID PPID C STIME TTY TIME CMD`, separated by runs of
/// whitespace. The command is taken verbatim from the rest of the line.
/// Rows with a non-numeric PID (the header among them) are skipped.
pub fn parse_process_table(table: &str) -> Vec<ProcessEntry> {
    table
        .lines()
        .filter_map(|line| {
            let (_uid, rest) = next_field(line)?;
            let (pid, rest) = next_field(rest)?;
            let (ppid, mut rest) = next_field(rest)?;
            for _ in 0..4 {
                rest = next_field(rest)?.1;
            }
            Some(ProcessEntry {
                pid: pid.parse().ok()?,
                ppid: ppid.parse().ok()?,
                command: rest.trim().to_string(),
            })
        })
        .collect()
}

/// Splits off the next whitespace-delimited field.
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some(s.split_at(end))
}

/// Source of the system process table.
pub trait ProcessLister: Send + Sync {
    /// Returns the raw `ps -ef` style listing.
    fn list(&self) -> Pin<Box<dyn Future<Output = Result<String, LaunchError>> + Send + '_>>;

    /// PID of the current process, excluded from matches.
    fn own_pid(&self) -> u32;
}

/// Lists processes by running `ps -ef`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsProcessLister;

impl ProcessLister for PsProcessLister {
    fn list(&self) -> Pin<Box<dyn Future<Output = Result<String, LaunchError>> + Send + '_>> {
        Box::pin(async move {
            let output = tokio::process::Command::new("ps")
                .arg("-ef")
                .output()
                .await
                .map_err(|e| LaunchError::ProcessList(format!("failed to run ps: {e}")))?;

            if !output.status.success() {
                return Err(LaunchError::ProcessList(format!(
                    "ps exited with {}",
                    output.status
                )));
            }

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        })
    }

    fn own_pid(&self) -> u32 {
        std::process::id()
    }
}
