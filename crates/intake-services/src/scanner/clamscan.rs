//! `clamscan` command-line backend

use async_trait::async_trait;
use intake_core::models::ScanOutcome;
use std::io::ErrorKind;
use std::path::Path;
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::{timeout_detail, Scanner, CLEAN_DETAIL, DEFAULT_INFECTED_DETAIL};

/// Runs `clamscan --no-summary <path>` once per file.
///
/// Exit code 0 is clean, 1 is infected (stdout carries the finding), anything else
/// means the engine could not give a verdict.
#[derive(Debug, Clone)]
pub struct ClamScanCommand {
    binary: String,
    timeout: Duration,
}

impl ClamScanCommand {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Map a finished process to a verdict.
    pub fn classify(status: ExitStatus, stdout: &str, stderr: &str) -> ScanOutcome {
        match status.code() {
            Some(0) => ScanOutcome::clean(CLEAN_DETAIL),
            Some(1) => ScanOutcome::infected(non_empty(stdout).unwrap_or(DEFAULT_INFECTED_DETAIL)),
            _ => ScanOutcome::unavailable(
                non_empty(stderr).unwrap_or("Unknown error from malware scanner."),
            ),
        }
    }
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[async_trait]
impl Scanner for ClamScanCommand {
    #[tracing::instrument(skip(self), fields(scanner = "clamscan", path = %path.display()))]
    async fn scan(&self, path: &Path) -> ScanOutcome {
        let start = Instant::now();

        let run = Command::new(&self.binary)
            .arg("--no-summary")
            .arg(path)
            .kill_on_drop(true)
            .output();

        let outcome = match tokio::time::timeout(self.timeout, run).await {
            Err(_) => ScanOutcome::unavailable(timeout_detail(self.timeout)),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                ScanOutcome::unavailable("Malware scanner (clamscan) not found on this system.")
            }
            Ok(Err(e)) => ScanOutcome::unavailable(format!("Error running malware scan: {}", e)),
            Ok(Ok(output)) => Self::classify(
                output.status,
                &String::from_utf8_lossy(&output.stdout),
                &String::from_utf8_lossy(&output.stderr),
            ),
        };

        tracing::info!(
            verdict = %outcome.verdict,
            duration_ms = start.elapsed().as_millis(),
            "Malware scan finished"
        );

        outcome
    }

    fn name(&self) -> &'static str {
        "clamscan"
    }
}
