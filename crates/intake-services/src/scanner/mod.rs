//! Malware scanning
//!
//! A scan is a single, time-bounded call against a file on disk. Every failure mode
//! (engine missing, engine error, timeout) is reported as `Verdict::Unavailable`
//! and never as `Infected`; what to do with an unavailable verdict is the
//! ingestion policy's decision.

pub mod clamscan;

#[cfg(feature = "clamav")]
pub mod clamd;

use async_trait::async_trait;
use intake_core::models::ScanOutcome;
use intake_core::{Config, ScannerBackend};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub use clamscan::ClamScanCommand;

#[cfg(feature = "clamav")]
pub use clamd::ClamdScanner;

/// Detail reported for infected files when the engine gives no finding text
pub const DEFAULT_INFECTED_DETAIL: &str = "Malware detected by ClamAV.";
pub const CLEAN_DETAIL: &str = "File is clean (ClamAV).";

#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(&self, path: &Path) -> ScanOutcome;

    /// Backend name for health reporting and logs.
    fn name(&self) -> &'static str;
}

/// Scanner used when scanning is switched off. Every file is `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledScanner;

#[async_trait]
impl Scanner for DisabledScanner {
    async fn scan(&self, _path: &Path) -> ScanOutcome {
        ScanOutcome::unavailable("Malware scanning is disabled.")
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

pub(crate) fn timeout_detail(timeout: Duration) -> String {
    format!("Malware scan timed out after {}s.", timeout.as_secs())
}

/// Build the scanner selected by `SCANNER_BACKEND`.
pub fn scanner_from_config(config: &Config) -> anyhow::Result<Arc<dyn Scanner>> {
    let timeout = Duration::from_secs(config.scan_timeout_secs());

    let scanner: Arc<dyn Scanner> = match config.scanner_backend() {
        ScannerBackend::Clamscan => Arc::new(ClamScanCommand::new(config.clamscan_path(), timeout)),
        #[cfg(feature = "clamav")]
        ScannerBackend::Clamd => Arc::new(ClamdScanner::new(
            config.clamav_host(),
            config.clamav_port(),
            timeout,
        )),
        #[cfg(not(feature = "clamav"))]
        ScannerBackend::Clamd => {
            anyhow::bail!("SCANNER_BACKEND=clamd requires the 'clamav' feature")
        }
        ScannerBackend::Disabled => {
            tracing::warn!("Malware scanning is disabled; every upload is treated as unscanned");
            Arc::new(DisabledScanner)
        }
    };

    tracing::info!(backend = scanner.name(), timeout_secs = timeout.as_secs(), "Malware scanner configured");
    Ok(scanner)
}
