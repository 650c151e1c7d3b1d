//! clamd daemon backend over TCP

use async_trait::async_trait;
use clamav_client::Tcp;
use intake_core::models::ScanOutcome;
use std::path::Path;
use std::time::{Duration, Instant};

use super::{timeout_detail, Scanner, CLEAN_DETAIL};

#[derive(Debug, Clone)]
pub struct ClamdScanner {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ClamdScanner {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Map a raw clamd reply (`stream: OK`, `stream: <name> FOUND`, `... ERROR`).
    pub fn classify_response(response: &[u8]) -> ScanOutcome {
        let text = String::from_utf8_lossy(response);
        let text = text.trim_end_matches('\0').trim();

        match clamav_client::clean(response) {
            Ok(true) => ScanOutcome::clean(CLEAN_DETAIL),
            Ok(false) if text.contains("FOUND") => ScanOutcome::infected(text),
            Ok(false) if text.is_empty() => {
                ScanOutcome::unavailable("Unknown error from malware scanner.")
            }
            Ok(false) => ScanOutcome::unavailable(text),
            Err(e) => ScanOutcome::unavailable(format!("Failed to parse ClamAV response: {}", e)),
        }
    }
}

#[async_trait]
impl Scanner for ClamdScanner {
    /// The client library is synchronous, so the scan runs in `spawn_blocking`.
    #[tracing::instrument(skip(self), fields(scanner = "clamd", path = %path.display()))]
    async fn scan(&self, path: &Path) -> ScanOutcome {
        let start = Instant::now();
        let path = path.to_path_buf();
        let address = format!("{}:{}", self.host, self.port);

        let result = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || {
                let connection = Tcp {
                    host_address: address.as_str(),
                };
                clamav_client::scan_file(&path, connection, None)
            }),
        )
        .await;

        let outcome = match result {
            Ok(Ok(Ok(response))) => Self::classify_response(&response),
            Ok(Ok(Err(e))) => ScanOutcome::unavailable(format!("Error running malware scan: {}", e)),
            Ok(Err(e)) => ScanOutcome::unavailable(format!("Error running malware scan: {}", e)),
            Err(_) => ScanOutcome::unavailable(timeout_detail(self.timeout)),
        };

        tracing::info!(
            host = %self.host,
            port = self.port,
            verdict = %outcome.verdict,
            duration_ms = start.elapsed().as_millis(),
            "Malware scan finished"
        );

        outcome
    }

    fn name(&self) -> &'static str {
        "clamd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::models::Verdict;

    #[test]
    fn test_classify_clean() {
        let outcome = ClamdScanner::classify_response(b"stream: OK\0");
        assert_eq!(outcome.verdict, Verdict::Clean);
    }

    #[test]
    fn test_classify_found() {
        let outcome = ClamdScanner::classify_response(b"stream: Eicar-Signature FOUND\0");
        assert_eq!(outcome.verdict, Verdict::Infected);
        assert_eq!(outcome.detail, "stream: Eicar-Signature FOUND");
    }

    #[test]
    fn test_classify_error_reply() {
        let outcome =
            ClamdScanner::classify_response(b"INSTREAM size limit exceeded. ERROR\0");
        assert_eq!(outcome.verdict, Verdict::Unavailable);
        assert!(outcome.detail.contains("size limit"));
    }

    #[tokio::test]
    async fn test_unreachable_daemon_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        // Port 1 on loopback is closed on any sane test host
        let scanner = ClamdScanner::new("127.0.0.1", 1, Duration::from_secs(5));
        let outcome = scanner.scan(&path).await;

        assert_eq!(outcome.verdict, Verdict::Unavailable);
    }
}
