//! Configuration module
//!
//! Settings are read once from the environment (with `.env` support) at startup.

use std::env;
use std::str::FromStr;

use crate::constants::{DEFAULT_OCR_TIMEOUT_SECS, DEFAULT_SCAN_TIMEOUT_SECS};

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 50;
const CLAMAV_PORT: u16 = 3310;

/// Which malware scanner implementation to wire into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerBackend {
    /// Shell out to the `clamscan` binary per file
    Clamscan,
    /// Stream the file to a clamd daemon over TCP
    Clamd,
    /// Never scan; every verdict is Unavailable
    Disabled,
}

impl FromStr for ScannerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clamscan" => Ok(ScannerBackend::Clamscan),
            "clamd" => Ok(ScannerBackend::Clamd),
            "disabled" | "none" => Ok(ScannerBackend::Disabled),
            other => Err(anyhow::anyhow!(
                "SCANNER_BACKEND must be one of clamscan, clamd, disabled (got '{}')",
                other
            )),
        }
    }
}

impl std::fmt::Display for ScannerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScannerBackend::Clamscan => f.write_str("clamscan"),
            ScannerBackend::Clamd => f.write_str("clamd"),
            ScannerBackend::Disabled => f.write_str("disabled"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub environment: String,
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage_path: String,
    pub max_upload_size_bytes: usize,
    // Scanner configuration
    pub scanner_backend: ScannerBackend,
    pub clamscan_path: String,
    pub clamav_host: String,
    pub clamav_port: u16,
    pub scan_timeout_secs: u64,
    pub scanner_fail_closed: bool,
    // Extraction
    pub ocr_enabled: bool,
    pub tesseract_path: String,
    pub ocr_timeout_secs: u64,
    // Request metadata
    pub trusted_proxy_count: usize,
    pub principal_header: String,
    pub log_format: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IngestConfig>);

impl Config {
    fn inner(&self) -> &IngestConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = IngestConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn storage_path(&self) -> &str {
        &self.inner().storage_path
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn scanner_backend(&self) -> ScannerBackend {
        self.inner().scanner_backend
    }

    pub fn clamscan_path(&self) -> &str {
        &self.inner().clamscan_path
    }

    pub fn clamav_host(&self) -> &str {
        &self.inner().clamav_host
    }

    pub fn clamav_port(&self) -> u16 {
        self.inner().clamav_port
    }

    pub fn scan_timeout_secs(&self) -> u64 {
        self.inner().scan_timeout_secs
    }

    pub fn scanner_fail_closed(&self) -> bool {
        self.inner().scanner_fail_closed
    }

    pub fn ocr_enabled(&self) -> bool {
        self.inner().ocr_enabled
    }

    pub fn tesseract_path(&self) -> &str {
        &self.inner().tesseract_path
    }

    pub fn ocr_timeout_secs(&self) -> u64 {
        self.inner().ocr_timeout_secs
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.inner().trusted_proxy_count
    }

    pub fn principal_header(&self) -> &str {
        &self.inner().principal_header
    }

    pub fn log_format(&self) -> &str {
        &self.inner().log_format
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default)
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let config = IngestConfig {
            environment,
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_path: env::var("STORAGE_PATH").unwrap_or_else(|_| "./data/uploads".to_string()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            scanner_backend: env::var("SCANNER_BACKEND")
                .unwrap_or_else(|_| "clamscan".to_string())
                .parse()?,
            clamscan_path: env::var("CLAMSCAN_PATH").unwrap_or_else(|_| "clamscan".to_string()),
            clamav_host: env::var("CLAMAV_HOST").unwrap_or_else(|_| "localhost".to_string()),
            clamav_port: env::var("CLAMAV_PORT")
                .unwrap_or_else(|_| CLAMAV_PORT.to_string())
                .parse()
                .unwrap_or(CLAMAV_PORT),
            scan_timeout_secs: env::var("SCAN_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_SCAN_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_SCAN_TIMEOUT_SECS),
            // Fail open unless explicitly told otherwise
            scanner_fail_closed: env_bool("SCANNER_FAIL_CLOSED", false),
            ocr_enabled: env_bool("OCR_ENABLED", false),
            tesseract_path: env::var("TESSERACT_PATH").unwrap_or_else(|_| "tesseract".to_string()),
            ocr_timeout_secs: env::var("OCR_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_OCR_TIMEOUT_SECS),
            trusted_proxy_count: env::var("TRUSTED_PROXY_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            principal_header: env::var("PRINCIPAL_HEADER")
                .unwrap_or_else(|_| "x-principal-id".to_string())
                .to_lowercase(),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.scan_timeout_secs == 0 {
            return Err(anyhow::anyhow!("SCAN_TIMEOUT_SECS must be greater than 0"));
        }

        if self.ocr_enabled && self.ocr_timeout_secs == 0 {
            return Err(anyhow::anyhow!("OCR_TIMEOUT_SECS must be greater than 0"));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.storage_path.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_PATH must not be empty"));
        }

        if self.principal_header.trim().is_empty() {
            return Err(anyhow::anyhow!("PRINCIPAL_HEADER must not be empty"));
        }

        Ok(())
    }
}
