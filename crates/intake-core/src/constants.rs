/// Audit user agent strings are truncated to this many characters.
pub const MAX_USER_AGENT_LEN: usize = 255;

/// Longest original file name accepted for an upload.
pub const MAX_FILENAME_LEN: usize = 255;

/// Number of hex characters shown by the short hash helpers.
pub const SHORT_HASH_LEN: usize = 10;

/// Default bound on a single malware scan.
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 60;

/// Default bound on one OCR run over an image.
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;

/// Prefix for every stored source file key.
pub const SOURCE_KEY_PREFIX: &str = "sources";

pub const API_PREFIX: &str = "/api/v0";
