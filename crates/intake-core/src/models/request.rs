use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::MAX_USER_AGENT_LEN;

/// Authenticated identity acting on a request, supplied by the upstream identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(pub Uuid);

impl Principal {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Origin metadata captured from the HTTP request for the audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl RequestMeta {
    pub fn new(ip_address: Option<String>, user_agent: Option<&str>) -> Self {
        Self {
            ip_address: ip_address.filter(|ip| !ip.is_empty()),
            user_agent: truncate_user_agent(user_agent.unwrap_or_default()),
        }
    }
}

/// Truncate on a character boundary so multi-byte agents never split a code point.
pub fn truncate_user_agent(user_agent: &str) -> String {
    user_agent.chars().take(MAX_USER_AGENT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_truncated() {
        let long = "A".repeat(400);
        let meta = RequestMeta::new(None, Some(&long));
        assert_eq!(meta.user_agent.chars().count(), MAX_USER_AGENT_LEN);
    }

    #[test]
    fn test_user_agent_multibyte_boundary() {
        let long = "é".repeat(300);
        let truncated = truncate_user_agent(&long);
        assert_eq!(truncated.chars().count(), MAX_USER_AGENT_LEN);
    }

    #[test]
    fn test_empty_ip_is_none() {
        let meta = RequestMeta::new(Some(String::new()), None);
        assert!(meta.ip_address.is_none());
        assert_eq!(meta.user_agent, "");
    }
}
