use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BODY_SIZE_CEILING: usize = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FORM_PATTERN: &str = r"<form[^>]*>";
pub const DEFAULT_USER_AGENT: &str = concat!("PortalFinder/", env!("CARGO_PKG_VERSION"));

const EXTENDED_PATHS: &[&str] = &[
    "login",
    "register",
    "signup",
    "signin",
    "create-account",
    "log-in",
    "sign-in",
    "sign-up",
    "authentication",
    "forgot-password",
    "reset-password",
];

const EXTENDED_KEYWORDS: &[&str] = &[
    "login",
    "register",
    "signup",
    "signin",
    "create account",
    "log in",
    "sign in",
    "sign up",
    "authentication",
    "forgot password",
    "reset password",
];

const COMPACT_PATHS: &[&str] = &["login", "register", "signup", "signin", "account", "auth"];

const COMPACT_KEYWORDS: &[&str] = &["login", "register", "sign up", "sign in", "create account"];

/// Named path/keyword sets shipped with the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Eleven paths, eleven keywords.
    #[default]
    Extended,
    /// Six paths, five keywords.
    Compact,
}

impl Preset {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "extended" | "full" => Some(Preset::Extended),
            "compact" | "short" => Some(Preset::Compact),
            _ => None,
        }
    }
}

/// Everything a probe run needs to know about what to request and how to
/// judge the answer. Built once and shared read-only by every worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Path suffixes tried in order for each candidate.
    pub paths: Vec<String>,
    /// Keywords matched case-insensitively, first hit in this order wins.
    pub keywords: Vec<String>,
    /// Regex that identifies a form-opening tag.
    pub form_pattern: String,
    /// Bodies larger than this many bytes are discarded.
    pub body_size_ceiling: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl ProbeConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let (paths, keywords) = match preset {
            Preset::Extended => (EXTENDED_PATHS, EXTENDED_KEYWORDS),
            Preset::Compact => (COMPACT_PATHS, COMPACT_KEYWORDS),
        };

        Self {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            form_pattern: DEFAULT_FORM_PATTERN.to_string(),
            body_size_ceiling: DEFAULT_BODY_SIZE_CEILING,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn extended() -> Self {
        Self::from_preset(Preset::Extended)
    }

    pub fn compact() -> Self {
        Self::from_preset(Preset::Compact)
    }

    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_form_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.form_pattern = pattern.into();
        self
    }

    pub fn with_body_size_ceiling(mut self, bytes: usize) -> Self {
        self.body_size_ceiling = bytes;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Reject configurations that could never produce a verdict.
    pub fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(ScanError::Config("path list is empty".to_string()));
        }
        if self.keywords.is_empty() {
            return Err(ScanError::Config("keyword list is empty".to_string()));
        }
        if self.paths.iter().any(|p| p.trim().is_empty()) {
            return Err(ScanError::Config("path list contains a blank entry".to_string()));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ScanError::Config(
                "keyword list contains a blank entry".to_string(),
            ));
        }
        if self.body_size_ceiling == 0 {
            return Err(ScanError::Config(
                "body size ceiling must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ScanError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::extended()
    }
}
