use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a probe response, after the status and size gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeBody {
    Text(String),
    /// Body exceeded the ceiling; carries the number of bytes seen before giving up.
    Oversized(usize),
    /// Status outside 2xx/3xx, body never read.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub url: String,
    pub status_code: u16,
    /// `Location` header, only captured for 3xx responses.
    pub location: Option<String>,
    pub body: ProbeBody,
}

impl ProbeResponse {
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ProbeBody::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// What the classifier saw in one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub keyword_hit: Option<String>,
    pub link_hit: bool,
    pub has_form: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    KeywordWithForm,
    LinkWithForm,
    None,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::KeywordWithForm => "Keywords in body with form",
            DetectionMethod::LinkWithForm => "Links or buttons in body with form",
            DetectionMethod::None => "None",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    pub candidate: String,
    pub matched: bool,
    pub method: DetectionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<String>,
    /// Path suffix that produced the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_path: Option<String>,
}

impl ClassificationVerdict {
    pub fn not_matched(candidate: String, redirect_target: Option<String>) -> Self {
        Self {
            candidate,
            matched: false,
            method: DetectionMethod::None,
            matched_keyword: None,
            redirect_target,
            matched_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
}

/// Aggregate result of one orchestrated scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Verdicts with `matched == true`, in completion order.
    pub matched: Vec<ClassificationVerdict>,
    pub completed: usize,
    pub total: usize,
    pub cancelled: bool,
}

impl ScanOutcome {
    pub fn matched_candidates(&self) -> Vec<String> {
        self.matched.iter().map(|v| v.candidate.clone()).collect()
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.completed == self.total
    }
}
