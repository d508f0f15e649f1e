use crate::classifier::{Classifier, match_rule};
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::prober::Prober;
use crate::result::{ClassificationVerdict, DetectionMethod};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Walks the configured path list for one candidate and stops at the first
/// path whose response satisfies a match rule.
#[derive(Debug, Clone)]
pub struct CandidateScanner {
    prober: Prober,
    classifier: Classifier,
    paths: Vec<String>,
}

impl CandidateScanner {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        config.validate()?;
        Self::with_prober(Prober::new(config)?, config)
    }

    /// Build around an existing prober, e.g. one sharing a caller's client.
    pub fn with_prober(prober: Prober, config: &ProbeConfig) -> Result<Self> {
        Ok(Self {
            prober,
            classifier: Classifier::new(config)?,
            paths: config.paths.clone(),
        })
    }

    pub async fn scan(&self, candidate: &str) -> ClassificationVerdict {
        let mut redirect_target = None;

        for path in &self.paths {
            let response = match self.prober.probe(candidate, path).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("{}", e);
                    continue;
                }
            };

            if response.location.is_some() {
                redirect_target = response.location.clone();
            }

            let Some(body) = response.text() else {
                continue;
            };

            let classification = self.classifier.classify(body);
            if let Some(method) = match_rule(&classification) {
                debug!("{} matched on /{} via {}", candidate, path, method);
                let matched_keyword = match method {
                    DetectionMethod::KeywordWithForm => classification.keyword_hit,
                    _ => None,
                };
                return ClassificationVerdict {
                    candidate: candidate.to_string(),
                    matched: true,
                    method,
                    matched_keyword,
                    redirect_target,
                    matched_path: Some(path.clone()),
                };
            }
        }

        ClassificationVerdict::not_matched(candidate.to_string(), redirect_target)
    }

    /// Like [`scan`](Self::scan), but returns `None` as soon as `cancel` fires,
    /// dropping whatever probe is in flight.
    pub async fn scan_cancellable(
        &self,
        candidate: &str,
        cancel: &CancellationToken,
    ) -> Option<ClassificationVerdict> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            verdict = self.scan(candidate) => Some(verdict),
        }
    }
}
