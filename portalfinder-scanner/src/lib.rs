pub mod candidate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prober;
pub mod result;

pub use candidate::CandidateScanner;
pub use classifier::Classifier;
pub use config::{Preset, ProbeConfig};
pub use error::{ProbeError, ScanError};
pub use orchestrator::{Orchestrator, VerdictCallback, default_concurrency};
pub use prober::Prober;
pub use result::{
    ClassificationVerdict, DetectionMethod, ProbeBody, ProbeResponse, ProgressEvent, ScanOutcome,
};
pub use tokio_util::sync::CancellationToken;
