// Persisting matched candidates

use crate::scan::ScanReport;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One matched base URL per line.
    Text,
    /// Full scan report as a JSON document.
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Write the matched base URLs in one pass. The list goes to a sibling temp
/// file first and is renamed into place, so readers never see a partial list.
pub fn write_matches(path: &Path, candidates: &[String]) -> io::Result<()> {
    let mut content = String::new();
    for candidate in candidates {
        content.push_str(candidate);
        content.push('\n');
    }

    let tmp_path = temp_sibling(path);
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}

pub fn write_json_report(path: &Path, report: &ScanReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    let tmp_path = temp_sibling(path);
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}

/// Write the final result in the requested format.
pub fn persist_report(path: &Path, format: OutputFormat, report: &ScanReport) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_matches(path, &report.matched_candidates()),
        OutputFormat::Json => write_json_report(path, report),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "portalfinder-output".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Appends matches to a file as they arrive, from a dedicated writer task.
///
/// Producers only enqueue lines, so any number of them can share one writer.
/// A failed write is logged and that line is lost; the scan goes on.
#[derive(Debug)]
pub struct AppendWriter {
    tx: mpsc::UnboundedSender<String>,
    handle: JoinHandle<usize>,
}

impl AppendWriter {
    pub async fn open(path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let display_path = path.display().to_string();

        let handle = tokio::spawn(async move {
            let mut written = 0;
            while let Some(line) = rx.recv().await {
                let record = format!("{}\n", line);
                let result = match file.write_all(record.as_bytes()).await {
                    Ok(()) => file.flush().await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) => {
                        written += 1;
                        debug!("Appended {} to {}", line, display_path);
                    }
                    Err(e) => warn!("Failed to write {} to {}: {}", line, display_path, e),
                }
            }
            written
        });

        Ok(Self { tx, handle })
    }

    pub fn record(&self, candidate: &str) {
        if self.tx.send(candidate.to_string()).is_err() {
            warn!("Output writer has stopped, dropping {}", candidate);
        }
    }

    /// Close the queue, wait for pending lines and return how many were written.
    pub async fn finish(self) -> usize {
        drop(self.tx);
        match self.handle.await {
            Ok(written) => written,
            Err(e) => {
                warn!("Output writer task failed: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_temp_sibling() {
        let tmp = temp_sibling(Path::new("/tmp/out/valid.txt"));
        assert_eq!(tmp, PathBuf::from("/tmp/out/valid.txt.tmp"));
    }

    #[test]
    fn test_write_matches_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("valid.txt");
        fs::write(&path, "stale\n").unwrap();

        write_matches(
            &path,
            &["https://a.test".to_string(), "https://c.test".to_string()],
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://a.test\nhttps://c.test\n"
        );
        assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn test_write_matches_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("valid.txt");
        assert!(write_matches(&path, &["https://a.test".to_string()]).is_err());
    }

    #[test]
    fn test_write_json_report_cleans_up_on_failed_rename() {
        let temp_dir = TempDir::new().unwrap();
        // A directory at the target path makes the final rename fail.
        let path = temp_dir.path().join("report.json");
        fs::create_dir(&path).unwrap();

        let outcome = portalfinder_scanner::ScanOutcome {
            total: 1,
            completed: 1,
            ..Default::default()
        };
        let report = ScanReport::from_outcome(
            outcome,
            chrono::Utc::now(),
            crate::progress::ReporterSummary::default(),
        );

        assert!(write_json_report(&path, &report).is_err());
        assert!(!temp_sibling(&path).exists());
    }

    #[tokio::test]
    async fn test_append_writer_appends_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("valid.txt");
        fs::write(&path, "https://earlier.test\n").unwrap();

        let writer = AppendWriter::open(&path).await.unwrap();
        writer.record("https://a.test");
        writer.record("https://b.test");
        assert_eq!(writer.finish().await, 2);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://earlier.test\nhttps://a.test\nhttps://b.test\n"
        );
    }

    #[tokio::test]
    async fn test_append_writer_shared_by_many_tasks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("valid.txt");

        let writer = std::sync::Arc::new(AppendWriter::open(&path).await.unwrap());
        let mut tasks = Vec::new();
        for i in 0..20 {
            let writer = writer.clone();
            tasks.push(tokio::spawn(async move {
                writer.record(&format!("https://host{}.test", i));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let writer = std::sync::Arc::try_unwrap(writer).unwrap();
        assert_eq!(writer.finish().await, 20);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|l| l.starts_with("https://host")));
    }

    #[tokio::test]
    async fn test_append_writer_open_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("valid.txt");
        assert!(AppendWriter::open(&path).await.is_err());
    }
}
