use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use portalfinder_core::config::{Overrides, ResolvedConfig, load_config_file, resolve_config};
use portalfinder_core::scan::{ScanOptions, ScanReport, execute_scan};
use portalfinder_core::sink::{AppendWriter, OutputFormat, persist_report};
use portalfinder_scanner::{CancellationToken, Preset};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Route diagnostics to stderr. `RUST_LOG` wins; otherwise only warnings show.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Load and parse candidate base URLs from a file.
///
/// Duplicates are dropped, keeping the first occurrence. An empty list is
/// not an error: the scan simply has nothing to do.
pub fn load_candidates_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read candidate list {}: {}", path.display(), e))?;

    let mut seen = HashSet::new();
    let candidates = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_candidate_line(line.trim()))
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect();

    Ok(candidates)
}

/// Accept a line as a candidate only if it is an absolute http(s) URL with a host.
pub fn parse_candidate_line(line: &str) -> Option<String> {
    match Url::parse(line) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
            Some(line.to_string())
        }
        _ => {
            warn!("Skipping invalid candidate '{}'", line);
            None
        }
    }
}

/// Collect the command-line settings that take precedence over the config file.
pub fn overrides_from_args(args: &ArgMatches) -> Overrides {
    Overrides {
        preset: args
            .get_one::<String>("preset")
            .and_then(|s| Preset::from_str(s)),
        paths_file: args.get_one::<PathBuf>("paths-file").map(|p| expand_path(p)),
        keywords_file: args
            .get_one::<PathBuf>("keywords-file")
            .map(|p| expand_path(p)),
        timeout_secs: args.get_one::<u64>("timeout").copied(),
        concurrency: args.get_one::<usize>("threads").copied(),
    }
}

pub fn resolve_from_args(args: &ArgMatches) -> Result<ResolvedConfig> {
    let file_config = match args.get_one::<PathBuf>("config") {
        Some(path) => Some(load_config_file(&expand_path(path)).map_err(anyhow::Error::msg)?),
        None => None,
    };

    resolve_config(file_config, overrides_from_args(args)).map_err(anyhow::Error::msg)
}

pub async fn handle_scan(args: &ArgMatches) -> Result<ScanReport> {
    let quiet = args.get_flag("quiet");
    let verbose = args.get_flag("verbose");
    let append = args.get_flag("append");
    let show_progress = !args.get_flag("no-progress");

    let list = args
        .get_one::<PathBuf>("list")
        .map(|p| expand_path(p))
        .ok_or_else(|| anyhow!("A candidate list is required (--list)"))?;
    let candidates = load_candidates_from_file(&list).map_err(anyhow::Error::msg)?;

    let resolved = resolve_from_args(args)?;
    let output = args.get_one::<PathBuf>("output").map(|p| expand_path(p));
    let format = args
        .get_one::<String>("format")
        .and_then(|s| OutputFormat::from_str(s))
        .unwrap_or(OutputFormat::Text);

    if !quiet {
        println!(
            "\n🔎 Checking {} candidate(s) from {}",
            candidates.len(),
            list.display()
        );
        println!("Workers: {}", resolved.concurrency);
        println!("Paths per candidate: {}", resolved.probe.paths.len());
        println!("Timeout: {}s\n", resolved.probe.request_timeout.as_secs());
    }
    info!(
        candidates = candidates.len(),
        workers = resolved.concurrency,
        "Starting scan"
    );

    let writer = match output {
        Some(ref path) if append => Some(
            AppendWriter::open(path)
                .await
                .with_context(|| format!("Failed to open output file {}", path.display()))?,
        ),
        _ => None,
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping workers");
            interrupt.cancel();
        }
    });

    let options = ScanOptions {
        candidates,
        probe: resolved.probe,
        concurrency: resolved.concurrency,
        verbose,
        show_progress,
    };
    let result = execute_scan(options, writer, cancel).await;
    ctrl_c.abort();
    let report = result.map_err(anyhow::Error::msg)?;

    print_summary(&report, quiet);

    if let Some(path) = output {
        if append {
            if !quiet {
                println!(
                    "{} Appended {} result(s) to {}",
                    "✓".green().bold(),
                    report.appended.unwrap_or(0),
                    path.display()
                );
            }
        } else {
            match persist_report(&path, format, &report) {
                Ok(()) if !quiet => {
                    println!("{} Results saved to {}", "✓".green().bold(), path.display())
                }
                Ok(()) => {}
                Err(e) => warn!("Failed to write results to {}: {}", path.display(), e),
            }
        }
    }

    Ok(report)
}

fn print_summary(report: &ScanReport, quiet: bool) {
    if quiet {
        return;
    }

    println!();
    if report.cancelled {
        println!(
            "{} Scan interrupted after {}/{} candidate(s)",
            "⚠".yellow().bold(),
            report.completed,
            report.total
        );
    } else {
        println!("{} Scan complete!", "✓".green().bold());
    }
    println!(
        "  Account portals found: {}",
        report.matched.len().to_string().bright_white().bold()
    );
    println!(
        "  Elapsed: {}s",
        (report.finished_at - report.started_at).num_seconds()
    );
}
