// Configuration file loading and CLI override merging

use portalfinder_scanner::{Preset, ProbeConfig, default_concurrency};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// On-disk configuration. Every field is optional and overrides the preset.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub preset: Option<Preset>,
    pub paths: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub form_pattern: Option<String>,
    pub body_size_ceiling: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub concurrency: Option<usize>,
}

/// Settings given on the command line; they win over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub preset: Option<Preset>,
    pub paths_file: Option<PathBuf>,
    pub keywords_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub probe: ProbeConfig,
    pub concurrency: usize,
}

/// Load a JSON configuration file
pub fn load_config_file(path: &Path) -> Result<FileConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

    serde_json::from_str(&content)
        .map_err(|e| format!("Invalid config file {}: {}", path.display(), e))
}

/// Load a line-delimited list (paths or keywords), skipping blanks and `#` comments
pub fn load_list_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read list {}: {}", path.display(), e))?;

    let entries: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#'))
        .map(String::from)
        .collect();

    if entries.is_empty() {
        return Err(format!(
            "List {} is empty or contains only comments",
            path.display()
        ));
    }

    Ok(entries)
}

/// Merge preset, file and command line into the configuration a scan runs with.
pub fn resolve_config(
    file: Option<FileConfig>,
    overrides: Overrides,
) -> Result<ResolvedConfig, String> {
    let file = file.unwrap_or_default();

    let preset = overrides.preset.or(file.preset).unwrap_or_default();
    let mut probe = ProbeConfig::from_preset(preset);
    let mut concurrency = default_concurrency();

    if let Some(paths) = file.paths {
        probe.paths = paths;
    }
    if let Some(keywords) = file.keywords {
        probe.keywords = keywords;
    }
    if let Some(pattern) = file.form_pattern {
        probe.form_pattern = pattern;
    }
    if let Some(ceiling) = file.body_size_ceiling {
        probe.body_size_ceiling = ceiling;
    }
    if let Some(timeout) = file.timeout_secs {
        probe.request_timeout = Duration::from_secs(timeout);
    }
    if let Some(user_agent) = file.user_agent {
        probe.user_agent = user_agent;
    }
    if let Some(workers) = file.concurrency {
        concurrency = workers;
    }

    if let Some(ref path) = overrides.paths_file {
        probe.paths = load_list_file(path)?;
    }
    if let Some(ref path) = overrides.keywords_file {
        probe.keywords = load_list_file(path)?;
    }
    if let Some(timeout) = overrides.timeout_secs {
        probe.request_timeout = Duration::from_secs(timeout);
    }
    if let Some(workers) = overrides.concurrency {
        concurrency = workers;
    }

    if concurrency == 0 {
        return Err("Concurrency must be at least 1".to_string());
    }
    probe.validate().map_err(|e| e.to_string())?;

    Ok(ResolvedConfig { probe, concurrency })
}
