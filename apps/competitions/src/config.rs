use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{transport::parse_base_url, DEFAULT_BACKEND_URL};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "competitions.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub request_timeout: Option<Duration>,
    pub strict_selection: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            request_timeout: None,
            strict_selection: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    request_timeout_secs: Option<u64>,
    strict_selection: Option<bool>,
}

/// Defaults, then the TOML file, then the environment, then the command line.
/// A missing default file is fine; an explicitly named one must exist.
pub fn load_settings(
    config_path: Option<&Path>,
    backend_url_flag: Option<&str>,
) -> anyhow::Result<Settings> {
    load_settings_with(config_path, backend_url_flag, |key| std::env::var(key).ok())
}

fn load_settings_with(
    config_path: Option<&Path>,
    backend_url_flag: Option<&str>,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, var);

    if let Some(url) = backend_url_flag {
        settings.backend_url = url.to_string();
    }

    parse_base_url(&settings.backend_url).context("backend url is not usable")?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.backend_url {
        settings.backend_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = timeout_from_secs(v);
    }
    if let Some(v) = file_cfg.strict_selection {
        settings.strict_selection = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = var("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout = timeout_from_secs(parsed);
        }
    }

    if let Some(v) = var("APP__STRICT_SELECTION") {
        if let Ok(parsed) = v.trim().to_ascii_lowercase().parse::<bool>() {
            settings.strict_selection = parsed;
        }
    }
}

/// Zero means "no timeout".
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
