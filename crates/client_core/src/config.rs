use std::{collections::HashMap, env, fs};

use anyhow::Context;
use url::Url;

use crate::session::OverlapPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub result_count: u32,
    pub theme: Theme,
    pub overlap: OverlapPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            result_count: 5,
            theme: Theme::Light,
            overlap: OverlapPolicy::Drop,
        }
    }
}

/// Defaults, then `vedan.toml`, then environment. Values that fail to
/// parse fall back silently to the previous layer.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("vedan.toml") {
        apply_file(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings);

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("result_count") {
            if let Ok(parsed) = v.parse::<u32>() {
                settings.result_count = parsed;
            }
        }
        if let Some(v) = file_cfg.get("theme") {
            if let Some(parsed) = parse_theme(v) {
                settings.theme = parsed;
            }
        }
        if let Some(v) = file_cfg.get("overlap") {
            if let Some(parsed) = parse_overlap(v) {
                settings.overlap = parsed;
            }
        }
    }
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(v) = env::var("VEDAN_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = env::var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Ok(v) = env::var("VEDAN_RESULT_COUNT") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.result_count = parsed;
        }
    }
    if let Ok(v) = env::var("APP__RESULT_COUNT") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.result_count = parsed;
        }
    }

    if let Ok(v) = env::var("VEDAN_THEME") {
        if let Some(parsed) = parse_theme(&v) {
            settings.theme = parsed;
        }
    }
    if let Ok(v) = env::var("APP__THEME") {
        if let Some(parsed) = parse_theme(&v) {
            settings.theme = parsed;
        }
    }

    if let Ok(v) = env::var("VEDAN_OVERLAP") {
        if let Some(parsed) = parse_overlap(&v) {
            settings.overlap = parsed;
        }
    }
    if let Ok(v) = env::var("APP__OVERLAP") {
        if let Some(parsed) = parse_overlap(&v) {
            settings.overlap = parsed;
        }
    }
}

fn parse_theme(raw: &str) -> Option<Theme> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "light" => Some(Theme::Light),
        "dark" => Some(Theme::Dark),
        _ => None,
    }
}

fn parse_overlap(raw: &str) -> Option<OverlapPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "drop" => Some(OverlapPolicy::Drop),
        "queue" => Some(OverlapPolicy::Queue),
        _ => None,
    }
}

/// Accepts absolute http/https URLs only; strips any trailing slash so
/// path joins stay well-formed.
pub fn validate_server_url(raw: &str) -> anyhow::Result<String> {
    let parsed = Url::parse(raw).with_context(|| format!("invalid server url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("unsupported server url scheme '{}'", parsed.scheme());
    }
    Ok(raw.trim_end_matches('/').to_string())
}
