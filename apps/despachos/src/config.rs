use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_CONFIG_FILE: &str = "despachos.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: Option<u64>,
    pub log_filter: String,
    pub download_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".into(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: None,
            log_filter: "info".into(),
            download_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Defaults, then the config file, then environment variables.
///
/// A missing default config file is fine; an explicitly requested one must exist.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if explicit_path.is_some() => {
            return Err(err).with_context(|| format!("cannot read '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("page_size") {
        settings.page_size = parse_page_size(v)?;
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        settings.request_timeout_secs = parse_timeout(v)?;
    }
    if let Some(v) = file_cfg.get("log") {
        settings.log_filter = v.clone();
    }
    if let Some(v) = file_cfg.get("download_dir") {
        settings.download_dir = PathBuf::from(v);
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = var("DESPACHOS_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        settings.page_size = parse_page_size(&v)?;
    }
    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_timeout(&v)?;
    }

    if let Some(v) = var("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG") {
        settings.log_filter = v;
    }

    if let Some(v) = var("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }
    Ok(())
}

fn parse_page_size(raw: &str) -> anyhow::Result<u32> {
    let page_size: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("page_size must be a positive integer, got '{raw}'"))?;
    if page_size == 0 {
        bail!("page_size must be at least 1");
    }
    Ok(page_size)
}

/// Empty or `0` disables the timeout.
fn parse_timeout(raw: &str) -> anyhow::Result<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("request_timeout_secs must be an integer, got '{raw}'"))?;
    Ok((secs > 0).then_some(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("despachos.toml");
        fs::write(
            &path,
            r#"
api_base_url = "https://aduana.example.com"
page_size = "50"
request_timeout_secs = "30"
download_dir = "/tmp/descargas"
"#,
        )
        .expect("write config");

        let mut settings = Settings::default();
        apply_file(&mut settings, &fs::read_to_string(&path).expect("read")).expect("apply");

        assert_eq!(settings.api_base_url, "https://aduana.example.com");
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.download_dir, PathBuf::from("/tmp/descargas"));
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn app_prefixed_env_wins_over_legacy_name() {
        let mut settings = Settings::default();
        apply_env(
            &mut settings,
            env_from(&[
                ("DESPACHOS_API_URL", "http://legacy:5000"),
                ("APP__API_BASE_URL", "http://app:5000"),
                ("APP__REQUEST_TIMEOUT_SECS", "0"),
                ("APP__LOG", "client_core=debug"),
            ]),
        )
        .expect("apply env");

        assert_eq!(settings.api_base_url, "http://app:5000");
        assert_eq!(settings.request_timeout(), None);
        assert_eq!(settings.log_filter, "client_core=debug");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut settings = Settings::default();
        let err = apply_env(&mut settings, env_from(&[("APP__PAGE_SIZE", "0")]))
            .expect_err("zero page size");
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");

        let err = load_settings(Some(&missing)).expect_err("missing file");

        assert!(err.to_string().contains("cannot read"));
    }
}
