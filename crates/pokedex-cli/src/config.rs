// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "pokedex";
const DEFAULT_GATEWAY_BASE_URL: &str = "https://pokedex-gateway-v1.onrender.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub speech: SpeechSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            gateway: GatewaySection::default(),
            fetch: FetchSection::default(),
            speech: SpeechSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySection {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_GATEWAY_BASE_URL.to_owned()),
            timeout: Some("10s".to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSection {
    pub prefetch: Option<bool>,
    pub detail_concurrency: Option<i64>,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            prefetch: Some(true),
            detail_concurrency: Some(pokedex_fetch::DETAIL_CONCURRENCY as i64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechSection {
    pub enabled: Option<bool>,
}

impl Default for SpeechSection {
    fn default() -> Self {
        Self {
            enabled: Some(true),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("POKEDEX_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set POKEDEX_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [gateway], [fetch], and [speech]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let base_url = self.gateway_base_url();
        let parsed = Url::parse(base_url).with_context(|| {
            format!(
                "gateway.base_url in {} is not a valid URL: {base_url:?}",
                path.display()
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "gateway.base_url in {} must use http or https, got {:?}",
                path.display(),
                parsed.scheme()
            );
        }

        if let Some(timeout) = &self.gateway.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "gateway.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(concurrency) = self.fetch.detail_concurrency
            && concurrency <= 0
        {
            bail!(
                "fetch.detail_concurrency in {} must be positive, got {}",
                path.display(),
                concurrency
            );
        }

        Ok(())
    }

    pub fn gateway_base_url(&self) -> &str {
        self.gateway
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_GATEWAY_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn gateway_timeout(&self) -> Result<Duration> {
        parse_duration(self.gateway.timeout.as_deref().unwrap_or("10s"))
    }

    pub fn prefetch(&self) -> bool {
        self.fetch.prefetch.unwrap_or(true)
    }

    pub fn detail_concurrency(&self) -> usize {
        self.fetch
            .detail_concurrency
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(pokedex_fetch::DETAIL_CONCURRENCY)
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech.enabled.unwrap_or(true)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# pokedex config\n# Place this file at: {}\n\nversion = 1\n\n[gateway]\nbase_url = \"{}\"\ntimeout = \"10s\"\n\n[fetch]\nprefetch = true\ndetail_concurrency = {}\n\n[speech]\nenabled = true\n",
            path.display(),
            DEFAULT_GATEWAY_BASE_URL,
            pokedex_fetch::DETAIL_CONCURRENCY,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
