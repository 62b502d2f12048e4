use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    bind_addr: Option<String>,
    recommend_url: Option<String>,
    detect_url: Option<String>,
    weather_url: Option<String>,
    upstream_timeout_seconds: Option<u64>,
    max_upload_bytes: Option<usize>,
    frontend_dist: Option<String>,
    frontend_entry: Option<String>,
    products_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct RootConfig {
    #[serde(default, flatten)]
    top: FileConfig,
    cropwise: Option<FileConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub recommend_url: String,
    pub detect_url: String,
    pub weather_url: String,
    pub upstream_timeout_seconds: u64,
    pub max_upload_bytes: usize,
    pub frontend_dist: String,
    pub frontend_entry: String,
    pub products_path: String,
    pub config_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            recommend_url: String::new(),
            detect_url: String::new(),
            weather_url: String::new(),
            upstream_timeout_seconds: 30,
            max_upload_bytes: 10 * 1024 * 1024,
            frontend_dist: "frontend/dist".to_string(),
            frontend_entry: "/assets/cropwise_frontend.js".to_string(),
            products_path: "products.json".to_string(),
            config_path: None,
        }
    }
}

impl AppConfig {
    /// Defaults, then the first config file found, then `CROPWISE_*` env vars.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(path) = find_config_file() {
            let root = load_root_config(&path)?;
            cfg.apply_root(root);
            cfg.config_path = Some(path);
        }

        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_root(&mut self, root: RootConfig) {
        let RootConfig { top, cropwise } = root;
        self.apply_file(top);
        if let Some(section) = cropwise {
            self.apply_file(section);
        }
    }

    fn apply_file(&mut self, file_cfg: FileConfig) {
        set_opt(&mut self.bind_addr, file_cfg.bind_addr);
        set_opt(&mut self.recommend_url, file_cfg.recommend_url);
        set_opt(&mut self.detect_url, file_cfg.detect_url);
        set_opt(&mut self.weather_url, file_cfg.weather_url);
        set_opt_u64_min(
            &mut self.upstream_timeout_seconds,
            file_cfg.upstream_timeout_seconds,
            1,
        );
        set_opt_usize_min(&mut self.max_upload_bytes, file_cfg.max_upload_bytes, 1024);
        set_opt(&mut self.frontend_dist, file_cfg.frontend_dist);
        set_opt(&mut self.frontend_entry, file_cfg.frontend_entry);
        set_opt(&mut self.products_path, file_cfg.products_path);
    }

    fn apply_env(&mut self) {
        let env_cfg = FileConfig {
            bind_addr: env_string("CROPWISE_BIND_ADDR"),
            recommend_url: env_string("CROPWISE_RECOMMEND_URL"),
            detect_url: env_string("CROPWISE_DETECT_URL"),
            weather_url: env_string("CROPWISE_WEATHER_URL"),
            upstream_timeout_seconds: env_parse("CROPWISE_UPSTREAM_TIMEOUT_SECONDS"),
            max_upload_bytes: env_parse("CROPWISE_MAX_UPLOAD_BYTES"),
            frontend_dist: env_string("CROPWISE_FRONTEND_DIST"),
            frontend_entry: env_string("CROPWISE_FRONTEND_ENTRY"),
            products_path: env_string("CROPWISE_PRODUCTS_PATH"),
        };
        self.apply_file(env_cfg);
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    pub fn frontend_dist(&self) -> PathBuf {
        PathBuf::from(&self.frontend_dist)
    }

    pub fn products_path(&self) -> PathBuf {
        PathBuf::from(&self.products_path)
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config.toml"), PathBuf::from("cropwise.toml")];
    if let Some(home) = dirs_home() {
        paths.push(home.join(".config").join("cropwise").join("config.toml"));
    }
    paths
}

pub fn find_config_file() -> Option<PathBuf> {
    config_search_paths().into_iter().find(|path| path.exists())
}

fn load_root_config(path: &Path) -> Result<RootConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed reading {path:?}"))?;
    parse_root_config(&raw).with_context(|| format!("failed parsing {path:?}"))
}

fn parse_root_config(raw: &str) -> Result<RootConfig> {
    toml::from_str::<RootConfig>(raw).context("config is not a valid root structure")
}

fn dirs_home() -> Option<PathBuf> {
    env::var("HOME").ok().map(PathBuf::from)
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_parse<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn set_opt<T>(dst: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *dst = v;
    }
}

fn set_opt_usize_min(dst: &mut usize, value: Option<usize>, min: usize) {
    if let Some(v) = value {
        *dst = v.max(min);
    }
}

fn set_opt_u64_min(dst: &mut u64, value: Option<u64>, min: u64) {
    if let Some(v) = value {
        *dst = v.max(min);
    }
}
