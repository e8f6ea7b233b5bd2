use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::args::Args;
use crate::infrastructure::error::WidgetError;
use crate::internationalization::Language;

const ENV_PREFIX: &str = "FORM_WIDGETS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub language: Language,
    pub endpoint_url: String,
    pub login_endpoint: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

/// On-disk shape of the TOML config file; every key is optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    language: Option<Language>,
    endpoint_url: Option<String>,
    login_endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
    log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            language: Language::Russian,
            endpoint_url: "http://localhost:8080/api".to_string(),
            login_endpoint: "login".to_string(),
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Build the effective configuration for a run of the binary.
    ///
    /// Sources in increasing priority: defaults, the `--config` TOML file,
    /// `.env` files, `FORM_WIDGETS_*` variables, command line. The `.env`
    /// step is skipped with `--no-env-file`.
    pub fn load(args: &Args) -> Result<Self, WidgetError> {
        let mut config = Config::default();
        if let Some(path) = &args.config {
            config.load_from_file(path)?;
        }
        if !args.no_env_file {
            config.load_from_env_file();
        }
        config.load_from_env();
        config.update_from_args(args)?;
        Ok(config)
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<(), WidgetError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WidgetError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file: ConfigFile = toml::from_str(&content)?;

        if let Some(language) = file.language {
            self.language = language;
        }
        if let Some(url) = file.endpoint_url {
            self.endpoint_url = url;
        }
        if let Some(endpoint) = file.login_endpoint {
            self.login_endpoint = endpoint;
        }
        if let Some(timeout) = file.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(())
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.form-widgets/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Some(lang) = env_var("LANGUAGE") {
            match lang.parse() {
                Ok(language) => self.language = language,
                Err(e) => tracing::warn!(value = %lang, error = %e, "ignoring {}_LANGUAGE", ENV_PREFIX),
            }
        }
        if let Some(url) = env_var("ENDPOINT_URL") {
            self.endpoint_url = url;
        }
        if let Some(endpoint) = env_var("LOGIN_ENDPOINT") {
            self.login_endpoint = endpoint;
        }
        if let Some(timeout) = env_var("REQUEST_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!(value = %timeout, "ignoring {}_REQUEST_TIMEOUT_SECS", ENV_PREFIX),
            }
        }
        if let Some(level) = env_var("LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn update_from_args(&mut self, args: &Args) -> Result<(), WidgetError> {
        // 命令行参数优先级最高
        if let Some(lang) = &args.lang {
            self.language = lang.parse()?;
        }
        if !args.endpoint_url.is_empty() {
            self.endpoint_url = args.endpoint_url.clone();
        }
        if !args.log_level.is_empty() {
            self.log_level = args.log_level.clone();
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://") {
            anyhow::bail!(
                "Endpoint URL must start with http:// or https://, got: {}",
                self.endpoint_url
            );
        }
        if self.login_endpoint.trim().is_empty() {
            anyhow::bail!("Login endpoint must not be empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("Request timeout must be at least one second");
        }
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!("Unsupported log level: {}", other),
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}
