use crate::errors::ApiError;
use crate::tracing::LogFormat;
use std::env;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
pub const DEFAULT_ROUTE_LAYOUT: &str = "compact";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API のベース URL（末尾の `/` は除去済み）
    pub api_base: String,
    /// 未指定ならトランスポートの既定値に従う
    pub timeout: Option<Duration>,
    pub route_layout: String,
    pub log_format: LogFormat,
}

impl ClientConfig {
    pub fn new(api_base: &str) -> Result<Self, ApiError> {
        Ok(Self {
            api_base: normalize_api_base(api_base)?,
            timeout: None,
            route_layout: DEFAULT_ROUTE_LAYOUT.to_string(),
            log_format: LogFormat::default(),
        })
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup("TODO_API_BASE").unwrap_or_else(|| {
            debug!("TODO_API_BASE not set, using default: {}", DEFAULT_API_BASE);
            DEFAULT_API_BASE.to_string()
        });

        let timeout = match lookup("TODO_API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ApiError::Configuration(format!("TODO_API_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let log_format = match lookup("TODO_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            api_base: normalize_api_base(&api_base)?,
            timeout,
            route_layout: lookup("TODO_ROUTE_LAYOUT")
                .unwrap_or_else(|| DEFAULT_ROUTE_LAYOUT.to_string()),
            log_format,
        })
    }

    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, ApiError> {
        self.api_base = normalize_api_base(api_base)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `path` を API ベースに連結した URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

fn normalize_api_base(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| ApiError::Configuration(format!("invalid API base `{}`: {}", raw, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ApiError::Configuration(format!(
            "API base must be http or https: {}",
            raw
        )));
    }
    Ok(trimmed.to_string())
}
