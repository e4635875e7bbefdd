//! 应用运行配置加载。

mod nodes;

pub use nodes::{load_nodes, parse_nodes};

use domain::{DeliveryPolicy, FieldMapping};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 默认遥测服务地址。
pub const DEFAULT_TELEMETRY_BASE_URL: &str = "https://api.thingspeak.com";
/// 默认 `X-M2M-Origin` 凭据。
pub const DEFAULT_OM2M_ORIGIN: &str = "dev_guest:dev_guest";
/// 默认轮询间隔（秒）。
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 600;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("nodes file error: {0}")]
    NodesFile(String),
    #[error("invalid nodes: {0}")]
    InvalidNodes(String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub nodes_file: PathBuf,
    pub telemetry_base_url: String,
    pub poll_interval_seconds: u64,
    pub om2m_origin: String,
    pub http_timeout_seconds: Option<u64>,
    pub state_file: Option<PathBuf>,
    pub delivery_policy: DeliveryPolicy,
    pub field_mapping: FieldMapping,
    pub status_addr: Option<String>,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let nodes_file = env::var("BRIDGE_NODES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("nodes_info.json"));
        let telemetry_base_url = env::var("BRIDGE_TELEMETRY_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_TELEMETRY_BASE_URL.to_string());
        let poll_interval_seconds =
            read_u64_with_default("BRIDGE_POLL_INTERVAL_SECONDS", DEFAULT_POLL_INTERVAL_SECONDS)?;
        if poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "BRIDGE_POLL_INTERVAL_SECONDS".to_string(),
                "0".to_string(),
            ));
        }
        let om2m_origin =
            read_optional("BRIDGE_OM2M_ORIGIN").unwrap_or_else(|| DEFAULT_OM2M_ORIGIN.to_string());
        let http_timeout_seconds =
            read_optional_u64("BRIDGE_HTTP_TIMEOUT_SECONDS")?.filter(|value| *value > 0);
        let state_file = read_optional("BRIDGE_STATE_FILE").map(PathBuf::from);
        let delivery_policy = match read_optional("BRIDGE_DELIVERY_POLICY") {
            Some(value) => DeliveryPolicy::parse(&value)
                .ok_or_else(|| ConfigError::Invalid("BRIDGE_DELIVERY_POLICY".to_string(), value))?,
            None => DeliveryPolicy::default(),
        };
        let defaults = FieldMapping::default();
        let field_mapping = FieldMapping {
            water_level: read_optional("BRIDGE_WATER_LEVEL_FIELD")
                .unwrap_or(defaults.water_level),
            temperature: read_optional("BRIDGE_TEMPERATURE_FIELD")
                .unwrap_or(defaults.temperature),
        };
        let status_addr = read_optional("BRIDGE_STATUS_ADDR");

        Ok(Self {
            nodes_file,
            telemetry_base_url,
            poll_interval_seconds,
            om2m_origin,
            http_timeout_seconds,
            state_file,
            delivery_policy,
            field_mapping,
            status_addr,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_seconds.map(Duration::from_secs)
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn read_optional_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        Err(_) => Ok(None),
    }
}
