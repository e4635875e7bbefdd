//! 遥测服务读数拉取。

use api_contract::FeedEntry;
use async_trait::async_trait;
use domain::RawReading;
use std::time::Duration;
use tracing::debug;

/// 拉取错误：调用方按“本轮无新数据”处理。
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetch failed with status {0}")]
    Status(u16),
    #[error("fetch transport error: {0}")]
    Transport(String),
    #[error("invalid reading body: {0}")]
    Decode(String),
}

/// 读数拉取抽象：返回通道的最新一条读数。
#[async_trait]
pub trait ReadingFetcher: Send + Sync {
    async fn fetch_last(&self, channel_id: &str, api_key: &str) -> Result<RawReading, FetchError>;
}

/// HTTP 拉取配置。
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

/// 基于 `feeds/last.json` 的拉取实现，不做重试。
#[derive(Debug, Clone)]
pub struct HttpReadingFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReadingFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self::with_client(client, config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// 通道最新读数的资源地址（不含 api_key）。
pub fn last_reading_url(base_url: &str, channel_id: &str) -> String {
    format!(
        "{}/channels/{}/feeds/last.json",
        base_url.trim_end_matches('/'),
        channel_id
    )
}

/// feed 响应体 -> RawReading，只保留 field 槽位。
pub fn reading_from_entry(entry: FeedEntry) -> RawReading {
    let fields = entry.field_slots();
    RawReading {
        entry_id: entry.entry_id,
        created_at: entry.created_at,
        fields,
    }
}

#[async_trait]
impl ReadingFetcher for HttpReadingFetcher {
    async fn fetch_last(&self, channel_id: &str, api_key: &str) -> Result<RawReading, FetchError> {
        let url = last_reading_url(&self.base_url, channel_id);
        debug!(target: "bridge.ingest", channel_id = %channel_id, url = %url, "fetch_last_reading");
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", api_key)])
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let entry = response
            .json::<FeedEntry>()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))?;
        Ok(reading_from_entry(entry))
    }
}
