//! oneM2M content instance 提交。
//!
//! 单次提交、不重试；只有 201 Created 视为成功。

use api_contract::ContentInstanceRequest;
use async_trait::async_trait;
use domain::{NodeConfig, SubmissionPayload};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// oneM2M 发起方身份头。
pub const ORIGIN_HEADER: &str = "X-M2M-Origin";
/// content instance（ty=4）资源类型。
pub const CONTENT_INSTANCE_TYPE: &str = "application/json;ty=4";

/// 提交错误。
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("submission rejected with status {0}")]
    Status(u16),
    #[error("submission transport error: {0}")]
    Transport(String),
}

/// 中间件提交抽象。
#[async_trait]
pub trait MiddlewareSubmitter: Send + Sync {
    async fn submit(&self, node: &NodeConfig, payload: &SubmissionPayload)
    -> Result<(), SubmitError>;
}

/// 基于 HTTP POST 的提交实现。
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
}

impl HttpSubmitter {
    pub fn new(timeout: Option<Duration>) -> Result<Self, SubmitError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MiddlewareSubmitter for HttpSubmitter {
    async fn submit(
        &self,
        node: &NodeConfig,
        payload: &SubmissionPayload,
    ) -> Result<(), SubmitError> {
        let body = ContentInstanceRequest::new(payload.labels.clone(), payload.content.clone());
        debug!(
            target: "bridge.submit",
            node_id = %node.node_id,
            endpoint = %node.endpoint,
            content = %payload.content,
            "content_instance_post"
        );
        // Content-Type 须先于 json() 写入，json() 遇到已有值时不覆盖
        let response = self
            .client
            .post(&node.endpoint)
            .header(ORIGIN_HEADER, &node.origin)
            .header(CONTENT_TYPE, CONTENT_INSTANCE_TYPE)
            .json(&body)
            .send()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(SubmitError::Status(status.as_u16()));
        }
        Ok(())
    }
}
