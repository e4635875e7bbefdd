//! 节点列表文件加载。
//!
//! 文件为 JSON 数组，顺序即每轮轮询的处理顺序。

use crate::ConfigError;
use domain::NodeConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct NodeRecord {
    node_id: String,
    channel_id: ChannelId,
    api_key: String,
    #[serde(alias = "endpoint")]
    onem2m_endpoint: String,
    origin: Option<String>,
}

/// channel_id 在文件中可写成数字或字符串。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChannelId {
    Number(u64),
    Text(String),
}

impl ChannelId {
    fn into_string(self) -> String {
        match self {
            ChannelId::Number(value) => value.to_string(),
            ChannelId::Text(value) => value,
        }
    }
}

/// 读取并校验节点列表文件。
pub fn load_nodes(path: &Path, default_origin: &str) -> Result<Vec<NodeConfig>, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| ConfigError::NodesFile(format!("{}: {}", path.display(), err)))?;
    parse_nodes(&raw, default_origin)
}

/// 解析节点列表 JSON；未指定 origin 的节点使用 `default_origin`。
pub fn parse_nodes(raw: &str, default_origin: &str) -> Result<Vec<NodeConfig>, ConfigError> {
    let records: Vec<NodeRecord> =
        serde_json::from_str(raw).map_err(|err| ConfigError::NodesFile(err.to_string()))?;

    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(records.len());
    for record in records {
        let node_id = record.node_id.trim().to_string();
        if node_id.is_empty() {
            return Err(ConfigError::InvalidNodes("empty node_id".to_string()));
        }
        if record.onem2m_endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidNodes(format!(
                "empty endpoint for node {}",
                node_id
            )));
        }
        if !seen.insert(node_id.clone()) {
            return Err(ConfigError::InvalidNodes(format!(
                "duplicate node_id {}",
                node_id
            )));
        }
        let origin = record
            .origin
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_origin.to_string());
        nodes.push(NodeConfig::new(
            node_id,
            record.channel_id.into_string(),
            record.api_key,
            record.onem2m_endpoint.trim(),
            origin,
        ));
    }
    Ok(nodes)
}
