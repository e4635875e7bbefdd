//! 存储接口 Trait 定义

use crate::error::StorageError;
use async_trait::async_trait;
use domain::NodeState;

/// 节点水位存储接口
///
/// 每个节点一条记录，以 node_id 为键；未写入过的节点返回默认（无水位）状态。
#[async_trait]
pub trait NodeStateStore: Send + Sync {
    /// 读取节点水位
    async fn load(&self, node_id: &str) -> Result<NodeState, StorageError>;

    /// 覆盖写入节点水位
    async fn save(&self, node_id: &str, state: NodeState) -> Result<(), StorageError>;

    /// 列出所有已记录的节点水位（按 node_id 排序）
    async fn list(&self) -> Result<Vec<(String, NodeState)>, StorageError>;
}
