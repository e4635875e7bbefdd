use crate::error::{StorageError, StorageErrorKind};
use crate::traits::NodeStateStore;
use domain::NodeState;
use std::collections::HashMap;
use std::sync::RwLock;

/// 节点水位内存存储
#[derive(Default)]
pub struct InMemoryNodeStateStore {
    states: RwLock<HashMap<String, NodeState>>,
}

impl InMemoryNodeStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已记录节点数量（用于测试）
    pub fn len(&self) -> usize {
        self.states.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl NodeStateStore for InMemoryNodeStateStore {
    async fn load(&self, node_id: &str) -> Result<NodeState, StorageError> {
        let states = self
            .states
            .read()
            .map_err(|_| StorageError::new(StorageErrorKind::Lock, "node state map"))?;
        Ok(states.get(node_id).copied().unwrap_or_default())
    }

    async fn save(&self, node_id: &str, state: NodeState) -> Result<(), StorageError> {
        let mut states = self
            .states
            .write()
            .map_err(|_| StorageError::new(StorageErrorKind::Lock, "node state map"))?;
        states.insert(node_id.to_string(), state);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, NodeState)>, StorageError> {
        let states = self
            .states
            .read()
            .map_err(|_| StorageError::new(StorageErrorKind::Lock, "node state map"))?;
        let mut list = states
            .iter()
            .map(|(node_id, state)| (node_id.clone(), *state))
            .collect::<Vec<_>>();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(list)
    }
}
