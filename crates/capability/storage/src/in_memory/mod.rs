//! 内存存储实现
//!
//! 使用 `RwLock<HashMap>`，进程退出即丢失。

mod node_state;

pub use node_state::InMemoryNodeStateStore;
