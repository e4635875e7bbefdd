//! # Bridge Storage 模块
//!
//! 节点水位（[`NodeState`](domain::NodeState)）的存储抽象。
//!
//! ## 实现
//!
//! - [`in_memory`]：内存存储，进程退出即丢失（默认）
//! - [`file`]：JSON 文件存储，启动时加载、每次写入原子落盘（需显式配置）
//!
//! 去重只依赖水位，所以持久化后进程重启不会把每个节点的第一条读数误判为新数据。

pub mod error;
pub mod file;
pub mod in_memory;
pub mod models;
pub mod traits;

pub use error::{StorageError, StorageErrorKind};
pub use file::JsonFileNodeStateStore;
pub use in_memory::InMemoryNodeStateStore;
pub use traits::NodeStateStore;
