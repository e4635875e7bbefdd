//! 存储层错误类型

use std::fmt;

/// 存储失败的类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// 文件读写失败
    Io,
    /// 水位文件内容无法编解码
    Format,
    /// 水位文件版本不受支持
    Version,
    /// 内存锁中毒
    Lock,
}

impl StorageErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageErrorKind::Io => "io error",
            StorageErrorKind::Format => "invalid state file",
            StorageErrorKind::Version => "unsupported state file version",
            StorageErrorKind::Lock => "state lock poisoned",
        }
    }
}

#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    detail: String,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.detail)
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::new(StorageErrorKind::Io, err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(StorageErrorKind::Format, err.to_string())
    }
}
