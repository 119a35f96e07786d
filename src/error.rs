//! 错误类型定义
//!
//! 提供 JBOD 客户端操作的错误类型。

use core::fmt;

/// JBOD 操作错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 缓存重复创建、容量非法或未创建即销毁
    Initialization,
    /// 地址、长度或 disk/block 编号越界
    OutOfBounds,
    /// 无效参数（缓冲区长度不足）
    InvalidInput,
    /// 缓存中已存在相同 (disk, block) 的条目
    AlreadyExists,
    /// 未挂载时发起读写
    NotMounted,
    /// 底层传输错误
    Io,
    /// 服务端拒绝操作或帧格式错误
    Protocol,
}

impl Error {
    /// 创建新错误
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self { kind, message }
    }

    /// 获取错误类型
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取错误消息
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        log::error!("[NET] transport error: {}", err);
        Error::new(ErrorKind::Io, "transport I/O error")
    }
}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;
