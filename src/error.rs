//! 错误类型定义
//!
//! 提供目标文件缓存操作的错误类型。

use core::fmt;

/// 缓存操作错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// I/O 错误（打开、定位、读取失败或读取不完整）
    Io,
    /// 无效参数（越界读取、未知文件）
    InvalidInput,
    /// 目标文件损坏（长度为 0 等）
    Corrupted,
    /// 文件不存在
    NotFound,
    /// 无效状态（文件之前已出错）
    InvalidState,
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
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::new(ErrorKind::NotFound, "File not found"),
            std::io::ErrorKind::UnexpectedEof => Error::new(ErrorKind::Io, "Unexpected end of file"),
            _ => Error::new(ErrorKind::Io, "Host I/O error"),
        }
    }
}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;
