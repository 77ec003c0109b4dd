//! 错误类型定义
//!
//! 提供 ext4 卷引导操作的错误类型。每个错误可以携带一个底层原因，
//! 形成一条可遍历的错误链，便于定位引导失败的具体位置。

use alloc::boxed::Box;
use core::fmt;

/// ext4 引导错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
    cause: Option<Box<Error>>,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// I/O 错误
    Io,
    /// 无效参数
    InvalidInput,
    /// 文件系统损坏
    Corrupted,
    /// 不支持的操作
    Unsupported,
    /// 无效状态
    InvalidState,
    /// 底层流拒绝了 seek（越界或介质 I/O 错误）
    SeekFailed,
    /// superblock 解析失败
    SuperblockParseFailed,
    /// 块组描述符解析失败
    DescriptorParseFailed,
    /// 引导操作整体失败
    BootstrapFailed,
}

impl Error {
    /// 创建新错误
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            message,
            cause: None,
        }
    }

    /// 创建带原因的错误
    pub fn with_cause(kind: ErrorKind, message: &'static str, cause: Error) -> Self {
        Self {
            kind,
            message,
            cause: Some(Box::new(cause)),
        }
    }

    /// 在当前错误外再包一层上下文
    pub fn wrap(self, kind: ErrorKind, message: &'static str) -> Self {
        Self::with_cause(kind, message, self)
    }

    /// 获取错误类型
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取错误消息
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// 获取直接原因
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// 获取最底层的原因（没有原因时返回自身）
    pub fn root_cause(&self) -> &Error {
        let mut cur = self;
        while let Some(next) = cur.cause() {
            cur = next;
        }
        cur
    }

    /// 从外到内遍历错误链
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// 错误链中是否存在指定类别
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.chain().any(|e| e.kind == kind)
    }
}

/// 错误链迭代器
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = cur.cause();
        Some(cur)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(cause) = self.cause() {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                Error::new(ErrorKind::Io, "Unexpected end of stream")
            }
            std::io::ErrorKind::InvalidInput => {
                Error::new(ErrorKind::InvalidInput, "Invalid stream argument")
            }
            _ => Error::new(ErrorKind::Io, "Stream I/O error"),
        }
    }
}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;
