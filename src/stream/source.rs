//! 字节流核心类型

use crate::error::Result;

/// seek 的起点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekFrom {
    /// 相对卷起始位置
    Start(u64),
    /// 相对当前读取位置
    Current(i64),
    /// 相对卷末尾
    End(i64),
}

/// 可随机访问的只读字节源
///
/// 实现此 trait 以提供引导所需的底层访问。实现者必须保证：
/// seek 要么精确落在请求的位置，要么返回 `ErrorKind::SeekFailed`
/// 且不改变当前位置；越过卷末尾的 seek 视为失败。
///
/// # 示例
///
/// ```rust,ignore
/// use ext4_bootstrap::{ByteSource, SeekFrom, Result};
///
/// struct MyDisk {
///     // ...
/// }
///
/// impl ByteSource for MyDisk {
///     fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
///         // 移动读取位置，返回新的绝对偏移
///     }
///
///     fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
///         // 从当前位置读满 buf
///     }
/// }
/// ```
pub trait ByteSource {
    /// 移动读取位置
    ///
    /// # 返回
    ///
    /// 成功返回新的绝对偏移（字节）
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// 从当前位置读满 `buf`，读取位置前进 `buf.len()`
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// 当前读取位置
    fn position(&mut self) -> Result<u64> {
        self.seek(SeekFrom::Current(0))
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        (**self).seek(pos)
    }

    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }

    #[inline]
    fn position(&mut self) -> Result<u64> {
        (**self).position()
    }
}

/// 按 `pos` 计算目标偏移，并检查不越过 `len`
///
/// 供 [`MemVolume`](super::MemVolume) 和 `IoVolume` 共用。
pub(crate) fn resolve_seek(pos: SeekFrom, current: u64, len: u64) -> Option<u64> {
    let target = match pos {
        SeekFrom::Start(off) => Some(off),
        SeekFrom::Current(delta) => current.checked_add_signed(delta),
        SeekFrom::End(delta) => len.checked_add_signed(delta),
    }?;

    (target <= len).then_some(target)
}
