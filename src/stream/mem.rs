//! 内存卷
//!
//! 把整个卷保存在一块 `Vec<u8>` 中，主要用于测试和已加载到内存的镜像。

use super::source::{resolve_seek, ByteSource, SeekFrom};
use crate::error::{Error, ErrorKind, Result};
use alloc::vec::Vec;

/// 基于内存缓冲区的字节源
///
/// seek 越过缓冲区末尾会失败，读取不足会失败且不移动位置。
#[derive(Debug, Clone, Default)]
pub struct MemVolume {
    data: Vec<u8>,
    pos: u64,
}

impl MemVolume {
    /// 接管一块缓冲区，读取位置为 0
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// 复制一段字节作为卷内容
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }

    /// 卷长度（字节）
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// 卷是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 当前读取位置（不经过 trait）
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// 获取底层缓冲区
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// 取回底层缓冲区
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteSource for MemVolume {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = resolve_seek(pos, self.pos, self.len()).ok_or(Error::new(
            ErrorKind::SeekFailed,
            "Seek outside of memory volume",
        ))?;

        log::trace!("[MemVolume] seek {:?}: {:#x} -> {:#x}", pos, self.pos, target);
        self.pos = target;
        Ok(target)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let start = usize::try_from(self.pos).map_err(|_| {
            Error::new(ErrorKind::Io, "Memory volume position exceeds address space")
        })?;
        let end = start
            .checked_add(buf.len())
            .filter(|&end| end <= self.data.len())
            .ok_or(Error::new(ErrorKind::Io, "Unexpected end of memory volume"))?;

        buf.copy_from_slice(&self.data[start..end]);
        self.pos = end as u64;
        Ok(())
    }

    fn position(&mut self) -> Result<u64> {
        Ok(self.pos)
    }
}
