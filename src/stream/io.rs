//! `std::io` 适配
//!
//! 把任意 `Read + Seek`（文件、块设备、`Cursor`）包装为 [`ByteSource`]。
//! `std` 的 seek 允许越过文件末尾，这里在构造时记录一次卷长度，
//! 之后所有越界 seek 都直接报错，避免后续读取被静默截断。

use super::source::{resolve_seek, ByteSource, SeekFrom};
use crate::error::{Error, ErrorKind, Result};
use std::io::{self, Read, Seek};

/// `Read + Seek` 适配器
#[derive(Debug)]
pub struct IoVolume<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> IoVolume<R> {
    /// 包装一个流
    ///
    /// 测量流长度后恢复原来的读取位置，因此不是从 0 开始的流
    /// （例如已经定位到备份 superblock 的流）可以直接使用。
    pub fn new(mut inner: R) -> Result<Self> {
        let pos = inner
            .stream_position()
            .map_err(|e| Error::from(e).wrap(ErrorKind::SeekFailed, "Failed to query stream position"))?;
        let len = inner
            .seek(io::SeekFrom::End(0))
            .map_err(|e| Error::from(e).wrap(ErrorKind::SeekFailed, "Failed to measure stream length"))?;
        inner
            .seek(io::SeekFrom::Start(pos))
            .map_err(|e| Error::from(e).wrap(ErrorKind::SeekFailed, "Failed to restore stream position"))?;

        log::debug!("[IoVolume] opened stream: len={:#x}, pos={:#x}", len, pos);

        Ok(Self { inner, len })
    }

    /// 流长度（字节）
    pub fn len(&self) -> u64 {
        self.len
    }

    /// 流是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 获取底层流的引用
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// 取回底层流
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for IoVolume<R> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let current = self.position()?;
        let target = resolve_seek(pos, current, self.len).ok_or(Error::new(
            ErrorKind::SeekFailed,
            "Seek outside of stream",
        ))?;

        log::trace!("[IoVolume] seek {:?}: {:#x} -> {:#x}", pos, current, target);

        self.inner
            .seek(io::SeekFrom::Start(target))
            .map_err(|e| Error::from(e).wrap(ErrorKind::SeekFailed, "Stream rejected seek"))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(Error::from)
    }

    fn position(&mut self) -> Result<u64> {
        self.inner
            .stream_position()
            .map_err(|e| Error::from(e).wrap(ErrorKind::SeekFailed, "Failed to query stream position"))
    }
}
