//! 引导过程消费的两种磁盘记录
//!
//! 引导只关心记录能否从流的当前位置解析出来，以及 superblock 报告的块大小。
//! 字段布局由具体实现负责：默认实现是 [`Superblock`] 和 [`BlockGroup`]，
//! 也可以换成其他满足同样契约的类型。

use crate::{
    block_group::BlockGroup,
    error::Result,
    stream::ByteSource,
    superblock::Superblock,
};

/// 可以从字节流解析出来的 superblock
pub trait SuperblockRecord: Sized {
    /// 从流的当前位置解析
    ///
    /// 最多消耗 [`SUPERBLOCK_FOOTPRINT`](crate::consts::SUPERBLOCK_FOOTPRINT) 字节，
    /// 返回时流必须恰好位于已消耗字节之后。
    fn parse<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self>;

    /// 块大小（字节）
    fn block_size(&self) -> u32;

    /// 解析之后的语义校验，默认不做任何检查
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// 可以从字节流解析出来的块组描述符
pub trait DescriptorRecord: Sized {
    /// 从流的当前位置（GDT 起始处）解析
    fn parse<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self>;
}

impl SuperblockRecord for Superblock {
    fn parse<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self> {
        Superblock::load(src)
    }

    fn block_size(&self) -> u32 {
        Superblock::block_size(self)
    }

    fn validate(&self) -> Result<()> {
        self.check()
    }
}

impl DescriptorRecord for BlockGroup {
    fn parse<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self> {
        BlockGroup::load(src)
    }
}
