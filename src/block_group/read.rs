//! 块组描述符读取和查询操作

use crate::{
    consts::*,
    error::Result,
    stream::ByteSource,
    superblock::Superblock,
    types::ext4_group_desc,
};

/// 计算块组描述符表（GDT）的起始块号
///
/// 传统布局下 GDT 紧跟在 superblock 所在块之后：1KiB 块的卷为块 2，
/// 更大块的卷为块 1。引导时流已经停在这里，此函数供调用方核对。
pub fn block_group_desc_table_block(sb: &Superblock) -> u64 {
    sb.first_data_block() as u64 + 1
}

/// 从字节流当前位置读取块组描述符
///
/// 只读取 32 字节基础记录，读完后流位于记录之后。
///
/// # 参数
///
/// * `src` - 已经对齐到 GDT 起始处的字节流
///
/// # 返回
///
/// 成功返回块组描述符
pub fn read_block_group_desc<S: ByteSource + ?Sized>(src: &mut S) -> Result<ext4_group_desc> {
    let mut desc_buf = [0u8; EXT4_GROUP_DESC_SIZE];
    src.read_exact(&mut desc_buf)?;

    Ok(ext4_group_desc::decode(&desc_buf))
}

/// BlockGroup 包装器，提供高级操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGroup {
    pub(super) inner: ext4_group_desc,
}

impl BlockGroup {
    /// 从 ext4_group_desc 创建 BlockGroup（主要用于测试）
    pub fn new(inner: ext4_group_desc) -> Self {
        Self { inner }
    }

    /// 从字节流当前位置加载块组描述符
    pub fn load<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self> {
        let inner = read_block_group_desc(src)?;
        Ok(Self { inner })
    }

    /// 获取内部块组描述符结构的引用
    pub fn inner(&self) -> &ext4_group_desc {
        &self.inner
    }

    /// 获取块位图块号
    pub fn block_bitmap(&self) -> u64 {
        self.inner.block_bitmap_lo as u64
    }

    /// 获取 inode 位图块号
    pub fn inode_bitmap(&self) -> u64 {
        self.inner.inode_bitmap_lo as u64
    }

    /// 获取 inode 表起始块号
    pub fn inode_table_first_block(&self) -> u64 {
        self.inner.inode_table_lo as u64
    }

    /// 获取空闲块数
    pub fn free_blocks_count(&self) -> u32 {
        self.inner.free_blocks_count_lo as u32
    }

    /// 获取空闲 inode 数
    pub fn free_inodes_count(&self) -> u32 {
        self.inner.free_inodes_count_lo as u32
    }

    /// 获取已使用的目录数
    pub fn used_dirs_count(&self) -> u32 {
        self.inner.used_dirs_count_lo as u32
    }

    /// 获取未使用的 inode 数
    pub fn itable_unused(&self) -> u32 {
        self.inner.itable_unused_lo as u32
    }

    /// 获取块组标志
    pub fn flags(&self) -> BlockGroupFlags {
        BlockGroupFlags::from_bits_retain(self.inner.flags)
    }

    /// 检查块组是否有指定标志
    pub fn has_flag(&self, flag: BlockGroupFlags) -> bool {
        self.flags().contains(flag)
    }

    /// 描述符引用的元数据块是否都落在卷内
    ///
    /// 只做范围检查，不验证校验和。
    pub fn references_in_range(&self, sb: &Superblock) -> bool {
        let blocks_count = sb.blocks_count();
        [
            self.block_bitmap(),
            self.inode_bitmap(),
            self.inode_table_first_block(),
        ]
        .iter()
        .all(|&blk| blk != 0 && blk < blocks_count)
    }
}
