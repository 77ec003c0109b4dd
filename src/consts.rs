//! ext4 卷引导常量定义
//!
//! 这个模块包含了引导过程需要的常量，包括：
//! - 磁盘布局相关常量
//! - superblock / 块组描述符的字段约束
//! - 特性标志（使用 `bitflags` 表示）

use bitflags::bitflags;

//=============================================================================
// 基础常量
//=============================================================================

/// 最小块大小（1024 字节）
pub const EXT4_MIN_BLOCK_SIZE: u32 = 1024;

/// 最大块大小（65536 字节）
pub const EXT4_MAX_BLOCK_SIZE: u32 = 65536;

/// `log_block_size` 的最大合法值（1024 << 6 = 65536）
pub const EXT4_MAX_LOG_BLOCK_SIZE: u32 = 6;

//=============================================================================
// 引导布局
//=============================================================================

/// 主 superblock 之前保留的引导扇区大小
///
/// 主 superblock 位于卷起始处偏移 1024 字节；备份 superblock 没有这段前缀。
pub const BOOT_SECTOR_SIZE: u64 = 1024;

/// superblock 记录在磁盘上占用的固定字节数
pub const SUPERBLOCK_FOOTPRINT: u32 = 1024;

/// Superblock 大小（字节，缓冲区长度）
pub const EXT4_SUPERBLOCK_SIZE: usize = SUPERBLOCK_FOOTPRINT as usize;

/// ext4 魔数 (0xEF53)
pub const EXT4_SUPERBLOCK_MAGIC: u16 = 0xEF53;

/// 块组描述符大小（传统）
pub const EXT4_GROUP_DESC_SIZE: usize = 32;

/// 块组描述符大小（64位）
pub const EXT4_GROUP_DESC_SIZE_64: usize = 64;

/// 块组描述符最小大小
pub const EXT4_MIN_BLOCK_GROUP_DESCRIPTOR_SIZE: usize = 32;

/// 块组描述符最大大小
pub const EXT4_MAX_BLOCK_GROUP_DESCRIPTOR_SIZE: usize = 1024;

/// Superblock 状态：干净卸载
pub const EXT4_SUPER_STATE_VALID: u16 = 0x0001;

/// Superblock 状态：有错误
pub const EXT4_SUPER_STATE_ERROR: u16 = 0x0002;

/// 旧的 inode 大小（rev 0 文件系统）
pub const EXT4_GOOD_OLD_INODE_SIZE: u16 = 128;

/// rev 0 文件系统的第一个非保留 inode
pub const EXT4_GOOD_OLD_FIRST_INO: u32 = 11;

//=============================================================================
// 特性标志
//=============================================================================

bitflags! {
    /// 兼容特性 (`feature_compat`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureCompat: u32 {
        const DIR_PREALLOC = 0x0001;
        const IMAGIC_INODES = 0x0002;
        const HAS_JOURNAL = 0x0004;
        const EXT_ATTR = 0x0008;
        const RESIZE_INODE = 0x0010;
        const DIR_INDEX = 0x0020;
        const SPARSE_SUPER2 = 0x0200;
    }
}

bitflags! {
    /// 不兼容特性 (`feature_incompat`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureIncompat: u32 {
        const COMPRESSION = 0x0001;
        const FILETYPE = 0x0002;
        const RECOVER = 0x0004;
        const JOURNAL_DEV = 0x0008;
        const META_BG = 0x0010;
        const EXTENTS = 0x0040;
        const BIT64 = 0x0080;
        const MMP = 0x0100;
        const FLEX_BG = 0x0200;
        const EA_INODE = 0x0400;
        const DIRDATA = 0x1000;
        const CSUM_SEED = 0x2000;
        const LARGEDIR = 0x4000;
        const INLINE_DATA = 0x8000;
        const ENCRYPT = 0x10000;
    }
}

bitflags! {
    /// 只读兼容特性 (`feature_ro_compat`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureRoCompat: u32 {
        const SPARSE_SUPER = 0x0001;
        const LARGE_FILE = 0x0002;
        const BTREE_DIR = 0x0004;
        const HUGE_FILE = 0x0008;
        const GDT_CSUM = 0x0010;
        const DIR_NLINK = 0x0020;
        const EXTRA_ISIZE = 0x0040;
        const HAS_SNAPSHOT = 0x0080;
        const QUOTA = 0x0100;
        const BIGALLOC = 0x0200;
        const METADATA_CSUM = 0x0400;
        const READONLY = 0x1000;
        const PROJECT = 0x2000;
    }
}

bitflags! {
    /// 块组描述符标志 (`bg_flags`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockGroupFlags: u16 {
        /// inode 表和位图未初始化
        const INODE_UNINIT = 0x0001;
        /// 块位图未初始化
        const BLOCK_UNINIT = 0x0002;
        /// inode 表已清零
        const ITABLE_ZEROED = 0x0004;
    }
}
