//! ext4 磁盘数据结构定义
//!
//! 这个模块包含了直接对应磁盘格式的数据结构。
//!
//! ## 设计原则
//!
//! 1. **磁盘格式结构** - 保留 C 风格命名（便于对照ext4规范）
//! 2. **字段解码** - 用 `byteorder` 按小端序逐字段解码，不做指针强转
//! 3. **辅助方法** - 提供 Rust 风格的访问器和工具函数

#![allow(non_camel_case_types)] // 允许C风格命名

use crate::consts::*;
use byteorder::{ByteOrder, LittleEndian};

/// 顺序小端字段读取器
///
/// 解码时按磁盘布局的字段顺序依次读取，偏移量自动累加。
pub(crate) struct LeReader<'a> {
    buf: &'a [u8],
    off: usize,
}

impl<'a> LeReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, off: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.off
    }

    pub(crate) fn u8(&mut self) -> u8 {
        let v = self.buf[self.off];
        self.off += 1;
        v
    }

    pub(crate) fn u16(&mut self) -> u16 {
        let v = LittleEndian::read_u16(&self.buf[self.off..]);
        self.off += 2;
        v
    }

    pub(crate) fn u32(&mut self) -> u32 {
        let v = LittleEndian::read_u32(&self.buf[self.off..]);
        self.off += 4;
        v
    }

    pub(crate) fn u64(&mut self) -> u64 {
        let v = LittleEndian::read_u64(&self.buf[self.off..]);
        self.off += 8;
        v
    }

    pub(crate) fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.off..self.off + N]);
        self.off += N;
        out
    }

    pub(crate) fn u32s<const N: usize>(&mut self) -> [u32; N] {
        let mut out = [0u32; N];
        LittleEndian::read_u32_into(&self.buf[self.off..self.off + N * 4], &mut out);
        self.off += N * 4;
        out
    }
}

//=============================================================================
// 磁盘格式结构定义
//=============================================================================

/// Superblock 结构
///
/// 对应 ext4 磁盘格式中的 superblock (ext4_super_block)。
/// 字段已经按主机字节序解码。
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ext4_sblock {
    pub inodes_count: u32,           // 0: 总 inode 数
    pub blocks_count_lo: u32,        // 4: 总块数（低32位）
    pub r_blocks_count_lo: u32,      // 8: 保留块数（低32位）
    pub free_blocks_count_lo: u32,   // 12: 空闲块数（低32位）
    pub free_inodes_count: u32,      // 16: 空闲 inode 数
    pub first_data_block: u32,       // 20: 第一个数据块
    pub log_block_size: u32,         // 24: 块大小（2^(10+log_block_size)）
    pub log_cluster_size: u32,       // 28: 簇大小
    pub blocks_per_group: u32,       // 32: 每组块数
    pub clusters_per_group: u32,     // 36: 每组簇数
    pub inodes_per_group: u32,       // 40: 每组 inode 数
    pub mtime: u32,                  // 44: 挂载时间
    pub wtime: u32,                  // 48: 写入时间
    pub mnt_count: u16,              // 52: 挂载次数
    pub max_mnt_count: u16,          // 54: 最大挂载次数
    pub magic: u16,                  // 56: 魔数 (0xEF53)
    pub state: u16,                  // 58: 文件系统状态
    pub errors: u16,                 // 60: 错误处理方式
    pub minor_rev_level: u16,        // 62: 次版本号
    pub lastcheck: u32,              // 64: 最后检查时间
    pub checkinterval: u32,          // 68: 检查间隔
    pub creator_os: u32,             // 72: 创建者操作系统
    pub rev_level: u32,              // 76: 版本级别
    pub def_resuid: u16,             // 80: 默认保留 uid
    pub def_resgid: u16,             // 82: 默认保留 gid

    // 扩展字段
    pub first_ino: u32,              // 84: 第一个非保留 inode
    pub inode_size: u16,             // 88: inode 大小
    pub block_group_nr: u16,         // 90: 本超级块所在的块组号
    pub feature_compat: u32,         // 92: 兼容特性
    pub feature_incompat: u32,       // 96: 不兼容特性
    pub feature_ro_compat: u32,      // 100: 只读兼容特性

    pub uuid: [u8; 16],              // 104: 128位UUID
    pub volume_name: [u8; 16],       // 120: 卷名称
    pub last_mounted: [u8; 64],      // 136: 最后挂载路径
    pub algorithm_usage_bitmap: u32, // 200: 压缩算法位图

    pub prealloc_blocks: u8,         // 204: 预分配块数
    pub prealloc_dir_blocks: u8,     // 205: 目录预分配块数
    pub reserved_gdt_blocks: u16,    // 206: 保留的GDT块数

    pub journal_uuid: [u8; 16],      // 208: 日志UUID
    pub journal_inum: u32,           // 224: 日志inode号
    pub journal_dev: u32,            // 228: 日志设备号
    pub last_orphan: u32,            // 232: 孤儿inode链表头
    pub hash_seed: [u32; 4],         // 236: HTREE哈希种子
    pub def_hash_version: u8,        // 252: 默认哈希版本
    pub jnl_backup_type: u8,         // 253: 日志备份类型
    pub desc_size: u16,              // 254: 组描述符大小
    pub default_mount_opts: u32,     // 256: 默认挂载选项
    pub first_meta_bg: u32,          // 260: 第一个元数据块组
    pub mkfs_time: u32,              // 264: 创建时间
    pub jnl_blocks: [u32; 17],       // 268: 日志备份

    // 64位支持字段
    pub blocks_count_hi: u32,        // 336: 总块数（高32位）
    pub r_blocks_count_hi: u32,      // 340: 保留块数（高32位）
    pub free_blocks_count_hi: u32,   // 344: 空闲块数（高32位）
    pub min_extra_isize: u16,        // 348: 最小额外inode大小
    pub want_extra_isize: u16,       // 350: 期望额外inode大小
    pub flags: u32,                  // 352: 标志
    pub raid_stride: u16,            // 356: RAID步长
    pub mmp_interval: u16,           // 358: MMP检查间隔
    pub mmp_block: u64,              // 360: MMP块号
    pub raid_stripe_width: u32,      // 368: RAID条带宽度
    pub log_groups_per_flex: u8,     // 372: flex_bg组大小log2
    pub checksum_type: u8,           // 373: 校验和类型
    pub reserved_pad: u16,           // 374: 保留填充
    pub kbytes_written: u64,         // 376: 已写入的KB数

    // 384..1020 为快照、错误记录、加密等字段，引导过程不关心
    pub checksum_seed: u32,          // 624: 校验和种子
    pub checksum: u32,               // 1020: superblock校验和
}

impl Default for ext4_sblock {
    fn default() -> Self {
        Self::decode(&[0u8; EXT4_SUPERBLOCK_SIZE])
    }
}

impl ext4_sblock {
    /// 从 superblock 区域解码
    ///
    /// `buf` 必须至少 [`EXT4_SUPERBLOCK_SIZE`] 字节。
    pub fn decode(buf: &[u8; EXT4_SUPERBLOCK_SIZE]) -> Self {
        let mut r = LeReader::new(buf);

        let mut sb = Self {
            inodes_count: r.u32(),
            blocks_count_lo: r.u32(),
            r_blocks_count_lo: r.u32(),
            free_blocks_count_lo: r.u32(),
            free_inodes_count: r.u32(),
            first_data_block: r.u32(),
            log_block_size: r.u32(),
            log_cluster_size: r.u32(),
            blocks_per_group: r.u32(),
            clusters_per_group: r.u32(),
            inodes_per_group: r.u32(),
            mtime: r.u32(),
            wtime: r.u32(),
            mnt_count: r.u16(),
            max_mnt_count: r.u16(),
            magic: r.u16(),
            state: r.u16(),
            errors: r.u16(),
            minor_rev_level: r.u16(),
            lastcheck: r.u32(),
            checkinterval: r.u32(),
            creator_os: r.u32(),
            rev_level: r.u32(),
            def_resuid: r.u16(),
            def_resgid: r.u16(),
            first_ino: r.u32(),
            inode_size: r.u16(),
            block_group_nr: r.u16(),
            feature_compat: r.u32(),
            feature_incompat: r.u32(),
            feature_ro_compat: r.u32(),
            uuid: r.bytes(),
            volume_name: r.bytes(),
            last_mounted: r.bytes(),
            algorithm_usage_bitmap: r.u32(),
            prealloc_blocks: r.u8(),
            prealloc_dir_blocks: r.u8(),
            reserved_gdt_blocks: r.u16(),
            journal_uuid: r.bytes(),
            journal_inum: r.u32(),
            journal_dev: r.u32(),
            last_orphan: r.u32(),
            hash_seed: r.u32s(),
            def_hash_version: r.u8(),
            jnl_backup_type: r.u8(),
            desc_size: r.u16(),
            default_mount_opts: r.u32(),
            first_meta_bg: r.u32(),
            mkfs_time: r.u32(),
            jnl_blocks: r.u32s(),
            blocks_count_hi: r.u32(),
            r_blocks_count_hi: r.u32(),
            free_blocks_count_hi: r.u32(),
            min_extra_isize: r.u16(),
            want_extra_isize: r.u16(),
            flags: r.u32(),
            raid_stride: r.u16(),
            mmp_interval: r.u16(),
            mmp_block: r.u64(),
            raid_stripe_width: r.u32(),
            log_groups_per_flex: r.u8(),
            checksum_type: r.u8(),
            reserved_pad: r.u16(),
            kbytes_written: r.u64(),
            checksum_seed: 0,
            checksum: 0,
        };
        debug_assert_eq!(r.offset(), 384);

        sb.checksum_seed = LittleEndian::read_u32(&buf[624..]);
        sb.checksum = LittleEndian::read_u32(&buf[1020..]);
        sb
    }

    /// 获取块大小（字节）
    ///
    /// `log_block_size` 越界时返回 0，由调用方的校验拒绝。
    pub fn block_size(&self) -> u32 {
        if self.log_block_size > EXT4_MAX_LOG_BLOCK_SIZE {
            return 0;
        }
        EXT4_MIN_BLOCK_SIZE << self.log_block_size
    }

    /// 获取 inode 大小
    pub fn inode_size(&self) -> u16 {
        if self.rev_level == 0 || self.inode_size == 0 {
            EXT4_GOOD_OLD_INODE_SIZE
        } else {
            self.inode_size
        }
    }

    /// 获取总块数（合并高低32位）
    pub fn blocks_count(&self) -> u64 {
        (self.blocks_count_lo as u64) | ((self.blocks_count_hi as u64) << 32)
    }

    /// 获取空闲块数（合并高低32位）
    pub fn free_blocks_count(&self) -> u64 {
        (self.free_blocks_count_lo as u64) | ((self.free_blocks_count_hi as u64) << 32)
    }

    /// 计算块组数量
    pub fn block_group_count(&self) -> u32 {
        let blocks_per_group = self.blocks_per_group as u64;
        if blocks_per_group == 0 {
            return 0;
        }
        let data_blocks = self.blocks_count().saturating_sub(self.first_data_block as u64);
        data_blocks.div_ceil(blocks_per_group) as u32
    }

    /// 验证魔数
    pub fn is_valid(&self) -> bool {
        self.magic == EXT4_SUPERBLOCK_MAGIC
    }
}

/// 块组描述符
///
/// 对应 ext4 磁盘格式中的块组描述符 (ext4_group_desc) 的 32 字节基础部分。
/// 64 位扩展字段不在引导范围内。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ext4_group_desc {
    pub block_bitmap_lo: u32,        // 块位图块号（低32位）
    pub inode_bitmap_lo: u32,        // inode位图块号（低32位）
    pub inode_table_lo: u32,         // inode表起始块号（低32位）
    pub free_blocks_count_lo: u16,   // 空闲块数（低16位）
    pub free_inodes_count_lo: u16,   // 空闲inode数（低16位）
    pub used_dirs_count_lo: u16,     // 目录数（低16位）
    pub flags: u16,                  // 标志
    pub exclude_bitmap_lo: u32,      // 排除位图块号（低32位）
    pub block_bitmap_csum_lo: u16,   // 块位图校验和（低16位）
    pub inode_bitmap_csum_lo: u16,   // inode位图校验和（低16位）
    pub itable_unused_lo: u16,       // 未使用inode数（低16位）
    pub checksum: u16,               // 校验和
}

impl ext4_group_desc {
    /// 从 32 字节描述符记录解码
    pub fn decode(buf: &[u8; EXT4_GROUP_DESC_SIZE]) -> Self {
        let mut r = LeReader::new(buf);
        let desc = Self {
            block_bitmap_lo: r.u32(),
            inode_bitmap_lo: r.u32(),
            inode_table_lo: r.u32(),
            free_blocks_count_lo: r.u16(),
            free_inodes_count_lo: r.u16(),
            used_dirs_count_lo: r.u16(),
            flags: r.u16(),
            exclude_bitmap_lo: r.u32(),
            block_bitmap_csum_lo: r.u16(),
            inode_bitmap_csum_lo: r.u16(),
            itable_unused_lo: r.u16(),
            checksum: r.u16(),
        };
        debug_assert_eq!(r.offset(), EXT4_GROUP_DESC_SIZE);
        desc
    }
}
