//! Superblock 读取和验证

use crate::{
    consts::*,
    error::{Error, ErrorKind, Result},
    stream::ByteSource,
    types::ext4_sblock,
};

/// 从字节流当前位置读取 superblock
///
/// 恰好消耗 [`SUPERBLOCK_FOOTPRINT`] 字节。调用前流必须已经定位到
/// superblock 起始处（主 superblock 为卷偏移 1024，备份 superblock 为所在块组起始）。
///
/// # 参数
///
/// * `src` - 字节流
///
/// # 返回
///
/// 成功返回 superblock 结构
pub fn read_superblock<S: ByteSource + ?Sized>(src: &mut S) -> Result<ext4_sblock> {
    let mut sb_buf = [0u8; EXT4_SUPERBLOCK_SIZE];
    src.read_exact(&mut sb_buf)?;

    let sb = ext4_sblock::decode(&sb_buf);

    // 验证魔数
    if !sb.is_valid() {
        log::debug!("[read_superblock] bad magic {:#06x}", sb.magic);
        return Err(Error::new(
            ErrorKind::Corrupted,
            "Invalid ext4 superblock magic number",
        ));
    }

    // 块大小必须在 1KiB..=64KiB 之间，同时避免移位溢出
    if sb.log_block_size > EXT4_MAX_LOG_BLOCK_SIZE {
        log::debug!("[read_superblock] log_block_size={} out of range", sb.log_block_size);
        return Err(Error::new(
            ErrorKind::Corrupted,
            "Superblock block size out of range",
        ));
    }

    Ok(sb)
}

/// Superblock 包装器，提供高级操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    pub(super) inner: ext4_sblock,
}

impl Superblock {
    /// 从 ext4_sblock 创建 Superblock（主要用于测试）
    pub fn new(inner: ext4_sblock) -> Self {
        Self { inner }
    }

    /// 从字节流当前位置加载 superblock
    pub fn load<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self> {
        let inner = read_superblock(src)?;
        Ok(Self { inner })
    }

    /// 获取内部 superblock 结构的引用
    pub fn inner(&self) -> &ext4_sblock {
        &self.inner
    }

    /// 获取块大小
    pub fn block_size(&self) -> u32 {
        self.inner.block_size()
    }

    /// 获取 inode 大小
    pub fn inode_size(&self) -> u16 {
        self.inner.inode_size()
    }

    /// 获取总块数
    pub fn blocks_count(&self) -> u64 {
        self.inner.blocks_count()
    }

    /// 获取空闲块数
    pub fn free_blocks_count(&self) -> u64 {
        self.inner.free_blocks_count()
    }

    /// 获取总 inode 数
    pub fn inodes_count(&self) -> u32 {
        self.inner.inodes_count
    }

    /// 获取空闲 inode 数
    pub fn free_inodes_count(&self) -> u32 {
        self.inner.free_inodes_count
    }

    /// 获取每组块数
    pub fn blocks_per_group(&self) -> u32 {
        self.inner.blocks_per_group
    }

    /// 获取每组 inode 数
    pub fn inodes_per_group(&self) -> u32 {
        self.inner.inodes_per_group
    }

    /// 获取块组数量
    pub fn block_group_count(&self) -> u32 {
        self.inner.block_group_count()
    }

    /// 获取第一个数据块
    pub fn first_data_block(&self) -> u32 {
        self.inner.first_data_block
    }

    /// 获取第一个非保留 inode
    pub fn first_ino(&self) -> u32 {
        if self.inner.rev_level == 0 {
            EXT4_GOOD_OLD_FIRST_INO
        } else {
            self.inner.first_ino
        }
    }

    /// 本 superblock 所在的块组号（备份 superblock 非零）
    pub fn block_group_nr(&self) -> u16 {
        self.inner.block_group_nr
    }

    /// 兼容特性
    pub fn feature_compat(&self) -> FeatureCompat {
        FeatureCompat::from_bits_retain(self.inner.feature_compat)
    }

    /// 不兼容特性
    pub fn feature_incompat(&self) -> FeatureIncompat {
        FeatureIncompat::from_bits_retain(self.inner.feature_incompat)
    }

    /// 只读兼容特性
    pub fn feature_ro_compat(&self) -> FeatureRoCompat {
        FeatureRoCompat::from_bits_retain(self.inner.feature_ro_compat)
    }

    /// 检查是否使用 extent
    pub fn has_extents(&self) -> bool {
        self.feature_incompat().contains(FeatureIncompat::EXTENTS)
    }

    /// 检查是否是 64 位文件系统
    pub fn is_64bit(&self) -> bool {
        self.feature_incompat().contains(FeatureIncompat::BIT64)
    }

    /// 检查是否启用元数据校验和
    pub fn has_metadata_csum(&self) -> bool {
        self.feature_ro_compat().contains(FeatureRoCompat::METADATA_CSUM)
    }

    /// 获取块组描述符大小
    pub fn group_desc_size(&self) -> usize {
        if self.is_64bit() {
            let size = self.inner.desc_size as usize;
            if size > 0 {
                size
            } else {
                EXT4_GROUP_DESC_SIZE_64
            }
        } else {
            EXT4_GROUP_DESC_SIZE
        }
    }

    /// 获取卷名称（UTF-8 字符串）
    pub fn volume_name(&self) -> Option<&str> {
        let len = self
            .inner
            .volume_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.inner.volume_name.len());

        core::str::from_utf8(&self.inner.volume_name[..len]).ok()
    }

    /// 获取 UUID
    pub fn uuid(&self) -> &[u8; 16] {
        &self.inner.uuid
    }

    /// 文件系统是否干净卸载
    pub fn is_clean(&self) -> bool {
        (self.inner.state & EXT4_SUPER_STATE_VALID) != 0
            && (self.inner.state & EXT4_SUPER_STATE_ERROR) == 0
    }

    /// 完整的 superblock 验证
    ///
    /// 对应 lwext4 的 `ext4_sb_check()`，不含校验和验证。
    ///
    /// 检查：
    /// - 魔数
    /// - 计数字段非零
    /// - 大小字段范围
    /// - 块组描述符大小
    pub fn check(&self) -> Result<()> {
        if !self.inner.is_valid() {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Invalid ext4 superblock magic number",
            ));
        }

        if self.block_size() == 0 {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Superblock block size out of range",
            ));
        }

        if self.inodes_count() == 0 {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Superblock inodes_count is zero",
            ));
        }

        if self.blocks_count() == 0 {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Superblock blocks_count is zero",
            ));
        }

        if self.blocks_per_group() == 0 {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Superblock blocks_per_group is zero",
            ));
        }

        if self.inodes_per_group() == 0 {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Superblock inodes_per_group is zero",
            ));
        }

        if self.inode_size() < EXT4_GOOD_OLD_INODE_SIZE {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Superblock inode_size is less than 128",
            ));
        }

        if self.first_ino() < EXT4_GOOD_OLD_FIRST_INO {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Superblock first_ino is less than 11",
            ));
        }

        let desc_size = self.group_desc_size();
        if desc_size < EXT4_MIN_BLOCK_GROUP_DESCRIPTOR_SIZE {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Block group descriptor size too small",
            ));
        }
        if desc_size > EXT4_MAX_BLOCK_GROUP_DESCRIPTOR_SIZE {
            return Err(Error::new(
                ErrorKind::Corrupted,
                "Block group descriptor size too large",
            ));
        }

        // 1KiB 块的卷中 superblock 占据块 1，其余情况占据块 0
        let expected_first = u32::from(self.block_size() == EXT4_MIN_BLOCK_SIZE);
        if self.first_data_block() != expected_first {
            log::warn!(
                "[Superblock::check] first_data_block={} for block_size={}, expected {}",
                self.first_data_block(),
                self.block_size(),
                expected_first
            );
        }

        Ok(())
    }

    /// 判断块组是否为稀疏超级块组
    ///
    /// 对应 lwext4 的 `ext4_sb_sparse()`
    ///
    /// 稀疏超级块特性：只在特定块组（0, 1, 和 3/5/7 的幂次）存储超级块备份
    pub fn is_sparse_group(group: u32) -> bool {
        if group <= 1 {
            return true;
        }

        if (group & 1) == 0 {
            return false;
        }

        is_power_of(group, 7) || is_power_of(group, 5) || is_power_of(group, 3)
    }

    /// 判断超级块是否存在于指定的块组中
    ///
    /// 对应 lwext4 的 `ext4_sb_is_super_in_bg()`
    pub fn has_super_in_bg(&self, group: u32) -> bool {
        if group >= self.block_group_count() {
            return false;
        }

        if self.feature_ro_compat().contains(FeatureRoCompat::SPARSE_SUPER) {
            Self::is_sparse_group(group)
        } else {
            true
        }
    }
}

/// 判断一个数是否为另一个数的幂
///
/// 对应 lwext4 的 `is_power_of()`
fn is_power_of(mut a: u32, b: u32) -> bool {
    loop {
        if a < b {
            return false;
        }
        if a == b {
            return true;
        }
        if (a % b) != 0 {
            return false;
        }
        a /= b;
    }
}
