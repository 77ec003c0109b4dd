//! 引导配置

/// 引导配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// 是否从主 superblock 引导
    ///
    /// 为 `true` 时先 seek 到卷偏移 [`BOOT_SECTOR_SIZE`](crate::consts::BOOT_SECTOR_SIZE)
    /// 跳过引导扇区；为 `false` 时（备份 superblock）从流的当前位置开始解析。
    pub is_first: bool,
    /// 解析后是否对 superblock 做语义校验
    pub validate_superblock: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            is_first: true,
            validate_superblock: true,
        }
    }
}

impl BootstrapConfig {
    /// 从主 superblock 引导
    pub fn primary() -> Self {
        Self::default()
    }

    /// 从流当前位置的备份 superblock 引导
    pub fn backup() -> Self {
        Self {
            is_first: false,
            ..Self::default()
        }
    }

    /// 设置是否校验 superblock
    pub fn validate_superblock(mut self, validate: bool) -> Self {
        self.validate_superblock = validate;
        self
    }
}
