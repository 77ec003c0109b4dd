//! 卷引导器
//!
//! 引导顺序：
//!
//! 1. 主 superblock 时 seek 到偏移 1024，跳过引导扇区
//! 2. 在当前位置解析 superblock
//! 3. 从 superblock 取块大小
//! 4. 块大小大于 superblock 占用的 1024 字节时跳到 GDT 所在的块：
//!    主 superblock 直接 seek 到块 1 起始处，备份 superblock 相对 seek
//!    `block_size - 1024` 字节跳过当前块剩余部分
//! 5. 在块对齐后的位置解析第一个块组描述符
//!
//! 每一步都依赖上一步留下的流位置，所以整个过程需要独占流。

use super::{BootstrapConfig, DescriptorRecord, SuperblockRecord};
use crate::{
    block_group::BlockGroup,
    consts::{BOOT_SECTOR_SIZE, SUPERBLOCK_FOOTPRINT},
    error::{Error, ErrorKind, Result},
    stream::{ByteSource, SeekFrom},
    superblock::Superblock,
};

/// 已引导的 ext4 卷句柄
///
/// 持有解析好的 superblock、第一个块组描述符和块大小，构造后不再改变。
/// 不持有字节流：流的生命周期由调用方管理。
///
/// # 示例
///
/// ```rust,ignore
/// use ext4_bootstrap::{MemVolume, VolumeBootstrapper};
///
/// let mut vol = MemVolume::new(image);
/// let ext4 = VolumeBootstrapper::bootstrap(&mut vol, true)?;
///
/// // 定位 inode 表
/// let itable = ext4.block_group_descriptor().inode_table_first_block();
/// ext4.seek_to_block(&mut vol, itable as u32)?;
/// ```
#[derive(Debug, Clone)]
pub struct VolumeBootstrapper<SB = Superblock, BG = BlockGroup> {
    sb: SB,
    bgd: BG,
    block_size: u32,
}

impl VolumeBootstrapper {
    /// 用默认的 superblock / 块组描述符解析器引导
    ///
    /// # 参数
    ///
    /// * `stream` - 字节流，引导期间被独占
    /// * `is_first` - 是否为主 superblock（需要跳过引导扇区）
    pub fn bootstrap<S: ByteSource + ?Sized>(stream: &mut S, is_first: bool) -> Result<Self> {
        Self::bootstrap_with_config(
            stream,
            BootstrapConfig {
                is_first,
                ..BootstrapConfig::default()
            },
        )
    }

    /// 按配置用默认解析器引导
    pub fn bootstrap_with_config<S: ByteSource + ?Sized>(
        stream: &mut S,
        config: BootstrapConfig,
    ) -> Result<Self> {
        Self::bootstrap_records(stream, config)
    }

    /// 从互斥锁保护的流引导
    ///
    /// 锁在整个引导过程中持有，任何返回路径上都会释放。
    #[cfg(feature = "std")]
    pub fn bootstrap_locked<S: ByteSource>(
        stream: &std::sync::Mutex<S>,
        is_first: bool,
    ) -> Result<Self> {
        let mut guard = stream.lock().map_err(|_| {
            Error::new(ErrorKind::InvalidState, "Stream lock poisoned")
                .wrap(ErrorKind::BootstrapFailed, "Volume bootstrap failed")
        })?;

        Self::bootstrap(&mut *guard, is_first)
    }
}

impl<SB: SuperblockRecord, BG: DescriptorRecord> VolumeBootstrapper<SB, BG> {
    /// 用指定的记录类型引导
    ///
    /// 任何失败都包装为 `ErrorKind::BootstrapFailed`，错误链中保留具体原因
    /// （`SeekFailed` / `SuperblockParseFailed` / `DescriptorParseFailed`）。
    /// 失败时不返回部分结果，也不会回退到备份 superblock。
    pub fn bootstrap_records<S: ByteSource + ?Sized>(
        stream: &mut S,
        config: BootstrapConfig,
    ) -> Result<Self> {
        Self::run(stream, config).map_err(|e| {
            log::debug!("[bootstrap] failed: {}", e);
            e.wrap(ErrorKind::BootstrapFailed, "Volume bootstrap failed")
        })
    }

    fn run<S: ByteSource + ?Sized>(stream: &mut S, config: BootstrapConfig) -> Result<Self> {
        if config.is_first {
            stream
                .seek(SeekFrom::Start(BOOT_SECTOR_SIZE))
                .map_err(|e| e.wrap(ErrorKind::SeekFailed, "Failed to skip boot sector"))?;
        }

        let sb = SB::parse(stream)
            .map_err(|e| e.wrap(ErrorKind::SuperblockParseFailed, "Failed to parse superblock"))?;

        if config.validate_superblock {
            sb.validate().map_err(|e| {
                e.wrap(ErrorKind::SuperblockParseFailed, "Superblock failed validation")
            })?;
        }

        let block_size = sb.block_size();
        if block_size == 0 {
            return Err(Error::new(
                ErrorKind::SuperblockParseFailed,
                "Superblock reports zero block size",
            ));
        }
        if block_size % SUPERBLOCK_FOOTPRINT != 0 {
            log::warn!(
                "[bootstrap] block_size={} is not a multiple of the superblock footprint",
                block_size
            );
        }

        log::debug!(
            "[bootstrap] superblock parsed: block_size={}, is_first={}",
            block_size,
            config.is_first
        );

        if block_size > SUPERBLOCK_FOOTPRINT {
            let pos = if config.is_first {
                // 主 superblock 位于块 0 内偏移 1024 处，GDT 在下一个块边界
                let sb_end = BOOT_SECTOR_SIZE + SUPERBLOCK_FOOTPRINT as u64;
                stream.seek(SeekFrom::Start(next_block_boundary(sb_end, block_size)))
            } else {
                // 备份 superblock 从块边界开始，跳过当前块剩余部分
                let skip = (block_size - SUPERBLOCK_FOOTPRINT) as i64;
                stream.seek(SeekFrom::Current(skip))
            }
            .map_err(|e| e.wrap(ErrorKind::SeekFailed, "Failed to skip to next block boundary"))?;
            log::trace!("[bootstrap] descriptor table at {:#x}", pos);
        }

        let bgd = BG::parse(stream).map_err(|e| {
            e.wrap(
                ErrorKind::DescriptorParseFailed,
                "Failed to parse block group descriptor",
            )
        })?;

        log::debug!("[bootstrap] block group descriptor parsed");

        Ok(Self {
            sb,
            bgd,
            block_size,
        })
    }

    /// 获取 superblock
    pub fn superblock(&self) -> &SB {
        &self.sb
    }

    /// 获取第一个块组描述符
    pub fn block_group_descriptor(&self) -> &BG {
        &self.bgd
    }

    /// 块大小（字节）
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// 块号对应的字节偏移
    ///
    /// 所有上层读取都应通过这里把块号换算为字节偏移。按 64 位计算，不会溢出。
    pub fn block_offset(&self, block: u32) -> u64 {
        block as u64 * self.block_size as u64
    }

    /// 把流 seek 到指定块的起始处
    ///
    /// 成功时流位置恰好为 [`block_offset(block)`](Self::block_offset)。
    /// 只修改流的位置，不修改句柄。
    pub fn seek_to_block<S: ByteSource + ?Sized>(&self, stream: &mut S, block: u32) -> Result<()> {
        let offset = self.block_offset(block);
        let pos = stream
            .seek(SeekFrom::Start(offset))
            .map_err(|e| e.wrap(ErrorKind::SeekFailed, "Failed to seek to block"))?;

        if pos != offset {
            return Err(Error::with_cause(
                ErrorKind::SeekFailed,
                "Failed to seek to block",
                Error::new(ErrorKind::InvalidState, "Stream landed on an unexpected offset"),
            ));
        }

        log::trace!("[seek_to_block] block={} offset={:#x}", block, offset);
        Ok(())
    }

    /// 拆出 superblock 和块组描述符
    pub fn into_parts(self) -> (SB, BG) {
        (self.sb, self.bgd)
    }
}

/// `pos` 之后（含）的第一个块边界
fn next_block_boundary(pos: u64, block_size: u32) -> u64 {
    let bs = block_size as u64;
    pos.div_ceil(bs) * bs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::EXT4_SUPERBLOCK_MAGIC;
    use crate::stream::MemVolume;
    use alloc::vec;
    use alloc::vec::Vec;
    use byteorder::{ByteOrder, LittleEndian};

    /// 记录解析时流位置的 superblock，块大小取前 4 字节
    #[derive(Debug)]
    struct ProbeSb {
        parsed_at: u64,
        block_size: u32,
    }

    impl SuperblockRecord for ProbeSb {
        fn parse<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self> {
            let parsed_at = src.position()?;
            let mut buf = [0u8; SUPERBLOCK_FOOTPRINT as usize];
            src.read_exact(&mut buf)?;
            Ok(Self {
                parsed_at,
                block_size: LittleEndian::read_u32(&buf),
            })
        }

        fn block_size(&self) -> u32 {
            self.block_size
        }
    }

    /// 记录解析时流位置的描述符，读取 32 字节
    #[derive(Debug)]
    struct ProbeBg {
        parsed_at: u64,
        tag: u32,
    }

    impl DescriptorRecord for ProbeBg {
        fn parse<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self> {
            let parsed_at = src.position()?;
            let mut buf = [0u8; 32];
            src.read_exact(&mut buf)?;
            Ok(Self {
                parsed_at,
                tag: LittleEndian::read_u32(&buf),
            })
        }
    }

    /// 只读取前 4 字节的 superblock
    #[derive(Debug)]
    struct ShortSb(u32);

    impl SuperblockRecord for ShortSb {
        fn parse<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self> {
            let mut buf = [0u8; 4];
            src.read_exact(&mut buf)?;
            Ok(Self(LittleEndian::read_u32(&buf)))
        }

        fn block_size(&self) -> u32 {
            self.0
        }
    }

    /// seek 总是报告落在 0 的流
    struct StuckVolume(MemVolume);

    impl ByteSource for StuckVolume {
        fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
            self.0.seek(pos)?;
            Ok(0)
        }

        fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
            self.0.read_exact(buf)
        }
    }

    #[derive(Debug)]
    struct RejectingBg;

    impl DescriptorRecord for RejectingBg {
        fn parse<S: ByteSource + ?Sized>(_src: &mut S) -> Result<Self> {
            Err(Error::new(ErrorKind::Corrupted, "descriptor rejected"))
        }
    }

    type Probe = VolumeBootstrapper<ProbeSb, ProbeBg>;

    /// 构造探测镜像：`sb_at` 处写入块大小，GDT 起始处写入标记 0xB6D
    ///
    /// `sb_at == 1024` 视为主 superblock（GDT 在下一个块边界），
    /// 其他位置视为备份（GDT 在 superblock 起始处之后一个块）。
    fn probe_image(sb_at: usize, block_size: u32, len: usize) -> Vec<u8> {
        let mut img = vec![0u8; len];
        LittleEndian::write_u32(&mut img[sb_at..], block_size);
        let sb_end = sb_at + SUPERBLOCK_FOOTPRINT as usize;
        let gdt = if block_size <= SUPERBLOCK_FOOTPRINT {
            sb_end
        } else if sb_at as u64 == BOOT_SECTOR_SIZE {
            next_block_boundary(sb_end as u64, block_size) as usize
        } else {
            sb_at + block_size as usize
        };
        if gdt + 4 <= len {
            LittleEndian::write_u32(&mut img[gdt..], 0xB6D);
        }
        img
    }

    fn probe_config(is_first: bool) -> BootstrapConfig {
        BootstrapConfig {
            is_first,
            validate_superblock: false,
        }
    }

    #[test]
    fn test_block_offset_1k() {
        let mut vol = MemVolume::new(probe_image(1024, 1024, 4096));
        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();

        assert_eq!(ext4.block_size(), 1024);
        assert_eq!(ext4.block_offset(0), 0);
        assert_eq!(ext4.block_offset(1), 1024);
        assert_eq!(ext4.block_offset(5), 5120);
    }

    #[test]
    fn test_block_offset_does_not_overflow() {
        let mut vol = MemVolume::new(probe_image(1024, 65536, 65536 + 64));
        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();

        assert_eq!(ext4.block_offset(u32::MAX), u32::MAX as u64 * 65536);
    }

    #[test]
    fn test_primary_skips_boot_sector() {
        let mut vol = MemVolume::new(probe_image(1024, 1024, 4096));
        vol.seek(SeekFrom::Start(300)).unwrap();

        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();
        assert_eq!(ext4.superblock().parsed_at, 1024);
    }

    #[test]
    fn test_backup_parses_at_current_position() {
        let mut vol = MemVolume::new(probe_image(8192, 4096, 16384));
        vol.seek(SeekFrom::Start(8192)).unwrap();

        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(false)).unwrap();
        assert_eq!(ext4.superblock().parsed_at, 8192);
        assert_eq!(ext4.block_group_descriptor().parsed_at, 12288);
        assert_eq!(ext4.block_group_descriptor().tag, 0xB6D);
    }

    #[test]
    fn test_backup_without_seek_starts_at_zero() {
        let mut vol = MemVolume::new(probe_image(0, 1024, 4096));

        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(false)).unwrap();
        assert_eq!(ext4.superblock().parsed_at, 0);
        assert_eq!(ext4.block_group_descriptor().parsed_at, 1024);
    }

    #[test]
    fn test_large_block_aligns_descriptor() {
        let mut vol = MemVolume::new(probe_image(1024, 4096, 8192));

        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();
        let bgd = ext4.block_group_descriptor();

        // 1024 (引导扇区) + 1024 (superblock) + 2048 (跳过) = 4096
        assert_eq!(bgd.parsed_at, 4096);
        assert_eq!(bgd.parsed_at % 4096, 0);
        assert_eq!(bgd.tag, 0xB6D);
        assert_eq!(vol.pos(), 4096 + 32);
    }

    #[test]
    fn test_backup_large_block_skips_rest_of_block() {
        let mut vol = MemVolume::new(probe_image(32768, 4096, 40960));
        vol.seek(SeekFrom::Start(32768)).unwrap();

        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(false)).unwrap();
        // superblock 结束于 33792，跳过 4096 - 1024 = 3072 字节
        assert_eq!(ext4.block_group_descriptor().parsed_at, 33792 + 3072);
        assert_eq!(ext4.block_group_descriptor().tag, 0xB6D);
    }

    #[test]
    fn test_backup_unaligned_skips_fixed_amount() {
        // 备份 superblock 不在块边界上时仍然只跳过 block_size - 1024
        let mut vol = MemVolume::new(probe_image(512, 4096, 8192));
        vol.seek(SeekFrom::Start(512)).unwrap();

        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(false)).unwrap();
        assert_eq!(ext4.superblock().parsed_at, 512);
        assert_eq!(ext4.block_group_descriptor().parsed_at, 1536 + 3072);
        assert_eq!(ext4.block_group_descriptor().tag, 0xB6D);
    }

    #[test]
    fn test_primary_skip_ignores_short_superblock_read() {
        // superblock 解析器少读了字节，主 superblock 的 GDT 仍在块 1
        let mut vol = MemVolume::new(probe_image(1024, 4096, 8192));
        let ext4 = VolumeBootstrapper::<ShortSb, ProbeBg>::bootstrap_records(
            &mut vol,
            probe_config(true),
        )
        .unwrap();
        assert_eq!(ext4.block_group_descriptor().parsed_at, 4096);
    }

    #[test]
    fn test_next_block_boundary() {
        assert_eq!(next_block_boundary(2048, 4096), 4096);
        assert_eq!(next_block_boundary(4096, 4096), 4096);
        assert_eq!(next_block_boundary(2048, 2048), 2048);
        assert_eq!(next_block_boundary(9216, 4096), 12288);
    }

    #[test]
    fn test_footprint_sized_block_no_skip() {
        let mut vol = MemVolume::new(probe_image(1024, 1024, 4096));

        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();
        assert_eq!(ext4.block_group_descriptor().parsed_at, 2048);
    }

    #[test]
    fn test_sub_footprint_block_no_skip() {
        // 小于 1024 的块大小不会触发回退 seek
        let mut vol = MemVolume::new(probe_image(1024, 512, 4096));

        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();
        assert_eq!(ext4.block_group_descriptor().parsed_at, 2048);
        assert_eq!(ext4.block_offset(3), 1536);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let mut vol = MemVolume::new(probe_image(1024, 0, 4096));

        let err = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BootstrapFailed);
        assert_eq!(err.root_cause().kind(), ErrorKind::SuperblockParseFailed);
    }

    #[test]
    fn test_boot_sector_seek_out_of_range() {
        let mut vol = MemVolume::new(vec![0u8; 512]);

        let err = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BootstrapFailed);
        assert!(err.has_kind(ErrorKind::SeekFailed));
    }

    #[test]
    fn test_alignment_seek_out_of_range() {
        // 块大小 4096，但卷在 superblock 之后就结束了
        let mut vol = MemVolume::new(probe_image(1024, 4096, 2048));

        let err = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BootstrapFailed);
        assert_eq!(err.cause().map(|e| e.kind()), Some(ErrorKind::SeekFailed));
        assert_eq!(err.root_cause().kind(), ErrorKind::SeekFailed);
    }

    #[test]
    fn test_truncated_superblock() {
        let mut vol = MemVolume::new(vec![0u8; 1500]);

        let err = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap_err();
        assert_eq!(err.cause().map(|e| e.kind()), Some(ErrorKind::SuperblockParseFailed));
        assert_eq!(err.root_cause().kind(), ErrorKind::Io);
    }

    #[test]
    fn test_descriptor_parse_failure() {
        let mut vol = MemVolume::new(probe_image(1024, 1024, 4096));

        let err = VolumeBootstrapper::<ProbeSb, RejectingBg>::bootstrap_records(
            &mut vol,
            probe_config(true),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BootstrapFailed);
        assert_eq!(err.cause().map(|e| e.kind()), Some(ErrorKind::DescriptorParseFailed));
        assert_eq!(err.root_cause().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_accessors_are_stable() {
        let mut vol = MemVolume::new(probe_image(1024, 2048, 8192));
        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();

        let sb1 = ext4.superblock() as *const ProbeSb;
        let sb2 = ext4.superblock() as *const ProbeSb;
        let bg1 = ext4.block_group_descriptor() as *const ProbeBg;
        let bg2 = ext4.block_group_descriptor() as *const ProbeBg;
        assert_eq!(sb1, sb2);
        assert_eq!(bg1, bg2);
        assert_eq!(ext4.superblock().block_size, ext4.block_size());
    }

    #[test]
    fn test_seek_to_block() {
        let mut vol = MemVolume::new(probe_image(1024, 2048, 8192));
        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();

        ext4.seek_to_block(&mut vol, 3).unwrap();
        assert_eq!(vol.pos(), 6144);

        ext4.seek_to_block(&mut vol, 0).unwrap();
        assert_eq!(vol.pos(), 0);

        let err = ext4.seek_to_block(&mut vol, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SeekFailed);
        assert_eq!(vol.pos(), 0);
    }

    #[test]
    fn test_seek_to_block_wrong_landing() {
        let mut vol = MemVolume::new(probe_image(1024, 2048, 8192));
        let ext4 = Probe::bootstrap_records(&mut vol, probe_config(true)).unwrap();

        let mut stuck = StuckVolume(vol);
        let err = ext4.seek_to_block(&mut stuck, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SeekFailed);
        assert_eq!(err.root_cause().kind(), ErrorKind::InvalidState);
    }

    /// 默认解析器：完整的 2KiB 块卷
    fn ext4_image_2k() -> Vec<u8> {
        let mut img = vec![0u8; 8 * 2048];
        let sb = &mut img[1024..2048];
        LittleEndian::write_u32(&mut sb[0..], 128); // inodes_count
        LittleEndian::write_u32(&mut sb[4..], 8); // blocks_count_lo
        LittleEndian::write_u32(&mut sb[24..], 1); // log_block_size -> 2048
        LittleEndian::write_u32(&mut sb[32..], 16384); // blocks_per_group
        LittleEndian::write_u32(&mut sb[40..], 128); // inodes_per_group
        LittleEndian::write_u16(&mut sb[56..], EXT4_SUPERBLOCK_MAGIC);
        LittleEndian::write_u16(&mut sb[58..], 1); // state
        LittleEndian::write_u32(&mut sb[76..], 1); // rev_level
        LittleEndian::write_u32(&mut sb[84..], 11); // first_ino
        LittleEndian::write_u16(&mut sb[88..], 256); // inode_size

        let gd = &mut img[2048..2080];
        LittleEndian::write_u32(&mut gd[0..], 3); // block_bitmap
        LittleEndian::write_u32(&mut gd[4..], 4); // inode_bitmap
        LittleEndian::write_u32(&mut gd[8..], 5); // inode_table
        img
    }

    #[test]
    fn test_default_parsers_round_trip() {
        let mut vol = MemVolume::new(ext4_image_2k());
        let ext4 = VolumeBootstrapper::bootstrap(&mut vol, true).unwrap();

        assert_eq!(ext4.block_size(), 2048);
        assert_eq!(ext4.superblock().block_size(), 2048);
        assert_eq!(ext4.block_offset(10), 20480);
        assert_eq!(ext4.block_group_descriptor().inode_table_first_block(), 5);
        assert!(ext4.block_group_descriptor().references_in_range(ext4.superblock()));
        assert_eq!(vol.pos(), 2048 + 32);
    }

    #[test]
    fn test_default_parsers_validation() {
        let mut img = ext4_image_2k();
        LittleEndian::write_u32(&mut img[1024 + 40..], 0); // inodes_per_group

        let mut vol = MemVolume::new(img.clone());
        let err = VolumeBootstrapper::bootstrap(&mut vol, true).unwrap_err();
        assert_eq!(err.cause().map(|e| e.kind()), Some(ErrorKind::SuperblockParseFailed));
        assert_eq!(err.root_cause().kind(), ErrorKind::Corrupted);

        // 关闭校验后可以引导
        let mut vol = MemVolume::new(img);
        let config = BootstrapConfig::primary().validate_superblock(false);
        assert!(VolumeBootstrapper::bootstrap_with_config(&mut vol, config).is_ok());
    }
}
