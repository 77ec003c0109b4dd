//! 备份 superblock 定位
//!
//! 主 superblock 损坏时，调用方可以定位某个块组中的备份，把流 seek 到
//! 返回的偏移后以 `is_first = false` 重新引导。引导过程本身从不自动回退。

use super::Superblock;

/// 计算块组 `group` 中备份 superblock 的字节偏移
///
/// # 返回
///
/// - `Some(offset)` - 该块组起始块的字节偏移，备份 superblock 就在这里
/// - `None` - 块组 0（主 superblock，需要跳过引导扇区）或该块组没有备份
pub fn backup_superblock_offset(sb: &Superblock, group: u32) -> Option<u64> {
    if group == 0 || !sb.has_super_in_bg(group) {
        return None;
    }

    let first_block = sb.first_data_block() as u64 + group as u64 * sb.blocks_per_group() as u64;
    Some(first_block * sb.block_size() as u64)
}

/// 列出所有存有备份 superblock 的块组及其字节偏移
pub fn backup_superblock_locations(sb: &Superblock) -> impl Iterator<Item = (u32, u64)> + '_ {
    (1..sb.block_group_count())
        .filter_map(move |group| backup_superblock_offset(sb, group).map(|off| (group, off)))
}
