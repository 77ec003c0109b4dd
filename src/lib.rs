//! ext4_bootstrap: ext4 卷引导
//!
//! 在进行任何上层文件系统遍历之前，先从字节流中定位并解析：
//! - **主 superblock**（跳过 1024 字节引导扇区）
//! - **第一个块组描述符**（对齐到 superblock 之后的块边界）
//!
//! 并建立块号到字节偏移的统一换算。inode、extent、目录等上层读取都依赖这里的换算。
//!
//! # 示例
//!
//! ```rust,ignore
//! use ext4_bootstrap::{IoVolume, VolumeBootstrapper, Result};
//!
//! fn main() -> Result<()> {
//!     let file = std::fs::File::open("disk.img").unwrap();
//!     let mut vol = IoVolume::new(file)?;
//!
//!     let ext4 = VolumeBootstrapper::bootstrap(&mut vol, true)?;
//!     println!("block size: {}", ext4.block_size());
//!
//!     // 定位到块 10
//!     ext4.seek_to_block(&mut vol, 10)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`stream`] - 字节流抽象
//! - [`consts`] - 常量定义
//! - [`types`] - 磁盘数据结构定义
//! - [`superblock`] - Superblock 读取、验证、备份定位
//! - [`block_group`] - 块组描述符读取
//! - [`bootstrap`] - 卷引导和块寻址

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 字节流抽象
pub mod stream;

/// 常量定义
pub mod consts;

/// 数据结构定义
pub mod types;

/// Superblock 操作
pub mod superblock;

/// 块组操作
pub mod block_group;

/// 卷引导
pub mod bootstrap;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 字节流
pub use stream::{ByteSource, MemVolume, SeekFrom};
#[cfg(feature = "std")]
pub use stream::IoVolume;

// Superblock
pub use superblock::{Superblock, read_superblock, backup_superblock_offset};

// BlockGroup
pub use block_group::{BlockGroup, read_block_group_desc};

// Bootstrap
pub use bootstrap::{BootstrapConfig, DescriptorRecord, SuperblockRecord, VolumeBootstrapper};

// 布局常量
pub use consts::{BOOT_SECTOR_SIZE, SUPERBLOCK_FOOTPRINT};
