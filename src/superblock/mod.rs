//! Superblock 操作模块
//!
//! 这个模块提供 ext4 superblock 的读取、验证，以及备份 superblock 的定位。

mod read;
mod backup;

pub use read::*;
pub use backup::*;
