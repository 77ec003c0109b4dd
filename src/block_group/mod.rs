//! 块组描述符操作模块
//!
//! 这个模块提供第一个 ext4 块组描述符的读取和查询功能。
mod read;

pub use read::*;
