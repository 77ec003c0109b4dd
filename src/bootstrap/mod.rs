//! 卷引导
//!
//! 从字节流定位并解析主 superblock 和第一个块组描述符，
//! 建立块号到字节偏移的换算。

mod config;
mod record;
mod volume;

pub use config::BootstrapConfig;
pub use record::{DescriptorRecord, SuperblockRecord};
pub use volume::VolumeBootstrapper;
