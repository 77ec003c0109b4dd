//! 字节流抽象
//!
//! 引导过程只需要三种能力：绝对 seek、相对 seek、精确读取。
//! stream/source.rs 定义 [`ByteSource`] trait 和 [`SeekFrom`]；
//! stream/mem.rs 提供内存卷实现，stream/io.rs 在 `std` 下适配 `Read + Seek`。

mod source;
mod mem;
#[cfg(feature = "std")]
mod io;

pub use source::{ByteSource, SeekFrom};
pub use mem::MemVolume;
#[cfg(feature = "std")]
pub use io::IoVolume;
