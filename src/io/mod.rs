//! 输入文件 I/O 抽象
//!
//! io/handle.rs 定义缓存所依赖的底层文件接口（打开、定位、读取、关闭、查询大小）。
//! io/std_file.rs 在 `std` 特性下提供基于 `std::fs::File` 的实现。

mod handle;
#[cfg(feature = "std")]
mod std_file;

pub use handle::ObjectIo;
#[cfg(feature = "std")]
pub use std_file::StdFileIo;
