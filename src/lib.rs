//! objcache: 链接器输入文件缓存
//!
//! 为链接器在多遍扫描中对目标文件、库文件的随机读取提供缓存，提供：
//! - **两种缓存模式**：整体缓存（打开时读入整个文件）与分页缓存（按需加载 8 KiB 页）
//! - **零拷贝读取**：单页内的读取直接返回页内视图，只有跨页读取才拼装到暂存缓冲区
//! - **类型化的有效期**：借用视图与调用者持有的缓冲区在类型上区分
//! - **按遍回收**：中间遍裁剪、最终释放、内存紧张时逐个丢弃
//!
//! # 示例
//!
//! ```rust,ignore
//! use objcache::{CacheConfig, LinkPass, ObjCache, ObjectIo, Result};
//!
//! // 实现 ObjectIo trait
//! struct MyFile {
//!     // ...
//! }
//!
//! impl ObjectIo for MyFile {
//!     // 实现必要的方法
//!     // ...
//! }
//!
//! fn main() -> Result<()> {
//!     let mut cache = ObjCache::new(CacheConfig::default());
//!     let id = cache.add_file(MyFile::new("foo.obj"), false);
//!
//!     cache.open(Some(id))?;
//!     let record = cache.read(id, 0, 3)?;
//!     println!("record type {:02x}", record[0]);
//!     cache.close(Some(id), LinkPass::Teardown)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`io`] - 输入文件 I/O 抽象
//! - [`consts`] - 常量定义
//! - [`types`] - 公共类型定义
//! - [`diag`] - 诊断信息上报
//! - [`cache`] - 目标文件缓存
//! - [`cursor`] - 顺序记录读取

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 输入文件 I/O 抽象
pub mod io;

/// 常量定义
pub mod consts;

/// 公共类型定义
pub mod types;

/// 诊断信息
pub mod diag;

/// 目标文件缓存
pub mod cache;

/// 顺序记录读取
pub mod cursor;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// I/O
pub use io::ObjectIo;
#[cfg(feature = "std")]
pub use io::StdFileIo;

// 类型
pub use types::{CacheConfig, CacheMode, CachePolicy, CacheStats, FileFlags, FileId, LinkPass};

// 诊断
pub use diag::{DiagCode, Diagnostic, Diagnostics, LogDiagnostics};

// 缓存
pub use cache::{CacheRead, CacheStorage, InputFile, ObjCache, PermBuf, ScratchBuffer};
pub use consts::{PAGE_SIZE, SECTOR_SIZE};

// 游标
pub use cursor::ObjCursor;
