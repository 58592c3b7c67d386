//! 目标文件缓存模块
//!
//! 把链接器在多遍扫描中对目标文件、库文件的随机读取，转换为少量真实的 I/O 操作。
//!
//! # 主要组件
//!
//! - [`ScratchBuffer`] - 跨页读取的暂存缓冲区
//! - [`CacheStorage`] / [`InputFile`] - 单个文件的页存储（整体缓存或分页缓存）
//! - [`CacheRead`] / [`PermBuf`] - 读取结果：借用视图与调用者持有的缓冲区
//! - [`ObjCache`] - 缓存上下文：文件记录、登记表、回收策略
//!
//! # 缓存模式
//!
//! | 模式       | 打开时                     | 读取                         |
//! |------------|----------------------------|------------------------------|
//! | 整体缓存   | 整个文件读入一块内存       | 直接返回区间视图，零拷贝     |
//! | 分页缓存   | 建立空的页数组，不读数据   | 按需加载 8 KiB 页，跨页拼装 |
//!
//! 默认情况下库文件（多次打开、稀疏读取、体积大）使用分页缓存，
//! 其他目标文件（通常被完整读取、体积小）使用整体缓存。
//!
//! # 视图有效期
//!
//! - [`CacheRead::Stable`] 指向页缓冲区或整文件缓存
//! - [`CacheRead::Transient`] 指向暂存缓冲区，下一次读取即被覆盖
//!
//! 两者都借用 [`ObjCache`]，因此在下一次调用缓存之前一定已经失效；
//! 需要跨读取保留的数据使用 [`ObjCache::perm_read`]。
//!
//! # 回收
//!
//! | 阶段                    | 整体缓存                | 分页缓存                       |
//! |-------------------------|-------------------------|--------------------------------|
//! | [`LinkPass::MidPass`]   | 非库文件释放            | 丢弃所有页（库文件保留当前页） |
//! | [`LinkPass::Teardown`]  | 释放并关闭句柄          | 释放并关闭句柄                 |
//! | [`ObjCache::dump_one`]  | 不受影响                | 丢弃一个文件的全部页           |
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use objcache::{CacheConfig, LinkPass, ObjCache, StdFileIo};
//!
//! let mut cache = ObjCache::new(CacheConfig::default());
//! let lib = cache.add_file(StdFileIo::new("clib.lib"), true);
//!
//! cache.open(Some(lib))?;
//! let header = cache.perm_read(lib, 0, 16)?;
//! let view = cache.read(lib, 8000, 9000)?;
//! if !view.is_stable() {
//!     // 跨页读取，数据位于暂存缓冲区
//! }
//! cache.release(lib, header);
//! cache.close(Some(lib), LinkPass::MidPass)?;
//!
//! cache.finish()?;
//! ```
//!
//! [`LinkPass::MidPass`]: crate::LinkPass::MidPass
//! [`LinkPass::Teardown`]: crate::LinkPass::Teardown

mod lifecycle;
mod objcache;
mod read;
mod scratch;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use objcache::ObjCache;
pub use read::{CacheRead, PermBuf};
pub use scratch::ScratchBuffer;
pub use store::{CacheStorage, InputFile};
