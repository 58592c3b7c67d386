//! 页存储
//!
//! 每个输入文件的缓存要么是一整块文件内容（整体缓存），要么是按需加载的页数组
//! （分页缓存）。两种形态用 [`CacheStorage`] 区分，不会混用。

use crate::{
    consts::{page_count, PAGE_SIZE},
    error::{Error, ErrorKind, Result},
    io::ObjectIo,
    types::{CacheMode, FileFlags},
};
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

/// 单个输入文件的缓存存储
#[derive(Debug)]
pub enum CacheStorage {
    /// 整个文件的内容
    Full(Arc<[u8]>),
    /// 页数组，`None` 表示该页未加载（或已被丢弃）
    Paged(Vec<Option<Box<[u8]>>>),
}

impl CacheStorage {
    /// 为长度为 `len` 的文件创建全空的页数组
    pub fn paged(len: u64) -> Self {
        let mut pages = Vec::with_capacity(page_count(len));
        pages.resize_with(page_count(len), || None);
        CacheStorage::Paged(pages)
    }

    /// 常驻页数（整体缓存返回 0）
    pub fn resident_pages(&self) -> usize {
        match self {
            CacheStorage::Full(_) => 0,
            CacheStorage::Paged(pages) => pages.iter().filter(|p| p.is_some()).count(),
        }
    }

    /// 丢弃常驻页，`keep` 指定的页除外
    ///
    /// # 返回
    ///
    /// 实际丢弃的页数；整体缓存不受影响，返回 0
    pub fn trim(&mut self, keep: Option<usize>) -> usize {
        let CacheStorage::Paged(pages) = self else {
            return 0;
        };
        let mut freed = 0;
        for (index, slot) in pages.iter_mut().enumerate() {
            if Some(index) != keep && slot.take().is_some() {
                freed += 1;
            }
        }
        freed
    }
}

/// 输入文件记录
///
/// # 字段说明
///
/// - `io`: 底层文件句柄
/// - `len`: 文件长度，0 表示未知（首次打开时查询）
/// - `currpos`: 句柄当前位置，用于省去多余的 seek
/// - `flags`: 状态标志
/// - `mode`: 缓存模式，`None` 表示尚未选定
/// - `cache`: 缓存存储，`None` 表示未分配
pub struct InputFile<F> {
    pub(crate) io: F,
    pub(crate) len: u64,
    pub(crate) currpos: u64,
    pub(crate) flags: FileFlags,
    pub(crate) mode: Option<CacheMode>,
    pub(crate) cache: Option<CacheStorage>,
}

impl<F: ObjectIo> core::fmt::Debug for InputFile<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InputFile")
            .field("name", &self.io.name())
            .field("len", &self.len)
            .field("currpos", &self.currpos)
            .field("flags", &self.flags)
            .field("mode", &self.mode)
            .field("resident_pages", &self.resident_pages())
            .finish()
    }
}

impl<F: ObjectIo> InputFile<F> {
    /// 创建文件记录
    ///
    /// # 参数
    ///
    /// * `io` - 底层文件句柄
    /// * `is_library` - 是否为库文件
    /// * `len` - 已知长度，0 表示未知
    pub fn new(io: F, is_library: bool, len: u64) -> Self {
        let mut flags = FileFlags::empty();
        flags.set(FileFlags::LIBRARY, is_library);
        Self {
            io,
            len,
            currpos: 0,
            flags,
            mode: None,
            cache: None,
        }
    }

    /// 文件名
    pub fn name(&self) -> &str {
        self.io.name()
    }

    /// 底层句柄
    pub fn io(&self) -> &F {
        &self.io
    }

    /// 文件长度（未知时为 0）
    pub fn len(&self) -> u64 {
        self.len
    }

    /// 文件长度是否为 0（未知或空文件）
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 句柄当前位置
    pub fn currpos(&self) -> u64 {
        self.currpos
    }

    /// 状态标志
    pub fn flags(&self) -> FileFlags {
        self.flags
    }

    /// 缓存模式
    pub fn mode(&self) -> Option<CacheMode> {
        self.mode
    }

    /// 是否为库文件
    pub fn is_library(&self) -> bool {
        self.flags.contains(FileFlags::LIBRARY)
    }

    /// 是否持有缓存存储
    pub fn has_storage(&self) -> bool {
        self.cache.is_some()
    }

    /// 常驻页数
    pub fn resident_pages(&self) -> usize {
        self.cache.as_ref().map_or(0, CacheStorage::resident_pages)
    }

    /// 指定页是否常驻
    pub fn is_page_resident(&self, index: usize) -> bool {
        match &self.cache {
            Some(CacheStorage::Paged(pages)) => pages.get(index).map_or(false, Option::is_some),
            _ => false,
        }
    }

    /// 把整个文件读入一块内存
    ///
    /// 句柄不在偏移 0 时才 seek；读取完成后句柄位于文件末尾。
    pub(crate) fn load_full(&mut self) -> Result<()> {
        let len = usize::try_from(self.len)
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Input file too large to cache"))?;
        let mut data = vec![0u8; len];
        if self.currpos != 0 {
            self.io.seek(0)?;
            self.currpos = 0;
        }
        self.io.read_exact(&mut data)?;
        self.currpos = self.len;
        log::debug!("[OBJCACHE] full cache {} ({} bytes)", self.io.name(), len);
        self.cache = Some(CacheStorage::Full(Arc::from(data)));
        Ok(())
    }

    /// 加载一页
    ///
    /// 页缓冲区总是完整的 `PAGE_SIZE` 字节；最后一页只有部分字节有效。
    /// 句柄位置与页偏移不同时才 seek。加载后记录的位置总是前移一整页，
    /// 即使最后一页读到的字节不足一页。
    pub(crate) fn load_page(&mut self, index: usize) -> Result<()> {
        let page_pos = index as u64 * PAGE_SIZE as u64;
        match &self.cache {
            Some(CacheStorage::Paged(pages)) if index < pages.len() => {}
            Some(CacheStorage::Paged(_)) => {
                return Err(Error::new(ErrorKind::InvalidInput, "Page index out of range"))
            }
            _ => return Err(Error::new(ErrorKind::InvalidState, "Input file is not paged")),
        }

        let mut page = vec![0u8; PAGE_SIZE].into_boxed_slice();
        if self.currpos != page_pos {
            self.io.seek(page_pos)?;
            self.currpos = page_pos;
        }
        let n = self.io.read_full(&mut page)?;
        self.currpos = page_pos + PAGE_SIZE as u64;
        log::debug!(
            "[PAGE] load {} page {} ({} bytes)",
            self.io.name(),
            index,
            n
        );

        if let Some(CacheStorage::Paged(pages)) = &mut self.cache {
            pages[index] = Some(page);
        }
        Ok(())
    }

    /// 常驻页的数据
    pub(crate) fn page(&self, index: usize) -> Option<&[u8]> {
        match &self.cache {
            Some(CacheStorage::Paged(pages)) => pages.get(index)?.as_deref(),
            _ => None,
        }
    }

    /// 丢弃常驻页（`keep` 除外），返回丢弃的页数
    pub(crate) fn trim_pages(&mut self, keep: Option<usize>) -> usize {
        let freed = self.cache.as_mut().map_or(0, |c| c.trim(keep));
        if freed > 0 {
            log::debug!("[PAGE] trim {}: {} pages freed", self.io.name(), freed);
        }
        freed
    }

    /// 释放全部缓存存储，返回丢弃的页数
    pub(crate) fn free_storage(&mut self) -> usize {
        match self.cache.take() {
            Some(CacheStorage::Paged(pages)) => pages.iter().filter(|p| p.is_some()).count(),
            Some(CacheStorage::Full(_)) => {
                log::debug!("[OBJCACHE] release full cache {}", self.io.name());
                0
            }
            None => 0,
        }
    }
}
