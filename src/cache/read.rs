//! 读取拼装
//!
//! 大多数读取落在单页之内，直接返回页内视图，不做拷贝；只有跨页读取才把各页的数据
//! 拷贝到暂存缓冲区拼成连续的一段。

use super::{
    objcache::ObjCache,
    scratch::ScratchBuffer,
    store::{CacheStorage, InputFile},
};
use crate::{
    consts::{page_index, PAGE_SIZE},
    diag::Diagnostics,
    error::{Error, ErrorKind, Result},
    io::ObjectIo,
    types::{CacheMode, FileFlags, FileId},
};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::Deref;

/// 一次读取的结果
///
/// 视图借用缓存上下文，下一次调用缓存之前必须用完。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheRead<'a> {
    /// 指向整文件缓存或页缓冲区，在对应存储被释放之前保持有效
    Stable(&'a [u8]),
    /// 指向暂存缓冲区，下一次读取即失效
    Transient(&'a [u8]),
}

impl<'a> CacheRead<'a> {
    /// 读取到的数据
    pub fn data(&self) -> &'a [u8] {
        match *self {
            CacheRead::Stable(data) | CacheRead::Transient(data) => data,
        }
    }

    /// 是否为稳定视图
    pub fn is_stable(&self) -> bool {
        matches!(self, CacheRead::Stable(_))
    }
}

impl Deref for CacheRead<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data()
    }
}

/// [`ObjCache::perm_read`] 返回的缓冲区，不受后续读取影响
///
/// 调用者持有它，用完后交还 [`ObjCache::release`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermBuf {
    /// 与整文件缓存共享的区间，整块内存在缓存释放后随最后一个持有者一起释放
    Shared {
        /// 整文件缓存
        block: Arc<[u8]>,
        /// 区间起点
        start: usize,
        /// 区间长度
        len: usize,
    },
    /// 调用者独占的缓冲区
    Owned(Vec<u8>),
}

impl PermBuf {
    /// 缓冲区数据
    pub fn as_slice(&self) -> &[u8] {
        match self {
            PermBuf::Shared { block, start, len } => &block[*start..*start + *len],
            PermBuf::Owned(data) => data,
        }
    }

    /// 是否与整文件缓存共享内存
    pub fn is_shared(&self) -> bool {
        matches!(self, PermBuf::Shared { .. })
    }

    /// 转换为独占的 `Vec<u8>`（共享区间会被拷贝）
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            PermBuf::Shared { .. } => self.as_slice().to_vec(),
            PermBuf::Owned(data) => data,
        }
    }
}

impl Deref for PermBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// 把已常驻的页拼成 `[pos, pos + len)` 的视图
///
/// 调用前所有涉及的页必须已加载。
fn assemble<'a, F: ObjectIo>(
    file: &'a InputFile<F>,
    scratch: &'a mut ScratchBuffer,
    pos: u64,
    len: usize,
) -> Result<CacheRead<'a>> {
    let missing = || Error::new(ErrorKind::InvalidState, "Page not resident");
    let first = page_index(pos);
    let offset = (pos % PAGE_SIZE as u64) as usize;

    if offset + len <= PAGE_SIZE {
        let page = file.page(first).ok_or_else(missing)?;
        return Ok(CacheRead::Stable(&page[offset..offset + len]));
    }

    scratch.reserve(len);
    let out = scratch.slice_mut(len);
    let mut done = PAGE_SIZE - offset;
    out[..done].copy_from_slice(&file.page(first).ok_or_else(missing)?[offset..]);
    let mut index = first;
    while done < len {
        index += 1;
        let amt = (len - done).min(PAGE_SIZE);
        let page = file.page(index).ok_or_else(missing)?;
        out[done..done + amt].copy_from_slice(&page[..amt]);
        done += amt;
    }
    Ok(CacheRead::Transient(scratch.slice(len)))
}

impl<F: ObjectIo, D: Diagnostics> ObjCache<F, D> {
    /// 读取 `[pos, pos + len)`
    ///
    /// # 返回
    ///
    /// - 整体缓存：指向整文件缓存的 [`CacheRead::Stable`]，零拷贝
    /// - 分页缓存且不跨页：指向页缓冲区的 [`CacheRead::Stable`]
    /// - 分页缓存且跨页：指向暂存缓冲区的 [`CacheRead::Transient`]
    ///
    /// 超出文件长度的读取返回 `InvalidInput`，两种模式一致。
    pub fn read(&mut self, id: FileId, pos: u64, len: usize) -> Result<CacheRead<'_>> {
        self.stats.reads += 1;
        let file = self.file(id)?;
        let end = pos
            .checked_add(len as u64)
            .filter(|&end| end <= file.len)
            .ok_or_else(|| {
                log::warn!(
                    "[OBJCACHE] read past end of {}: pos={} len={} file_len={}",
                    file.name(),
                    pos,
                    len,
                    file.len
                );
                Error::new(ErrorKind::InvalidInput, "Read past end of input file")
            })?;

        let mode = match &file.cache {
            Some(CacheStorage::Full(_)) => CacheMode::Full,
            Some(CacheStorage::Paged(_)) => CacheMode::Paged,
            None => return Err(Error::new(ErrorKind::InvalidState, "Input file cache is not open")),
        };

        if mode == CacheMode::Full || len == 0 {
            self.last_stable = true;
            self.stats.stable_reads += 1;
            return Ok(match &self.files[id.0].cache {
                Some(CacheStorage::Full(block)) => {
                    CacheRead::Stable(&block[pos as usize..end as usize])
                }
                _ => CacheRead::Stable(&[]),
            });
        }

        let first = page_index(pos);
        let last = page_index(end - 1);
        for index in first..=last {
            self.ensure_page(id, index)?;
        }

        if first == last {
            self.last_stable = true;
            self.stats.stable_reads += 1;
        } else {
            log::trace!("[OBJCACHE] assemble pages {}..={} ({} bytes)", first, last, len);
            self.last_stable = false;
            self.stats.transient_reads += 1;
        }
        assemble(&self.files[id.0], &mut self.scratch, pos, len)
    }

    /// 保证页常驻，必要时从磁盘加载
    ///
    /// 设置了页数上限时，加载前先丢弃其他文件的页。
    fn ensure_page(&mut self, id: FileId, index: usize) -> Result<()> {
        if self.files[id.0].is_page_resident(index) {
            self.stats.page_hits += 1;
            return Ok(());
        }
        self.relieve_pressure(id);

        let file = &mut self.files[id.0];
        if let Err(e) = file.load_page(index) {
            log::error!("[PAGE] failed to load {} page {}: {}", file.name(), index, e);
            file.flags.insert(FileFlags::IO_ERROR);
            return Err(e);
        }
        self.resident_pages += 1;
        self.stats.page_loads += 1;
        Ok(())
    }

    /// 读取一段在后续读取中保持不变的数据
    ///
    /// - 整体缓存：与整文件缓存共享，不拷贝
    /// - 本次读取跨页：暂存缓冲区整体移交给调用者，随后换上一块新的暂存缓冲区
    /// - 本次读取在单页内：拷贝到新分配的缓冲区（页可能被丢弃）
    pub fn perm_read(&mut self, id: FileId, pos: u64, len: usize) -> Result<PermBuf> {
        if self.file(id)?.mode == Some(CacheMode::Full) {
            self.read(id, pos, len)?;
            if let Some(CacheStorage::Full(block)) = &self.files[id.0].cache {
                return Ok(PermBuf::Shared {
                    block: Arc::clone(block),
                    start: pos as usize,
                    len,
                });
            }
        }

        let copied = match self.read(id, pos, len)? {
            CacheRead::Stable(data) => Some(data.to_vec()),
            CacheRead::Transient(_) => None,
        };
        match copied {
            Some(data) => {
                self.stats.perm_copies += 1;
                Ok(PermBuf::Owned(data))
            }
            None => {
                self.stats.perm_handoffs += 1;
                self.last_stable = true;
                Ok(PermBuf::Owned(self.scratch.take(len)))
            }
        }
    }

    /// 交还 [`ObjCache::perm_read`] 得到的缓冲区
    ///
    /// 分页缓存的缓冲区在此释放；整体缓存共享的区间不单独释放，整块内存随文件缓存一起回收。
    pub fn release(&mut self, id: FileId, buf: PermBuf) {
        match self.files.get(id.0).and_then(|f| f.mode) {
            Some(CacheMode::Paged) => {
                self.stats.perm_released += 1;
                drop(buf);
            }
            _ => {
                // 共享区间随整块内存的最后一个持有者释放
                log::trace!("[OBJCACHE] release shared buffer of {} bytes", buf.len());
            }
        }
    }

    /// 最近一次读取是否返回了稳定视图
    ///
    /// 为 `false` 时，调用者必须在下一次读取之前拷贝数据（或改用 [`ObjCache::perm_read`]）。
    pub fn is_perm(&self) -> bool {
        self.last_stable
    }

    /// `pos` 是否已到达文件末尾
    pub fn at_end(&self, id: FileId, pos: u64) -> bool {
        self.files.get(id.0).map_or(true, |f| pos >= f.len)
    }
}
