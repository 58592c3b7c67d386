//! 缓存生命周期与回收
//!
//! - `open` 在首次使用时选定缓存模式并分配存储
//! - `close` 在每一遍结束时按文件类型裁剪缓存，最终释放时关闭句柄
//! - `dump_one` 在内存紧张时丢弃一个文件的全部常驻页

use super::{
    objcache::{report, ObjCache},
    store::CacheStorage,
};
use crate::{
    consts::page_index,
    diag::{DiagCode, Diagnostics},
    error::{Error, ErrorKind, Result},
    io::ObjectIo,
    types::{CacheMode, FileFlags, FileId, LinkPass},
};

impl<F: ObjectIo, D: Diagnostics> ObjCache<F, D> {
    /// 为读取准备文件缓存
    ///
    /// # 流程
    ///
    /// 1. 之前出过错的文件直接失败，不重试
    /// 2. 打开底层句柄（已打开则跳过）
    /// 3. 长度未知时查询长度，长度为 0 视为损坏的目标文件
    /// 4. 尚未选定模式时按策略选定
    /// 5. 尚未分配存储时分配：整体缓存立即读入整个文件，分页缓存只建立空的页数组
    ///
    /// 重复调用不会重新选定模式，也不会重新读取已缓存的数据。
    pub fn open(&mut self, id: Option<FileId>) -> Result<()> {
        let Some(id) = id else {
            return Ok(());
        };
        let policy = self.config.policy;
        let file = self
            .files
            .get_mut(id.0)
            .ok_or(Error::new(ErrorKind::InvalidInput, "Unknown input file"))?;

        if file.flags.contains(FileFlags::IO_ERROR) {
            report(&mut self.diag, DiagCode::PriorError, file.io.name());
            return Err(Error::new(ErrorKind::InvalidState, "Input file has a previous I/O error"));
        }

        if !file.flags.contains(FileFlags::HANDLE_OPEN) {
            if let Err(e) = file.io.open() {
                log::error!("[OBJCACHE] cannot open {}: {}", file.io.name(), e);
                file.flags.insert(FileFlags::IO_ERROR);
                report(&mut self.diag, DiagCode::OpenFailed, file.io.name());
                return Err(e);
            }
            file.flags.insert(FileFlags::HANDLE_OPEN);
            file.currpos = 0;
        }
        file.flags.insert(FileFlags::IN_USE);

        if file.len == 0 {
            file.len = match file.io.size() {
                Ok(len) => len,
                Err(e) => {
                    file.flags.insert(FileFlags::IO_ERROR);
                    report(&mut self.diag, DiagCode::BadObject, file.io.name());
                    return Err(e);
                }
            };
            if file.len == 0 {
                file.flags.insert(FileFlags::IO_ERROR);
                report(&mut self.diag, DiagCode::BadObject, file.io.name());
                return Err(Error::new(ErrorKind::Corrupted, "Input file is empty"));
            }
        }

        let mode = match file.mode {
            Some(mode) => mode,
            None => {
                let mode = policy.select(file.is_library());
                log::debug!("[OBJCACHE] {} uses {:?} cache", file.io.name(), mode);
                file.mode = Some(mode);
                mode
            }
        };

        if file.cache.is_none() {
            match mode {
                CacheMode::Full => {
                    if let Err(e) = file.load_full() {
                        file.flags.insert(FileFlags::IO_ERROR);
                        return Err(e);
                    }
                    self.stats.full_loads += 1;
                }
                CacheMode::Paged => {
                    file.cache = Some(CacheStorage::paged(file.len));
                }
            }
        }
        self.registry.insert(id);
        Ok(())
    }

    /// 结束本遍对文件的使用
    ///
    /// - [`LinkPass::MidPass`]: 整体缓存的非库文件释放整块内存（库文件会被反复打开，保留）；
    ///   分页缓存丢弃所有页，库文件保留句柄当前位置所在的页
    /// - [`LinkPass::Teardown`]: 释放全部缓存并关闭句柄
    /// - [`LinkPass::Keep`]: 不裁剪
    pub fn close(&mut self, id: Option<FileId>, pass: LinkPass) -> Result<()> {
        let Some(id) = id else {
            return Ok(());
        };
        let file = self.file_mut(id)?;
        file.flags.remove(FileFlags::IN_USE);
        let is_library = file.is_library();
        let mode = file.mode;

        match pass {
            LinkPass::MidPass => match mode {
                Some(CacheMode::Full) => {
                    if !is_library {
                        self.free_all(Some(id))?;
                    }
                }
                Some(CacheMode::Paged) => {
                    let file = &mut self.files[id.0];
                    let keep = is_library.then(|| page_index(file.currpos));
                    let freed = file.trim_pages(keep);
                    self.account_evicted(freed);
                }
                None => {}
            },
            LinkPass::Teardown => {
                self.free_all(Some(id))?;
                let file = &mut self.files[id.0];
                if file.flags.contains(FileFlags::HANDLE_OPEN) {
                    file.flags.remove(FileFlags::HANDLE_OPEN);
                    file.currpos = 0;
                    file.io.close()?;
                }
            }
            LinkPass::Keep => {}
        }
        Ok(())
    }

    /// 释放文件的全部缓存存储（两种模式均适用），不关闭句柄
    pub fn free_all(&mut self, id: Option<FileId>) -> Result<()> {
        let Some(id) = id else {
            return Ok(());
        };
        let freed = self.file_mut(id)?.free_storage();
        self.account_evicted(freed);
        self.registry.remove(&id);
        Ok(())
    }

    /// 丢弃一个文件的全部常驻页
    ///
    /// 按登记顺序扫描分页缓存的文件，跳过驱动当前处理的模块所在的文件；
    /// 第一个确实释放了页的文件处理完即返回 `true`，调用者可据此重试失败的分配。
    /// 没有任何页可丢弃时返回 `false`。
    pub fn dump_one(&mut self) -> bool {
        self.dump_one_excluding(None)
    }

    pub(super) fn dump_one_excluding(&mut self, exclude: Option<FileId>) -> bool {
        for &id in self.registry.iter() {
            if Some(id) == self.current_source || Some(id) == exclude {
                continue;
            }
            let file = &mut self.files[id.0];
            if file.mode != Some(CacheMode::Paged) {
                continue;
            }
            let freed = file.trim_pages(None);
            if freed > 0 {
                self.resident_pages -= freed;
                self.stats.pages_evicted += freed as u64;
                log::debug!("[OBJCACHE] dumped {} pages of {}", freed, file.io.name());
                return true;
            }
        }
        false
    }

    /// 常驻页达到上限时，丢弃其他文件的页直到低于上限
    pub(super) fn relieve_pressure(&mut self, reading: FileId) {
        let Some(budget) = self.config.page_budget else {
            return;
        };
        while self.resident_pages >= budget {
            if !self.dump_one_excluding(Some(reading)) {
                log::warn!(
                    "[OBJCACHE] page budget {} exceeded ({} resident), nothing left to dump",
                    budget,
                    self.resident_pages
                );
                break;
            }
        }
    }

    /// 释放所有文件的缓存并关闭全部句柄
    pub fn finish(&mut self) -> Result<()> {
        let mut result = Ok(());
        for index in 0..self.files.len() {
            if let Err(e) = self.close(Some(FileId(index)), LinkPass::Teardown) {
                log::error!("[OBJCACHE] teardown of {:?} failed: {}", FileId(index), e);
                result = result.and(Err(e));
            }
        }
        result
    }

    fn account_evicted(&mut self, freed: usize) {
        self.resident_pages -= freed;
        self.stats.pages_evicted += freed as u64;
    }
}
