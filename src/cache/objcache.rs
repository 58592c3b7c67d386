//! 目标文件缓存上下文
//!
//! [`ObjCache`] 持有所有输入文件记录、缓存文件登记表、暂存缓冲区和统计信息。
//! 读取、生命周期相关的操作分别在 `read.rs` 与 `lifecycle.rs` 中实现。

use super::{scratch::ScratchBuffer, store::InputFile};
use crate::{
    diag::{DiagCode, Diagnostic, Diagnostics, LogDiagnostics},
    error::{Error, ErrorKind, Result},
    io::ObjectIo,
    types::{CacheConfig, CacheStats, FileId},
};
use alloc::collections::BTreeSet;
use alloc::string::ToString;
use alloc::vec::Vec;

/// 目标文件缓存
///
/// 单线程使用：所有共享状态都通过 `&mut self` 修改。读取返回的视图借用整个上下文，
/// 因此下一次调用之前视图必然已失效，这一点由借用检查器保证。
///
/// # 示例
///
/// ```rust,ignore
/// let mut cache = ObjCache::new(CacheConfig::default());
/// let id = cache.add_file(StdFileIo::new("foo.obj"), false);
///
/// cache.open(Some(id))?;
/// let header = cache.read(id, 0, 3)?;
/// println!("record type {:02x}", header[0]);
/// cache.close(Some(id), LinkPass::MidPass)?;
///
/// cache.finish()?;
/// ```
pub struct ObjCache<F, D = LogDiagnostics> {
    /// 所有输入文件，按 `FileId` 索引
    pub(super) files: Vec<InputFile<F>>,
    /// 持有缓存存储的文件
    pub(super) registry: BTreeSet<FileId>,
    /// 跨页读取的暂存缓冲区
    pub(super) scratch: ScratchBuffer,
    pub(super) config: CacheConfig,
    pub(super) diag: D,
    /// 驱动当前正在处理的模块所在文件
    pub(super) current_source: Option<FileId>,
    /// 最近一次读取是否返回稳定视图
    pub(super) last_stable: bool,
    /// 所有文件的常驻页总数
    pub(super) resident_pages: usize,
    pub(super) stats: CacheStats,
}

impl<F: ObjectIo> ObjCache<F, LogDiagnostics> {
    /// 创建缓存，诊断输出到日志
    pub fn new(config: CacheConfig) -> Self {
        Self::with_diagnostics(config, LogDiagnostics)
    }
}

impl<F: ObjectIo, D: Diagnostics> ObjCache<F, D> {
    /// 创建缓存并指定诊断接收者
    pub fn with_diagnostics(config: CacheConfig, diag: D) -> Self {
        Self {
            files: Vec::new(),
            registry: BTreeSet::new(),
            scratch: ScratchBuffer::new(config.initial_scratch),
            config,
            diag,
            current_source: None,
            last_stable: true,
            resident_pages: 0,
            stats: CacheStats::default(),
        }
    }

    /// 登记一个输入文件，长度在首次打开时查询
    pub fn add_file(&mut self, io: F, is_library: bool) -> FileId {
        self.add_file_with_len(io, is_library, 0)
    }

    /// 登记一个长度已知的输入文件
    pub fn add_file_with_len(&mut self, io: F, is_library: bool, len: u64) -> FileId {
        let id = FileId(self.files.len());
        log::trace!(
            "[OBJCACHE] add {} as {:?} (library={})",
            io.name(),
            id,
            is_library
        );
        self.files.push(InputFile::new(io, is_library, len));
        id
    }

    /// 获取文件记录
    pub fn file(&self, id: FileId) -> Result<&InputFile<F>> {
        self.files
            .get(id.0)
            .ok_or(Error::new(ErrorKind::InvalidInput, "Unknown input file"))
    }

    pub(super) fn file_mut(&mut self, id: FileId) -> Result<&mut InputFile<F>> {
        self.files
            .get_mut(id.0)
            .ok_or(Error::new(ErrorKind::InvalidInput, "Unknown input file"))
    }

    /// 已登记的文件数
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// 当前持有缓存存储的文件
    pub fn cached_files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.registry.iter().copied()
    }

    /// 设置驱动当前处理的模块所在的文件
    ///
    /// 该文件的页不会被 [`ObjCache::dump_one`] 丢弃。
    pub fn set_current_source(&mut self, id: Option<FileId>) {
        self.current_source = id;
    }

    /// 驱动当前处理的模块所在的文件
    pub fn current_source(&self) -> Option<FileId> {
        self.current_source
    }

    /// 缓存配置
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// 诊断接收者
    pub fn diagnostics(&self) -> &D {
        &self.diag
    }

    /// 所有文件的常驻页总数
    pub fn resident_pages(&self) -> usize {
        self.resident_pages
    }

    /// 暂存缓冲区当前容量
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }
}

/// 上报诊断
pub(super) fn report<D: Diagnostics>(diag: &mut D, code: DiagCode, file: &str) {
    diag.report(&Diagnostic {
        code,
        file: file.to_string(),
    });
}

impl<F: ObjectIo, D> core::fmt::Debug for ObjCache<F, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjCache")
            .field("files", &self.files.len())
            .field("cached_files", &self.registry.len())
            .field("resident_pages", &self.resident_pages)
            .field("scratch_capacity", &self.scratch.capacity())
            .field("current_source", &self.current_source)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::{CollectDiagnostics, MockIo};
    use crate::consts::DEFAULT_SCRATCH_SIZE;

    #[test]
    fn test_cache_creation() {
        let cache: ObjCache<MockIo> = ObjCache::new(CacheConfig::default());
        assert_eq!(cache.file_count(), 0);
        assert_eq!(cache.cached_files().count(), 0);
        assert_eq!(cache.resident_pages(), 0);
        assert_eq!(cache.scratch_capacity(), DEFAULT_SCRATCH_SIZE);
        assert!(cache.is_perm());
    }

    #[test]
    fn test_add_file() {
        let mut cache = ObjCache::with_diagnostics(CacheConfig::default(), CollectDiagnostics::default());
        let a = cache.add_file(MockIo::patterned("a.obj", 10), false);
        let b = cache.add_file_with_len(MockIo::patterned("b.lib", 10), true, 10);

        assert_ne!(a, b);
        assert_eq!(cache.file(a).unwrap().name(), "a.obj");
        assert_eq!(cache.file(a).unwrap().len(), 0);
        assert!(cache.file(b).unwrap().is_library());
        assert_eq!(cache.file(b).unwrap().len(), 10);
        assert_eq!(
            cache.file(FileId(7)).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_current_source() {
        let mut cache: ObjCache<MockIo> = ObjCache::new(CacheConfig::default());
        let a = cache.add_file(MockIo::patterned("a.obj", 10), false);
        assert_eq!(cache.current_source(), None);
        cache.set_current_source(Some(a));
        assert_eq!(cache.current_source(), Some(a));
    }
}
