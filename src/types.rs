//! 缓存公共类型定义

use bitflags::bitflags;

/// 输入文件 ID（在缓存上下文中的索引）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub(crate) usize);

impl FileId {
    /// 获取原始索引
    pub const fn index(self) -> usize {
        self.0
    }
}

bitflags! {
    /// 输入文件状态标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FileFlags: u8 {
        /// 正在使用（open 与 close 之间）
        const IN_USE      = 0x01;
        /// 之前发生过 I/O 错误，不再重试
        const IO_ERROR    = 0x02;
        /// 库文件（会被多次打开、稀疏读取）
        const LIBRARY     = 0x04;
        /// 底层句柄已打开
        const HANDLE_OPEN = 0x08;
    }
}

/// 缓存模式，一旦选定在文件生命周期内不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// 打开时整个文件读入一块连续内存
    Full,
    /// 按需加载固定大小的页
    Paged,
}

/// 全局缓存策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// 按文件类型决定：库文件分页，其他文件整体缓存
    #[default]
    Default,
    /// 所有文件整体缓存
    CacheAll,
    /// 所有文件分页缓存
    NoCache,
}

impl CachePolicy {
    /// 为文件选择缓存模式
    pub const fn select(self, is_library: bool) -> CacheMode {
        match self {
            CachePolicy::CacheAll => CacheMode::Full,
            CachePolicy::NoCache => CacheMode::Paged,
            CachePolicy::Default => {
                if is_library {
                    CacheMode::Paged
                } else {
                    CacheMode::Full
                }
            }
        }
    }
}

/// 链接遍的生命周期阶段，由驱动在 close 时传入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPass {
    /// 中间遍结束：按文件类型裁剪缓存
    MidPass,
    /// 最终释放：释放全部缓存并关闭句柄
    Teardown,
    /// 本遍不裁剪
    Keep,
}

/// 缓存配置
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// 缓存策略
    pub policy: CachePolicy,
    /// 常驻页数上限（`None` 表示不限制）
    pub page_budget: Option<usize>,
    /// 暂存缓冲区初始容量（字节）
    pub initial_scratch: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: CachePolicy::Default,
            page_budget: None,
            initial_scratch: crate::consts::DEFAULT_SCRATCH_SIZE,
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// 读取次数
    pub reads: u64,
    /// 返回稳定视图的读取次数
    pub stable_reads: u64,
    /// 经暂存缓冲区拼接的读取次数
    pub transient_reads: u64,
    /// 从磁盘加载的页数
    pub page_loads: u64,
    /// 页命中次数
    pub page_hits: u64,
    /// 整体缓存的文件加载次数
    pub full_loads: u64,
    /// 被丢弃的页数
    pub pages_evicted: u64,
    /// perm_read 复制次数
    pub perm_copies: u64,
    /// perm_read 直接移交暂存缓冲区的次数
    pub perm_handoffs: u64,
    /// 被释放的永久缓冲区数量
    pub perm_released: u64,
}

impl CacheStats {
    /// 计算页命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.page_hits + self.page_loads;
        if total == 0 {
            0.0
        } else {
            self.page_hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_select() {
        assert_eq!(CachePolicy::Default.select(true), CacheMode::Paged);
        assert_eq!(CachePolicy::Default.select(false), CacheMode::Full);
        assert_eq!(CachePolicy::CacheAll.select(true), CacheMode::Full);
        assert_eq!(CachePolicy::NoCache.select(false), CacheMode::Paged);
    }

    #[test]
    fn test_file_flags() {
        let mut flags = FileFlags::LIBRARY;
        flags.insert(FileFlags::IN_USE);
        assert!(flags.contains(FileFlags::LIBRARY | FileFlags::IN_USE));
        flags.remove(FileFlags::IN_USE);
        assert!(!flags.contains(FileFlags::IN_USE));
        assert!(!flags.contains(FileFlags::IO_ERROR));
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        stats.page_loads = 1;
        stats.page_hits = 3;
        assert_eq!(stats.hit_rate(), 0.75);
    }
}
