//! 目标文件缓存常量定义

//=============================================================================
// 页缓存
//=============================================================================

/// 分页缓存的页大小（8 KiB）
pub const PAGE_SIZE: usize = 8 * 1024;

/// 扇区大小，暂存缓冲区按此粒度增长
pub const SECTOR_SIZE: usize = 512;

/// 暂存缓冲区默认初始容量
pub const DEFAULT_SCRATCH_SIZE: usize = SECTOR_SIZE;

//=============================================================================
// 辅助函数
//=============================================================================

/// 覆盖 `len` 字节所需的页数
#[inline]
pub const fn page_count(len: u64) -> usize {
    let pages = len / PAGE_SIZE as u64;
    if len % PAGE_SIZE as u64 != 0 {
        pages as usize + 1
    } else {
        pages as usize
    }
}

/// 文件偏移所在的页号
#[inline]
pub const fn page_index(pos: u64) -> usize {
    (pos / PAGE_SIZE as u64) as usize
}

/// 向上取整到扇区边界
#[inline]
pub const fn round_up_sector(len: usize) -> usize {
    (len + SECTOR_SIZE - 1) / SECTOR_SIZE * SECTOR_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(PAGE_SIZE as u64), 1);
        assert_eq!(page_count(PAGE_SIZE as u64 + 1), 2);
        assert_eq!(page_count(20000), 3);
    }

    #[test]
    fn test_page_index() {
        assert_eq!(page_index(0), 0);
        assert_eq!(page_index(8191), 0);
        assert_eq!(page_index(8192), 1);
        assert_eq!(page_index(16999), 2);
    }

    #[test]
    fn test_round_up_sector() {
        assert_eq!(round_up_sector(1), 512);
        assert_eq!(round_up_sector(512), 512);
        assert_eq!(round_up_sector(9000), 9216);
    }
}
