//! 暂存缓冲区
//!
//! 跨页读取时，各页的数据被依次拷贝到这里拼成连续的一段。缓冲区只增长不收缩，
//! 内容只在下一次读取之前有效。

use crate::consts::round_up_sector;
use alloc::vec;
use alloc::vec::Vec;

/// 跨页读取使用的暂存缓冲区
#[derive(Debug)]
pub struct ScratchBuffer {
    buf: Vec<u8>,
}

impl ScratchBuffer {
    /// 创建指定初始容量的暂存缓冲区
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity],
        }
    }

    /// 当前容量（字节）
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// 保证至少能容纳 `len` 字节，按扇区粒度增长
    pub fn reserve(&mut self, len: usize) {
        if len > self.buf.len() {
            let size = round_up_sector(len);
            log::debug!("[SCRATCH] grow {} -> {} bytes", self.buf.len(), size);
            self.buf.resize(size, 0);
        }
    }

    /// 前 `len` 字节的可写视图
    pub fn slice_mut(&mut self, len: usize) -> &mut [u8] {
        &mut self.buf[..len]
    }

    /// 前 `len` 字节的只读视图
    pub fn slice(&self, len: usize) -> &[u8] {
        &self.buf[..len]
    }

    /// 把当前内容的前 `len` 字节移交给调用者
    ///
    /// 移交出去的分配被截断到恰好 `len` 字节；随后装入一块同样容量的新缓冲区，
    /// 供后续的跨页读取使用。
    pub fn take(&mut self, len: usize) -> Vec<u8> {
        let capacity = self.buf.len();
        let mut out = core::mem::replace(&mut self.buf, vec![0u8; capacity]);
        out.truncate(len);
        out.shrink_to_fit();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_rounds_to_sector() {
        let mut s = ScratchBuffer::new(512);
        s.reserve(100);
        assert_eq!(s.capacity(), 512);

        s.reserve(9000);
        assert_eq!(s.capacity(), 9216);

        // 只增长不收缩
        s.reserve(600);
        assert_eq!(s.capacity(), 9216);
    }

    #[test]
    fn test_take_hands_off_contents() {
        let mut s = ScratchBuffer::new(1024);
        s.slice_mut(4).copy_from_slice(b"abcd");

        let owned = s.take(4);
        assert_eq!(owned, b"abcd");
        assert_eq!(owned.capacity(), 4);

        // 新缓冲区容量不变，写入不影响已移交的数据
        assert_eq!(s.capacity(), 1024);
        s.slice_mut(4).copy_from_slice(b"wxyz");
        assert_eq!(owned, b"abcd");
        assert_eq!(s.slice(4), b"wxyz");
    }
}
