//! 顺序记录读取
//!
//! 目标文件解析通常按记录顺序向前读取：先读记录头，再按长度读取记录体。
//! [`ObjCursor`] 在缓存之上维护读取位置，并按小端序解码整数字段。

use crate::{
    cache::{ObjCache, PermBuf},
    diag::Diagnostics,
    error::Result,
    io::ObjectIo,
    types::FileId,
};
use byteorder::{ByteOrder, LittleEndian};

/// 输入文件上的顺序读取游标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjCursor {
    file: FileId,
    pos: u64,
}

impl ObjCursor {
    /// 在 `pos` 处创建游标
    pub const fn new(file: FileId, pos: u64) -> Self {
        Self { file, pos }
    }

    /// 所属文件
    pub const fn file(&self) -> FileId {
        self.file
    }

    /// 当前位置
    pub const fn position(&self) -> u64 {
        self.pos
    }

    /// 移动到绝对位置
    pub fn seek(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// 跳过 `len` 字节
    ///
    /// 位置在 `u64::MAX` 处饱和，越界由后续读取报告。
    pub fn skip(&mut self, len: u64) {
        self.pos = self.pos.saturating_add(len);
    }

    /// 是否已到达文件末尾
    pub fn at_end<F: ObjectIo, D: Diagnostics>(&self, cache: &ObjCache<F, D>) -> bool {
        cache.at_end(self.file, self.pos)
    }

    /// 在 `len` 字节的视图上执行 `f`，随后前移
    ///
    /// 视图只在闭包内有效，不会拷贝数据。
    pub fn with_bytes<F, D, T>(
        &mut self,
        cache: &mut ObjCache<F, D>,
        len: usize,
        f: impl FnOnce(&[u8]) -> T,
    ) -> Result<T>
    where
        F: ObjectIo,
        D: Diagnostics,
    {
        let view = cache.read(self.file, self.pos, len)?;
        let value = f(view.data());
        self.pos = self.pos.saturating_add(len as u64);
        Ok(value)
    }

    /// 读取一个字节
    pub fn read_u8<F: ObjectIo, D: Diagnostics>(&mut self, cache: &mut ObjCache<F, D>) -> Result<u8> {
        self.with_bytes(cache, 1, |b| b[0])
    }

    /// 读取小端序 u16
    pub fn read_u16_le<F: ObjectIo, D: Diagnostics>(
        &mut self,
        cache: &mut ObjCache<F, D>,
    ) -> Result<u16> {
        self.with_bytes(cache, 2, LittleEndian::read_u16)
    }

    /// 读取小端序 u32
    pub fn read_u32_le<F: ObjectIo, D: Diagnostics>(
        &mut self,
        cache: &mut ObjCache<F, D>,
    ) -> Result<u32> {
        self.with_bytes(cache, 4, LittleEndian::read_u32)
    }

    /// 读取 `len` 字节到调用者持有的缓冲区
    pub fn read_bytes<F: ObjectIo, D: Diagnostics>(
        &mut self,
        cache: &mut ObjCache<F, D>,
        len: usize,
    ) -> Result<PermBuf> {
        let buf = cache.perm_read(self.file, self.pos, len)?;
        self.pos = self.pos.saturating_add(len as u64);
        Ok(buf)
    }
}
