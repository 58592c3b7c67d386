//! 测试用的内存文件与诊断收集器

use crate::{
    diag::{Diagnostic, Diagnostics},
    error::{Error, ErrorKind, Result},
    io::ObjectIo,
};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// 内存中的输入文件，记录每次 open/seek/read
pub(crate) struct MockIo {
    name: String,
    data: Vec<u8>,
    pos: u64,
    opens: usize,
    closes: usize,
    seeks: usize,
    reads: Vec<(u64, usize)>,
    fail_open: bool,
    fail_size: bool,
    fail_read: bool,
}

impl MockIo {
    pub(crate) fn new(name: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            data,
            pos: 0,
            opens: 0,
            closes: 0,
            seeks: 0,
            reads: Vec::new(),
            fail_open: false,
            fail_size: false,
            fail_read: false,
        }
    }

    /// 内容为 `byte_at(i)` 的文件
    pub(crate) fn patterned(name: &str, len: usize) -> Self {
        Self::new(name, (0..len).map(Self::byte_at).collect())
    }

    /// 打开总是失败的文件
    pub(crate) fn unopenable(name: &str) -> Self {
        let mut io = Self::new(name, Vec::new());
        io.fail_open = true;
        io
    }

    /// 查询长度总是失败
    pub(crate) fn failing_size(mut self) -> Self {
        self.fail_size = true;
        self
    }

    /// 读取总是失败
    pub(crate) fn failing_read(mut self) -> Self {
        self.fail_read = true;
        self
    }

    pub(crate) fn byte_at(i: usize) -> u8 {
        (i % 251) as u8
    }

    pub(crate) fn opens(&self) -> usize {
        self.opens
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes
    }

    pub(crate) fn seeks(&self) -> usize {
        self.seeks
    }

    /// 非空读取记录：(起始偏移, 字节数)
    pub(crate) fn reads(&self) -> &[(u64, usize)] {
        &self.reads
    }
}

impl ObjectIo for MockIo {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(Error::new(ErrorKind::NotFound, "File not found"));
        }
        self.opens += 1;
        self.pos = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closes += 1;
        Ok(())
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.seeks += 1;
        self.pos = pos;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.fail_read {
            return Err(Error::new(ErrorKind::Io, "Read failed"));
        }
        let start = (self.pos as usize).min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        if n > 0 {
            self.reads.push((self.pos, n));
        }
        self.pos += n as u64;
        Ok(n)
    }

    fn size(&mut self) -> Result<u64> {
        if self.fail_size {
            return Err(Error::new(ErrorKind::Io, "Stat failed"));
        }
        Ok(self.data.len() as u64)
    }
}

/// 收集所有诊断的接收者
#[derive(Debug, Default)]
pub(crate) struct CollectDiagnostics(pub(crate) Vec<Diagnostic>);

impl Diagnostics for CollectDiagnostics {
    fn report(&mut self, diag: &Diagnostic) {
        self.0.push(diag.clone());
    }
}

/// 期望的文件内容 `[pos, pos + len)`
pub(crate) fn expected(pos: usize, len: usize) -> Vec<u8> {
    (pos..pos + len).map(MockIo::byte_at).collect()
}
