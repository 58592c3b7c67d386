//! 输入文件句柄接口

use crate::error::{Error, ErrorKind, Result};

/// 输入文件句柄
///
/// 实现此 trait 以提供对目标文件/库文件的同步阻塞访问。缓存只读取，从不写入。
///
/// # 示例
///
/// ```rust,ignore
/// use objcache::{ObjectIo, Result};
///
/// struct MyFile {
///     // ...
/// }
///
/// impl ObjectIo for MyFile {
///     fn name(&self) -> &str {
///         "foo.obj"
///     }
///
///     fn open(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     fn close(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     fn seek(&mut self, pos: u64) -> Result<()> {
///         Ok(())
///     }
///
///     fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
///         Ok(0)
///     }
///
///     fn size(&mut self) -> Result<u64> {
///         Ok(0)
///     }
/// }
/// ```
pub trait ObjectIo {
    /// 文件名（用于诊断信息）
    fn name(&self) -> &str;

    /// 打开底层句柄
    fn open(&mut self) -> Result<()>;

    /// 关闭底层句柄
    fn close(&mut self) -> Result<()>;

    /// 定位到绝对字节偏移
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// 从当前位置读取
    ///
    /// # 返回
    ///
    /// 成功返回实际读取的字节数，0 表示到达文件末尾
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// 文件总长度（字节）
    fn size(&mut self) -> Result<u64>;

    /// 尽量读满缓冲区
    ///
    /// 反复调用 [`ObjectIo::read`] 直到缓冲区满或遇到文件末尾，返回读取的总字节数。
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut done = 0;
        while done < buf.len() {
            let n = self.read(&mut buf[done..])?;
            if n == 0 {
                break;
            }
            done += n;
        }
        Ok(done)
    }

    /// 精确读取 `buf.len()` 字节，不足则返回 I/O 错误
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.read_full(buf)?;
        if n != buf.len() {
            log::error!(
                "[IO] short read on {}: wanted {} bytes, got {}",
                self.name(),
                buf.len(),
                n
            );
            return Err(Error::new(ErrorKind::Io, "Short read from input file"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 每次最多返回 3 字节的文件，用于验证 read_full 的循环
    struct Trickle {
        data: &'static [u8],
        pos: usize,
    }

    impl ObjectIo for Trickle {
        fn name(&self) -> &str {
            "trickle.obj"
        }

        fn open(&mut self) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn seek(&mut self, pos: u64) -> Result<()> {
            self.pos = pos as usize;
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let n = buf.len().min(3).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn size(&mut self) -> Result<u64> {
            Ok(self.data.len() as u64)
        }
    }

    #[test]
    fn test_read_full_loops_until_filled() {
        let mut f = Trickle { data: b"0123456789", pos: 0 };
        let mut buf = [0u8; 8];
        assert_eq!(f.read_full(&mut buf).unwrap(), 8);
        assert_eq!(&buf, b"01234567");
    }

    #[test]
    fn test_read_full_stops_at_eof() {
        let mut f = Trickle { data: b"0123456789", pos: 6 };
        let mut buf = [0u8; 8];
        assert_eq!(f.read_full(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"6789");
    }

    #[test]
    fn test_read_exact_short() {
        let mut f = Trickle { data: b"0123", pos: 0 };
        let mut buf = [0u8; 8];
        let err = f.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
