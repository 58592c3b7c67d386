//! 基于 `std::fs::File` 的输入文件句柄

use super::ObjectIo;
use crate::error::{Error, ErrorKind, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::string::String;

/// 宿主文件系统上的输入文件
///
/// 句柄在 [`ObjectIo::open`] 时才真正打开，[`ObjectIo::close`] 后释放。
#[derive(Debug)]
pub struct StdFileIo {
    path: PathBuf,
    name: String,
    file: Option<File>,
}

impl StdFileIo {
    /// 创建（尚未打开的）文件句柄
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.to_string_lossy().into_owned();
        Self { path, name, file: None }
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file
            .as_mut()
            .ok_or(Error::new(ErrorKind::InvalidState, "Input file is not open"))
    }
}

impl ObjectIo for StdFileIo {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<()> {
        if self.file.is_none() {
            self.file = Some(File::open(&self.path)?);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.file = None;
        Ok(())
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.file_mut()?.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.file_mut()?.read(buf)?)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.file_mut()?.metadata()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::vec::Vec;

    fn temp_file(tag: &str, data: &[u8]) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(std::format!("objcache-{}-{}.bin", tag, std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    #[test]
    fn test_std_file_roundtrip() {
        let data: Vec<u8> = (0..1000u32).map(|i| i as u8).collect();
        let path = temp_file("io", &data);

        let mut io = StdFileIo::new(&path);
        assert!(io.seek(0).is_err());

        io.open().unwrap();
        assert_eq!(io.size().unwrap(), 1000);
        io.seek(100).unwrap();
        let mut buf = [0u8; 10];
        io.read_exact(&mut buf).unwrap();
        assert_eq!(&buf[..], &data[100..110]);
        io.close().unwrap();

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_std_file_missing() {
        let mut io = StdFileIo::new("/nonexistent/objcache/missing.obj");
        assert_eq!(io.open().unwrap_err().kind(), ErrorKind::NotFound);
    }
}
