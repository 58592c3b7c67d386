//! 诊断信息上报
//!
//! 缓存不自行决定错误如何呈现给用户，只把分类后的诊断交给 [`Diagnostics`]。

use alloc::string::String;
use core::fmt;

/// 诊断类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagCode {
    /// 无法打开输入文件
    OpenFailed,
    /// 目标文件为空或不可读
    BadObject,
    /// 文件之前已出错，拒绝再次打开
    PriorError,
}

impl DiagCode {
    /// 消息模板，`%s` 处替换为文件名
    pub const fn template(self) -> &'static str {
        match self {
            DiagCode::OpenFailed => "cannot open %s",
            DiagCode::BadObject => "invalid object file %s",
            DiagCode::PriorError => "%s was not read due to previous errors",
        }
    }
}

/// 一条诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 类别
    pub code: DiagCode,
    /// 相关文件名
    pub file: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (head, tail) = self
            .code
            .template()
            .split_once("%s")
            .unwrap_or((self.code.template(), ""));
        write!(f, "{}{}{}", head, self.file, tail)
    }
}

/// 诊断接收者
pub trait Diagnostics {
    /// 上报一条诊断
    fn report(&mut self, diag: &Diagnostic);
}

/// 默认实现：通过 `log` 输出为 error 级别日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, diag: &Diagnostic) {
        log::error!("[OBJCACHE] {}", diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn test_diagnostic_substitutes_name() {
        let d = Diagnostic {
            code: DiagCode::BadObject,
            file: "empty.obj".to_string(),
        };
        assert_eq!(format!("{}", d), "invalid object file empty.obj");

        let d = Diagnostic {
            code: DiagCode::PriorError,
            file: "bad.lib".to_string(),
        };
        assert_eq!(format!("{}", d), "bad.lib was not read due to previous errors");
    }
}
