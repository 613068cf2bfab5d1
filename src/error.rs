use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 门户请求相关错误
    Portal(PortalError),
    /// 导出文件错误
    Export(ExportError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Portal(e) => write!(f, "门户错误: {}", e),
            AppError::Export(e) => write!(f, "导出错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Portal(e) => Some(e),
            AppError::Export(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 门户请求相关错误
#[derive(Debug)]
pub enum PortalError {
    /// 会话创建失败
    SessionBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 网络请求失败（含超时与非 2xx 状态码）
    RequestFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::SessionBuildFailed { source } => {
                write!(f, "会话创建失败: {}", source)
            }
            PortalError::RequestFailed { url, source } => {
                write!(f, "请求失败 ({}): {}", url, source)
            }
        }
    }
}

impl std::error::Error for PortalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PortalError::SessionBuildFailed { source }
            | PortalError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 导出文件错误
#[derive(Debug)]
pub enum ExportError {
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：anyhow 已经为所有实现了 std::error::Error 的类型提供了自动转换

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        AppError::Portal(PortalError::RequestFailed {
            url,
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Export(ExportError::WriteFailed {
            path: String::new(), // io 错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建会话创建失败错误
    pub fn session_build_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Portal(PortalError::SessionBuildFailed {
            source: Box::new(source),
        })
    }

    /// 创建门户请求失败错误
    pub fn portal_request_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Portal(PortalError::RequestFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建导出写入失败错误
    pub fn export_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Export(ExportError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
