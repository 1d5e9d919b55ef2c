use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档相关错误（类型、大小、解析）
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// AI 生成服务错误
    #[error(transparent)]
    Ai(#[from] AiError),
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 语音播报失败
    #[error("Speech synthesis failed: {0}")]
    Speech(String),
    /// 剪贴板写入失败
    #[error("Failed to copy: {0}")]
    Clipboard(String),
    /// 上一个操作尚未完成
    #[error("Another action is still in progress")]
    Busy,
}

/// 文档相关错误
///
/// 这些错误对当前操作是终止性的，消息会原样展示给用户。
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 不支持的文件类型
    #[error("Unsupported file type")]
    UnsupportedFileType { name: String, media_type: Option<String> },
    /// 文件超过大小限制
    #[error("File size exceeds {}MB limit", .limit / (1024 * 1024))]
    FileTooLarge { name: String, size: u64, limit: u64 },
    /// 文档损坏或无法解析
    #[error("{message}")]
    ExtractionFailed {
        name: String,
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 读取文件失败
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// AI 生成服务错误
///
/// 在流程层被捕获并触发本地兜底，不会作为整体失败返回。
#[derive(Debug, Error)]
pub enum AiError {
    /// 未配置 API 密钥
    #[error("No API credential configured")]
    MissingCredential,
    /// 请求失败（网络、鉴权、限流等）
    #[error("AI request failed (model: {model}): {message}")]
    RequestFailed { model: String, message: String },
    /// 返回结果为空
    #[error("AI returned an empty response (model: {model})")]
    EmptyResponse { model: String },
    /// 返回内容结构不符合预期
    #[error("Invalid response format from API: {reason}")]
    MalformedResponse { reason: String },
}

impl AiError {
    /// 是否属于"请求失败"类别（相对于"响应格式错误"）
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            AiError::MissingCredential | AiError::RequestFailed { .. }
        )
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 数值配置不合法
    #[error("Invalid configuration {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::MalformedResponse {
            reason: err.to_string(),
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Document(DocumentError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
