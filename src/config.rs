use crate::error::ConfigError;

/// 默认的单次上传大小上限（仅测验路径检查）
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 文档处理 ---
    /// 测验生成允许的最大文件字节数
    pub max_upload_bytes: u64,
    /// 发送给模型的文本前缀长度（字符）
    pub prompt_char_limit: usize,
    /// 朗读时截取的文本长度（字符）
    pub read_aloud_char_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-1.5-flash".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            prompt_char_limit: 30_000,
            read_aloud_char_limit: 1_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("LLM_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_upload_bytes),
            prompt_char_limit: std::env::var("PROMPT_CHAR_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.prompt_char_limit),
            read_aloud_char_limit: std::env::var("READ_ALOUD_CHAR_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.read_aloud_char_limit),
        }
    }

    /// 检查数值配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("MAX_UPLOAD_BYTES", self.max_upload_bytes as usize),
            ("PROMPT_CHAR_LIMIT", self.prompt_char_limit),
            ("READ_ALOUD_CHAR_LIMIT", self.read_aloud_char_limit),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// 是否配置了 API 密钥
    pub fn has_credential(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }
}
