use crate::error::{AppError, AppResult, DocumentError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;

/// 文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// PDF
    Pdf,
    /// Word 文档（.docx）
    WordProcessor,
    /// 纯文本
    PlainText,
}

impl DocumentKind {
    /// 根据声明的媒体类型和文件名判断类型
    ///
    /// 先看媒体类型，再看扩展名；都无法识别时返回 `None`。
    pub fn detect(name: &str, media_type: Option<&str>) -> Option<Self> {
        let media_type = media_type.unwrap_or("").to_ascii_lowercase();
        let name = name.to_ascii_lowercase();

        if media_type == "application/pdf" || name.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if media_type.contains("word") || name.ends_with(".docx") {
            Some(DocumentKind::WordProcessor)
        } else if media_type.contains("text") || name.ends_with(".txt") {
            Some(DocumentKind::PlainText)
        } else {
            None
        }
    }

    /// 获取显示名称
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::WordProcessor => "DOCX",
            DocumentKind::PlainText => "TXT",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 用户选择的文档
///
/// 只保存原始字节和声明信息，类型校验推迟到提取阶段。
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub media_type: Option<String>,
    bytes: Vec<u8>,
}

impl Document {
    /// 从内存字节创建文档
    pub fn from_bytes(name: impl Into<String>, media_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(str::to_string),
            bytes,
        }
    }

    /// 从磁盘文件加载文档
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self::from_bytes(name, None, bytes))
    }

    /// 文件大小（字节）
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 解析文档类型
    pub fn kind(&self) -> Result<DocumentKind, DocumentError> {
        DocumentKind::detect(&self.name, self.media_type.as_deref()).ok_or_else(|| {
            DocumentError::UnsupportedFileType {
                name: self.name.clone(),
                media_type: self.media_type.clone(),
            }
        })
    }

    /// 检查文件大小是否超过限制
    pub fn ensure_within(&self, limit: u64) -> Result<(), DocumentError> {
        if self.size() > limit {
            return Err(DocumentError::FileTooLarge {
                name: self.name.clone(),
                size: self.size(),
                limit,
            });
        }
        Ok(())
    }
}
