//! 文本提取器 - 基础设施层
//!
//! 把上传的文档转换成纯文本，具体格式解析交给第三方库：
//! - PDF → `pdf-extract`
//! - DOCX → `docx-rs`
//! - TXT → UTF-8 解码（非法字节替换）

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use tracing::{debug, warn};

use crate::error::DocumentError;
use crate::models::{Document, DocumentKind};

/// 文本提取器
///
/// 职责：
/// - 按文档类型分派到对应的解析库
/// - 不关心文本用途（测验 / 要点 / 朗读）
#[derive(Debug, Default, Clone, Copy)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 提取文档文本
    ///
    /// 不支持的类型返回 `UnsupportedFileType`，解析失败返回 `ExtractionFailed`。
    /// 返回空字符串表示文档没有可用内容，由调用方决定如何处理。
    pub fn extract(&self, document: &Document) -> Result<String, DocumentError> {
        let kind = document.kind()?;
        debug!("提取文本: {} ({}, {} 字节)", document.name, kind, document.size());

        let text = match kind {
            DocumentKind::Pdf => extract_pdf(document)?,
            DocumentKind::WordProcessor => extract_docx(document)?,
            DocumentKind::PlainText => String::from_utf8_lossy(document.bytes()).into_owned(),
        };

        if text.trim().is_empty() {
            warn!("⚠️ 文档 {} 没有提取到任何文本", document.name);
        }

        Ok(text)
    }

    /// 在阻塞线程池中提取文本，避免 PDF/DOCX 解析占住异步运行时
    pub async fn extract_in_background(
        &self,
        document: &Document,
    ) -> Result<String, DocumentError> {
        let extractor = *self;
        let owned = document.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&owned))
            .await
            .map_err(|e| DocumentError::ExtractionFailed {
                name: document.name.clone(),
                message: "Failed to process document.".to_string(),
                source: Box::new(e),
            })?
    }
}

fn extract_pdf(document: &Document) -> Result<String, DocumentError> {
    pdf_extract::extract_text_from_mem(document.bytes()).map_err(|e| {
        DocumentError::ExtractionFailed {
            name: document.name.clone(),
            message: "Failed to process PDF. Please ensure it contains selectable text."
                .to_string(),
            source: e.to_string().into(),
        }
    })
}

/// 遍历 Document → Paragraph → Run → Text，段落之间空一行
fn extract_docx(document: &Document) -> Result<String, DocumentError> {
    let docx = read_docx(document.bytes()).map_err(|e| DocumentError::ExtractionFailed {
        name: document.name.clone(),
        message: "Failed to process Word document.".to_string(),
        source: format!("{:?}", e).into(),
    })?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    Ok(paragraphs.join("\n\n"))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut parts = Vec::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                if let RunChild::Text(t) = rc {
                    parts.push(t.text.clone());
                }
            }
        }
    }
    parts.join("")
}
