//! 要点提取流程 - 流程层
//!
//! 与测验流程不同，这里不做大小检查

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{Clipboard, TextExtractor};
use crate::models::{Document, GenerationSource, KeyPoint};
use crate::services::{extract_key_points, AiRequester, TextGenerator};
use crate::utils::logging;
use crate::workflow::gate::ProcessingGate;
use crate::workflow::quiz_flow::{FALLBACK_NOTICE, NO_CONTENT_NOTICE};

/// 复制成功提示
pub const COPIED_NOTICE: &str = "Key points copied to clipboard!";

/// 一次要点提取的结果
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPointsOutcome {
    pub key_points: Vec<KeyPoint>,
    pub source: GenerationSource,
    pub notice: Option<String>,
    pub ai_error: Option<String>,
}

/// 要点提取流程
pub struct KeyPointsFlow<G> {
    extractor: TextExtractor,
    requester: AiRequester<G>,
    gate: ProcessingGate,
}

impl<G: TextGenerator> KeyPointsFlow<G> {
    pub fn new(config: &Config, generator: G) -> Self {
        Self {
            extractor: TextExtractor::new(),
            requester: AiRequester::new(generator, config.prompt_char_limit),
            gate: ProcessingGate::new(),
        }
    }

    pub fn gate(&self) -> &ProcessingGate {
        &self.gate
    }

    /// 提取文档文本
    pub async fn load(&self, document: &Document) -> AppResult<String> {
        let _guard = self.gate.try_enter()?;

        let text = self
            .extractor
            .extract_in_background(document)
            .await
            .map_err(|e| {
                error!("❌ 文档处理失败 {}: {}", document.name, e);
                e
            })?;
        logging::log_document_loaded(&document.name, document.size(), text.chars().count());
        Ok(text)
    }

    /// 由文本生成要点，模型失败时按句子长度兜底
    pub async fn generate(&self, text: &str) -> AppResult<KeyPointsOutcome> {
        let _guard = self.gate.try_enter()?;

        if text.trim().is_empty() {
            warn!("⚠️ 没有可用文本，跳过生成");
            return Ok(KeyPointsOutcome {
                key_points: Vec::new(),
                source: GenerationSource::Fallback,
                notice: Some(NO_CONTENT_NOTICE.to_string()),
                ai_error: None,
            });
        }

        info!("🤖 请求模型提取要点...");
        let outcome = match self.requester.request_key_points(text).await {
            Ok(key_points) => KeyPointsOutcome {
                key_points,
                source: GenerationSource::Ai,
                notice: None,
                ai_error: None,
            },
            Err(e) => {
                warn!("⚠️ 模型提取失败，使用本地兜底: {}", e);
                let key_points = extract_key_points(text);
                info!("✓ 本地兜底提取 {} 条要点", key_points.len());
                KeyPointsOutcome {
                    key_points,
                    source: GenerationSource::Fallback,
                    notice: Some(FALLBACK_NOTICE.to_string()),
                    ai_error: Some(e.to_string()),
                }
            }
        };
        Ok(outcome)
    }

    /// 加载文档并生成要点
    pub async fn run(&self, document: &Document) -> AppResult<KeyPointsOutcome> {
        let text = self.load(document).await?;
        self.generate(&text).await
    }
}

/// 剪贴板格式：每条要点一行，以 "• " 开头
pub fn format_for_clipboard(key_points: &[KeyPoint]) -> String {
    key_points
        .iter()
        .map(|point| format!("• {}", point.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 把要点写入剪贴板，返回提示文字
pub fn copy_to_clipboard<C: Clipboard + ?Sized>(
    clipboard: &mut C,
    key_points: &[KeyPoint],
) -> AppResult<&'static str> {
    clipboard.write_text(&format_for_clipboard(key_points))?;
    info!("📋 已复制 {} 条要点", key_points.len());
    Ok(COPIED_NOTICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::LlmService;

    #[derive(Default)]
    struct MemoryClipboard {
        content: Option<String>,
    }

    impl Clipboard for MemoryClipboard {
        fn write_text(&mut self, text: &str) -> AppResult<()> {
            self.content = Some(text.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&mut self, _text: &str) -> AppResult<()> {
            Err(AppError::Clipboard("no display".to_string()))
        }
    }

    #[test]
    fn test_format_for_clipboard() {
        let points = KeyPoint::batch(["First", "Second"]);
        assert_eq!(format_for_clipboard(&points), "• First\n• Second");
        assert_eq!(format_for_clipboard(&[]), "");
    }

    #[test]
    fn test_copy_to_clipboard() {
        let mut clipboard = MemoryClipboard::default();
        let points = KeyPoint::batch(["Only point"]);
        let notice = copy_to_clipboard(&mut clipboard, &points).unwrap();
        assert_eq!(notice, "Key points copied to clipboard!");
        assert_eq!(clipboard.content.as_deref(), Some("• Only point"));
    }

    #[test]
    fn test_copy_failure_is_reported() {
        let points = KeyPoint::batch(["Only point"]);
        let err = copy_to_clipboard(&mut BrokenClipboard, &points).unwrap_err();
        assert_eq!(err.to_string(), "Failed to copy: no display");
    }

    #[test]
    fn test_generate_falls_back_without_credential() {
        let config = Config::default();
        let flow = KeyPointsFlow::new(&config, LlmService::new(&config));

        let outcome = tokio_test::block_on(
            flow.generate("Tiny. This sentence clearly has more than five words."),
        )
        .unwrap();

        assert_eq!(outcome.source, GenerationSource::Fallback);
        assert_eq!(outcome.notice.as_deref(), Some(FALLBACK_NOTICE));
        assert_eq!(outcome.ai_error.as_deref(), Some("No API credential configured"));
        assert_eq!(outcome.key_points.len(), 1);
        assert!(!flow.gate().is_busy());
    }
}
