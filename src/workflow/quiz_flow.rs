//! 测验生成流程 - 流程层
//!
//! 流程顺序：
//! 1. 大小检查（提取之前）
//! 2. 文本提取
//! 3. 模型生成 → 失败时本地兜底

use rand::Rng;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::TextExtractor;
use crate::models::{Document, GenerationSource, Question, QuizAnalysis};
use crate::services::{AiRequester, QuestionSynthesizer, TextGenerator};
use crate::utils::logging;
use crate::workflow::gate::ProcessingGate;

/// 模型生成失败、改用本地方法时展示给用户的提示
pub const FALLBACK_NOTICE: &str = "AI generation failed. Using basic extraction method instead.";

/// 文档没有可用文本时的提示
pub const NO_CONTENT_NOTICE: &str = "No readable text was found in this document.";

/// 兜底也没有生成题目时的提示
pub const NO_QUESTIONS_NOTICE: &str = "Could not generate questions from this document.";

/// 一次测验生成的结果
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub questions: Vec<Question>,
    pub source: GenerationSource,
    pub analysis: Option<QuizAnalysis>,
    /// 需要额外告知用户的信息（兜底、无内容等）
    pub notice: Option<String>,
    /// 触发兜底的原始错误
    pub ai_error: Option<String>,
}

impl QuizOutcome {
    fn empty(notice: &str) -> Self {
        Self {
            questions: Vec::new(),
            source: GenerationSource::Fallback,
            analysis: None,
            notice: Some(notice.to_string()),
            ai_error: None,
        }
    }

    /// 生成结果摘要
    pub fn summary(&self) -> String {
        match &self.analysis {
            Some(analysis) => format!(
                "Generated {} questions covering {} key concepts from your document.",
                self.questions.len(),
                analysis.total_concepts
            ),
            None => format!(
                "Generated {} questions from your document content.",
                self.questions.len()
            ),
        }
    }
}

/// 测验生成流程
///
/// - 编排"提取 → 模型 → 兜底"的顺序
/// - 文档错误直接返回，模型错误在这里被吸收
pub struct QuizFlow<G> {
    extractor: TextExtractor,
    requester: AiRequester<G>,
    synthesizer: QuestionSynthesizer,
    max_upload_bytes: u64,
    gate: ProcessingGate,
}

impl<G: TextGenerator> QuizFlow<G> {
    pub fn new(config: &Config, generator: G) -> Self {
        Self {
            extractor: TextExtractor::new(),
            requester: AiRequester::new(generator, config.prompt_char_limit),
            synthesizer: QuestionSynthesizer::new(),
            max_upload_bytes: config.max_upload_bytes,
            gate: ProcessingGate::new(),
        }
    }

    pub fn gate(&self) -> &ProcessingGate {
        &self.gate
    }

    /// 处理一份上传的文档
    pub async fn run<R: Rng + ?Sized>(
        &self,
        document: &Document,
        rng: &mut R,
    ) -> AppResult<QuizOutcome> {
        let _guard = self.gate.try_enter()?;

        if let Err(e) = document.ensure_within(self.max_upload_bytes) {
            error!("❌ {}: {}", document.name, e);
            return Err(e.into());
        }

        let text = self
            .extractor
            .extract_in_background(document)
            .await
            .map_err(|e| {
                error!("❌ 文档处理失败 {}: {}", document.name, e);
                e
            })?;
        logging::log_document_loaded(&document.name, document.size(), text.chars().count());

        Ok(self.generate_from_text(&text, rng).await)
    }

    /// 从已提取的文本生成题目，不会失败
    pub async fn generate_from_text<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> QuizOutcome {
        if text.trim().is_empty() {
            warn!("⚠️ 没有可用文本，跳过生成");
            return QuizOutcome::empty(NO_CONTENT_NOTICE);
        }

        info!("🤖 请求模型生成测验...");
        match self.requester.request_quiz(text).await {
            Ok(response) => QuizOutcome {
                questions: response.questions,
                source: GenerationSource::Ai,
                analysis: response.analysis,
                notice: None,
                ai_error: None,
            },
            Err(e) => {
                if e.is_request_error() {
                    warn!("⚠️ 模型请求失败，使用本地兜底: {}", e);
                } else {
                    warn!("⚠️ 模型返回格式错误，使用本地兜底: {}", e);
                }
                let questions = self.synthesizer.generate(text, rng);
                info!("✓ 本地兜底生成 {} 道题", questions.len());

                let notice = if questions.is_empty() {
                    format!("{} {}", FALLBACK_NOTICE, NO_QUESTIONS_NOTICE)
                } else {
                    FALLBACK_NOTICE.to_string()
                };

                QuizOutcome {
                    questions,
                    source: GenerationSource::Fallback,
                    analysis: None,
                    notice: Some(notice),
                    ai_error: Some(e.to_string()),
                }
            }
        }
    }
}
