//! LLM 服务 - 业务能力层
//!
//! 只负责"把一段提示词发给模型并拿回文本"，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（默认指向 Gemini 的 OpenAI 兼容端点）

use std::sync::Arc;

use anyhow::Context;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AiError;

/// 文本生成能力
///
/// 流程层只依赖这个 trait，测试中可以替换为脚本化的实现。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 发送一次对话请求，返回模型的文本回复
    async fn generate(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, AiError>;

    /// 当前使用的模型名称
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<'a, T: TextGenerator + ?Sized> TextGenerator for &'a T {
    async fn generate(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, AiError> {
        (**self).generate(user_message, system_message).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, AiError> {
        (**self).generate(user_message, system_message).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// LLM 服务
///
/// 职责：
/// - 调用兼容 OpenAI 的 Chat Completion 接口
/// - 把传输层错误统一转换为 `AiError`
/// - 不解析回复内容
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    has_credential: bool,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            has_credential: config.has_credential(),
        }
    }

    async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> anyhow::Result<Option<String>> {
        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .context("构建系统消息失败")?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .context("构建用户消息失败")?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(4096u32)
            .build()
            .context("构建请求失败")?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("LLM API 调用失败")?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, AiError> {
        if !self.has_credential {
            warn!("⚠️ 未配置 API 密钥，跳过 AI 调用");
            return Err(AiError::MissingCredential);
        }

        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let content = self
            .send_to_llm(user_message, system_message)
            .await
            .map_err(|e| {
                warn!("LLM API 调用失败: {:#}", e);
                AiError::RequestFailed {
                    model: self.model_name.clone(),
                    message: format!("{:#}", e),
                }
            })?;

        let content = content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AiError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        debug!("LLM API 调用成功，回复 {} 字符", content.len());
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
