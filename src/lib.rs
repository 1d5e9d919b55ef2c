//! # Study Buddy
//!
//! 从学习资料（PDF / DOCX / TXT）生成测验、提取要点、朗读文档
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 对接第三方库，只暴露能力
//! - `TextExtractor` - 文档转纯文本
//! - `SpeechService` / `Clipboard` - 语音与剪贴板，由调用方注入
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `LlmService` - 兼容 OpenAI 的模型调用
//! - `AiRequester` - 测验 / 要点提示词与回复解析
//! - `QuestionSynthesizer` - 本地兜底出题
//! - `extract_key_points` - 本地兜底要点
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义每个用户操作的完整流程
//! - `QuizFlow` - 大小检查 → 提取 → 模型 → 兜底
//! - `KeyPointsFlow` - 提取 → 模型 → 兜底 → 剪贴板
//! - `ScreenReader` - 按键驱动的朗读
//! - `ProcessingGate` - 防止重复触发
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 装配资源、分派子命令、终端交互
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AiError, AppError, AppResult, DocumentError};
pub use models::{Document, KeyPoint, Question};
pub use orchestrator::App;
pub use workflow::{KeyPointsFlow, QuizFlow, ScreenReader};
