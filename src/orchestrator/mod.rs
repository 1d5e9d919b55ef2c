//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责装配资源并调度流程，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (解析后的子命令)
//!     ↓
//! workflow (QuizFlow / KeyPointsFlow / ScreenReader / QuizSession)
//!     ↓
//! services (能力层：llm / ai_requester / synthesizer / key points)
//!     ↓
//! infrastructure (基础设施：extractor / speech / clipboard)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源注入**：语音、剪贴板、随机源只在这里创建
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度和终端输出

pub mod app;

pub use app::App;
