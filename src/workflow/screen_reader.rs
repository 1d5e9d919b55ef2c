//! 屏幕阅读器 - 流程层
//!
//! 激活后响应三个按键：U 上传、R 朗读、S 调整语速（Shift 减速）。
//! 语音服务由阅读器持有，调用方在创建时注入。

use std::fmt::Display;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{SpeechOptions, SpeechService, TextExtractor};
use crate::models::Document;
use crate::utils::{logging, take_chars};
use crate::workflow::gate::ProcessingGate;

pub const WELCOME_MESSAGE: &str = "Welcome to Study Buddy Screen Reader. Press U to upload a document, S to adjust speed, and R to repeat.";
pub const UPLOAD_MESSAGE: &str = "Press U to upload a document for the screen reader.";
pub const PROCESSING_MESSAGE: &str = "Processing your document. Please wait...";
pub const READY_MESSAGE: &str = "Document ready. Press R to hear the content.";
pub const NO_CONTENT_MESSAGE: &str = "No document content available.";

/// 语速范围（以 0.1 为单位）
const MIN_SPEED_TENTHS: u8 = 5;
const MAX_SPEED_TENTHS: u8 = 20;
const DEFAULT_SPEED_TENTHS: u8 = 10;

/// 阅读器按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKey {
    Upload,
    Read,
    Speed { slower: bool },
}

impl ReaderKey {
    /// 解析单个按键，大写 `S` 视为按住 Shift
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "u" | "U" => Some(ReaderKey::Upload),
            "r" | "R" => Some(ReaderKey::Read),
            "s" => Some(ReaderKey::Speed { slower: false }),
            "S" => Some(ReaderKey::Speed { slower: true }),
            _ => None,
        }
    }
}

/// 按键处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// 阅读器未激活，按键被忽略
    Ignored,
    /// 已播报
    Spoken,
    /// 需要调用方选择文件后调用 `load_path` 或 `load_document`
    UploadRequested,
}

/// 屏幕阅读器
pub struct ScreenReader<S> {
    speech: S,
    extractor: TextExtractor,
    gate: ProcessingGate,
    active: bool,
    current_message: String,
    speed_tenths: u8,
    text: String,
    document_name: Option<String>,
    read_aloud_char_limit: usize,
}

impl<S: SpeechService> ScreenReader<S> {
    pub fn new(config: &Config, speech: S) -> Self {
        Self {
            speech,
            extractor: TextExtractor::new(),
            gate: ProcessingGate::new(),
            active: false,
            current_message: String::new(),
            speed_tenths: DEFAULT_SPEED_TENTHS,
            text: String::new(),
            document_name: None,
            read_aloud_char_limit: config.read_aloud_char_limit,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 当前正在播报的内容，播报结束后为空
    pub fn current_message(&self) -> &str {
        &self.current_message
    }

    pub fn speed(&self) -> f32 {
        f32::from(self.speed_tenths) / 10.0
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    /// 直接设置语速，超出范围时截断
    pub fn set_speed(&mut self, rate: f32) {
        let tenths = (rate * 10.0).round().clamp(
            f32::from(MIN_SPEED_TENTHS),
            f32::from(MAX_SPEED_TENTHS),
        );
        self.speed_tenths = tenths as u8;
        debug!("语速设置为 {:.1}", self.speed());
    }

    /// 开关阅读器，返回切换后的状态
    pub fn toggle(&mut self) -> AppResult<bool> {
        self.active = !self.active;
        if self.active {
            info!("🔈 屏幕阅读器已开启");
            let message = if self.has_content() {
                READY_MESSAGE
            } else {
                WELCOME_MESSAGE
            };
            self.speak(message, true)?;
        } else {
            info!("🔇 屏幕阅读器已关闭");
            self.stop();
        }
        Ok(self.active)
    }

    pub fn handle_key(&mut self, key: ReaderKey) -> AppResult<KeyResponse> {
        if !self.active {
            return Ok(KeyResponse::Ignored);
        }

        match key {
            ReaderKey::Upload => {
                self.speak(UPLOAD_MESSAGE, true)?;
                return Ok(KeyResponse::UploadRequested);
            }
            ReaderKey::Read => {
                if self.has_content() {
                    let message = format!(
                        "Document content: {}",
                        take_chars(&self.text, self.read_aloud_char_limit)
                    );
                    self.speak(&message, true)?;
                } else if !self.current_message.is_empty() {
                    let message = self.current_message.clone();
                    self.speak(&message, true)?;
                } else {
                    self.speak(NO_CONTENT_MESSAGE, true)?;
                }
            }
            ReaderKey::Speed { slower } => {
                self.speed_tenths = if slower {
                    self.speed_tenths.saturating_sub(1).max(MIN_SPEED_TENTHS)
                } else {
                    (self.speed_tenths + 1).min(MAX_SPEED_TENTHS)
                };
                let message = format!("Reading speed set to {:.1}", self.speed());
                self.speak(&message, true)?;
            }
        }
        Ok(KeyResponse::Spoken)
    }

    /// 加载文档；成功与失败都会播报
    pub async fn load_document(&mut self, document: &Document) -> AppResult<()> {
        let gate = self.gate.clone();
        let _guard = gate.try_enter()?;

        self.speak(PROCESSING_MESSAGE, false)?;
        self.process_document(document).await
    }

    /// 从磁盘读取文档再加载，读取失败同样会播报
    pub async fn load_path(&mut self, path: &Path) -> AppResult<()> {
        let gate = self.gate.clone();
        let _guard = gate.try_enter()?;

        self.speak(PROCESSING_MESSAGE, false)?;
        match Document::from_path(path).await {
            Ok(document) => self.process_document(&document).await,
            Err(e) => {
                warn!("⚠️ 无法读取 {}: {}", path.display(), e);
                self.announce_error(&e)?;
                Err(e)
            }
        }
    }

    /// 播报加载失败的原因
    pub fn announce_error(&mut self, reason: &impl Display) -> AppResult<()> {
        let message = format!("Error: Could not process the document. {}", reason);
        self.speak(&message, true)
    }

    async fn process_document(&mut self, document: &Document) -> AppResult<()> {
        match self.extractor.extract_in_background(document).await {
            Ok(text) => {
                logging::log_document_loaded(&document.name, document.size(), text.chars().count());
                self.text = text;
                self.document_name = Some(document.name.clone());
                let message = format!(
                    "Document {} processed successfully. Press R to hear the content.",
                    document.name
                );
                self.speak(&message, true)
            }
            Err(e) => {
                warn!("⚠️ 文档处理失败 {}: {}", document.name, e);
                self.announce_error(&e)?;
                Err(e.into())
            }
        }
    }

    /// 停止播报
    pub fn stop(&mut self) {
        self.speech.cancel();
        self.current_message.clear();
    }

    /// 语音服务通知播报结束
    pub fn on_speech_end(&mut self) {
        self.current_message.clear();
    }

    fn speak(&mut self, message: &str, interrupt: bool) -> AppResult<()> {
        self.current_message = message.to_string();
        self.speech.speak(
            message,
            SpeechOptions {
                rate: self.speed(),
                interrupt,
            },
        )
    }
}
