//! 语音播报能力 - 基础设施层
//!
//! 由会话持有并显式传入，不使用全局语音引擎

use std::io::Write;

use tracing::debug;

use crate::error::{AppError, AppResult};

/// 单次播报参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechOptions {
    /// 语速倍率
    pub rate: f32,
    /// 是否打断正在进行的播报
    pub interrupt: bool,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            interrupt: true,
        }
    }
}

/// 语音播报服务
pub trait SpeechService {
    /// 播报一段文本
    fn speak(&mut self, text: &str, options: SpeechOptions) -> AppResult<()>;

    /// 停止当前播报
    fn cancel(&mut self);
}

/// 终端"播报"：把要朗读的内容写到标准输出
pub struct ConsoleSpeech<W: Write = std::io::Stdout> {
    out: W,
}

impl ConsoleSpeech {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsoleSpeech<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SpeechService for ConsoleSpeech<W> {
    fn speak(&mut self, text: &str, options: SpeechOptions) -> AppResult<()> {
        if options.interrupt {
            self.cancel();
        }
        debug!("播报 {} 个字符，语速 {:.1}", text.chars().count(), options.rate);
        writeln!(self.out, "🔊 [{:.1}x] {}", options.rate, text)
            .map_err(|e| AppError::Speech(e.to_string()))
    }

    fn cancel(&mut self) {
        debug!("停止播报");
        if let Err(e) = self.out.flush() {
            debug!("刷新输出失败: {}", e);
        }
    }
}
