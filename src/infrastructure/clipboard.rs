//! 剪贴板能力 - 基础设施层

use tracing::debug;

use crate::error::{AppError, AppResult};

/// 剪贴板写入能力
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> AppResult<()>;
}

/// 系统剪贴板（基于 arboard）
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> AppResult<Self> {
        let inner = arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> AppResult<()> {
        debug!("写入剪贴板: {} 个字符", text.chars().count());
        self.inner
            .set_text(text.to_owned())
            .map_err(|e| AppError::Clipboard(e.to_string()))
    }
}
