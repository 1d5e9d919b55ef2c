//! 处理闸门
//!
//! 同一时刻只允许一个用户操作在执行，重复触发直接返回 `AppError::Busy`

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 单许可信号量，持有许可即处于处理状态
#[derive(Debug, Clone)]
pub struct ProcessingGate {
    permits: Arc<Semaphore>,
}

impl Default for ProcessingGate {
    fn default() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }
}

impl ProcessingGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试获取许可，返回的守卫在析构时归还许可
    pub fn try_enter(&self) -> AppResult<ProcessingGuard> {
        let permit = self
            .permits
            .clone()
            .try_acquire_owned()
            .map_err(|_| AppError::Busy)?;
        debug!("进入处理状态");
        Ok(ProcessingGuard { _permit: permit })
    }

    pub fn is_busy(&self) -> bool {
        self.permits.available_permits() == 0
    }
}

/// 处理中守卫
#[derive(Debug)]
pub struct ProcessingGuard {
    _permit: OwnedSemaphorePermit,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        debug!("退出处理状态");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reentry_is_rejected_until_guard_drops() {
        let gate = ProcessingGate::new();
        assert!(!gate.is_busy());

        let guard = gate.try_enter().unwrap();
        assert!(gate.is_busy());
        assert!(matches!(gate.try_enter(), Err(AppError::Busy)));

        // 克隆共享同一个信号量
        assert!(gate.clone().is_busy());

        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_enter().is_ok());
    }

    #[tokio::test]
    async fn test_permit_released_across_tasks() {
        let gate = ProcessingGate::new();
        let shared = gate.clone();

        let handle = tokio::spawn(async move {
            let _guard = shared.try_enter().unwrap();
            tokio::task::yield_now().await;
        });
        handle.await.unwrap();

        assert!(!gate.is_busy());
        assert!(gate.try_enter().is_ok());
    }
}
