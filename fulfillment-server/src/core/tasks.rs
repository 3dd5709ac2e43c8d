//! 后台任务管理
//!
//! 统一管理后台任务的注册、启动和关闭。发票管线等 fire-and-forget
//! 任务也在此注册，关闭时可等待在途任务完成（可观察的完成语义，
//! 而非静默丢弃）。
//!
//! # 任务类型
//!
//! - [`TaskKind::Worker`] - 长期后台工作者
//! - [`TaskKind::Oneshot`] - 单次后台作业（如一次发票生成投递）

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// 长期后台工作者
    Worker,
    /// 单次后台作业
    Oneshot,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Worker => write!(f, "Worker"),
            TaskKind::Oneshot => write!(f, "Oneshot"),
        }
    }
}

/// 后台任务管理器
///
/// # 使用示例
///
/// ```ignore
/// let tasks = BackgroundTasks::new();
///
/// tasks.spawn("invoice_pipeline", TaskKind::Oneshot, async move {
///     // 任务逻辑
/// });
///
/// // Graceful shutdown: 等待在途任务完成或超时
/// tasks.shutdown(Duration::from_secs(10)).await;
/// ```
#[derive(Debug, Clone)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    /// 创建新的任务管理器
    pub fn new() -> Self {
        Self {
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 获取取消令牌（用于任务内部监听 shutdown 信号）
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 注册并启动一个后台任务
    ///
    /// 任务会被包装以捕获 panic，异常退出会记录错误日志。
    ///
    /// # 参数
    ///
    /// - `name`: 任务名称（用于日志和调试）
    /// - `kind`: 任务类型
    /// - `future`: 要执行的异步任务
    pub fn spawn<F>(&self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let wrapped_future = async move {
            let result: Result<(), Box<dyn std::any::Any + Send>> =
                AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) => {
                    // Oneshot 任务正常结束不值得记录
                    if kind == TaskKind::Worker {
                        tracing::warn!(task = %name, kind = %kind, "Background task completed unexpectedly");
                    }
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(
                        task = %name,
                        kind = %kind,
                        panic = %panic_msg,
                        "Background task panicked! This is a bug that should be reported."
                    );
                }
            }
        };

        tokio::spawn(self.tracker.track_future(wrapped_future));
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
    }

    /// 当前在途任务数量
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    /// 检查是否没有在途任务
    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Graceful shutdown - 发送取消信号并等待在途任务完成或超时
    pub async fn shutdown(&self, timeout: Duration) {
        tracing::info!(in_flight = self.tracker.len(), "Shutting down background tasks...");

        self.shutdown.cancel();
        self.tracker.close();

        if tokio::time::timeout(timeout, self.tracker.wait()).await.is_err() {
            tracing::warn!(
                remaining = self.tracker.len(),
                "Background task shutdown timed out, abandoning remaining tasks"
            );
            return;
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_oneshot_runs_to_completion() {
        let tasks = BackgroundTasks::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        tasks.spawn("test_oneshot", TaskKind::Oneshot, async move {
            flag.store(true, Ordering::SeqCst);
        });
        tasks.shutdown(Duration::from_secs(1)).await;
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let tasks = BackgroundTasks::new();
        tasks.spawn("test_panic", TaskKind::Oneshot, async move {
            panic!("boom");
        });
        // Shutdown must not propagate the panic
        tasks.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_worker_observes_shutdown_token() {
        let tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();
        tasks.spawn("test_worker", TaskKind::Worker, async move {
            token.cancelled().await;
        });
        tasks.shutdown(Duration::from_secs(1)).await;
        assert!(tasks.is_empty());
    }
}
