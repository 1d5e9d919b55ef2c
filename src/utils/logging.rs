/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅者
///
/// `RUST_LOG` 优先；否则 `verbose` 为 true 时使用 debug 级别。
/// 重复调用是安全的（测试中会多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `command`: 本次执行的子命令
/// - `model`: 使用的模型名称
pub fn log_startup(command: &str, model: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 Study Buddy 启动 - {}", command);
    info!("🤖 模型: {}", model);
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
pub fn log_document_loaded(name: &str, size: u64, chars: usize) {
    info!("📄 文档: {} ({} 字节)", name, size);
    info!("✓ 提取文本 {} 个字符", chars);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
