//! 命令行参数

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Study Buddy: 从学习资料生成测验、提取要点、朗读文档
#[derive(Debug, Parser)]
#[command(name = "study-buddy", version, about)]
pub struct Cli {
    /// 显示详细日志（等同于 VERBOSE_LOGGING=true）
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 从文档生成选择题（PDF / DOCX / TXT，最大 5MB）
    Quiz {
        file: PathBuf,
        /// 逐题作答并显示反馈
        #[arg(short, long)]
        interactive: bool,
        /// 本地兜底出题时使用的随机种子
        #[arg(long)]
        seed: Option<u64>,
    },
    /// 从文档提取要点
    KeyPoints {
        file: PathBuf,
        /// 把要点复制到剪贴板
        #[arg(short, long)]
        copy: bool,
    },
    /// 键盘驱动的屏幕阅读器
    Reader {
        file: Option<PathBuf>,
        /// 初始语速（0.5 - 2.0）
        #[arg(long, default_value_t = 1.0)]
        speed: f32,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Quiz { .. } => "quiz",
            Command::KeyPoints { .. } => "key-points",
            Command::Reader { .. } => "reader",
        }
    }
}
