//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、输出启动信息
//! 2. **命令分派**：quiz / key-points / reader
//! 3. **资源装配**：创建 LLM 服务、语音、剪贴板、随机源并注入流程
//! 4. **终端交互**：读取标准输入、打印结果

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, warn};

use crate::cli::Command;
use crate::config::Config;
use crate::infrastructure::{ConsoleSpeech, SpeechOptions, SpeechService, SystemClipboard};
use crate::models::{Document, GenerationSource, KeyPoint};
use crate::services::LlmService;
use crate::utils::logging;
use crate::workflow::{
    copy_to_clipboard, KeyPointsFlow, KeyResponse, QuizFlow, QuizOutcome, QuizSession, ReaderKey,
    ScreenReader,
};

type InputLines = Lines<BufReader<Stdin>>;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config, command: &Command) -> Result<Self> {
        config.validate().context("配置无效")?;
        logging::log_startup(command.name(), &config.llm_model_name);

        if !config.has_credential() {
            warn!("⚠️ 未设置 GEMINI_API_KEY，将直接使用本地方法");
        }

        Ok(Self { config })
    }

    /// 运行子命令
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Quiz {
                file,
                interactive,
                seed,
            } => self.run_quiz(&file, interactive, seed).await,
            Command::KeyPoints { file, copy } => self.run_key_points(&file, copy).await,
            Command::Reader { file, speed } => self.run_reader(file.as_deref(), speed).await,
        }
    }

    async fn run_quiz(&self, path: &Path, interactive: bool, seed: Option<u64>) -> Result<()> {
        let document = Document::from_path(path).await?;
        let flow = QuizFlow::new(&self.config, LlmService::new(&self.config));

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let outcome = flow.run(&document, &mut rng).await.map_err(|e| {
            error!("❌ 生成测验失败: {}", e);
            e
        })?;
        print_quiz_outcome(&outcome);

        if interactive && !outcome.questions.is_empty() {
            let mut session = QuizSession::new(outcome.questions);
            let mut input = BufReader::new(tokio::io::stdin()).lines();
            let mut speech = ConsoleSpeech::stdout();
            run_quiz_session(&mut session, &mut input, &mut speech).await?;
        }

        Ok(())
    }

    async fn run_key_points(&self, path: &Path, copy: bool) -> Result<()> {
        let document = Document::from_path(path).await?;
        let flow = KeyPointsFlow::new(&self.config, LlmService::new(&self.config));

        let outcome = flow.run(&document).await.map_err(|e| {
            error!("❌ 提取要点失败: {}", e);
            e
        })?;

        if let Some(notice) = &outcome.notice {
            println!("{}", notice);
        }
        if let Some(reason) = &outcome.ai_error {
            info!("兜底原因: {}", reason);
        }
        print_key_points(&outcome.key_points, outcome.source);

        if copy && !outcome.key_points.is_empty() {
            let mut clipboard = SystemClipboard::new()?;
            let notice = copy_to_clipboard(&mut clipboard, &outcome.key_points)?;
            println!("{}", notice);
        }

        Ok(())
    }

    async fn run_reader(&self, path: Option<&Path>, speed: f32) -> Result<()> {
        let mut reader = ScreenReader::new(&self.config, ConsoleSpeech::stdout());
        reader.set_speed(speed);
        reader.toggle()?;

        if let Some(path) = path {
            load_into_reader(&mut reader, path).await;
        }

        println!("Keys: u = upload, r = read, s / S = faster / slower, t = toggle, x = stop, q = quit (5MB max)");

        let mut input = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = input.next_line().await? {
            let line = line.trim();
            match line {
                "q" | "Q" => break,
                "t" | "T" => {
                    reader.toggle()?;
                }
                "x" | "X" => reader.stop(),
                _ => match ReaderKey::parse(line) {
                    Some(key) => {
                        if reader.handle_key(key)? == KeyResponse::UploadRequested {
                            prompt("File path: ")?;
                            if let Some(path) = input.next_line().await? {
                                load_into_reader(&mut reader, Path::new(path.trim())).await;
                            }
                        }
                    }
                    None if line.is_empty() => {}
                    None => warn!("未知按键: {}", line),
                },
            }
        }

        reader.stop();
        info!("👋 屏幕阅读器已退出");
        Ok(())
    }
}

/// 读取并加载文档，失败只记录日志（阅读器已播报错误）
async fn load_into_reader<S: SpeechService>(reader: &mut ScreenReader<S>, path: &Path) {
    if let Err(e) = reader.load_path(path).await {
        warn!("⚠️ 文档加载失败: {}", e);
    }
}

async fn run_quiz_session<S: SpeechService>(
    session: &mut QuizSession,
    input: &mut InputLines,
    speech: &mut S,
) -> Result<()> {
    loop {
        let questions = session.questions().to_vec();
        for (idx, question) in questions.iter().enumerate() {
            println!("\n[{}/{}] {}", idx + 1, questions.len(), question);

            loop {
                prompt("Your answer (letter, or 'listen'): ")?;
                let Some(line) = input.next_line().await? else {
                    return Ok(());
                };
                let line = line.trim();

                if line.eq_ignore_ascii_case("listen") {
                    speech.speak(&question.question, SpeechOptions::default())?;
                    continue;
                }

                let Some(choice) = parse_choice(line) else {
                    println!("Please enter an option letter.");
                    continue;
                };
                if session.select_answer(&question.id, choice) {
                    break;
                }
                println!("Please enter one of the listed options.");
            }

            if let Some(feedback) = session.feedback(&question.id) {
                println!("{}", feedback);
            }
        }

        let (correct, total) = session.score();
        println!("\nScore: {}/{}", correct, total);

        prompt("Retry this quiz? (y/N): ")?;
        match input.next_line().await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => session.retry(),
            _ => return Ok(()),
        }
    }
}

/// 把 "A" / "b" 解析为选项下标
fn parse_choice(input: &str) -> Option<usize> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    std::io::stdout().flush().context("刷新标准输出失败")
}

fn print_quiz_outcome(outcome: &QuizOutcome) {
    if let Some(notice) = &outcome.notice {
        println!("{}", notice);
    }
    if let Some(reason) = &outcome.ai_error {
        info!("兜底原因: {}", reason);
    }
    if outcome.questions.is_empty() {
        return;
    }

    println!("{}\n", outcome.summary());
    for (idx, question) in outcome.questions.iter().enumerate() {
        println!("{}. {}", idx + 1, question);
    }
}

fn print_key_points(key_points: &[KeyPoint], source: GenerationSource) {
    info!("要点来源: {:?}", source);
    for point in key_points {
        let marker = if point.is_important { "★" } else { "•" };
        println!("{} {}", marker, point.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("A"), Some(0));
        assert_eq!(parse_choice("c"), Some(2));
        assert_eq!(parse_choice("AB"), None);
        assert_eq!(parse_choice("1"), None);
        assert_eq!(parse_choice(""), None);
    }
}
