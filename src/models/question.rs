use serde::{Deserialize, Serialize};

/// 选择题选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    pub correct: bool,
}

impl QuizOption {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

/// 选择题
///
/// `correct_answer` 必须是 `options` 的合法下标，且只有该选项 `correct == true`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<QuizOption>,
    pub correct_answer: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// 由选项列表构建题目，正确答案下标取自 `correct` 标记
    ///
    /// 标记数量不是恰好一个时返回 `None`。
    pub fn from_options(
        id: impl Into<String>,
        question: impl Into<String>,
        options: Vec<QuizOption>,
        explanation: Option<String>,
    ) -> Option<Self> {
        let mut marked = options.iter().enumerate().filter(|(_, opt)| opt.correct);
        let (correct_answer, _) = marked.next()?;
        if marked.next().is_some() {
            return None;
        }

        Some(Self {
            id: id.into(),
            question: question.into(),
            options,
            correct_answer,
            explanation,
        })
    }

    /// 检查题目是否满足"恰好一个正确选项"的约束
    pub fn is_consistent(&self) -> bool {
        self.correct_answer < self.options.len()
            && self.options[self.correct_answer].correct
            && self.options.iter().filter(|opt| opt.correct).count() == 1
    }

    /// 正确选项
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.get(self.correct_answer)
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.question)?;
        for (idx, option) in self.options.iter().enumerate() {
            let label = (b'A' + (idx % 26) as u8) as char;
            writeln!(f, "  {}. {}", label, option.text)?;
        }
        Ok(())
    }
}

/// 模型返回的测验分析信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnalysis {
    #[serde(default)]
    pub total_concepts: u32,
    #[serde(default)]
    pub questions_generated: u32,
}

/// 要点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub id: usize,
    pub text: String,
    pub is_important: bool,
}

/// 每批要点中被标记为重要的数量
pub const IMPORTANT_KEY_POINTS: usize = 4;

impl KeyPoint {
    /// 按顺序构建一批要点，前 4 条标记为重要
    pub fn batch<I, S>(texts: I) -> Vec<KeyPoint>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| KeyPoint {
                id,
                text: text.into(),
                is_important: id < IMPORTANT_KEY_POINTS,
            })
            .collect()
    }
}

/// 结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationSource {
    /// 远程模型生成
    Ai,
    /// 本地兜底生成
    Fallback,
}
