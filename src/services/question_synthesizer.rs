//! 兜底出题服务 - 业务能力层
//!
//! 远程模型不可用时，直接从文本中用正则规则生成选择题：
//! - 定义句 "X is / are / means Y" → "What is X?"
//! - 并列词组 "a, b, and c" → "Which item doesn't belong with these: ...?"
//!
//! 所有随机性都来自调用方注入的 `Rng`，同一种子得到同样的结果。

use std::collections::HashSet;
use std::sync::LazyLock;

use phf::phf_set;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use tracing::debug;

use crate::models::{Question, QuizOption};

/// 候选干扰项中需要排除的常见词（不区分大小写）
static STOP_WORDS: phf::Set<&'static str> = phf_set! {
    "the", "and", "but", "for", "are", "was", "were", "this", "that", "with", "from", "which",
};

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9 .,;?!-]").expect("safelist pattern"));

static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([A-Z][a-z]+(?:\s+[A-Za-z]+)*?)\s+(?:is|are|means)\s+([^.!?]+)")
        .expect("definition pattern")
});

static LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:[A-Za-z]+(?:-[A-Za-z]+)?(?:,\s(?:and\s|or\s)?|\sand\s|\sor\s)){2,}[A-Za-z]+")
        .expect("list pattern")
});

static LIST_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*,\s*(?:(?:and|or)\s+)?|\s+(?:and|or)\s+").expect("list separator pattern")
});

static CANDIDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[A-Z][a-z]+\b|\b\w{4,}\b").expect("candidate pattern"));

/// 最多生成的定义题数量
const MAX_DEFINITION_QUESTIONS: usize = 5;
/// 最多生成的列表题数量
const MAX_LIST_QUESTIONS: usize = 5;
/// 最终返回的题目上限
const MAX_QUESTIONS: usize = 10;
/// 参与抽取的候选干扰词上限
const MAX_CANDIDATES: usize = 20;
/// 每道定义题的干扰项数量
const DISTRACTORS_PER_QUESTION: usize = 3;

/// 兜底出题服务
///
/// 职责：
/// - 不依赖网络，只依赖文本本身
/// - 永远不返回错误，没有可识别的模式时返回空列表
#[derive(Debug, Default, Clone, Copy)]
pub struct QuestionSynthesizer;

impl QuestionSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// 从文本生成最多 10 道选择题
    pub fn generate<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Vec<Question> {
        let cleaned = clean_text(text);
        let candidates = candidate_terms(&cleaned);

        let definition_qs = self.definition_questions(&cleaned, &candidates, rng);
        let list_qs = self.list_questions(&cleaned, &candidates, rng);

        debug!(
            "兜底出题: 定义题 {} 道, 列表题 {} 道, 候选干扰词 {} 个",
            definition_qs.len(),
            list_qs.len(),
            candidates.len()
        );

        let mut questions = definition_qs;
        questions.extend(list_qs);
        let mut questions = shuffled(questions, rng);
        questions.truncate(MAX_QUESTIONS);
        questions
    }

    fn definition_questions<R: Rng + ?Sized>(
        &self,
        cleaned: &str,
        candidates: &[String],
        rng: &mut R,
    ) -> Vec<Question> {
        DEFINITION_RE
            .captures_iter(cleaned)
            .filter_map(|caps| {
                let subject = caps.get(1)?.as_str().trim();
                let definition = caps.get(2)?.as_str().trim();
                (!subject.is_empty() && !definition.is_empty()).then_some((subject, definition))
            })
            .take(MAX_DEFINITION_QUESTIONS)
            .enumerate()
            .filter_map(|(i, (subject, definition))| {
                let distractors = select_distractors(
                    candidates,
                    &[definition],
                    DISTRACTORS_PER_QUESTION,
                    &mut *rng,
                );

                let mut options = vec![QuizOption::new(definition, true)];
                options.extend(distractors.into_iter().map(|d| QuizOption::new(d, false)));

                Question::from_options(
                    format!("def-{}", i),
                    format!("What is {}?", subject),
                    shuffled(options, &mut *rng),
                    Some("Definition from document".to_string()),
                )
            })
            .collect()
    }

    fn list_questions<R: Rng + ?Sized>(
        &self,
        cleaned: &str,
        candidates: &[String],
        rng: &mut R,
    ) -> Vec<Question> {
        LIST_RE
            .find_iter(cleaned)
            .map(|m| split_list_items(m.as_str()))
            .filter(|items| items.len() >= 3)
            .take(MAX_LIST_QUESTIONS)
            .enumerate()
            .filter_map(|(i, items)| {
                let item_refs: Vec<&str> = items.iter().map(String::as_str).collect();
                let Some(odd_one) = select_distractors(candidates, &item_refs, 1, &mut *rng).pop() else {
                    debug!("列表 {:?} 找不到可用的干扰项，跳过", items);
                    return None;
                };

                let mut options: Vec<QuizOption> =
                    items.iter().map(|item| QuizOption::new(item.as_str(), false)).collect();
                options.push(QuizOption::new(odd_one, true));

                Question::from_options(
                    format!("list-{}", i),
                    format!("Which item doesn't belong with these: {}?", items.join(", ")),
                    shuffled(options, &mut *rng),
                    Some("List from document".to_string()),
                )
            })
            .collect()
    }
}

/// 规范化文本：换行变空格，合并空白，去掉白名单外的字符
pub fn clean_text(text: &str) -> String {
    let single_line = text.replace('\n', " ");
    let collapsed = WHITESPACE_RE.replace_all(&single_line, " ");
    DISALLOWED_RE.replace_all(&collapsed, "").into_owned()
}

/// 提取候选干扰词
///
/// 按首次出现顺序去重，去掉停用词和不超过 3 个字符的词，最多保留 20 个。
pub fn candidate_terms(cleaned: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    CANDIDATE_RE
        .find_iter(cleaned)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() > 3)
        .filter(|word| !STOP_WORDS.contains(word.to_ascii_lowercase().as_str()))
        .filter(|word| seen.insert(*word))
        .take(MAX_CANDIDATES)
        .map(str::to_string)
        .collect()
}

/// 从候选词中随机挑选干扰项
///
/// `exclude` 中的文本（不区分大小写）永远不会被选中；候选不足时返回更少的结果。
pub fn select_distractors<R: Rng + ?Sized>(
    candidates: &[String],
    exclude: &[&str],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let pool: Vec<&String> = candidates
        .iter()
        .filter(|c| !exclude.iter().any(|e| e.eq_ignore_ascii_case(c)))
        .collect();

    shuffled(pool, rng)
        .into_iter()
        .take(count)
        .cloned()
        .collect()
}

/// 无偏 Fisher-Yates 洗牌，返回新的排列
pub fn shuffled<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

fn split_list_items(list: &str) -> Vec<String> {
    LIST_SEPARATOR_RE
        .split(list)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
