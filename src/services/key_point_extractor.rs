//! 要点兜底提取 - 业务能力层
//!
//! 以句子长度近似重要程度：取词数最多的句子作为要点

use std::sync::LazyLock;

use regex::Regex;

use crate::models::KeyPoint;

static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern"));

/// 句子至少需要超过这么多词才会被选中
const MIN_WORDS_EXCLUSIVE: usize = 5;
/// 最多返回的要点数量
const MAX_KEY_POINTS: usize = 10;

/// 从文本中挑选最长的句子作为要点
///
/// 词数相同的句子保持原文顺序。
pub fn extract_key_points(text: &str) -> Vec<KeyPoint> {
    let mut sentences: Vec<(&str, usize)> = SENTENCE_END_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| (s, s.split_whitespace().count()))
        .filter(|(_, words)| *words > MIN_WORDS_EXCLUSIVE)
        .collect();

    sentences.sort_by(|a, b| b.1.cmp(&a.1));

    KeyPoint::batch(
        sentences
            .into_iter()
            .take(MAX_KEY_POINTS)
            .map(|(sentence, _)| sentence),
    )
}
