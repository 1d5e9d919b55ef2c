//! AI 请求服务 - 业务能力层
//!
//! 负责构造测验 / 要点提示词，并把模型回复解析为结构化结果。
//! 任何失败都以 `AiError` 返回，由流程层决定是否兜底。

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::AiError;
use crate::models::{KeyPoint, Question, QuizAnalysis, QuizOption};
use crate::services::llm_service::TextGenerator;
use crate::utils::{take_chars, truncate_text};

/// 测验生成结果
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResponse {
    pub questions: Vec<Question>,
    pub analysis: Option<QuizAnalysis>,
}

/// AI 请求器
pub struct AiRequester<G> {
    generator: G,
    prompt_char_limit: usize,
}

impl<G: TextGenerator> AiRequester<G> {
    pub fn new(generator: G, prompt_char_limit: usize) -> Self {
        Self {
            generator,
            prompt_char_limit,
        }
    }

    /// 请求模型生成测验题
    pub async fn request_quiz(&self, text: &str) -> Result<QuizResponse, AiError> {
        let prompt = build_quiz_prompt(take_chars(text, self.prompt_char_limit));
        debug!("测验提示词长度: {} 字符", prompt.len());

        let reply = self.generator.generate(&prompt, None).await?;
        debug!("模型回复: {}", truncate_text(&reply, 200));
        let response = parse_quiz_response(&reply)?;

        info!(
            "✅ 模型生成 {} 道题 (模型: {})",
            response.questions.len(),
            self.generator.model_name()
        );
        Ok(response)
    }

    /// 请求模型提取要点
    pub async fn request_key_points(&self, text: &str) -> Result<Vec<KeyPoint>, AiError> {
        let prompt = build_key_points_prompt(take_chars(text, self.prompt_char_limit));
        debug!("要点提示词长度: {} 字符", prompt.len());

        let reply = self.generator.generate(&prompt, None).await?;
        let points = parse_key_points(&reply)?;

        info!(
            "✅ 模型提取 {} 条要点 (模型: {})",
            points.len(),
            self.generator.model_name()
        );
        Ok(points)
    }
}

fn build_quiz_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following text and generate as many high-quality quiz questions as possible.
Focus on key concepts, important details, and relationships in the text.
Return JSON format:
{{
  "questions": [
    {{
      "question": "",
      "options": [],
      "answer": 0,
      "explanation": ""
    }}
  ],
  "analysis": {{
    "total_concepts": number,
    "questions_generated": number
  }}
}}
Text: {}"#,
        text
    )
}

fn build_key_points_prompt(text: &str) -> String {
    format!(
        "Extract 10 key points from the following text in simple, concise bullet points.\n\
         Each point should be short (1 sentence max) and easy to understand. Focus on the most important concepts.\n\
         Return only the bullet points without any additional text or numbering.\n\n\
         Text: {}",
        text
    )
}

/// 去掉 Markdown 代码块标记，并截取最外层的 JSON 对象
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.trim_end().strip_suffix("```").unwrap_or(trimmed);

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed.trim(),
    }
}

#[derive(Debug, Deserialize)]
struct RawQuiz {
    questions: Option<Vec<RawQuestion>>,
    #[serde(default)]
    analysis: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    answer: Option<Value>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOption {
    Text(String),
    Object { text: String },
}

impl RawOption {
    fn into_text(self) -> String {
        match self {
            RawOption::Text(text) | RawOption::Object { text } => text,
        }
    }
}

/// 把 `answer` 字段解释为选项下标
///
/// 支持数字、数字字符串和字母（"A"/"b"）；缺省时为 0。
fn answer_index(answer: Option<&Value>) -> Option<usize> {
    match answer {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<usize>() {
                return Some(n);
            }
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => {
                    Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
                }
                _ => None,
            }
        }
        Some(_) => None,
    }
}

/// 解析测验回复
///
/// 缺少 `questions` 字段视为格式错误；答案下标非法的题目会被丢弃。
pub fn parse_quiz_response(reply: &str) -> Result<QuizResponse, AiError> {
    let raw: RawQuiz = serde_json::from_str(strip_code_fences(reply))?;

    let raw_questions = raw.questions.ok_or_else(|| AiError::MalformedResponse {
        reason: "missing \"questions\" field".to_string(),
    })?;

    let total = raw_questions.len();
    let questions: Vec<Question> = raw_questions
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let answer = answer_index(raw.answer.as_ref());
            let options: Vec<QuizOption> = raw
                .options
                .into_iter()
                .enumerate()
                .map(|(idx, opt)| QuizOption::new(opt.into_text(), Some(idx) == answer))
                .collect();
            let explanation = raw.explanation.filter(|e| !e.trim().is_empty());

            let question = Question::from_options(format!("q-{}", i), raw.question, options, explanation);
            if question.is_none() {
                warn!("⚠️ 丢弃第 {} 题：答案下标无效", i + 1);
            }
            question
        })
        .collect();

    if questions.is_empty() {
        return Err(AiError::MalformedResponse {
            reason: format!("none of the {} questions is usable", total),
        });
    }

    let analysis = raw
        .analysis
        .and_then(|value| serde_json::from_value::<QuizAnalysis>(value).ok());

    Ok(QuizResponse {
        questions,
        analysis,
    })
}

/// 解析要点回复：每个非空行一条，去掉行首的一个项目符号
pub fn parse_key_points(reply: &str) -> Result<Vec<KeyPoint>, AiError> {
    let points = KeyPoint::batch(
        reply
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.strip_prefix(['-', '•', '*']).unwrap_or(line).trim())
            .filter(|line| !line.is_empty()),
    );

    if points.is_empty() {
        return Err(AiError::MalformedResponse {
            reason: "no key points in response".to_string(),
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(
            strip_code_fences("Here you go:\n{\"a\":{\"b\":2}}\nEnjoy"),
            "{\"a\":{\"b\":2}}"
        );
        assert_eq!(strip_code_fences("  plain  "), "plain");
    }

    #[test]
    fn test_parse_quiz_response() {
        let reply = r#"```json
{
  "questions": [
    {"question": "What is H2O?", "options": ["Salt", "Water", "Air"], "answer": 1, "explanation": "Chemistry"},
    {"question": "Pick B", "options": [{"text": "a"}, {"text": "b"}], "answer": "B"},
    {"question": "Broken", "options": ["x"], "answer": 5}
  ],
  "analysis": {"total_concepts": 4, "questions_generated": 3}
}
```"#;
        let response = parse_quiz_response(reply).unwrap();
        assert_eq!(response.questions.len(), 2);

        let first = &response.questions[0];
        assert_eq!(first.id, "q-0");
        assert_eq!(first.correct_answer, 1);
        assert_eq!(first.correct_option().unwrap().text, "Water");
        assert_eq!(first.explanation.as_deref(), Some("Chemistry"));

        let second = &response.questions[1];
        assert_eq!(second.id, "q-1");
        assert_eq!(second.correct_answer, 1);
        assert_eq!(second.explanation, None);
        assert!(response.questions.iter().all(Question::is_consistent));

        assert_eq!(
            response.analysis,
            Some(QuizAnalysis {
                total_concepts: 4,
                questions_generated: 3
            })
        );
    }

    #[test]
    fn test_missing_answer_defaults_to_first_option() {
        let reply = r#"{"questions":[{"question":"Q","options":["a","b"]}]}"#;
        let response = parse_quiz_response(reply).unwrap();
        assert_eq!(response.questions[0].correct_answer, 0);
        assert_eq!(response.analysis, None);
    }

    #[test]
    fn test_parse_quiz_response_errors() {
        assert!(matches!(
            parse_quiz_response(r#"{"analysis": {}}"#),
            Err(AiError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_quiz_response("not json at all"),
            Err(AiError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_quiz_response(r#"{"questions": [{"question": "Q", "options": []}]}"#),
            Err(AiError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_parse_key_points() {
        let reply = "- First point\n\n• Second point\n* Third point\nFourth point\n-Fifth";
        let points = parse_key_points(reply).unwrap();
        let texts: Vec<&str> = points.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["First point", "Second point", "Third point", "Fourth point", "Fifth"]
        );
        assert!(points[3].is_important);
        assert!(!points[4].is_important);
        assert_eq!(points[4].id, 4);
    }

    #[test]
    fn test_parse_key_points_strips_single_bullet() {
        let reply = "* **Bold** text\n**Emphasis** first\n-- Dashed";
        let points = parse_key_points(reply).unwrap();
        let texts: Vec<&str> = points.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["**Bold** text", "*Emphasis** first", "- Dashed"]);
    }

    #[test]
    fn test_parse_key_points_empty() {
        assert!(parse_key_points("  \n - \n").is_err());
    }
}
