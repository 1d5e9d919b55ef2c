//! 答题会话
//!
//! 保存当前展示的题目和用户的作答，每道题只记录第一次作答

use std::collections::HashMap;

use crate::models::Question;

/// 答题会话
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: HashMap<String, usize>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            answers: HashMap::new(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// 记录作答
    ///
    /// 返回 `false` 表示题目不存在、选项越界或已经作答过。
    pub fn select_answer(&mut self, question_id: &str, option_index: usize) -> bool {
        let Some(question) = self.questions.iter().find(|q| q.id == question_id) else {
            return false;
        };
        if option_index >= question.options.len() || self.answers.contains_key(question_id) {
            return false;
        }
        self.answers.insert(question_id.to_string(), option_index);
        true
    }

    pub fn answer(&self, question_id: &str) -> Option<usize> {
        self.answers.get(question_id).copied()
    }

    /// 作答反馈，未作答时返回 `None`
    pub fn feedback(&self, question_id: &str) -> Option<String> {
        let question = self.questions.iter().find(|q| q.id == question_id)?;
        let selected = self.answer(question_id)?;
        let explanation = question.explanation.as_deref().unwrap_or("");

        if selected == question.correct_answer {
            Some(format!("✓ Correct! {}", explanation).trim_end().to_string())
        } else {
            let correct_text = question
                .correct_option()
                .map(|opt| opt.text.as_str())
                .unwrap_or("");
            Some(format!(
                "✗ The correct answer is \"{}\" ({})",
                correct_text, explanation
            ))
        }
    }

    /// 清空作答，保留题目
    pub fn retry(&mut self) {
        self.answers.clear();
    }

    /// (答对数, 题目总数)
    pub fn score(&self) -> (usize, usize) {
        let correct = self
            .questions
            .iter()
            .filter(|q| self.answer(&q.id) == Some(q.correct_answer))
            .count();
        (correct, self.questions.len())
    }

    pub fn is_complete(&self) -> bool {
        self.questions.iter().all(|q| self.answers.contains_key(&q.id))
    }
}
