use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use study_buddy::error::{AiError, AppError, AppResult, DocumentError};
use study_buddy::infrastructure::{Clipboard, SpeechOptions, SpeechService};
use study_buddy::models::{Document, GenerationSource};
use study_buddy::services::{LlmService, TextGenerator};
use study_buddy::workflow::quiz_flow::NO_CONTENT_NOTICE;
use study_buddy::workflow::{
    copy_to_clipboard, KeyPointsFlow, QuizFlow, QuizSession, ReaderKey, ScreenReader,
    FALLBACK_NOTICE,
};
use study_buddy::Config;

/// 按顺序返回预设回复的生成器
struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(replies: Vec<Result<String, AiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self::new(vec![Err(AiError::RequestFailed {
            model: "scripted".to_string(),
            message: "connection reset".to_string(),
        })])
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _user_message: &str,
        _system_message: Option<&str>,
    ) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AiError::EmptyResponse {
                model: "scripted".to_string(),
            }))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
struct RecordingSpeech {
    spoken: Vec<String>,
}

impl SpeechService for RecordingSpeech {
    fn speak(&mut self, text: &str, _options: SpeechOptions) -> AppResult<()> {
        self.spoken.push(text.to_string());
        Ok(())
    }

    fn cancel(&mut self) {}
}

#[derive(Default)]
struct MemoryClipboard {
    content: String,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> AppResult<()> {
        self.content = text.to_string();
        Ok(())
    }
}

fn text_document(name: &str, body: &str) -> Document {
    Document::from_bytes(name, Some("text/plain"), body.as_bytes().to_vec())
}

#[tokio::test]
async fn test_quiz_falls_back_when_request_fails() {
    let generator = ScriptedGenerator::failing();
    let flow = QuizFlow::new(&Config::default(), &generator);
    let doc = text_document("notes.txt", "Paris is the capital of France. Water is H2O.");

    let outcome = flow.run(&doc, &mut StdRng::seed_from_u64(3)).await.unwrap();

    assert_eq!(generator.calls(), 1);
    assert_eq!(outcome.source, GenerationSource::Fallback);
    assert_eq!(outcome.notice.as_deref(), Some(FALLBACK_NOTICE));
    assert!(outcome.ai_error.unwrap().contains("connection reset"));

    let mut answers: Vec<&str> = outcome
        .questions
        .iter()
        .map(|q| q.correct_option().unwrap().text.as_str())
        .collect();
    answers.sort();
    assert_eq!(answers, vec!["H2O", "the capital of France"]);
    assert!(outcome.questions.iter().all(|q| q.is_consistent()));
}

#[tokio::test]
async fn test_oversized_quiz_upload_is_rejected_before_extraction() {
    let generator = ScriptedGenerator::failing();
    let flow = QuizFlow::new(&Config::default(), &generator);
    // 不是合法 PDF：如果先提取会得到 ExtractionFailed
    let doc = Document::from_bytes("big.pdf", Some("application/pdf"), vec![0u8; 6 * 1024 * 1024]);

    let err = flow
        .run(&doc, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Document(DocumentError::FileTooLarge { .. })
    ));
    assert_eq!(err.to_string(), "File size exceeds 5MB limit");
    assert_eq!(generator.calls(), 0);
    assert!(!flow.gate().is_busy());
}

#[tokio::test]
async fn test_quiz_uses_ai_result() {
    let reply = r#"```json
{
  "questions": [
    {"question": "What is H2O?", "options": ["Salt", "Water", "Air", "Fire"], "answer": 1, "explanation": "Basic chemistry"}
  ],
  "analysis": {"total_concepts": 3, "questions_generated": 1}
}
```"#;
    let generator = ScriptedGenerator::new(vec![Ok(reply.to_string())]);
    let flow = QuizFlow::new(&Config::default(), &generator);
    let doc = text_document("notes.txt", "Water is H2O.");

    let outcome = flow.run(&doc, &mut StdRng::seed_from_u64(0)).await.unwrap();

    assert_eq!(outcome.source, GenerationSource::Ai);
    assert_eq!(outcome.notice, None);
    assert_eq!(outcome.questions.len(), 1);
    assert_eq!(outcome.questions[0].correct_option().unwrap().text, "Water");
    assert_eq!(
        outcome.summary(),
        "Generated 1 questions covering 3 key concepts from your document."
    );

    // 作答与重试
    let mut session = QuizSession::new(outcome.questions);
    assert!(session.select_answer("q-0", 1));
    assert_eq!(session.feedback("q-0").unwrap(), "✓ Correct! Basic chemistry");
    session.retry();
    assert_eq!(session.score(), (0, 1));
}

#[tokio::test]
async fn test_malformed_ai_reply_falls_back() {
    let generator = ScriptedGenerator::new(vec![Ok("Sorry, I cannot help with that.".to_string())]);
    let flow = QuizFlow::new(&Config::default(), &generator);
    let doc = text_document("notes.txt", "Paris is the capital of France.");

    let outcome = flow.run(&doc, &mut StdRng::seed_from_u64(0)).await.unwrap();

    assert_eq!(outcome.source, GenerationSource::Fallback);
    assert_eq!(outcome.notice.as_deref(), Some(FALLBACK_NOTICE));
    assert_eq!(outcome.questions.len(), 1);
    assert_eq!(
        outcome.summary(),
        "Generated 1 questions from your document content."
    );
}

#[tokio::test]
async fn test_unsupported_and_empty_documents() {
    let generator = ScriptedGenerator::failing();
    let flow = QuizFlow::new(&Config::default(), &generator);

    let image = Document::from_bytes("photo.png", Some("image/png"), vec![1, 2, 3]);
    let err = flow
        .run(&image, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported file type");

    let empty = text_document("empty.txt", "   \n");
    let outcome = flow.run(&empty, &mut StdRng::seed_from_u64(0)).await.unwrap();
    assert!(outcome.questions.is_empty());
    assert_eq!(outcome.notice.as_deref(), Some(NO_CONTENT_NOTICE));

    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_busy_gate_rejects_reentry() {
    let generator = ScriptedGenerator::failing();
    let flow = QuizFlow::new(&Config::default(), &generator);
    let doc = text_document("notes.txt", "Water is H2O.");

    let guard = flow.gate().try_enter().unwrap();
    let err = flow
        .run(&doc, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Busy));
    drop(guard);

    assert!(flow.run(&doc, &mut StdRng::seed_from_u64(0)).await.is_ok());
}

#[tokio::test]
async fn test_missing_credential_uses_local_fallback() {
    let config = Config {
        llm_api_key: String::new(),
        ..Config::default()
    };
    let flow = QuizFlow::new(&config, LlmService::new(&config));
    let doc = text_document("notes.txt", "Water is H2O.");

    let outcome = flow.run(&doc, &mut StdRng::seed_from_u64(0)).await.unwrap();
    assert_eq!(outcome.source, GenerationSource::Fallback);
    assert_eq!(outcome.ai_error.as_deref(), Some("No API credential configured"));
}

#[tokio::test]
async fn test_key_points_from_ai_and_copy() {
    let reply = "- Cells are the basic unit of life\n• DNA stores genetic information\n\n* Proteins do most of the work";
    let generator = ScriptedGenerator::new(vec![Ok(reply.to_string())]);
    let flow = KeyPointsFlow::new(&Config::default(), &generator);
    let doc = text_document("bio.txt", "Biology notes.");

    let outcome = flow.run(&doc).await.unwrap();
    assert_eq!(outcome.source, GenerationSource::Ai);
    assert_eq!(outcome.key_points.len(), 3);

    let mut clipboard = MemoryClipboard::default();
    let notice = copy_to_clipboard(&mut clipboard, &outcome.key_points).unwrap();
    assert_eq!(notice, "Key points copied to clipboard!");
    assert_eq!(
        clipboard.content,
        "• Cells are the basic unit of life\n• DNA stores genetic information\n• Proteins do most of the work"
    );
}

#[tokio::test]
async fn test_key_points_fallback_ranks_long_sentences() {
    let generator = ScriptedGenerator::failing();
    let flow = KeyPointsFlow::new(&Config::default(), &generator);
    let text = "Short. The mitochondria is the powerhouse of the cell. \
                Photosynthesis converts light energy into chemical energy in plants and algae!";
    // 要点路径不检查大小
    let mut body = text.to_string();
    body.push_str(&" ".repeat(6 * 1024 * 1024));
    let doc = text_document("bio.txt", &body);

    let outcome = flow.run(&doc).await.unwrap();
    assert_eq!(outcome.source, GenerationSource::Fallback);
    assert_eq!(outcome.notice.as_deref(), Some(FALLBACK_NOTICE));
    let texts: Vec<&str> = outcome.key_points.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Photosynthesis converts light energy into chemical energy in plants and algae",
            "The mitochondria is the powerhouse of the cell",
        ]
    );
}

#[tokio::test]
async fn test_screen_reader_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lecture.txt");
    std::fs::write(&path, "Gravity pulls objects toward each other.").unwrap();

    let mut reader = ScreenReader::new(&Config::default(), RecordingSpeech::default());
    reader.toggle().unwrap();

    let doc = Document::from_path(&path).await.unwrap();
    reader.load_document(&doc).await.unwrap();
    reader.handle_key(ReaderKey::Read).unwrap();

    let spoken = &reader.speech().spoken;
    assert_eq!(
        spoken[spoken.len() - 2],
        "Document lecture.txt processed successfully. Press R to hear the content."
    );
    assert_eq!(
        spoken.last().unwrap(),
        "Document content: Gravity pulls objects toward each other."
    );
}
