pub mod ai_requester;
pub mod key_point_extractor;
pub mod llm_service;
pub mod question_synthesizer;

pub use ai_requester::{AiRequester, QuizResponse};
pub use key_point_extractor::extract_key_points;
pub use llm_service::{LlmService, TextGenerator};
pub use question_synthesizer::QuestionSynthesizer;
