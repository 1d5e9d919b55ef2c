pub mod document;
pub mod question;

pub use document::{Document, DocumentKind};
pub use question::{GenerationSource, KeyPoint, Question, QuizAnalysis, QuizOption};
