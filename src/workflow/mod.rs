pub mod gate;
pub mod key_points_flow;
pub mod quiz_flow;
pub mod quiz_session;
pub mod screen_reader;

pub use gate::{ProcessingGate, ProcessingGuard};
pub use key_points_flow::{copy_to_clipboard, format_for_clipboard, KeyPointsFlow, KeyPointsOutcome};
pub use quiz_flow::{QuizFlow, QuizOutcome, FALLBACK_NOTICE};
pub use quiz_session::QuizSession;
pub use screen_reader::{KeyResponse, ReaderKey, ScreenReader};
