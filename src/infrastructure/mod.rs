pub mod clipboard;
pub mod extractor;
pub mod speech;

pub use clipboard::{Clipboard, SystemClipboard};
pub use extractor::TextExtractor;
pub use speech::{ConsoleSpeech, SpeechOptions, SpeechService};
