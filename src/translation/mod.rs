mod cached;
mod client;
mod language;
mod prompt;
mod sse_parser;

pub use cached::CachedTranslator;
pub use client::{TranslationClient, TranslationRequest};
pub use language::{SUPPORTED_LANGUAGES, is_supported_language, language_name, print_languages};
