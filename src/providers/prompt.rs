/// The instruction template wrapped around every transcript.
///
/// The prompt is loaded from `prompt.txt` at compile time using the
/// `include_str!` macro, making it easy to edit without dealing with
/// Rust string syntax. It contains a single `{transcript}` placeholder.
pub const RECIPE_EXTRACTION_PROMPT: &str = include_str!("prompt.txt");

const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

/// Render the extraction prompt for a transcript.
///
/// The transcript is inserted verbatim; callers make sure it is not empty.
pub fn build_prompt(transcript: &str) -> String {
    RECIPE_EXTRACTION_PROMPT.replacen(TRANSCRIPT_PLACEHOLDER, transcript, 1)
}
