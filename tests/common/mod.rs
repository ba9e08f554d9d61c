#![allow(dead_code)]

use async_trait::async_trait;
use recitube::{GenerationError, TextGenerator, TranscriptError, TranscriptSource};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const TWO_RECIPES: &str = r#"[{"name":"Tuna with rice","ingredients":["Tuna","Rice"]},{"name":"Broccoli with garlic","ingredients":["garlic","broccoli"]}]"#;

/// Transcript source returning a fixed transcript, or no transcript at all
pub struct FakeTranscriptSource {
    transcript: Option<String>,
    calls: AtomicUsize,
}

impl FakeTranscriptSource {
    pub fn with_transcript(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            transcript: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptSource for FakeTranscriptSource {
    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcript
            .clone()
            .ok_or_else(|| TranscriptError::Disabled(video_id.to_string()))
    }
}

/// One scripted generator outcome
pub enum Reply {
    Text(&'static str),
    Fail,
}

/// Generator that plays back scripted replies, repeating the last one forever
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    last: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(mut replies: Vec<Reply>) -> Self {
        let last = replies.pop().unwrap_or(Reply::Fail);
        Self {
            replies: Mutex::new(replies.into()),
            last,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: Reply) -> Self {
        Self::new(vec![reply])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let next = self.replies.lock().unwrap().pop_front();
        match next.as_ref().unwrap_or(&self.last) {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Fail => Err(GenerationError::Status {
                status: 503,
                body: "backend overloaded".to_string(),
            }),
        }
    }
}
