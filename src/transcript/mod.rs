mod timedtext;
mod youtube;

pub use timedtext::parse_timed_text;
pub use youtube::{CaptionTrack, YouTubeTranscriptSource};

use crate::error::TranscriptError;
use async_trait::async_trait;

/// Where transcripts come from
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Return the full caption text of a video in temporal order
    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError>;
}
