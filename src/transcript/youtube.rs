use super::{parse_timed_text, TranscriptSource};
use crate::config::TranscriptConfig;
use crate::error::{SetupError, TranscriptError};
use crate::secrets::SecretStore;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Proxy};
use serde::Deserialize;
use std::time::Instant;

const CAPTIONS_MARKER: &str = "\"captions\":";
const VIDEO_DETAILS_MARKER: &str = ",\"videoDetails";

/// One caption track advertised on a watch page
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `Some("asr")` for automatically generated captions
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsBlock {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

/// Fetches captions the way the YouTube web player does: read the caption
/// track list embedded in the watch page, then download the chosen track.
pub struct YouTubeTranscriptSource {
    client: Client,
    base_url: String,
    languages: Vec<String>,
}

impl YouTubeTranscriptSource {
    /// Create a source from configuration.
    ///
    /// Proxy credentials, when a proxy is configured, are read from the secret store.
    pub fn new(config: &TranscriptConfig, secrets: &dyn SecretStore) -> Result<Self, SetupError> {
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .user_agent("Mozilla/5.0 (compatible; RecitubeBot/1.0)");

        if let Some(proxy) = &config.proxy {
            let username = secrets.get_secret(&proxy.username_secret)?;
            let password = secrets.get_secret(&proxy.password_secret)?;
            info!("Routing transcript requests through proxy {}", proxy.url);
            builder = builder.proxy(Proxy::https(&proxy.url)?.basic_auth(&username, &password));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            languages: config.languages.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, languages: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            languages,
        }
    }

    /// Download the watch page and list its caption tracks
    pub async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
        let response = self
            .client
            .get(format!("{}/watch", self.base_url))
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranscriptError::Status(response.status().as_u16()));
        }

        let html = response.text().await?;
        extract_caption_tracks(&html, video_id)
    }

    /// Pick a track in language preference order, manual captions first
    pub fn select_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        self.languages.iter().find_map(|language| {
            let matching = || tracks.iter().filter(move |t| &t.language_code == language);
            matching()
                .find(|t| !t.is_generated())
                .or_else(|| matching().next())
        })
    }
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptSource {
    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError> {
        let start = Instant::now();

        let tracks = self.list_tracks(video_id).await?;
        let track = self
            .select_track(&tracks)
            .ok_or_else(|| TranscriptError::NotFound {
                video_id: video_id.to_string(),
                languages: self.languages.clone(),
            })?;
        debug!(
            "Using '{}' captions for {} (generated: {})",
            track.language_code,
            video_id,
            track.is_generated()
        );

        let response = self.client.get(&track.base_url).send().await?;
        if !response.status().is_success() {
            return Err(TranscriptError::Status(response.status().as_u16()));
        }
        let transcript = parse_timed_text(&response.text().await?)?;

        info!(
            "Transcript for {} fetched in {:.2} seconds",
            video_id,
            start.elapsed().as_secs_f64()
        );
        Ok(transcript)
    }
}

/// Pull the caption track list out of the player response embedded in a watch page
fn extract_caption_tracks(html: &str, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let Some((_, after)) = html.split_once(CAPTIONS_MARKER) else {
        if html.contains("class=\"g-recaptcha\"") {
            return Err(TranscriptError::Blocked);
        }
        if !html.contains("\"playabilityStatus\":") {
            return Err(TranscriptError::VideoUnavailable(video_id.to_string()));
        }
        return Err(TranscriptError::Disabled(video_id.to_string()));
    };

    let block = after
        .split_once(VIDEO_DETAILS_MARKER)
        .map(|(block, _)| block)
        .unwrap_or(after)
        .replace('\n', "");

    let captions: CaptionsBlock = serde_json::from_str(&block)
        .map_err(|e| TranscriptError::Malformed(format!("caption block: {e}")))?;

    match captions.player_captions_tracklist_renderer {
        Some(renderer) if !renderer.caption_tracks.is_empty() => Ok(renderer.caption_tracks),
        _ => Err(TranscriptError::Disabled(video_id.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(language: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.com/{language}"),
            language_code: language.to_string(),
            kind: kind.map(String::from),
        }
    }

    #[test]
    fn test_extract_caption_tracks() {
        let html = r#"<script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","name":{"simpleText":"English"},"languageCode":"en","kind":"asr"}]}},"videoDetails":{"videoId":"abc"}};</script>"#;

        let tracks = extract_caption_tracks(html, "abc").unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(
            tracks[0].base_url,
            "https://www.youtube.com/api/timedtext?v=abc&lang=en"
        );
        assert!(tracks[0].is_generated());
    }

    #[test]
    fn test_extract_caption_tracks_disabled() {
        let html = r#"{"playabilityStatus":{"status":"OK"},"videoDetails":{"videoId":"abc"}}"#;
        assert!(matches!(
            extract_caption_tracks(html, "abc"),
            Err(TranscriptError::Disabled(_))
        ));
    }

    #[test]
    fn test_extract_caption_tracks_unavailable_and_blocked() {
        assert!(matches!(
            extract_caption_tracks("<html></html>", "abc"),
            Err(TranscriptError::VideoUnavailable(_))
        ));
        assert!(matches!(
            extract_caption_tracks(r#"<div class="g-recaptcha"></div>"#, "abc"),
            Err(TranscriptError::Blocked)
        ));
    }

    #[test]
    fn test_extract_caption_tracks_without_tracks() {
        let html = r#""playabilityStatus":{},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[]}},"videoDetails":{}"#;
        assert!(matches!(
            extract_caption_tracks(html, "abc"),
            Err(TranscriptError::Disabled(_))
        ));
    }

    #[test]
    fn test_select_track_prefers_manual_captions() {
        let source = YouTubeTranscriptSource::with_base_url(
            "http://localhost".to_string(),
            vec!["en".to_string()],
        );
        let tracks = vec![track("en", Some("asr")), track("de", None), track("en", None)];

        let selected = source.select_track(&tracks).unwrap();
        assert_eq!(selected.language_code, "en");
        assert!(!selected.is_generated());
    }

    #[test]
    fn test_select_track_language_order() {
        let source = YouTubeTranscriptSource::with_base_url(
            "http://localhost".to_string(),
            vec!["fr".to_string(), "de".to_string(), "en".to_string()],
        );
        let tracks = vec![track("en", None), track("de", Some("asr"))];

        let selected = source.select_track(&tracks).unwrap();
        assert_eq!(selected.language_code, "de");
    }

    #[test]
    fn test_select_track_no_match() {
        let source = YouTubeTranscriptSource::with_base_url(
            "http://localhost".to_string(),
            vec!["ja".to_string()],
        );
        assert!(source.select_track(&[track("en", None)]).is_none());
    }
}
